//! Domain service for request authentication.
//!
//! Two independent schemes exist: `Basic` (email + password, used for
//! profile mutation and token issuance) and `Bearer` (a signed token, used
//! for everything else). Both resolve to an [`AuthenticatedIdentity`] that
//! lives for a single request.

use base64::Engine;
use thiserror::Error;

use super::token::TokenError;
use crate::db::User;

/// Errors specific to authentication operations.
///
/// Every variant except `Database` and `Internal` is a rejection of the
/// caller's credentials; the API layer collapses those into one generic
/// message per scheme.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredentials,

    #[error("Malformed Authorization header: {0}")]
    Malformed(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("Token subject {0} does not exist")]
    UnknownSubject(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True when the failure is the caller's fault rather than ours.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Credential,
    Token,
}

/// The resolved user for the current request and how they proved it.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub user: User,
    pub scheme: AuthScheme,
}

impl AuthenticatedIdentity {
    #[must_use]
    pub const fn user_id(&self) -> i32 {
        self.user.id
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Resolves a `Basic base64(email:password)` header.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for both unknown emails and
    /// wrong passwords.
    async fn authenticate_basic(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticatedIdentity, AuthError>;

    /// Resolves a `Bearer <token>` header.
    async fn authenticate_bearer(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticatedIdentity, AuthError>;

    /// Issues a fresh bearer token. Only credential-authenticated identities
    /// may obtain one.
    fn issue_token(&self, identity: &AuthenticatedIdentity) -> Result<String, AuthError>;
}

/// Splits `<scheme> <payload>`, matching the scheme case-insensitively.
fn strip_scheme<'a>(header: &'a str, scheme: &str) -> Result<&'a str, AuthError> {
    let (given, payload) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| AuthError::Malformed(format!("expected '{scheme} <credentials>'")))?;

    if !given.eq_ignore_ascii_case(scheme) {
        return Err(AuthError::Malformed(format!(
            "expected '{scheme}' scheme, got '{given}'"
        )));
    }

    let payload = payload.trim();
    if payload.is_empty() {
        return Err(AuthError::Malformed("empty credentials".to_string()));
    }
    Ok(payload)
}

/// Decodes a Basic header into `(email, password)`, splitting on the first `:`.
pub fn parse_basic(header: Option<&str>) -> Result<(String, String), AuthError> {
    let payload = strip_scheme(header.ok_or(AuthError::MissingCredentials)?, "Basic")?;

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AuthError::Malformed(format!("invalid base64: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AuthError::Malformed("credentials are not UTF-8".to_string()))?;

    let (email, password) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::Malformed("missing ':' separator".to_string()))?;

    Ok((email.to_string(), password.to_string()))
}

/// Extracts the token from a Bearer header.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    strip_scheme(header.ok_or(AuthError::MissingCredentials)?, "Bearer")
}
