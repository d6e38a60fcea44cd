use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::debug;

use super::{ApiError, AppState, TokenResponse};
use crate::services::{AuthError, AuthenticatedIdentity};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_TOKEN: &str = "Invalid or expired token";

// ============================================================================
// Extractors
// ============================================================================

/// Caller authenticated with `Authorization: Basic base64(email:password)`.
pub struct CredentialAuth(pub AuthenticatedIdentity);

/// Caller authenticated with `Authorization: Bearer <token>`.
pub struct TokenAuth(pub AuthenticatedIdentity);

impl FromRequestParts<Arc<AppState>> for CredentialAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let identity = state
            .auth_service()
            .authenticate_basic(authorization_header(&parts.headers))
            .await
            .map_err(|e| reject(e, INVALID_CREDENTIALS))?;

        tracing::Span::current().record("user_id", identity.user_id());
        Ok(Self(identity))
    }
}

impl FromRequestParts<Arc<AppState>> for TokenAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let identity = state
            .auth_service()
            .authenticate_bearer(authorization_header(&parts.headers))
            .await
            .map_err(|e| reject(e, INVALID_TOKEN))?;

        tracing::Span::current().record("user_id", identity.user_id());
        Ok(Self(identity))
    }
}

/// A header that is not visible ASCII is treated as absent.
fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok())
}

/// Collapses every credential rejection into one generic message per scheme.
/// The real reason only goes to the debug log.
fn reject(err: AuthError, message: &str) -> ApiError {
    if err.is_rejection() {
        debug!(reason = %err, "Authentication rejected");
        return ApiError::Unauthorized(message.to_string());
    }

    match err {
        AuthError::Database(msg) => ApiError::DatabaseError(msg),
        other => ApiError::internal(other.to_string()),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/tokens
/// Exchange Basic credentials for a short-lived bearer token
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    CredentialAuth(identity): CredentialAuth,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .auth_service()
        .issue_token(&identity)
        .map_err(|e| reject(e, INVALID_CREDENTIALS))?;

    tracing::info!(user_id = identity.user_id(), "Token issued");

    Ok(Json(TokenResponse { token }))
}
