//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::db::Store;
use crate::services::auth_service::{
    AuthError, AuthScheme, AuthService, AuthenticatedIdentity, parse_basic, parse_bearer,
};
use crate::services::password::PasswordService;
use crate::services::token::TokenIssuer;

pub struct SeaOrmAuthService {
    store: Store,
    passwords: PasswordService,
    tokens: Arc<TokenIssuer>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, passwords: PasswordService, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            store,
            passwords,
            tokens,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn authenticate_basic(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let (email, password) = parse_basic(authorization)?;

        let Some((user, verifier)) = self.store.get_user_by_email_with_password(&email).await?
        else {
            debug!(email = %email, "Basic auth rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.passwords.matches(&password, &verifier).await? {
            debug!(user_id = user.id, "Basic auth rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(AuthenticatedIdentity {
            user,
            scheme: AuthScheme::Credential,
        })
    }

    async fn authenticate_bearer(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let token = parse_bearer(authorization)?;
        let user_id = self.tokens.verify(token)?;

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UnknownSubject(user_id))?;

        Ok(AuthenticatedIdentity {
            user,
            scheme: AuthScheme::Token,
        })
    }

    fn issue_token(&self, identity: &AuthenticatedIdentity) -> Result<String, AuthError> {
        if identity.scheme != AuthScheme::Credential {
            return Err(AuthError::InvalidCredentials);
        }

        self.tokens
            .issue(identity.user_id())
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}
