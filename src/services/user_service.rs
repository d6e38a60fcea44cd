//! Domain service for user accounts: registration, listing, profile edits
//! and deletion.

use thiserror::Error;

use crate::db::User;
use crate::pagination::{Page, PageQuery};
use crate::services::auth_service::AuthenticatedIdentity;

/// Errors specific to user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("You can only modify your own account")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A registration request with every field present.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Profile edit; any subset of fields.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Conflict`] if the username or email is taken.
    async fn register(&self, request: RegisterUser) -> Result<User, UserError>;

    /// Lists users ordered by id.
    async fn list(&self, query: &PageQuery) -> Result<Page<User>, UserError>;

    /// Gets a user by id.
    async fn get(&self, id: i32) -> Result<User, UserError>;

    /// Applies a profile edit to the caller's own account.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Forbidden`] if `id` is not the caller, and
    /// [`UserError::Conflict`] if a new username or email is taken.
    async fn update(
        &self,
        identity: &AuthenticatedIdentity,
        id: i32,
        update: UserUpdate,
    ) -> Result<User, UserError>;

    /// Deletes the caller's own account and all of its entries.
    async fn delete(&self, identity: &AuthenticatedIdentity, id: i32) -> Result<(), UserError>;
}
