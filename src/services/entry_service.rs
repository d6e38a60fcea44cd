//! Domain service for journal entries.
//!
//! Every operation is scoped to the authenticated owner. Looking up someone
//! else's entry is indistinguishable from looking up one that does not exist.

use thiserror::Error;

use crate::db::Entry;
use crate::pagination::{Page, PageQuery};
use crate::services::auth_service::AuthenticatedIdentity;
use crate::timestamp::TimestampError;

/// Errors specific to entry operations.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Entry not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TimestampError> for EntryError {
    fn from(err: TimestampError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<sea_orm::DbErr> for EntryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EntryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A new entry. `local_time` and `timezone` must both be present.
#[derive(Debug, Clone)]
pub struct CreateEntry {
    pub local_time: Option<String>,
    pub timezone: Option<String>,
    pub content: String,
}

/// Entry edit; `local_time` and `timezone` travel together or not at all.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub local_time: Option<String>,
    pub timezone: Option<String>,
    pub content: Option<String>,
}

/// Domain service trait for entries.
#[async_trait::async_trait]
pub trait EntryService: Send + Sync {
    /// Lists the caller's entries, newest first.
    async fn list(
        &self,
        identity: &AuthenticatedIdentity,
        query: &PageQuery,
    ) -> Result<Page<Entry>, EntryError>;

    /// Creates an entry owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::Validation`] before touching storage if the time
    /// fields are missing, unpaired or malformed.
    async fn create(
        &self,
        identity: &AuthenticatedIdentity,
        request: CreateEntry,
    ) -> Result<Entry, EntryError>;

    /// Gets one of the caller's entries.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::NotFound`] both for missing entries and for
    /// entries owned by someone else.
    async fn get(&self, identity: &AuthenticatedIdentity, id: i32) -> Result<Entry, EntryError>;

    /// Edits one of the caller's entries.
    async fn update(
        &self,
        identity: &AuthenticatedIdentity,
        id: i32,
        update: EntryUpdate,
    ) -> Result<Entry, EntryError>;

    /// Deletes one of the caller's entries.
    async fn delete(&self, identity: &AuthenticatedIdentity, id: i32) -> Result<(), EntryError>;
}
