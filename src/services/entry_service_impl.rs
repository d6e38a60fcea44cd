//! `SeaORM` implementation of the `EntryService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::{Entry, EntryChanges, NewEntry, Store};
use crate::pagination::{Page, PageQuery, PaginationState};
use crate::services::auth_service::AuthenticatedIdentity;
use crate::services::entry_service::{CreateEntry, EntryError, EntryService, EntryUpdate};
use crate::services::ownership;
use crate::timestamp::EntryTimestamp;

pub struct SeaOrmEntryService {
    store: Store,
}

impl SeaOrmEntryService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Loads `id` if the caller owns it. Missing and foreign entries both
    /// come back as `NotFound`.
    async fn owned_entry(
        &self,
        identity: &AuthenticatedIdentity,
        id: i32,
    ) -> Result<Entry, EntryError> {
        let entry = self.store.get_entry(id).await?.ok_or(EntryError::NotFound)?;

        if !ownership::authorize(identity, entry.user_id).is_allowed() {
            debug!(
                entry_id = id,
                user_id = identity.user_id(),
                "Entry belongs to another user"
            );
            return Err(EntryError::NotFound);
        }

        Ok(entry)
    }
}

fn require_content(content: &str) -> Result<(), EntryError> {
    if content.trim().is_empty() {
        return Err(EntryError::Validation("content cannot be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl EntryService for SeaOrmEntryService {
    async fn list(
        &self,
        identity: &AuthenticatedIdentity,
        query: &PageQuery,
    ) -> Result<Page<Entry>, EntryError> {
        let owner = identity.user_id();
        let total = self.store.count_entries_for_user(owner).await?;
        let state = PaginationState::from_query(query, total);

        let items = match state.fetch_window() {
            Some((limit, offset)) => {
                self.store
                    .list_entries_for_user(owner, limit, offset)
                    .await?
            }
            None => Vec::new(),
        };

        Ok(Page { state, items })
    }

    async fn create(
        &self,
        identity: &AuthenticatedIdentity,
        request: CreateEntry,
    ) -> Result<Entry, EntryError> {
        let timestamp = EntryTimestamp::assemble_new(
            request.local_time.as_deref(),
            request.timezone.as_deref(),
        )?;
        require_content(&request.content)?;

        let entry = self
            .store
            .insert_entry(NewEntry {
                user_id: identity.user_id(),
                timestamp,
                content: request.content,
            })
            .await?;

        info!(entry_id = entry.id, user_id = entry.user_id, "Entry created");
        Ok(entry)
    }

    async fn get(&self, identity: &AuthenticatedIdentity, id: i32) -> Result<Entry, EntryError> {
        self.owned_entry(identity, id).await
    }

    async fn update(
        &self,
        identity: &AuthenticatedIdentity,
        id: i32,
        update: EntryUpdate,
    ) -> Result<Entry, EntryError> {
        let timestamp =
            EntryTimestamp::assemble_edit(update.local_time.as_deref(), update.timezone.as_deref())?;
        if let Some(content) = update.content.as_deref() {
            require_content(content)?;
        }

        self.owned_entry(identity, id).await?;

        let entry = self
            .store
            .update_entry(
                id,
                EntryChanges {
                    timestamp,
                    content: update.content,
                },
            )
            .await?
            .ok_or(EntryError::NotFound)?;

        info!(entry_id = id, "Entry updated");
        Ok(entry)
    }

    async fn delete(&self, identity: &AuthenticatedIdentity, id: i32) -> Result<(), EntryError> {
        self.owned_entry(identity, id).await?;

        if !self.store.delete_entry(id).await? {
            return Err(EntryError::NotFound);
        }

        info!(entry_id = id, "Entry deleted");
        Ok(())
    }
}
