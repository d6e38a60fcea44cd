use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::{entries, prelude::*};
use crate::timestamp::EntryTimestamp;

pub use entries::Model as Entry;

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: i32,
    pub timestamp: EntryTimestamp,
    pub content: String,
}

/// Partial update; the timestamp and its offset always move together.
#[derive(Debug, Clone, Default)]
pub struct EntryChanges {
    pub timestamp: Option<EntryTimestamp>,
    pub content: Option<String>,
}

pub struct EntryRepository {
    conn: DatabaseConnection,
}

impl EntryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<Entry>> {
        Entries::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query entry by ID")
    }

    pub async fn count_by_owner(&self, user_id: i32) -> Result<u64> {
        Entries::find()
            .filter(entries::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count entries")
    }

    /// Newest first; ties broken by id so paging is stable.
    pub async fn page_by_owner(&self, user_id: i32, limit: u64, offset: u64) -> Result<Vec<Entry>> {
        Entries::find()
            .filter(entries::Column::UserId.eq(user_id))
            .order_by_desc(entries::Column::TimestampUtc)
            .order_by_desc(entries::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list entries")
    }

    pub async fn insert(&self, new_entry: NewEntry) -> Result<Entry> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = entries::ActiveModel {
            timestamp_utc: Set(new_entry.timestamp.timestamp_utc),
            utc_offset: Set(new_entry.timestamp.utc_offset),
            content: Set(new_entry.content),
            user_id: Set(new_entry.user_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert entry")
    }

    pub async fn update(&self, id: i32, changes: EntryChanges) -> Result<Option<Entry>> {
        let Some(entry) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: entries::ActiveModel = entry.into();
        if let Some(timestamp) = changes.timestamp {
            active.timestamp_utc = Set(timestamp.timestamp_utc);
            active.utc_offset = Set(timestamp.utc_offset);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update entry")?;

        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Entries::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete entry")?;

        Ok(result.rows_affected > 0)
    }
}
