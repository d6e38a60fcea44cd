use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::entry::{Entry, EntryChanges, NewEntry};
pub use repositories::user::{NewUser, User, UserChanges};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn entry_repo(&self) -> repositories::entry::EntryRepository {
        repositories::entry::EntryRepository::new(self.conn.clone())
    }

    // Users

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn list_users(&self, limit: u64, offset: u64) -> Result<Vec<User>> {
        self.user_repo().list_page(limit, offset).await
    }

    pub async fn insert_user(&self, new_user: NewUser) -> Result<User> {
        self.user_repo().insert(new_user).await
    }

    pub async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>> {
        self.user_repo().update(id, changes).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // Entries

    pub async fn get_entry(&self, id: i32) -> Result<Option<Entry>> {
        self.entry_repo().get(id).await
    }

    pub async fn count_entries_for_user(&self, user_id: i32) -> Result<u64> {
        self.entry_repo().count_by_owner(user_id).await
    }

    pub async fn list_entries_for_user(
        &self,
        user_id: i32,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Entry>> {
        self.entry_repo()
            .page_by_owner(user_id, limit, offset)
            .await
    }

    pub async fn insert_entry(&self, new_entry: NewEntry) -> Result<Entry> {
        self.entry_repo().insert(new_entry).await
    }

    pub async fn update_entry(&self, id: i32, changes: EntryChanges) -> Result<Option<Entry>> {
        self.entry_repo().update(id, changes).await
    }

    pub async fn delete_entry(&self, id: i32) -> Result<bool> {
        self.entry_repo().delete(id).await
    }
}

/// True when `err` (or anything it wraps) is a unique-constraint violation.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
}
