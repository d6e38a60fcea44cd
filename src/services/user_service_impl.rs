//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{self, NewUser, Store, User, UserChanges};
use crate::pagination::{Page, PageQuery, PaginationState};
use crate::services::auth_service::AuthenticatedIdentity;
use crate::services::ownership;
use crate::services::password::PasswordService;
use crate::services::user_service::{RegisterUser, UserError, UserService, UserUpdate};

pub struct SeaOrmUserService {
    store: Store,
    passwords: PasswordService,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, passwords: PasswordService) -> Self {
        Self { store, passwords }
    }

    /// Fails with `Conflict` if `username` or `email` belongs to a user
    /// other than `except`.
    async fn ensure_available(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<i32>,
    ) -> Result<(), UserError> {
        if let Some(username) = username
            && let Some(existing) = self.store.get_user_by_username(username).await?
            && Some(existing.id) != except
        {
            return Err(UserError::Conflict("Username already in use".to_string()));
        }

        if let Some(email) = email
            && let Some(existing) = self.store.get_user_by_email(email).await?
            && Some(existing.id) != except
        {
            return Err(UserError::Conflict("Email already in use".to_string()));
        }

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), UserError> {
    if value.trim().is_empty() {
        return Err(UserError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn map_write_error(err: anyhow::Error) -> UserError {
    if db::is_unique_violation(&err) {
        UserError::Conflict("Username or email already in use".to_string())
    } else {
        UserError::Internal(err.to_string())
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, request: RegisterUser) -> Result<User, UserError> {
        require_non_empty("username", &request.username)?;
        require_non_empty("email", &request.email)?;
        require_non_empty("name", &request.name)?;
        require_non_empty("password", &request.password)?;

        self.ensure_available(Some(&request.username), Some(&request.email), None)
            .await?;

        let password_hash = self.passwords.hash(&request.password).await?;

        let user = self
            .store
            .insert_user(NewUser {
                username: request.username,
                email: request.email,
                name: request.name,
                password_hash,
            })
            .await
            .map_err(map_write_error)?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    async fn list(&self, query: &PageQuery) -> Result<Page<User>, UserError> {
        let total = self.store.count_users().await?;
        let state = PaginationState::from_query(query, total);

        let items = match state.fetch_window() {
            Some((limit, offset)) => self.store.list_users(limit, offset).await?,
            None => Vec::new(),
        };

        Ok(Page { state, items })
    }

    async fn get(&self, id: i32) -> Result<User, UserError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn update(
        &self,
        identity: &AuthenticatedIdentity,
        id: i32,
        update: UserUpdate,
    ) -> Result<User, UserError> {
        if !ownership::authorize(identity, id).is_allowed() {
            return Err(UserError::Forbidden);
        }

        for (field, value) in [
            ("username", &update.username),
            ("email", &update.email),
            ("name", &update.name),
            ("password", &update.password),
        ] {
            if let Some(value) = value {
                require_non_empty(field, value)?;
            }
        }

        self.ensure_available(update.username.as_deref(), update.email.as_deref(), Some(id))
            .await?;

        let password_hash = match update.password.as_deref() {
            Some(password) => Some(self.passwords.hash(password).await?),
            None => None,
        };

        let user = self
            .store
            .update_user(
                id,
                UserChanges {
                    username: update.username,
                    email: update.email,
                    name: update.name,
                    password_hash,
                },
            )
            .await
            .map_err(map_write_error)?
            .ok_or(UserError::NotFound(id))?;

        info!(user_id = user.id, "User profile updated");
        Ok(user)
    }

    async fn delete(&self, identity: &AuthenticatedIdentity, id: i32) -> Result<(), UserError> {
        if !ownership::authorize(identity, id).is_allowed() {
            return Err(UserError::Forbidden);
        }

        if !self.store.delete_user(id).await? {
            return Err(UserError::NotFound(id));
        }

        info!(user_id = id, "User deleted");
        Ok(())
    }
}
