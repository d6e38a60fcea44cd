use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::db::Store;
use crate::services::token::{TokenIssuer, generate_secret};
use crate::services::{
    AuthService, Clock, EntryService, PasswordService, SeaOrmAuthService, SeaOrmEntryService,
    SeaOrmUserService, SystemClock, UserService,
};

/// Long-lived collaborators shared by every request.
///
/// Built once from [`Config`] and injected into the router; nothing here is
/// mutated after start-up.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub entry_service: Arc<dyn EntryService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Same as [`SharedState::new`] but with an explicit clock for token
    /// issuance and verification.
    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let secret = if config.security.token_secret.is_empty() {
            warn!(
                "No token secret configured; generated a random one. \
                 Tokens will not survive a restart."
            );
            generate_secret()
        } else {
            config.security.token_secret.as_bytes().to_vec()
        };

        let tokens = Arc::new(TokenIssuer::with_hs256(
            &secret,
            config.security.token_ttl_seconds,
            clock,
        ));
        let passwords = PasswordService::new(config.security.clone());

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            passwords.clone(),
            tokens,
        )) as Arc<dyn AuthService>;

        let user_service =
            Arc::new(SeaOrmUserService::new(store.clone(), passwords)) as Arc<dyn UserService>;

        let entry_service = Arc::new(SeaOrmEntryService::new(store.clone())) as Arc<dyn EntryService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            user_service,
            entry_service,
        })
    }
}
