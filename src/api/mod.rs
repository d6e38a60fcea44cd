use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use url::Url;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::services::{AuthService, Clock, EntryService, UserService};
use crate::state::SharedState;

pub mod auth;
mod entries;
mod error;
mod observability;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    /// Externally visible origin; pagination links and `Location` headers
    /// are built against it.
    pub public_url: Url,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn entry_service(&self) -> &Arc<dyn EntryService> {
        &self.shared.entry_service
    }

    /// Base URL for the links of a list served at `path`.
    pub fn link_base(&self, path: &str) -> Result<Url, ApiError> {
        self.public_url
            .join(path)
            .map_err(|e| ApiError::internal(format!("Failed to build link for {path}: {e}")))
    }

    /// Absolute URL of a single resource, for `Location` headers.
    pub fn resource_url(&self, path: &str) -> Result<String, ApiError> {
        self.link_base(path).map(String::from)
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let public_url = Url::parse(&shared.config.server.public_url)
        .with_context(|| format!("Invalid public_url '{}'", shared.config.server.public_url))?;

    Ok(Arc::new(AppState {
        shared,
        public_url,
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle)
}

/// Like [`create_app_state_from_config`] with an explicit token clock.
pub async fn create_app_state_with_clock(
    config: Config,
    clock: Arc<dyn Clock>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_clock(config, clock).await?);
    create_app_state(shared, prometheus_handle)
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = &state.config().server.cors_allowed_origins;

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router())
        .route("/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
        .fallback(system::not_found)
        .with_state(state)
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list_users).post(users::register))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/user", get(users::current_user))
        .route("/tokens", post(auth::issue_token))
        .route(
            "/entries",
            get(entries::list_entries).post(entries::create_entry),
        )
        .route(
            "/entries/{id}",
            get(entries::get_entry)
                .put(entries::update_entry)
                .delete(entries::delete_entry),
        )
}
