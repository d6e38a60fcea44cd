use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use std::sync::Arc;

use super::auth::TokenAuth;
use super::validation::{JsonBody, parse_id, require_field};
use super::{ApiError, AppState, CreateEntryRequest, EntryDto, ListResponse, UpdateEntryRequest};
use crate::pagination::PageQuery;
use crate::services::{CreateEntry, EntryUpdate};

/// GET /api/entries
/// The caller's entries, newest first
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    TokenAuth(identity): TokenAuth,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<EntryDto>>, ApiError> {
    let page = state.entry_service().list(&identity, &query).await?;
    let base = state.link_base(uri.path())?;

    Ok(Json(ListResponse::from_page(page.map(EntryDto::from), &base)))
}

/// POST /api/entries
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    TokenAuth(identity): TokenAuth,
    JsonBody(payload): JsonBody<CreateEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = CreateEntry {
        local_time: payload.local_time,
        timezone: payload.timezone,
        content: require_field("content", payload.content)?,
    };

    let entry = state.entry_service().create(&identity, request).await?;
    let location = state.resource_url(&format!("/api/entries/{}", entry.id))?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(EntryDto::from(entry)),
    ))
}

/// GET /api/entries/{id}
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    TokenAuth(identity): TokenAuth,
    Path(id): Path<String>,
) -> Result<Json<EntryDto>, ApiError> {
    let entry = state
        .entry_service()
        .get(&identity, parse_id(&id)?)
        .await?;

    Ok(Json(entry.into()))
}

/// PUT /api/entries/{id}
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    TokenAuth(identity): TokenAuth,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateEntryRequest>,
) -> Result<Json<EntryDto>, ApiError> {
    let update = EntryUpdate {
        local_time: payload.local_time,
        timezone: payload.timezone,
        content: payload.content,
    };

    let entry = state
        .entry_service()
        .update(&identity, parse_id(&id)?, update)
        .await?;

    Ok(Json(entry.into()))
}

/// DELETE /api/entries/{id}
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    TokenAuth(identity): TokenAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .entry_service()
        .delete(&identity, parse_id(&id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
