use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use std::sync::Arc;

use super::auth::{CredentialAuth, TokenAuth};
use super::validation::{JsonBody, parse_id, require_field};
use super::{
    ApiError, AppState, ListResponse, ProfileDto, RegisterRequest, UpdateUserRequest,
    UserSummaryDto,
};
use crate::pagination::PageQuery;
use crate::services::{RegisterUser, UserUpdate};

/// POST /api/users
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = RegisterUser {
        username: require_field("username", payload.username)?,
        email: require_field("email", payload.email)?,
        name: require_field("name", payload.name)?,
        password: require_field("password", payload.password)?,
    };

    let user = state.user_service().register(request).await?;
    let location = state.resource_url(&format!("/api/users/{}", user.id))?;

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(UserSummaryDto::from(user)),
    ))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<UserSummaryDto>>, ApiError> {
    let page = state.user_service().list(&query).await?;
    let base = state.link_base(uri.path())?;

    Ok(Json(ListResponse::from_page(
        page.map(UserSummaryDto::from),
        &base,
    )))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserSummaryDto>, ApiError> {
    let user = state.user_service().get(parse_id(&id)?).await?;
    Ok(Json(user.into()))
}

/// GET /api/user
/// Profile of the bearer of the token
pub async fn current_user(TokenAuth(identity): TokenAuth) -> Json<ProfileDto> {
    Json(identity.user.into())
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CredentialAuth(identity): CredentialAuth,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Json<ProfileDto>, ApiError> {
    let update = UserUpdate {
        username: payload.username,
        email: payload.email,
        name: payload.name,
        password: payload.password,
    };

    let user = state
        .user_service()
        .update(&identity, parse_id(&id)?, update)
        .await?;

    Ok(Json(user.into()))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CredentialAuth(identity): CredentialAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .user_service()
        .delete(&identity, parse_id(&id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
