use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::db::{Entry, User};
use crate::pagination::{Page, PageLinks, PaginationState};

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// `{_meta, _links, items}` envelope for paginated collections.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    #[serde(rename = "_meta")]
    pub meta: PaginationState,
    #[serde(rename = "_links")]
    pub links: PageLinks,
    pub items: Vec<T>,
}

impl<T> ListResponse<T> {
    /// Wraps a page, deriving navigation links from `base`.
    pub fn from_page(page: Page<T>, base: &Url) -> Self {
        Self {
            links: page.state.build_links(base),
            meta: page.state,
            items: page.items,
        }
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserSummaryDto {
    pub id: i32,
    pub username: String,
}

impl From<User> for UserSummaryDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// A user's own profile. Never carries the password verifier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for ProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Entries
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub local_time: Option<String>,
    pub timezone: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub local_time: Option<String>,
    pub timezone: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDto {
    pub id: i32,
    #[serde(rename = "timestampInUTC")]
    pub timestamp_in_utc: DateTime<Utc>,
    pub utc_zone_of_timestamp: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: i32,
}

impl From<Entry> for EntryDto {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            timestamp_in_utc: entry.timestamp_utc,
            utc_zone_of_timestamp: entry.utc_offset,
            content: entry.content,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            user_id: entry.user_id,
        }
    }
}
