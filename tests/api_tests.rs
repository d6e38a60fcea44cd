use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use daybook::config::Config;
use daybook::services::{Clock, SystemClock};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const PASSWORD: &str = "correct horse battery staple";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.token_secret = "integration-test-secret-32-bytes!".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app() -> Router {
    spawn_app_with_clock(Arc::new(SystemClock)).await
}

async fn spawn_app_with_clock(clock: Arc<dyn Clock>) -> Router {
    let state = daybook::api::create_app_state_with_clock(test_config(), clock, None)
        .await
        .expect("Failed to create app state");
    daybook::api::router(state)
}

/// A clock tests can move forward.
struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn basic(email: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{email}:{password}"));
    format!("Basic {encoded}")
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn email_of(username: &str) -> String {
    format!("{username}@example.com")
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

async fn register(app: &Router, username: &str) -> i64 {
    let (status, _, body) = send(
        app,
        json_request(
            "POST",
            "/api/users",
            None,
            &json!({
                "username": username,
                "name": format!("{username} Example"),
                "email": email_of(username),
                "password": PASSWORD,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["id"].as_i64().unwrap()
}

async fn token_for(app: &Router, username: &str) -> String {
    let auth = basic(&email_of(username), PASSWORD);
    let (status, _, body) = send(app, empty_request("POST", "/api/tokens", Some(&auth))).await;
    assert_eq!(status, StatusCode::OK, "token request failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_entry(app: &Router, token: &str, local_time: &str, content: &str) -> Value {
    let (status, _, body) = send(
        app,
        json_request(
            "POST",
            "/api/entries",
            Some(&bearer(token)),
            &json!({ "localTime": local_time, "timezone": "+00:00", "content": content }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create entry failed: {body}");
    body
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_register_returns_id_and_username() {
    let app = spawn_app().await;

    let (status, headers, body) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            None,
            &json!({
                "username": "ada",
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "password": PASSWORD,
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(body["username"], "ada");

    let id = body["id"].as_i64().unwrap();
    assert_eq!(
        headers.get(header::LOCATION).unwrap(),
        &format!("http://localhost:5000/api/users/{id}")
    );
}

#[tokio::test]
async fn test_register_duplicate_username_is_rejected() {
    let app = spawn_app().await;
    let id = register(&app, "ada").await;

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            None,
            &json!({
                "username": "ada",
                "name": "Impostor",
                "email": "other@example.com",
                "password": "whatever",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already in use");

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            None,
            &json!({
                "username": "ada2",
                "name": "Impostor",
                "email": "ada@example.com",
                "password": "whatever",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already in use");

    // The original account still works with its original password.
    let token = token_for(&app, "ada").await;
    let (status, _, profile) = send(&app, empty_request("GET", "/api/user", Some(&bearer(&token)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"].as_i64().unwrap(), id);
    assert_eq!(profile["name"], "ada Example");
}

#[tokio::test]
async fn test_username_match_is_case_sensitive() {
    let app = spawn_app().await;
    register(&app, "ada").await;
    register(&app, "Ada").await;
}

#[tokio::test]
async fn test_register_missing_field_is_named() {
    let app = spawn_app().await;

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            None,
            &json!({ "username": "ada", "name": "Ada", "password": PASSWORD }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email is required");
}

#[tokio::test]
async fn test_missing_content_type_is_rejected() {
    let app = spawn_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .body(Body::from(
            json!({
                "username": "ada",
                "name": "Ada",
                "email": "ada@example.com",
                "password": PASSWORD,
            })
            .to_string(),
        ))
        .unwrap();

    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Content-Type must be application/json");

    let (_, _, list) = send(&app, empty_request("GET", "/api/users", None)).await;
    assert_eq!(list["_meta"]["totalItems"], 0);
}

#[tokio::test]
async fn test_get_user_is_public() {
    let app = spawn_app().await;
    let id = register(&app, "ada").await;

    let (status, _, body) = send(&app, empty_request("GET", &format!("/api/users/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": id, "username": "ada" }));

    let (status, _, body) = send(&app, empty_request("GET", "/api/users/9999", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _, _) = send(&app, empty_request("GET", "/api/users/abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_requires_bearer_and_hides_password() {
    let app = spawn_app().await;
    let id = register(&app, "ada").await;

    let (status, _, body) = send(&app, empty_request("GET", "/api/user", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");

    let token = token_for(&app, "ada").await;
    let (status, _, body) = send(&app, empty_request("GET", "/api/user", Some(&bearer(&token)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), id);
    assert_eq!(body["username"], "ada");
    assert_eq!(body["email"], "ada@example.com");
    assert!(body["createdAt"].is_string());
    assert!(body["updatedAt"].is_string());

    let serialized = body.to_string();
    assert!(!serialized.contains("password"));
    assert!(!serialized.contains("argon2"));
}

#[tokio::test]
async fn test_user_list_pagination() {
    let app = spawn_app().await;
    for name in ["ada", "grace", "linus"] {
        register(&app, name).await;
    }

    let (status, _, body) = send(
        &app,
        empty_request("GET", "/api/users?perPage=2&page=2&sort=desc", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["_meta"],
        json!({ "totalItems": 3, "perPage": 2, "totalPages": 2, "page": 2 })
    );
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["username"], "linus");

    let links = &body["_links"];
    assert_eq!(links["self"], "http://localhost:5000/api/users?perPage=2&page=2");
    assert_eq!(links["first"], "http://localhost:5000/api/users?perPage=2&page=1");
    assert_eq!(links["prev"], "http://localhost:5000/api/users?perPage=2&page=1");
    assert_eq!(links["last"], "http://localhost:5000/api/users?perPage=2&page=2");
    assert!(links["next"].is_null());
}

#[tokio::test]
async fn test_user_list_caps_per_page() {
    let app = spawn_app().await;
    register(&app, "ada").await;
    register(&app, "grace").await;

    let (_, _, body) = send(&app, empty_request("GET", "/api/users?perPage=1000", None)).await;
    assert_eq!(body["_meta"]["perPage"], 100);
    assert_eq!(body["_meta"]["totalPages"], 1);

    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["ada", "grace"]);
}

#[tokio::test]
async fn test_zero_per_page_yields_unbounded_page_count() {
    let app = spawn_app().await;
    register(&app, "ada").await;

    let (status, _, body) = send(&app, empty_request("GET", "/api/users?perPage=0", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_meta"]["perPage"], 0);
    assert!(body["_meta"]["totalPages"].is_null());
    assert!(body["_links"]["last"].is_null());
    assert!(body["_links"]["next"].as_str().unwrap().ends_with("perPage=0&page=2"));
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_negative_per_page_passes_through_to_page_count() {
    let app = spawn_app().await;
    for username in ["ada", "grace", "linus", "ken", "dennis", "barbara"] {
        register(&app, username).await;
    }

    let (status, _, body) = send(&app, empty_request("GET", "/api/users?perPage=-5", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_meta"]["perPage"], -5);
    assert_eq!(body["_meta"]["totalPages"], -1);
    assert!(body["_links"]["next"].is_null());
    assert!(body["_links"]["last"].as_str().unwrap().ends_with("perPage=-5&page=-1"));
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_user_update_is_owner_only() {
    let app = spawn_app().await;
    let ada = register(&app, "ada").await;
    let grace = register(&app, "grace").await;
    let ada_auth = basic("ada@example.com", PASSWORD);

    let (status, _, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/users/{grace}"),
            Some(&ada_auth),
            &json!({ "name": "Hijacked" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, _, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/users/{ada}"),
            Some(&ada_auth),
            &json!({ "name": "Augusta Ada King", "password": "new password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Augusta Ada King");
    assert_eq!(body["username"], "ada");

    let (status, _, _) = send(&app, empty_request("POST", "/api/tokens", Some(&ada_auth))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let new_auth = basic("ada@example.com", "new password");
    let (status, _, _) = send(&app, empty_request("POST", "/api/tokens", Some(&new_auth))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_user_update_keeps_profile_unchanged() {
    let app = spawn_app().await;
    let ada = register(&app, "ada").await;
    let token = token_for(&app, "ada").await;
    let ada_auth = basic("ada@example.com", PASSWORD);

    let (_, _, before) = send(&app, empty_request("GET", "/api/user", Some(&bearer(&token)))).await;

    let (status, _, after) = send(
        &app,
        json_request("PUT", &format!("/api/users/{ada}"), Some(&ada_auth), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after, before);
    assert_eq!(after["updatedAt"], before["updatedAt"]);
}

#[tokio::test]
async fn test_user_update_rejects_taken_username() {
    let app = spawn_app().await;
    let ada = register(&app, "ada").await;
    register(&app, "grace").await;

    let (status, _, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/users/{ada}"),
            Some(&basic("ada@example.com", PASSWORD)),
            &json!({ "username": "grace" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already in use");

    // Keeping one's own username is not a conflict.
    let (status, _, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/users/{ada}"),
            Some(&basic("ada@example.com", PASSWORD)),
            &json!({ "username": "ada" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_delete_is_owner_only_and_revokes_access() {
    let app = spawn_app().await;
    let ada = register(&app, "ada").await;
    let grace = register(&app, "grace").await;
    let ada_auth = basic("ada@example.com", PASSWORD);
    let token = token_for(&app, "ada").await;
    create_entry(&app, &token, "2021-05-13 09:00", "soon gone").await;

    let (status, _, _) = send(
        &app,
        empty_request("DELETE", &format!("/api/users/{grace}"), Some(&ada_auth)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = send(
        &app,
        empty_request("DELETE", &format!("/api/users/{ada}"), Some(&ada_auth)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _, _) = send(&app, empty_request("GET", "/api/entries", Some(&bearer(&token)))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, empty_request("POST", "/api/tokens", Some(&ada_auth))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, _, body) = send(&app, empty_request("GET", "/api/users", None)).await;
    assert_eq!(body["_meta"]["totalItems"], 1);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_token_issuance_failures_are_indistinguishable() {
    let app = spawn_app().await;
    register(&app, "ada").await;

    let attempts = [
        None,
        Some(basic("ada@example.com", "wrong")),
        Some(basic("nobody@example.com", PASSWORD)),
        Some("Basic !!!not-base64!!!".to_string()),
        Some("Bearer something".to_string()),
    ];

    for auth in attempts {
        let (status, _, body) = send(&app, empty_request("POST", "/api/tokens", auth.as_deref())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "auth: {auth:?}");
        assert_eq!(body, json!({ "error": "Invalid credentials" }));
    }
}

#[tokio::test]
async fn test_password_may_contain_colons() {
    let app = spawn_app().await;

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            None,
            &json!({
                "username": "colon",
                "name": "Colon",
                "email": "colon@example.com",
                "password": "a:b:c",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let auth = basic("colon@example.com", "a:b:c");
    let (status, _, _) = send(&app, empty_request("POST", "/api/tokens", Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_entries_require_a_valid_bearer_token() {
    let app = spawn_app().await;
    register(&app, "ada").await;

    let attempts = [
        None,
        Some("Bearer not.a.token".to_string()),
        Some(basic("ada@example.com", PASSWORD)),
    ];

    for auth in attempts {
        let (status, _, body) = send(&app, empty_request("GET", "/api/entries", auth.as_deref())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "auth: {auth:?}");
        assert_eq!(body, json!({ "error": "Invalid or expired token" }));
    }
}

#[tokio::test]
async fn test_token_expires_after_sixty_seconds() {
    let clock = Arc::new(SteppingClock(Mutex::new(Utc::now())));
    let app = spawn_app_with_clock(clock.clone()).await;
    register(&app, "ada").await;
    let token = token_for(&app, "ada").await;

    clock.advance(Duration::seconds(59));
    let (status, _, _) = send(&app, empty_request("GET", "/api/entries", Some(&bearer(&token)))).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::seconds(2));
    let (status, _, body) = send(&app, empty_request("GET", "/api/entries", Some(&bearer(&token)))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

// ============================================================================
// Entries
// ============================================================================

#[tokio::test]
async fn test_entry_crud() {
    let app = spawn_app().await;
    let ada = register(&app, "ada").await;
    let token = token_for(&app, "ada").await;
    let auth = bearer(&token);

    let (status, headers, entry) = send(
        &app,
        json_request(
            "POST",
            "/api/entries",
            Some(&auth),
            &json!({ "localTime": "2021-05-13 00:18", "timezone": "-08:00", "content": "Late night" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["timestampInUTC"], "2021-05-13T08:18:00Z");
    assert_eq!(entry["utcZoneOfTimestamp"], "-08:00");
    assert_eq!(entry["content"], "Late night");
    assert_eq!(entry["userId"].as_i64().unwrap(), ada);
    assert!(entry["createdAt"].is_string());
    assert!(entry["updatedAt"].is_string());

    let id = entry["id"].as_i64().unwrap();
    let path = format!("/api/entries/{id}");
    assert_eq!(
        headers.get(header::LOCATION).unwrap(),
        &format!("http://localhost:5000{path}")
    );

    let (status, _, fetched) = send(&app, empty_request("GET", &path, Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, entry);

    let (status, _, updated) = send(
        &app,
        json_request("PUT", &path, Some(&auth), &json!({ "content": "Edited" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "Edited");
    assert_eq!(updated["timestampInUTC"], "2021-05-13T08:18:00Z");
    assert_eq!(updated["utcZoneOfTimestamp"], "-08:00");

    let (status, _, moved) = send(
        &app,
        json_request(
            "PUT",
            &path,
            Some(&auth),
            &json!({ "localTime": "2021-05-13 10:00", "timezone": "+02:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["timestampInUTC"], "2021-05-13T08:00:00Z");
    assert_eq!(moved["utcZoneOfTimestamp"], "+02:00");
    assert_eq!(moved["content"], "Edited");

    let (status, _, _) = send(&app, empty_request("DELETE", &path, Some(&auth))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app, empty_request("GET", &path, Some(&auth))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Entry not found");
}

#[tokio::test]
async fn test_unpaired_timezone_is_rejected_before_storage() {
    let app = spawn_app().await;
    register(&app, "ada").await;
    let auth = bearer(&token_for(&app, "ada").await);

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/api/entries",
            Some(&auth),
            &json!({ "timezone": "+02:00", "content": "No local time" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("supplied together"));

    let (_, _, list) = send(&app, empty_request("GET", "/api/entries", Some(&auth))).await;
    assert_eq!(list["_meta"]["totalItems"], 0);
}

#[tokio::test]
async fn test_entry_validation() {
    let app = spawn_app().await;
    register(&app, "ada").await;
    let token = token_for(&app, "ada").await;
    let auth = bearer(&token);

    let invalid_bodies = [
        json!({ "localTime": "2021-05-13 00:18", "timezone": "-08:00" }),
        json!({ "content": "no time at all" }),
        json!({ "localTime": "13/05/2021", "timezone": "-08:00", "content": "x" }),
        json!({ "localTime": "2021-05-13 00:18", "timezone": "PST", "content": "x" }),
        json!({ "localTime": "2021-05-13 00:18", "timezone": "+25:00", "content": "x" }),
    ];
    for body in &invalid_bodies {
        let (status, _, _) = send(&app, json_request("POST", "/api/entries", Some(&auth), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
    }

    let entry = create_entry(&app, &token, "2021-05-13 09:00", "valid").await;
    let path = format!("/api/entries/{}", entry["id"]);

    let (status, _, _) = send(
        &app,
        json_request("PUT", &path, Some(&auth), &json!({ "localTime": "2021-05-14 09:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        json_request("PUT", &path, Some(&auth), &json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, unchanged) = send(&app, empty_request("GET", &path, Some(&auth))).await;
    assert_eq!(unchanged, entry);
}

#[tokio::test]
async fn test_foreign_entry_is_indistinguishable_from_missing() {
    let app = spawn_app().await;
    register(&app, "ada").await;
    register(&app, "grace").await;
    let ada = bearer(&token_for(&app, "ada").await);
    let grace_token = token_for(&app, "grace").await;

    let entry = create_entry(&app, &grace_token, "2021-05-13 09:00", "private").await;
    let foreign = format!("/api/entries/{}", entry["id"]);
    let missing = "/api/entries/9999";

    for (method, body) in [
        ("GET", None),
        ("PUT", Some(json!({ "content": "defaced" }))),
        ("DELETE", None),
    ] {
        let request_for = |path: &str| match &body {
            Some(body) => json_request(method, path, Some(&ada), body),
            None => empty_request(method, path, Some(&ada)),
        };

        let (foreign_status, _, foreign_body) = send(&app, request_for(foreign.as_str())).await;
        let (missing_status, _, missing_body) = send(&app, request_for(missing)).await;

        assert_eq!(foreign_status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(foreign_status, missing_status, "{method}");
        assert_eq!(foreign_body, missing_body, "{method}");
    }

    let (status, _, still_there) = send(
        &app,
        empty_request("GET", &foreign, Some(&bearer(&grace_token))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(still_there["content"], "private");
}

#[tokio::test]
async fn test_entry_list_is_scoped_ordered_and_paginated() {
    let app = spawn_app().await;
    register(&app, "ada").await;
    register(&app, "grace").await;
    let ada = token_for(&app, "ada").await;
    let grace = token_for(&app, "grace").await;

    create_entry(&app, &ada, "2021-05-02 10:00", "second").await;
    create_entry(&app, &ada, "2021-05-01 10:00", "first").await;
    create_entry(&app, &ada, "2021-05-03 10:00", "third").await;
    create_entry(&app, &grace, "2021-05-04 10:00", "not ada's").await;

    let (status, _, body) = send(
        &app,
        empty_request("GET", "/api/entries?perPage=2&page=1&q=x", Some(&bearer(&ada))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["_meta"],
        json!({ "totalItems": 3, "perPage": 2, "totalPages": 2, "page": 1 })
    );

    let contents: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, ["third", "second"]);

    let links = &body["_links"];
    assert_eq!(links["self"], "http://localhost:5000/api/entries?perPage=2&page=1");
    assert_eq!(links["next"], "http://localhost:5000/api/entries?perPage=2&page=2");
    assert_eq!(links["last"], "http://localhost:5000/api/entries?perPage=2&page=2");
    assert!(links["prev"].is_null());

    let (_, _, body) = send(
        &app,
        empty_request("GET", "/api/entries?perPage=2&page=2", Some(&bearer(&ada))),
    )
    .await;
    assert_eq!(body["items"][0]["content"], "first");
    assert!(body["_links"]["next"].is_null());

    let (_, _, body) = send(
        &app,
        empty_request("GET", "/api/entries?page=7", Some(&bearer(&ada))),
    )
    .await;
    assert_eq!(body["_meta"]["page"], 7);
    assert_eq!(body["items"], json!([]));
}

// ============================================================================
// Operational
// ============================================================================

#[tokio::test]
async fn test_health_and_response_headers() {
    let app = spawn_app().await;

    let (status, headers, body) = send(&app, empty_request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = spawn_app().await;

    let (status, _, body) = send(&app, empty_request("GET", "/api/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let app = spawn_app().await;

    let response = app
        .oneshot(empty_request("GET", "/metrics", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
