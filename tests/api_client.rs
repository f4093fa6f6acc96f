//! End-to-end tests for `ApiClient`, `DashboardClient` and `SessionManager`
//! against an in-process axum backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use talktolead_dashboard::api::models::ContactInput;
use talktolead_dashboard::api::{ApiClient, DashboardClient, RetryPolicy};
use talktolead_dashboard::auth::models::LoginCredentials;
use talktolead_dashboard::auth::{
    route_for, AuthApi, CredentialStore, Route, SessionManager, SessionStatus, View,
};
use talktolead_dashboard::common::{AppConfig, MemoryStore};
use talktolead_dashboard::types::RecordingStatus;
use talktolead_dashboard::ApiClientError;

const GOOD_TOKEN: &str = "good-token";

// ============================================================================
// Mock backend
// ============================================================================

#[derive(Default)]
struct Backend {
    hits: Mutex<HashMap<&'static str, usize>>,
    auth_headers: Mutex<HashMap<&'static str, Option<String>>>,
    bodies: Mutex<HashMap<&'static str, Value>>,
}

type Shared = Arc<Backend>;

impl Backend {
    fn hit(&self, route: &'static str, headers: &HeaderMap) -> usize {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().insert(route, auth);

        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(route).or_insert(0);
        *count += 1;
        *count
    }

    fn hits(&self, route: &'static str) -> usize {
        self.hits.lock().unwrap().get(route).copied().unwrap_or(0)
    }

    fn auth_header(&self, route: &'static str) -> Option<String> {
        self.auth_headers.lock().unwrap().get(route).cloned().flatten()
    }

    fn body(&self, route: &'static str) -> Option<Value> {
        self.bodies.lock().unwrap().get(route).cloned()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Bearer {}", GOOD_TOKEN))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Token expired" })),
    )
        .into_response()
}

async fn login(State(backend): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    backend.hit("login", &headers);

    if body["email"] == "bad@example.com" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "Validation failed",
                "code": "VALIDATION_ERROR",
                "details": { "email": "invalid" }
            })),
        )
            .into_response();
    }

    Json(json!({ "access_token": GOOD_TOKEN, "refresh_token": "refresh-1" })).into_response()
}

async fn current_user(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    backend.hit("current_user", &headers);
    if !authorized(&headers) {
        return unauthorized();
    }

    Json(json!({
        "id": 42,
        "uuid": "6c1f0c2e",
        "email": "manager@example.com",
        "display_name": "Alice",
        "role": "manager",
        "organization_id": 7
    }))
    .into_response()
}

async fn recordings(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    backend.hit("recordings", &headers);
    if !authorized(&headers) {
        return unauthorized();
    }

    Json(json!([
        {
            "id": 1,
            "user_id": 10,
            "status": "completed",
            "created_at": "2026-02-19T10:00:00Z",
            "user": { "display_name": "John Doe" }
        },
        { "id": 2, "user_id": 10, "status": "pending", "created_at": "2026-02-19T11:00:00Z" }
    ]))
    .into_response()
}

async fn recording(Path(id): Path<String>) -> Response {
    if id == "broken" {
        return Json(json!({ "id": 1 })).into_response();
    }
    Json(json!({ "id": id, "user_id": 10, "status": "completed", "created_at": "2026-02-19T10:00:00Z" }))
        .into_response()
}

async fn delete_recording(State(backend): State<Shared>, headers: HeaderMap) -> StatusCode {
    backend.hit("delete_recording", &headers);
    StatusCode::NO_CONTENT
}

async fn recording_status(State(backend): State<Shared>, headers: HeaderMap) -> Json<Value> {
    let count = backend.hit("recording_status", &headers);
    let status = if count < 3 { "processing" } else { "completed" };
    Json(json!({ "status": status }))
}

async fn contacts(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    let count = backend.hit("contacts", &headers);
    if count <= 2 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "Service unavailable" })),
        )
            .into_response();
    }

    Json(json!([
        { "id": 5, "user_id": 10, "first_name": "Jane", "last_name": "Smith", "created_at": "2026-02-15T10:00:00Z" }
    ]))
    .into_response()
}

async fn create_contact(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    backend.hit("create_contact", &headers);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "message": "Service unavailable" })),
    )
        .into_response()
}

async fn update_contact(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    backend.hit("update_contact", &headers);
    backend
        .bodies
        .lock()
        .unwrap()
        .insert("update_contact", body.clone());

    Json(json!({
        "id": id,
        "user_id": 10,
        "first_name": body["first_name"],
        "last_name": body["last_name"],
        "created_at": "2026-02-15T10:00:00Z"
    }))
}

async fn team_summary(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    backend.hit("team_summary", &headers);
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "Forbidden", "code": "FORBIDDEN" })),
    )
        .into_response()
}

async fn dashboard(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    backend.hit("dashboard", &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn spawn_backend() -> (String, Shared) {
    let backend: Shared = Arc::new(Backend::default());

    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/current_user", get(current_user))
        .route("/api/voice/recordings", get(recordings))
        .route(
            "/api/voice/recordings/:id",
            get(recording).delete(delete_recording),
        )
        .route("/api/voice/recordings/:id/status", get(recording_status))
        .route("/api/contact/", get(contacts).post(create_contact))
        .route("/api/contact/:id", put(update_contact))
        .route("/api/manager/team-summary", get(team_summary))
        .route("/api/manager/dashboard", get(dashboard))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

// ============================================================================
// Client setup
// ============================================================================

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
    }
}

fn client_for(base_url: &str) -> (ApiClient, CredentialStore) {
    let config = AppConfig {
        api_base_url: base_url.to_string(),
        ..AppConfig::from_lookup(|_| None)
    };
    let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
    let client = ApiClient::new(&config, credentials.clone())
        .unwrap()
        .with_retry_policy(fast_retry());
    (client, credentials)
}

// ============================================================================
// Authentication plumbing
// ============================================================================

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let (base_url, backend) = spawn_backend().await;
    let (client, credentials) = client_for(&base_url);
    credentials.set_token(GOOD_TOKEN).unwrap();

    let user = client.current_user().await.unwrap();

    assert_eq!(user.id, "42");
    assert_eq!(user.organization_id.as_deref(), Some("7"));
    assert_eq!(
        backend.auth_header("current_user").as_deref(),
        Some("Bearer good-token")
    );
}

#[tokio::test]
async fn test_login_never_sends_bearer_token() {
    let (base_url, backend) = spawn_backend().await;
    let (client, credentials) = client_for(&base_url);
    credentials.set_token("left-over-token").unwrap();

    let response = client
        .login(&LoginCredentials {
            email: "manager@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.access_token.as_deref(), Some(GOOD_TOKEN));
    assert_eq!(backend.hits("login"), 1);
    assert_eq!(backend.auth_header("login"), None);
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_calls_hook() {
    let (base_url, backend) = spawn_backend().await;
    let (client, credentials) = client_for(&base_url);
    credentials.set_token("stale-token").unwrap();

    let hook_calls = Arc::new(AtomicUsize::new(0));
    let client = {
        let hook_calls = hook_calls.clone();
        client.with_unauthorized_hook(move || {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        })
    };
    let dashboard = DashboardClient::new(client);

    let err = dashboard.recordings().await.unwrap_err();

    assert_eq!(err.status(), 401);
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Token expired");
    assert_eq!(backend.hits("recordings"), 1);
    assert_eq!(credentials.token().unwrap(), None);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_error_body_fields_are_mapped() {
    let (base_url, _) = spawn_backend().await;
    let (client, _) = client_for(&base_url);

    let err = client
        .login(&LoginCredentials {
            email: "bad@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), 422);
    assert_eq!(err.code(), Some("VALIDATION_ERROR"));
    assert_eq!(err.to_string(), "Validation failed");
    assert_eq!(err.details(), Some(&json!({ "email": "invalid" })));
}

// ============================================================================
// Retry policy
// ============================================================================

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let (base_url, backend) = spawn_backend().await;
    let (client, _) = client_for(&base_url);
    let dashboard = DashboardClient::new(client);

    let err = dashboard.team_summary().await.unwrap_err();

    assert_eq!(err.status(), 403);
    assert_eq!(err.code(), Some("FORBIDDEN"));
    assert_eq!(err.to_string(), "Forbidden");
    assert_eq!(
        err.details(),
        Some(&json!({ "error": "Forbidden", "code": "FORBIDDEN" }))
    );
    assert_eq!(backend.hits("team_summary"), 1);
}

#[tokio::test]
async fn test_transient_get_failures_are_retried() {
    let (base_url, backend) = spawn_backend().await;
    let (client, _) = client_for(&base_url);
    let dashboard = DashboardClient::new(client);

    let contacts = dashboard.contacts().await.unwrap();

    assert_eq!(backend.hits("contacts"), 3);
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].name, "Jane Smith");
}

#[tokio::test]
async fn test_retries_are_bounded_and_plain_text_errors_get_fallback_message() {
    let (base_url, backend) = spawn_backend().await;
    let (client, _) = client_for(&base_url);
    let dashboard = DashboardClient::new(client);

    let err = dashboard.manager_dashboard().await.unwrap_err();

    assert_eq!(err.status(), 500);
    assert_eq!(err.to_string(), "Request failed with status 500");
    assert_eq!(err.code(), None);
    assert_eq!(backend.hits("dashboard"), 3);
}

#[tokio::test]
async fn test_mutations_are_not_retried() {
    let (base_url, backend) = spawn_backend().await;
    let (client, _) = client_for(&base_url);
    let dashboard = DashboardClient::new(client);

    let err = dashboard
        .create_contact(&ContactInput {
            first_name: Some("Jane".to_string()),
            ..ContactInput::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), 503);
    assert_eq!(backend.hits("create_contact"), 1);
}

// ============================================================================
// Resources
// ============================================================================

#[tokio::test]
async fn test_recordings_are_transformed() {
    let (base_url, _) = spawn_backend().await;
    let (client, credentials) = client_for(&base_url);
    credentials.set_token(GOOD_TOKEN).unwrap();
    let dashboard = DashboardClient::new(client);

    let recordings = dashboard.recordings().await.unwrap();

    assert_eq!(recordings.len(), 2);
    assert_eq!(recordings[0].id, "1");
    assert_eq!(recordings[0].user_name, "John Doe");
    assert_eq!(recordings[0].status, RecordingStatus::Ready);
    assert_eq!(recordings[1].status, RecordingStatus::Uploading);
}

#[tokio::test]
async fn test_malformed_record_is_a_decode_error() {
    let (base_url, _) = spawn_backend().await;
    let (client, _) = client_for(&base_url);
    let client = client.with_retry_policy(RetryPolicy::none());
    let dashboard = DashboardClient::new(client);

    let err = dashboard.recording("broken").await.unwrap_err();

    assert!(matches!(err, ApiClientError::Decode(_)));
    assert_eq!(err.code(), Some("DECODE_ERROR"));

    let recording = dashboard.recording("rec-9").await.unwrap();
    assert_eq!(recording.id, "rec-9");
}

#[tokio::test]
async fn test_update_contact_sends_only_set_fields() {
    let (base_url, backend) = spawn_backend().await;
    let (client, _) = client_for(&base_url);
    let dashboard = DashboardClient::new(client);

    let contact = dashboard
        .update_contact(
            "5",
            &ContactInput {
                first_name: Some("Janet".to_string()),
                last_name: Some("Smith".to_string()),
                ..ContactInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(contact.id, "5");
    assert_eq!(contact.name, "Janet Smith");
    assert_eq!(
        backend.body("update_contact"),
        Some(json!({ "first_name": "Janet", "last_name": "Smith" }))
    );
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let (base_url, backend) = spawn_backend().await;
    let (client, _) = client_for(&base_url);
    let dashboard = DashboardClient::new(client);

    dashboard.delete_recording("1").await.unwrap();

    assert_eq!(backend.hits("delete_recording"), 1);
}

#[tokio::test]
async fn test_wait_for_recording_polls_until_settled() {
    let (base_url, backend) = spawn_backend().await;
    let (client, _) = client_for(&base_url);
    let dashboard = DashboardClient::new(client);

    let status = dashboard
        .wait_for_recording("1", Duration::from_millis(10))
        .await
        .unwrap();

    assert_eq!(status, RecordingStatus::Ready);
    assert_eq!(backend.hits("recording_status"), 3);
}

// ============================================================================
// Session over HTTP
// ============================================================================

#[tokio::test]
async fn test_login_then_bootstrap_from_persisted_credentials() {
    let (base_url, backend) = spawn_backend().await;
    let (client, credentials) = client_for(&base_url);

    let manager = SessionManager::new(Arc::new(client.clone()), credentials.clone());
    let user = manager.login("manager@example.com", "secret").await.unwrap();
    assert_eq!(user.name.as_deref(), Some("Alice"));
    assert_eq!(credentials.refresh_token().unwrap().as_deref(), Some("refresh-1"));

    let restored = SessionManager::new(Arc::new(client), credentials);
    restored.bootstrap().await;

    let state = restored.state();
    assert_eq!(state.status, SessionStatus::Authenticated);
    assert_eq!(state.user.unwrap().id, "42");
    assert_eq!(backend.hits("current_user"), 2);
}

#[tokio::test]
async fn test_bootstrap_with_rejected_token_signs_out() {
    let (base_url, _) = spawn_backend().await;
    let (client, credentials) = client_for(&base_url);
    credentials.set_token("revoked-token").unwrap();

    let manager = SessionManager::new(Arc::new(client), credentials.clone());
    manager.bootstrap().await;

    assert_eq!(manager.state().status, SessionStatus::Unauthenticated);
    assert_eq!(credentials.token().unwrap(), None);
    assert_eq!(credentials.cached_user().unwrap(), None);
}

#[tokio::test]
async fn test_rejected_token_on_resource_call_signs_session_out() {
    let (base_url, backend) = spawn_backend().await;
    let (client, credentials) = client_for(&base_url);

    let manager = Arc::new(SessionManager::new(
        Arc::new(client.clone()),
        credentials.clone(),
    ));
    manager.login("manager@example.com", "secret").await.unwrap();
    let dashboard = DashboardClient::new(client.with_unauthorized_hook(manager.unauthorized_hook()));

    credentials.set_token("revoked-token").unwrap();
    let err = dashboard.recordings().await.unwrap_err();

    assert_eq!(err.status(), 401);
    assert_eq!(backend.hits("recordings"), 1);
    let state = manager.state();
    assert_eq!(state.status, SessionStatus::Unauthenticated);
    assert!(!manager.is_authenticated());
    assert_eq!(route_for(&state, View::Protected), Some(Route::Login));
    assert_eq!(credentials.token().unwrap(), None);
    assert_eq!(credentials.cached_user().unwrap(), None);
}
