//! HTTP surface driven through the router with the in-memory store

use bytes::Bytes;
use clap::Parser;
use http_body_util::BodyExt;
use hyper::{Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use panchayath_survey::auth::JwtSessionProvider;
use panchayath_survey::config::Args;
use panchayath_survey::server::{route, AppState};
use panchayath_survey::store::{AppRole, MemoryStore, StoreOp};

struct Harness {
    state: Arc<AppState>,
    store: Arc<MemoryStore>,
    sessions: Arc<JwtSessionProvider>,
}

impl Harness {
    fn new() -> Self {
        let mut args = Args::parse_from(["panchayath-survey", "--dev-mode", "--auth-url", "/login"]);
        args.jwt_secret = None;
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(JwtSessionProvider::from_args(&args).unwrap());
        let state = Arc::new(AppState::with_memory_store(
            args,
            store.clone(),
            sessions.clone(),
        ));
        Self {
            state,
            store,
            sessions,
        }
    }

    async fn admin_token(&self) -> String {
        self.store.grant_role("admin-1", AppRole::Admin).await;
        self.sessions.issue("admin-1", "admin@example.org").unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, hyper::HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let body = body.map(|b| Bytes::from(b.to_string())).unwrap_or_default();
        let response = route(Arc::clone(&self.state), builder.body(body).unwrap()).await;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }
}

fn survey_body(mobile: &str) -> Value {
    json!({
        "name": "Anu",
        "mobile": mobile,
        "location": "Aluva",
        "ward": "4",
        "role": "respondent",
        "items": ["Soap", "Rice", " "]
    })
}

#[tokio::test]
async fn test_health_and_version() {
    let h = Harness::new();
    let (status, _, body) = h.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["mode"], "development");

    let (status, _, body) = h.send(Method::GET, "/version", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "panchayath-survey");
}

#[tokio::test]
async fn test_submit_created_with_confirmation_window() {
    let h = Harness::new();
    let (status, _, body) = h
        .send(Method::POST, "/api/surveys", None, Some(survey_body("9876543210")))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["confirmation_secs"], 5);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][0]["category"], "product");
    assert_eq!(body["notification"]["level"], "success");
}

#[tokio::test]
async fn test_submit_invalid_lists_field_errors_in_requested_language() {
    let h = Harness::new();
    let (status, _, body) = h
        .send(
            Method::POST,
            "/api/surveys?lang=en",
            None,
            Some(survey_body("12345")),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "mobile");
    assert_eq!(
        body["errors"][0]["message"],
        "Enter a valid 10-digit mobile number"
    );
    assert_eq!(h.store.call_count(), 0);
}

#[tokio::test]
async fn test_locations_show_malayalam_label() {
    let h = Harness::new();
    let token = h.admin_token().await;
    let (status, _, _) = h
        .send(
            Method::POST,
            "/admin/panchayaths",
            Some(&token),
            Some(json!({ "name": "Aluva", "name_ml": "ആലുവ", "ward_count": 22 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = h.send(Method::GET, "/api/locations", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lang"], "ml");
    assert_eq!(body["options"][0]["label"], "ആലുവ");
    assert_eq!(body["options"][0]["value"], "Aluva");
}

#[tokio::test]
async fn test_admin_without_session_redirects() {
    let h = Harness::new();
    let (status, headers, _) = h.send(Method::GET, "/admin", None, None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers["location"], "/login");
}

#[tokio::test]
async fn test_non_admin_is_denied_and_signed_out() {
    let h = Harness::new();
    let token = h.sessions.issue("someone", "someone@example.org").unwrap();

    let (status, headers, body) = h.send(Method::GET, "/admin", Some(&token), None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(body["notification"]["message"], "Access denied");
    assert!(headers.contains_key("set-cookie"));
    assert_eq!(h.sessions.revoked_count(), 1);
}

#[tokio::test]
async fn test_dashboard_tabs() {
    let h = Harness::new();
    let token = h.admin_token().await;
    h.send(Method::POST, "/api/surveys", None, Some(survey_body("9876543210")))
        .await;

    let (status, _, body) = h.send(Method::GET, "/admin", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active_tab"], "panchayaths");
    assert_eq!(body["tabs"], json!(["panchayaths", "surveys", "demanded"]));

    let (_, _, body) = h
        .send(Method::GET, "/admin?tab=demanded", Some(&token), None)
        .await;
    assert_eq!(body["view"]["products"][0]["label"], "Soap");
    assert_eq!(body["view"]["products"][0]["rank"], 1);

    let (_, _, body) = h.send(Method::GET, "/admin/surveys", Some(&token), None).await;
    assert_eq!(body["stats"]["total_surveys"], 1);
    assert_eq!(body["stats"]["unique_items"], 2);
    assert_eq!(body["surveys"][0]["name"], "Anu");
    assert_eq!(body["surveys"][0]["items"].as_array().unwrap().len(), 2);

    let (status, _, _) = h
        .send(Method::GET, "/admin?tab=users", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let h = Harness::new();
    let token = h.admin_token().await;
    let (_, _, created) = h
        .send(Method::POST, "/api/surveys", None, Some(survey_body("9876543210")))
        .await;
    let id = created["header"]["id"].as_str().unwrap().to_string();
    let path = format!("/admin/surveys/{id}");

    // Session checks touch the role table; the delete itself must not
    let before = h.store.call_count();
    let (status, _, body) = h.send(Method::DELETE, &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["prompt"], "Are you sure you want to delete this survey?");
    assert_eq!(h.store.call_count(), before + 1);

    let (status, _, body) = h
        .send(Method::DELETE, &format!("{path}?confirm=true"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"]["message"], "Survey deleted successfully");
    assert_eq!(body["data"]["surveys"], json!([]));
    assert_eq!(h.store.all_items().await.len(), 2);
}

#[tokio::test]
async fn test_panchayath_validation_and_update() {
    let h = Harness::new();
    let token = h.admin_token().await;

    let (status, _, body) = h
        .send(
            Method::POST,
            "/admin/panchayaths",
            Some(&token),
            Some(json!({ "name": "  ", "ward_count": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["notification"]["message"], "Name is required");

    let (_, _, body) = h
        .send(
            Method::POST,
            "/admin/panchayaths",
            Some(&token),
            Some(json!({ "name": "Kalady", "ward_count": 17 })),
        )
        .await;
    let id = body["data"][0]["id"].as_str().unwrap().to_string();

    let (status, _, body) = h
        .send(
            Method::PUT,
            &format!("/admin/panchayaths/{id}"),
            Some(&token),
            Some(json!({ "name": "Kalady", "ward_count": 18 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["ward_count"], 18);
}

#[tokio::test]
async fn test_update_without_ward_count_is_rejected() {
    let h = Harness::new();
    let token = h.admin_token().await;
    let (_, _, body) = h
        .send(
            Method::POST,
            "/admin/panchayaths",
            Some(&token),
            Some(json!({ "name": "Kalady", "ward_count": 17 })),
        )
        .await;
    let id = body["data"][0]["id"].as_str().unwrap().to_string();

    let (status, _, body) = h
        .send(
            Method::PUT,
            &format!("/admin/panchayaths/{id}"),
            Some(&token),
            Some(json!({ "name": "Kalady" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");

    let (_, _, body) = h
        .send(Method::GET, "/admin/panchayaths", Some(&token), None)
        .await;
    assert_eq!(body["panchayaths"][0]["ward_count"], 17);
}

#[tokio::test]
async fn test_create_reports_failed_reread() {
    let h = Harness::new();
    let token = h.admin_token().await;
    h.store.fail(StoreOp::ListLocations).await;

    let (status, _, body) = h
        .send(
            Method::POST,
            "/admin/panchayaths",
            Some(&token),
            Some(json!({ "name": "Aluva", "ward_count": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "done");
    assert_eq!(body["notification"]["message"], "Panchayath added successfully");
    assert_eq!(body["refresh"]["level"], "error");
    assert_eq!(body["refresh"]["message"], "Failed to fetch panchayaths");
}

#[tokio::test]
async fn test_logout_redirects_and_revokes() {
    let h = Harness::new();
    let token = h.admin_token().await;

    let (status, headers, body) = h
        .send(Method::POST, "/admin/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers["location"], "/login");
    assert_eq!(body["notification"]["message"], "Logged out successfully");

    let (status, _, _) = h.send(Method::GET, "/admin", Some(&token), None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_unknown_path_and_preflight() {
    let h = Harness::new();
    let (status, _, _) = h.send(Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = h.send(Method::OPTIONS, "/api/surveys", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
