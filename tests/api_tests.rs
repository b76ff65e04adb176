// HTTP handler tests for Matchmaker

use actix_web::{http::StatusCode, test, web, App};
use chrono::NaiveDate;
use matchmaker::auth::TokenService;
use matchmaker::core::AgeBounds;
use matchmaker::error::{handle_json_payload_error, handle_query_payload_error};
use matchmaker::models::{Gender, NewUser, UserId};
use matchmaker::routes::{configure_routes, AppState};
use matchmaker::services::{InMemoryStore, ProfileStore};
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "api-test-secret";

async fn seed(store: &InMemoryStore, name: &str, gender: Gender, lat: f64) -> UserId {
    store
        .create_user(NewUser {
            email: format!("{}@example.com", name),
            password_hash: String::new(),
            name: name.to_string(),
            gender,
            date_of_birth: NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
            latitude: lat,
            longitude: 0.0,
        })
        .await
        .unwrap()
        .id
}

fn state(store: Arc<InMemoryStore>) -> AppState {
    AppState::new(store, TokenService::new(SECRET, 60), AgeBounds::default(), 1_000)
}

fn bearer(user: UserId) -> (&'static str, String) {
    let token = TokenService::new(SECRET, 60).issue(user).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

macro_rules! app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state($store)))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let app = app!(Arc::new(InMemoryStore::new()));
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = app!(Arc::new(InMemoryStore::new()));

    let req = test::TestRequest::get().uri("/api/v1/profiles").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .set_json(json!({ "profile_id": 1, "preference": "YES" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_swipe_flow_status_codes() {
    let store = Arc::new(InMemoryStore::new());
    let a = seed(&store, "a", Gender::Male, 0.0).await;
    let b = seed(&store, "b", Gender::Female, 1.0).await;
    let app = app!(store.clone());

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header(bearer(a))
        .set_json(json!({ "profile_id": b, "preference": "YES" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "matched": false }));

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header(bearer(b))
        .set_json(json!({ "profile_id": a, "preference": "YES" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "matched": true, "match_id": a }));

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header(bearer(a))
        .set_json(json!({ "profile_id": b, "preference": "YES" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "conflict");
}

#[actix_web::test]
async fn test_swipe_validation() {
    let store = Arc::new(InMemoryStore::new());
    let a = seed(&store, "a", Gender::Male, 0.0).await;
    let b = seed(&store, "b", Gender::Female, 1.0).await;
    let app = app!(store.clone());

    for body in [
        json!({ "profile_id": b, "preference": "MAYBE" }),
        json!({ "profile_id": 0, "preference": "YES" }),
        json!({ "profile_id": b }),
        json!({ "preference": "YES" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/swipe")
            .insert_header(bearer(a))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(store.relationship_count().await, 0);
    assert_eq!(store.likability(b).await, Some(0));

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header(bearer(a))
        .set_json(json!({ "profile_id": 404, "preference": "NO" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_discover_profiles() {
    let store = Arc::new(InMemoryStore::new());
    let me = seed(&store, "me", Gender::Male, 0.0).await;
    let far = seed(&store, "far", Gender::Female, 20.0).await;
    let near = seed(&store, "near", Gender::Female, 2.0).await;
    seed(&store, "other", Gender::Male, 1.0).await;
    let app = app!(store.clone());

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles?gender=Female&sort=distance")
        .insert_header(bearer(me))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let profiles = body.as_array().unwrap();

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0]["id"], near);
    assert_eq!(profiles[1]["id"], far);
    assert_eq!(profiles[0]["gender"], "Female");
    assert!(profiles[0]["distance"].as_f64().unwrap() > 0.0);
    assert!(profiles[0].get("latitude").is_none());
    assert!(profiles[0].get("date_of_birth").is_none());
}

#[actix_web::test]
async fn test_discover_rejects_inverted_ages() {
    let store = Arc::new(InMemoryStore::new());
    let me = seed(&store, "me", Gender::Male, 0.0).await;
    let app = app!(store.clone());

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles?age_min=40&age_max=30")
        .insert_header(bearer(me))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles?age_min=abc")
        .insert_header(bearer(me))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_create_account_then_login() {
    let store = Arc::new(InMemoryStore::new());
    let app = app!(store.clone());

    let req = test::TestRequest::post().uri("/api/v1/user/create").to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let email = created["email"].as_str().unwrap().to_string();
    let password = created["password"].as_str().unwrap().to_string();
    assert!(created["age"].as_u64().unwrap() >= 18);
    assert_eq!(created["likability"], 0);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().unwrap();

    let user_id = TokenService::new(SECRET, 60).verify(token).unwrap();
    assert_eq!(json!(user_id), created["id"]);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
