//! HTTP-level authentication and authorization tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use proposal_auth::{Session, SessionStore, TokenCodec};
use proposal_core::{AuthSettings, PasswordHashSettings, Settings};
use proposal_web::{create_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const PASSWORD: &str = "correct-horse";
const BOOTSTRAP_EMAIL: &str = "bootstrap@example.com";

fn settings() -> Settings {
    Settings::new(
        AuthSettings::new("http-test-secret", 5)
            .with_password_hash(PasswordHashSettings::minimal())
            .with_bootstrap_user(BOOTSTRAP_EMAIL, PASSWORD),
    )
}

async fn test_app() -> (Router, AppState) {
    let state = AppState::new(settings()).await.unwrap();
    (create_app(state.clone()), state)
}

/// Test helper to create a request with an optional JSON body and bearer token
fn create_request(method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    if let Some(body) = body {
        builder = builder.header("Content-Type", "application/json");
        builder
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    }
}

/// Test helper to extract JSON response
async fn extract_json_response(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// Invite `email` as the bootstrap admin
async fn register(app: &Router, email: &str) -> Uuid {
    let inviter = login(app, BOOTSTRAP_EMAIL).await;
    let (status, body) = send(
        app,
        create_request(
            "POST",
            "/users",
            Some(json!({"email": email, "password": PASSWORD})),
            Some(&inviter),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().parse().unwrap()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        create_request(
            "POST",
            "/users/login",
            Some(json!({"email": email, "password": PASSWORD})),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_company(app: &Router, token: &str, name: &str) -> Uuid {
    let (status, body) = send(
        app,
        create_request("POST", "/companies", Some(json!({"name": name})), Some(token)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_status_needs_a_session() {
    let (app, _) = test_app().await;

    let (status, body) = send(&app, create_request("GET", "/status", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Bearer Token");

    let token = login(&app, BOOTSTRAP_EMAIL).await;
    let response = app
        .clone()
        .oneshot(create_request("GET", "/status", None, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json_response(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_anonymous_registration_is_refused() {
    let (app, _) = test_app().await;

    let (status, body) = send(
        &app,
        create_request(
            "POST",
            "/users",
            Some(json!({"email": "walk-in@example.com", "password": PASSWORD})),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Bearer Token");

    let (status, _) = send(
        &app,
        create_request(
            "POST",
            "/users/login",
            Some(json!({"email": "walk-in@example.com", "password": PASSWORD})),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_outsider_cannot_reach_another_tenant() {
    let (app, _) = test_app().await;
    register(&app, "tenant@example.com").await;
    let tenant = login(&app, "tenant@example.com").await;
    let company = create_company(&app, &tenant, "Tenant Co").await;
    let company_path = format!("/companies/{company}");

    // Without a way to self-register there is no token to act with
    let (status, _) = send(
        &app,
        create_request(
            "POST",
            "/users",
            Some(json!({"email": "intruder@example.com", "password": PASSWORD})),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    for (method, path) in [("POST", "/companies"), ("PUT", company_path.as_str())] {
        let (status, _) = send(
            &app,
            create_request(method, path, Some(json!({"name": "Mine now"})), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
    }

    // An invited user with no grant on the company is refused as well
    register(&app, "neighbour@example.com").await;
    let neighbour = login(&app, "neighbour@example.com").await;
    let (status, _) = send(
        &app,
        create_request("PUT", &company_path, Some(json!({"name": "Mine now"})), Some(&neighbour)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, create_request("GET", &company_path, None, Some(&tenant))).await;
    assert_eq!(body["name"], "Tenant Co");
}

#[tokio::test]
async fn test_login_returns_token_and_millisecond_expiry() {
    let (app, _) = test_app().await;
    register(&app, "login@example.com").await;

    let before = Utc::now();
    let (status, body) = send(
        &app,
        create_request(
            "POST",
            "/users/login",
            Some(json!({"email": "LOGIN@example.com", "password": PASSWORD})),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"].as_str().unwrap().split('.').count(), 3);
    let expires_at = body["expires_at"].as_i64().unwrap();
    let expected = (before + Duration::minutes(5)).timestamp_millis();
    assert!((expires_at - expected).abs() < 5_000, "{expires_at} vs {expected}");
}

#[tokio::test]
async fn test_bad_credentials_are_generic() {
    let (app, _) = test_app().await;
    register(&app, "real@example.com").await;

    let (unknown_status, unknown_body) = send(
        &app,
        create_request(
            "POST",
            "/users/login",
            Some(json!({"email": "ghost@example.com", "password": PASSWORD})),
            None,
        ),
    )
    .await;
    let (wrong_status, wrong_body) = send(
        &app,
        create_request(
            "POST",
            "/users/login",
            Some(json!({"email": "real@example.com", "password": "not-the-password"})),
            None,
        ),
    )
    .await;

    assert_eq!(unknown_status, StatusCode::FORBIDDEN);
    assert_eq!(wrong_status, StatusCode::FORBIDDEN);
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (app, _) = test_app().await;
    register(&app, "twice@example.com").await;
    let inviter = login(&app, BOOTSTRAP_EMAIL).await;

    let (status, _) = send(
        &app,
        create_request(
            "POST",
            "/users",
            Some(json!({"email": "Twice@Example.com", "password": PASSWORD})),
            Some(&inviter),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_missing_and_invalid_tokens() {
    let (app, _) = test_app().await;

    let (status, body) = send(
        &app,
        create_request("POST", "/companies", Some(json!({"name": "Acme"})), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Bearer Token");

    let (status, body) = send(
        &app,
        create_request("POST", "/companies", Some(json!({"name": "Acme"})), Some("garbage")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid Bearer Token");
}

#[tokio::test]
async fn test_bypass_matches_method_exactly() {
    let (app, _) = test_app().await;

    let (status, body) = send(&app, create_request("GET", "/users/login", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Bearer Token");
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let (app, state) = test_app().await;
    let user_id = register(&app, "late@example.com").await;

    let session = Session::start(
        user_id,
        Utc::now() - Duration::minutes(10),
        Duration::minutes(5),
    )
    .unwrap();
    state.db.insert_session(&session).await.unwrap();
    let token = TokenCodec::from_settings(&state.settings.auth)
        .encode(&session)
        .unwrap();

    let (status, body) = send(
        &app,
        create_request("POST", "/companies", Some(json!({"name": "Late"})), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid Bearer Token");
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let (app, _) = test_app().await;
    register(&app, "bye@example.com").await;
    let token = login(&app, "bye@example.com").await;

    let (status, _) = send(&app, create_request("POST", "/users/logout", None, Some(&token))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, create_request("POST", "/users/logout", None, Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_change() {
    let (app, _) = test_app().await;
    register(&app, "rotate@example.com").await;
    let token = login(&app, "rotate@example.com").await;

    let (status, _) = send(
        &app,
        create_request(
            "PATCH",
            "/users/password",
            Some(json!({"current_password": "wrong-one", "new_password": "brand-new-pw"})),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        create_request(
            "PATCH",
            "/users/password",
            Some(json!({"current_password": PASSWORD, "new_password": "brand-new-pw"})),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        create_request(
            "POST",
            "/users/login",
            Some(json!({"email": "rotate@example.com", "password": "brand-new-pw"})),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_company_roles_end_to_end() {
    let (app, _) = test_app().await;

    register(&app, "owner@example.com").await;
    let owner = login(&app, "owner@example.com").await;
    let pm_id = register(&app, "pm@example.com").await;
    let pm = login(&app, "pm@example.com").await;
    let contributor_id = register(&app, "contrib@example.com").await;
    let contributor = login(&app, "contrib@example.com").await;

    let company = create_company(&app, &owner, "Acme").await;
    let company_path = format!("/companies/{company}");

    // Creator can read; strangers cannot
    let (status, body) = send(&app, create_request("GET", &company_path, None, Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme");
    let (status, body) = send(&app, create_request("GET", &company_path, None, Some(&pm))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized");

    // Owner grants roles
    let grants = format!("{company_path}/permissions");
    for (user_id, role) in [
        (pm_id, "company_project_manager"),
        (contributor_id, "company_contributor"),
    ] {
        let (status, body) = send(
            &app,
            create_request(
                "POST",
                &grants,
                Some(json!({"user_id": user_id, "role": role})),
                Some(&owner),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["company_id"], company.to_string());
    }

    let (status, body) = send(&app, create_request("GET", &grants, None, Some(&contributor))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    // Only the project manager may create contracts
    let contracts = format!("{company_path}/contracts");
    let (status, body) = send(
        &app,
        create_request("POST", &contracts, Some(json!({"name": "Roof"})), Some(&pm)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["company_id"], company.to_string());

    let (status, _) = send(
        &app,
        create_request("POST", &contracts, Some(json!({"name": "Walls"})), Some(&contributor)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Renaming the company record needs company_admin
    let (status, _) = send(
        &app,
        create_request("PUT", &company_path, Some(json!({"name": "Acme 2"})), Some(&pm)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(
        &app,
        create_request("PUT", &company_path, Some(json!({"name": "Acme 2"})), Some(&owner)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme 2");
}

#[tokio::test]
async fn test_members_cannot_hand_out_admin() {
    let (app, _) = test_app().await;

    register(&app, "boss@example.com").await;
    let boss = login(&app, "boss@example.com").await;
    let member_id = register(&app, "member@example.com").await;
    let member = login(&app, "member@example.com").await;

    let company = create_company(&app, &boss, "Globex").await;
    let grants = format!("/companies/{company}/permissions");
    let (status, body) = send(
        &app,
        create_request(
            "POST",
            &grants,
            Some(json!({"user_id": member_id, "role": "company_admin"})),
            Some(&boss),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let grant_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        create_request(
            "POST",
            &grants,
            Some(json!({"user_id": member_id, "role": "admin"})),
            Some(&member),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        create_request(
            "PUT",
            &format!("{grants}/{grant_id}"),
            Some(json!({"role": "admin"})),
            Some(&member),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Revocation is deny-by-default for non-admins
    let (status, _) = send(
        &app,
        create_request("DELETE", &format!("{grants}/{grant_id}"), None, Some(&member)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        create_request("DELETE", &format!("{grants}/{grant_id}"), None, Some(&boss)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unknown_company_is_not_found_for_admin() {
    let (app, _) = test_app().await;
    register(&app, "root@example.com").await;
    let root = login(&app, "root@example.com").await;
    create_company(&app, &root, "Initech").await;

    let (status, _) = send(
        &app,
        create_request("GET", &format!("/companies/{}", Uuid::new_v4()), None, Some(&root)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_user_is_locked_out() {
    let (app, _) = test_app().await;
    let user_id = register(&app, "leaver@example.com").await;
    let token = login(&app, "leaver@example.com").await;
    let root = login(&app, BOOTSTRAP_EMAIL).await;
    let user_path = format!("/users/{user_id}");

    let (status, _) = send(&app, create_request("DELETE", &user_path, None, Some(&root))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Same answer as for an address that never existed
    let (status, body) = send(
        &app,
        create_request(
            "POST",
            "/users/login",
            Some(json!({"email": "leaver@example.com", "password": PASSWORD})),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = send(&app, create_request("GET", "/status", None, Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid Bearer Token");

    let (status, _) = send(&app, create_request("GET", &user_path, None, Some(&root))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, create_request("DELETE", &user_path, None, Some(&root))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The address stays taken
    let (status, _) = send(
        &app,
        create_request(
            "POST",
            "/users",
            Some(json!({"email": "leaver@example.com", "password": PASSWORD})),
            Some(&root),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_user_records_are_for_self_or_admin() {
    let (app, _) = test_app().await;
    let root = login(&app, BOOTSTRAP_EMAIL).await;

    let (status, body) = send(
        &app,
        create_request(
            "POST",
            "/users",
            Some(json!({
                "email": "ada@example.com",
                "password": PASSWORD,
                "first_name": "Ada",
                "last_name": "Lovelace"
            })),
            Some(&root),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body.get("email").is_none());
    let ada_id = body["id"].as_str().unwrap().to_string();
    let ada = login(&app, "ada@example.com").await;
    let other_id = register(&app, "other@example.com").await;

    let (status, body) =
        send(&app, create_request("GET", &format!("/users/{ada_id}"), None, Some(&ada))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ada");
    assert!(body["invited_by"].is_string());

    let other_path = format!("/users/{other_id}");
    for method in ["GET", "DELETE"] {
        let (status, _) = send(&app, create_request(method, &other_path, None, Some(&ada))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method}");
    }
    let (status, _) = send(&app, create_request("GET", "/users", None, Some(&ada))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, create_request("GET", "/users", None, Some(&root))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    // Anyone signed in may invite; the invitation records who did it
    let (status, body) = send(
        &app,
        create_request(
            "POST",
            "/users",
            Some(json!({"email": "friend@example.com", "password": PASSWORD})),
            Some(&ada),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invited_by"], ada_id);
}

#[tokio::test]
async fn test_company_delete_is_admin_only() {
    let (app, _) = test_app().await;
    register(&app, "founder@example.com").await;
    let founder = login(&app, "founder@example.com").await;
    let manager_id = register(&app, "manager@example.com").await;
    let manager = login(&app, "manager@example.com").await;

    let company = create_company(&app, &founder, "Hooli").await;
    let company_path = format!("/companies/{company}");
    let (status, _) = send(
        &app,
        create_request(
            "POST",
            &format!("{company_path}/permissions"),
            Some(json!({"user_id": manager_id, "role": "company_admin"})),
            Some(&founder),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, create_request("DELETE", &company_path, None, Some(&manager))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, create_request("DELETE", &company_path, None, Some(&founder))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, create_request("GET", &company_path, None, Some(&founder))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, create_request("DELETE", &company_path, None, Some(&founder))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The grants went with it
    let (status, _) = send(&app, create_request("GET", &company_path, None, Some(&manager))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_categories_follow_company_membership() {
    let (app, _) = test_app().await;
    register(&app, "cfo@example.com").await;
    let cfo = login(&app, "cfo@example.com").await;
    let clerk_id = register(&app, "clerk@example.com").await;
    let clerk = login(&app, "clerk@example.com").await;
    register(&app, "stranger@example.com").await;
    let stranger = login(&app, "stranger@example.com").await;

    let company = create_company(&app, &cfo, "Ledger Ltd").await;
    let categories = format!("/companies/{company}/categories");
    let (status, _) = send(
        &app,
        create_request(
            "POST",
            &format!("/companies/{company}/permissions"),
            Some(json!({"user_id": clerk_id, "role": "company_contributor"})),
            Some(&cfo),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, parent) = send(
        &app,
        create_request(
            "POST",
            &categories,
            Some(json!({"description": "Materials", "type": "cost"})),
            Some(&clerk),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{parent}");
    assert_eq!(parent["type"], "cost");
    let parent_id = parent["id"].as_str().unwrap().to_string();

    let (status, child) = send(
        &app,
        create_request(
            "POST",
            &categories,
            Some(json!({"description": "Timber", "type": "cost", "parent_id": parent_id})),
            Some(&clerk),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{child}");
    assert_eq!(child["parent_id"], parent_id);

    // One level of nesting only
    let (status, _) = send(
        &app,
        create_request(
            "POST",
            &categories,
            Some(json!({"description": "Oak", "type": "cost", "parent_id": child["id"]})),
            Some(&clerk),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, create_request("GET", &categories, None, Some(&stranger))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let parent_path = format!("{categories}/{parent_id}");
    let (status, body) = send(
        &app,
        create_request("PUT", &parent_path, Some(json!({"description": "Supplies"})), Some(&clerk)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Supplies");

    let (status, _) = send(&app, create_request("DELETE", &parent_path, None, Some(&clerk))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Looked up through another company's path it does not exist
    let elsewhere = create_company(&app, &cfo, "Elsewhere").await;
    let (status, _) = send(
        &app,
        create_request(
            "GET",
            &format!("/companies/{elsewhere}/categories/{parent_id}"),
            None,
            Some(&cfo),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, create_request("DELETE", &parent_path, None, Some(&cfo))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, create_request("GET", &categories, None, Some(&clerk))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_company_admin_is_granted_by_company_admins_only() {
    let (app, _) = test_app().await;
    register(&app, "chief@example.com").await;
    let chief = login(&app, "chief@example.com").await;
    let worker_id = register(&app, "worker@example.com").await;
    let worker = login(&app, "worker@example.com").await;
    let deputy_id = register(&app, "deputy@example.com").await;
    let deputy = login(&app, "deputy@example.com").await;
    let hire_id = register(&app, "hire@example.com").await;

    let company = create_company(&app, &chief, "Umbrella").await;
    let grants = format!("/companies/{company}/permissions");
    let mut grant_ids = Vec::new();
    for (user_id, role) in [(worker_id, "company_contributor"), (deputy_id, "company_admin")] {
        let (status, body) = send(
            &app,
            create_request(
                "POST",
                &grants,
                Some(json!({"user_id": user_id, "role": role})),
                Some(&chief),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        grant_ids.push(body["id"].as_str().unwrap().to_string());
    }

    // A contributor can neither grant nor upgrade to company_admin
    let (status, _) = send(
        &app,
        create_request(
            "POST",
            &grants,
            Some(json!({"user_id": worker_id, "role": "company_admin"})),
            Some(&worker),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        create_request(
            "PUT",
            &format!("{grants}/{}", grant_ids[0]),
            Some(json!({"role": "company_admin"})),
            Some(&worker),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The company's own company_admin can
    let (status, body) = send(
        &app,
        create_request(
            "POST",
            &grants,
            Some(json!({"user_id": hire_id, "role": "company_admin"})),
            Some(&deputy),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    // but not for a company it does not administer
    let other = create_company(&app, &chief, "Other").await;
    let (status, _) = send(
        &app,
        create_request(
            "POST",
            &format!("/companies/{other}/permissions"),
            Some(json!({"user_id": hire_id, "role": "company_admin"})),
            Some(&deputy),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
