//! Account administration through the router.

mod common;

use axum::http::StatusCode;
use common::{app, app_with, bodyless, config, get, json_request};
use serde_json::{Value, json};
use zima_core::models::account::{Plan, Role};

async fn me(app: &common::TestApp, token: &str) -> Value {
    app.send(get("/auth/me", Some(token))).await.1
}

#[tokio::test]
async fn upsert_creates_then_updates() {
    let app = app();
    let admin = app.admin_token().await;

    let (status, created) = app
        .send(json_request(
            "POST",
            "/admin/users",
            Some(&admin),
            json!({"email": "New@X.com", "password": "pw", "plan": "basic"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "upsert failed: {created}");
    assert_eq!(created["email"], "new@x.com");
    assert_eq!(created["role"], "user");
    assert_eq!(created["plan"], "basic");

    let (status, updated) = app
        .send(json_request(
            "POST",
            "/admin/users",
            Some(&admin),
            json!({"email": "new@x.com", "role": "institutional"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["role"], "institutional");
    assert_eq!(updated["plan"], "basic");

    // The password given at creation still logs in.
    assert_eq!(app.login("new@x.com", "pw").await.0, StatusCode::OK);

    let (status, body) = app
        .send(json_request(
            "POST",
            "/admin/users",
            Some(&admin),
            json!({"email": "nopw@x.com"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn list_users_never_exposes_password_hashes() {
    let app = app();
    let admin = app.admin_token().await;
    app.signup("a@x.com", "pw123").await;

    let (status, users) = app.send(get("/admin/users", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
    assert_eq!(users[0]["email"], "admin@zima.ia");
}

#[tokio::test]
async fn role_change_applies_to_existing_tokens() {
    let app = app();
    let admin = app.admin_token().await;
    let (_, body) = app.signup("a@x.com", "pw123").await;
    let token = body["access_token"].as_str().unwrap().to_string();
    let id = me(&app, &token).await["id"].as_str().unwrap().to_string();

    let (status, _) = app.send(get("/admin/dashboard", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, promoted) = app
        .send(json_request(
            "POST",
            "/admin/user/role",
            Some(&admin),
            json!({"user_id": id, "new_role": "admin"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], "admin");

    let (status, _) = app.send(get("/admin/dashboard", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn set_plan_and_role_validate_input() {
    let app = app();
    let admin = app.admin_token().await;
    let (_, body) = app.signup("a@x.com", "pw123").await;
    let token = body["access_token"].as_str().unwrap().to_string();
    let id = me(&app, &token).await["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .send(json_request(
            "POST",
            "/admin/user/plan",
            Some(&admin),
            json!({"user_id": id, "new_plan": "Pro"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["plan"], "pro");

    let (status, body) = app
        .send(json_request(
            "POST",
            "/admin/user/plan",
            Some(&admin),
            json!({"user_id": id, "new_plan": "enterprise"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = app
        .send(json_request(
            "POST",
            "/admin/user/role",
            Some(&admin),
            json!({"user_id": "missing", "new_role": "admin"}),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn admin_cannot_disable_itself() {
    let app = app();
    let admin = app.admin_token().await;
    let id = me(&app, &admin).await["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(bodyless("DELETE", &format!("/admin/users/{id}"), Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(bodyless("DELETE", "/admin/users/missing", Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_counts_by_plan_order() {
    let app = app();
    let admin = app.admin_token().await;
    app.seed_account("f@x.com", "pw", Role::User, Plan::Freemium).await;
    app.seed_account("b@x.com", "pw", Role::User, Plan::Basic).await;
    app.seed_account("i@x.com", "pw", Role::Institutional, Plan::Institutional)
        .await;

    let (status, dash) = app.send(get("/admin/dashboard", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["total_users"], 4);
    // admin (lifetime) and institutional rank at or above pro by default.
    assert_eq!(dash["premium_users"], 2);
    assert_eq!(dash["freemium_users"], 1);
    assert_eq!(dash["total_licenses"], 0);
}

#[tokio::test]
async fn dashboard_follows_configured_plan_order() {
    let app = app_with(config(&[(
        "PLAN_ORDER",
        "freemium,basic,institutional,pro,lifetime",
    )]));
    let admin = app.admin_token().await;
    app.seed_account("i@x.com", "pw", Role::User, Plan::Institutional)
        .await;

    let (_, dash) = app.send(get("/admin/dashboard", Some(&admin))).await;
    assert_eq!(dash["premium_users"], 1);
}
