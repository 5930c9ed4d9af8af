//! Shared helpers for router integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use zima_api::AppState;
use zima_api::config::ApiConfig;
use zima_api::services::auth::{issue_token, new_account};
use zima_core::models::account::{Plan, Role};
use zima_core::store::{CredentialStore, MemoryStore};

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

/// Configuration with a fixed secret plus `vars` on top of the defaults.
pub fn config(vars: &[(&str, &str)]) -> ApiConfig {
    let mut env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    env.entry("JWT_SECRET".into())
        .or_insert_with(|| "integration-test-secret".into());
    ApiConfig::from_lookup(|var| env.get(var).cloned()).expect("test config")
}

pub fn app() -> TestApp {
    app_with(config(&[]))
}

pub fn app_with(config: ApiConfig) -> TestApp {
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
    let state = AppState::new(store, config);
    let router = zima_api::router(state.clone());
    TestApp { state, router }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Insert an account directly and return a bearer token for it.
    pub async fn seed_account(
        &self,
        email: &str,
        password: &str,
        role: Role,
        plan: Plan,
    ) -> String {
        let account = new_account(email.to_string(), password, role, plan).expect("account");
        let account = self
            .state
            .store
            .insert_account(account)
            .await
            .expect("insert account");
        issue_token(&self.state, &account)
            .expect("token")
            .access_token
    }

    pub async fn admin_token(&self) -> String {
        self.seed_account("admin@zima.ia", "admin-pw", Role::Admin, Plan::Lifetime)
            .await
    }

    pub async fn signup(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(json_request(
            "POST",
            "/auth/signup",
            None,
            serde_json::json!({"email": email, "password": password}),
        ))
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.send(form_login(username, password)).await
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    bodyless("GET", uri, token)
}

pub fn bodyless(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn form_login(username: &str, password: &str) -> Request<Body> {
    let body = format!(
        "username={}&password={}",
        username.replace('@', "%40"),
        password
    );
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request")
}
