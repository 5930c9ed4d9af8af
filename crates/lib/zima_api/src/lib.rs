//! # zima_api
//!
//! HTTP API library for ZIMA.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;
use zima_core::auth::guard::Guard;
use zima_core::auth::jwt::TokenIssuer;
use zima_core::licenses::LicenseManager;
use zima_core::store::CredentialStore;

use crate::config::ApiConfig;
use crate::handlers::{admin, auth, health, licenses};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Account and license persistence.
    pub store: Arc<dyn CredentialStore>,
    pub tokens: TokenIssuer,
    pub licenses: LicenseManager,
    pub guard: Guard,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Wire the services for `store` according to `config`.
    pub fn new(store: Arc<dyn CredentialStore>, config: ApiConfig) -> Self {
        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.access_token_ttl);
        let licenses = LicenseManager::new(store.clone(), config.license_policy.clone());
        let guard = Guard::new(config.role_order.clone(), config.plan_order.clone());
        Self {
            store,
            tokens,
            licenses,
            guard,
            config,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `zima_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    zima_core::migrate::migrate(pool).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health))
        .route(routes::POST_AUTH_SIGNUP, post(auth::signup_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(
            routes::GET_LICENSES_VALIDATE_SECRET,
            get(licenses::validate_license_handler),
        );

    // Protected routes (any authenticated account)
    let protected = Router::new()
        .route(routes::GET_AUTH_ME, get(auth::me_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Admin routes. The last layer added runs first, so `require_auth` precedes `require_admin`.
    let admin = Router::new()
        .route(
            routes::POST_LICENSES_CREATE,
            post(licenses::create_license_handler),
        )
        .route(routes::GET_LICENSES, get(licenses::list_licenses_handler))
        .route(
            routes::POST_LICENSES_REVOKE,
            post(licenses::revoke_license_handler),
        )
        .route(
            routes::ADMIN_USERS,
            get(admin::list_users_handler).post(admin::upsert_user_handler),
        )
        .route(
            routes::DELETE_ADMIN_USERS_ID,
            delete(admin::disable_user_handler),
        )
        .route(routes::POST_ADMIN_USER_ROLE, post(admin::set_role_handler))
        .route(routes::POST_ADMIN_USER_PLAN, post(admin::set_plan_handler))
        .route(routes::GET_ADMIN_DASHBOARD, get(admin::dashboard_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(admin)
        .layer(cors)
        .with_state(state)
}
