//! Account administration handlers. All routes here require the admin role.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use zima_core::models::account::AccountSummary;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{DashboardResponse, SetPlanRequest, SetRoleRequest, UpsertAccountRequest};
use crate::services::accounts;

/// `GET /admin/users`
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AccountSummary>>> {
    Ok(Json(accounts::list(&state).await?))
}

/// `POST /admin/users`: create or update an account by email.
pub async fn upsert_user_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpsertAccountRequest>,
) -> AppResult<Json<AccountSummary>> {
    Ok(Json(accounts::upsert(&state, &body).await?))
}

/// `POST /admin/user/role`
pub async fn set_role_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SetRoleRequest>,
) -> AppResult<Json<AccountSummary>> {
    let account = accounts::set_role(&state, &body.user_id, &body.new_role).await?;
    Ok(Json(account))
}

/// `POST /admin/user/plan`
pub async fn set_plan_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SetPlanRequest>,
) -> AppResult<Json<AccountSummary>> {
    let account = accounts::set_plan(&state, &body.user_id, &body.new_plan).await?;
    Ok(Json(account))
}

/// `DELETE /admin/users/{id}`: soft-disable; the record is kept.
pub async fn disable_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> AppResult<Json<AccountSummary>> {
    Ok(Json(accounts::disable(&state, &user.0, &user_id).await?))
}

/// `GET /admin/dashboard`: account and license counts.
pub async fn dashboard_handler(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardResponse>> {
    Ok(Json(accounts::dashboard(&state).await?))
}
