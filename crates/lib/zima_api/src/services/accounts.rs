//! Account administration.

use chrono::Utc;
use tracing::info;
use zima_core::models::account::{Account, AccountSummary, Identity, Plan, Role};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{DashboardResponse, UpsertAccountRequest};
use crate::services::auth::{new_account, require_email};

fn parse_role(value: &str) -> AppResult<Role> {
    value
        .parse::<Role>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

fn parse_plan(value: &str) -> AppResult<Plan> {
    value
        .parse::<Plan>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

pub async fn list(state: &AppState) -> AppResult<Vec<AccountSummary>> {
    let accounts = state.store.list_accounts().await?;
    Ok(accounts.iter().map(Account::summary).collect())
}

/// Create an account, or update role/plan of the account with that email.
pub async fn upsert(state: &AppState, req: &UpsertAccountRequest) -> AppResult<AccountSummary> {
    let email = require_email(&req.email)?;
    let role = req.role.as_deref().map(parse_role).transpose()?;
    let plan = req.plan.as_deref().map(parse_plan).transpose()?;

    let account = match state.store.find_account_by_email(&email).await? {
        Some(existing) => {
            let changed = Account {
                role: role.unwrap_or(existing.role),
                plan: plan.unwrap_or(existing.plan),
                ..existing
            };
            state.store.upsert_account(changed).await?
        }
        None => {
            let password = req.password.as_deref().ok_or_else(|| {
                AppError::Validation("password is required for new accounts".into())
            })?;
            let account = new_account(
                email,
                password,
                role.unwrap_or_default(),
                plan.unwrap_or_default(),
            )?;
            state.store.upsert_account(account).await?
        }
    };
    info!(
        account_id = %account.id,
        role = %account.role,
        plan = %account.plan,
        "account upserted"
    );
    Ok(account.summary())
}

pub async fn set_role(
    state: &AppState,
    user_id: &str,
    new_role: &str,
) -> AppResult<AccountSummary> {
    let role = parse_role(new_role)?;
    let account = state.store.set_role(user_id.trim(), role).await?;
    info!(account_id = %account.id, %role, "role changed");
    Ok(account.summary())
}

pub async fn set_plan(
    state: &AppState,
    user_id: &str,
    new_plan: &str,
) -> AppResult<AccountSummary> {
    let plan = parse_plan(new_plan)?;
    let account = state.store.set_plan(user_id.trim(), plan).await?;
    info!(account_id = %account.id, %plan, "plan changed");
    Ok(account.summary())
}

/// Soft-disable an account. Administrators cannot disable themselves.
pub async fn disable(
    state: &AppState,
    caller: &Identity,
    user_id: &str,
) -> AppResult<AccountSummary> {
    let user_id = user_id.trim();
    if caller.account_id == user_id {
        return Err(AppError::Validation("cannot disable your own account".into()));
    }
    let account = state.store.set_disabled(user_id, true).await?;
    info!(account_id = %account.id, "account disabled");
    Ok(account.summary())
}

pub async fn dashboard(state: &AppState) -> AppResult<DashboardResponse> {
    let accounts = state.store.list_accounts().await?;
    let licenses = state.licenses.list().await?;
    let now = Utc::now();
    Ok(DashboardResponse {
        total_users: accounts.len(),
        premium_users: accounts
            .iter()
            .filter(|a| state.guard.plan_at_least(a.plan, Plan::Pro))
            .count(),
        freemium_users: accounts.iter().filter(|a| a.plan == Plan::Freemium).count(),
        disabled_users: accounts.iter().filter(|a| a.disabled).count(),
        total_licenses: licenses.len(),
        active_licenses: licenses.iter().filter(|l| l.is_usable_at(now)).count(),
    })
}
