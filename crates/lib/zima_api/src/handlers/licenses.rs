//! License request handlers.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use zima_core::models::account::Plan;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::models::{
    CreateLicenseRequest, CreateLicenseResponse, LicenseInfo, RevokeLicenseRequest,
    RevokeLicenseResponse, ValidateLicenseResponse,
};

/// `POST /licenses/create`: issue a license. The secret is returned once.
pub async fn create_license_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateLicenseRequest>,
) -> AppResult<Json<CreateLicenseResponse>> {
    let plan = match body.plan.as_deref() {
        Some(plan) => plan
            .parse::<Plan>()
            .map_err(|e| AppError::Validation(e.to_string()))?,
        None => Plan::default(),
    };
    let issued = state
        .licenses
        .create(&body.owner, &body.scopes, plan, body.expires_in_days)
        .await?;
    Ok(Json(CreateLicenseResponse {
        secret: issued.secret,
        license: LicenseInfo::from_record(issued.record, Utc::now()),
    }))
}

/// `GET /licenses`: all licenses, newest first.
pub async fn list_licenses_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LicenseInfo>>> {
    let now = Utc::now();
    let licenses = state
        .licenses
        .list()
        .await?
        .into_iter()
        .map(|record| LicenseInfo::from_record(record, now))
        .collect();
    Ok(Json(licenses))
}

/// `GET /licenses/validate/{secret}`: check a license secret.
pub async fn validate_license_handler(
    State(state): State<AppState>,
    Path(secret): Path<String>,
) -> AppResult<Json<ValidateLicenseResponse>> {
    let grant = state.licenses.validate(&secret).await?;
    Ok(Json(grant.into()))
}

/// `POST /licenses/revoke`: revoke a license by id. Idempotent.
pub async fn revoke_license_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RevokeLicenseRequest>,
) -> AppResult<Json<RevokeLicenseResponse>> {
    let record = state.licenses.revoke(&body.license_id).await?;
    Ok(Json(RevokeLicenseResponse {
        status: record.status_at(Utc::now()),
        license_id: record.id,
        revoked_at: record.revoked_at,
    }))
}
