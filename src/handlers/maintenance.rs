// src/handlers/maintenance.rs

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::UserRole,
    services::rbac_service::ensure,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResponse {
    pub jobs_purged: u64,
    pub customers_purged: u64,
}

// POST /api/maintenance/purge
#[utoipa::path(
    post,
    path = "/api/maintenance/purge",
    tag = "Maintenance",
    responses(
        (status = 200, description = "Soft-deleted rows removed for good", body = ApiResponse<PurgeResponse>),
        (status = 403, description = "Admins only")
    ),
    security(("api_jwt" = []))
)]
pub async fn purge_deleted(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<ApiResponse<PurgeResponse>>, AppError> {
    ensure(user.role == UserRole::Admin, "Only admins can purge deleted records")?;

    let report = app_state.job_service.purge_deleted().await?;

    Ok(Json(ApiResponse::ok(PurgeResponse {
        jobs_purged: report.jobs,
        customers_purged: report.customers,
    })))
}
