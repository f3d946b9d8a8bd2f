// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermViewDashboard, RequirePermission},
    },
    models::dashboard::DashboardStats,
};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Card counters for the caller's role", body = ApiResponse<DashboardStats>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role lacks canViewDashboard")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermViewDashboard>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = app_state.dashboard_service.stats(&user).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
