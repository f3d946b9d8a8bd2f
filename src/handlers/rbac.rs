// src/handlers/rbac.rs

use axum::Json;

use crate::{
    common::response::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::rbac::RolePermissionsResponse,
    services::rbac_service::permissions_for,
};

// GET /api/permissions
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses(
        (status = 200, description = "The caller's role and capabilities", body = ApiResponse<RolePermissionsResponse>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_permissions(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<ApiResponse<RolePermissionsResponse>> {
    Json(ApiResponse::ok(permissions_for(&user)))
}
