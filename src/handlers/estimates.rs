// src/handlers/estimates.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath},
        response::{ApiResponse, MessageResponse},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermCreateEstimates, RequirePermission},
    },
    models::estimate::{CreateEstimatePayload, EstimateDetail, ListEstimatesQuery, UpdateEstimatePayload},
};

// GET /api/estimates
#[utoipa::path(
    get,
    path = "/api/estimates",
    tag = "Estimates",
    params(ListEstimatesQuery),
    responses(
        (status = 200, description = "Estimates visible to the caller, newest first", body = ApiResponse<Vec<EstimateDetail>>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_estimates(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListEstimatesQuery>,
) -> Result<Json<ApiResponse<Vec<EstimateDetail>>>, AppError> {
    let estimates = app_state.estimate_service.list(&user, query).await?;
    Ok(Json(ApiResponse::ok(estimates)))
}

// POST /api/estimates
#[utoipa::path(
    post,
    path = "/api/estimates",
    tag = "Estimates",
    request_body = CreateEstimatePayload,
    responses(
        (status = 201, description = "Next estimate version created", body = ApiResponse<EstimateDetail>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller cannot create estimates"),
        (status = 404, description = "Job not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_estimate(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermCreateEstimates>,
    AppJson(payload): AppJson<CreateEstimatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let estimate = app_state.estimate_service.create(&user, payload).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(estimate))))
}

// GET /api/estimates/{id}
#[utoipa::path(
    get,
    path = "/api/estimates/{id}",
    tag = "Estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    responses(
        (status = 200, description = "The estimate", body = ApiResponse<EstimateDetail>),
        (status = 404, description = "No such estimate")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_estimate(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<EstimateDetail>>, AppError> {
    let estimate = app_state.estimate_service.get(id).await?;
    Ok(Json(ApiResponse::ok(estimate)))
}

// PUT /api/estimates/{id}
#[utoipa::path(
    put,
    path = "/api/estimates/{id}",
    tag = "Estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    request_body = UpdateEstimatePayload,
    responses(
        (status = 200, description = "Estimate updated and repriced", body = ApiResponse<EstimateDetail>),
        (status = 403, description = "Only admins or the author"),
        (status = 404, description = "No such estimate")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_estimate(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateEstimatePayload>,
) -> Result<Json<ApiResponse<EstimateDetail>>, AppError> {
    payload.validate()?;

    let estimate = app_state.estimate_service.update(&user, id, payload).await?;
    Ok(Json(ApiResponse::ok(estimate)))
}

// DELETE /api/estimates/{id}
#[utoipa::path(
    delete,
    path = "/api/estimates/{id}",
    tag = "Estimates",
    params(("id" = Uuid, Path, description = "Estimate id")),
    responses(
        (status = 200, description = "Estimate deleted", body = MessageResponse),
        (status = 403, description = "Only admins or the author"),
        (status = 404, description = "No such estimate")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_estimate(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.estimate_service.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Estimate deleted successfully")))
}
