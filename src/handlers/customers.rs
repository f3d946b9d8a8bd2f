// src/handlers/customers.rs

use axum::{
    extract::State,
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
    middleware::auth::AuthenticatedUser,
    models::{
        auth::UserRole,
        customer::{CreateCustomerPayload, Customer},
    },
    services::rbac_service::ensure,
};

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses(
        (status = 200, description = "Customers, newest first", body = ApiResponse<Vec<Customer>>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Customer>>>, AppError> {
    let customers = app_state.customer_service.list().await?;
    Ok(Json(ApiResponse::ok(customers)))
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Customer created", body = ApiResponse<Customer>),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state.customer_service.create(&user, payload).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(customer))))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "The customer", body = ApiResponse<Customer>),
        (status = 404, description = "No such customer")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let customer = app_state.customer_service.get(id).await?;
    Ok(Json(ApiResponse::ok(customer)))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer soft-deleted", body = MessageResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "No such customer")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure(
        user.role == UserRole::Admin,
        "Only admins can delete customers",
    )?;

    app_state.customer_service.soft_delete(id).await?;
    Ok(Json(MessageResponse::new("Customer deleted successfully")))
}
