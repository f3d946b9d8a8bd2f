// src/handlers/jobs.rs

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
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
        rbac::{PermCreateJobs, RequirePermission},
    },
    models::job::{
        CreateJobForm, CreateJobMultipart, JobDetail, JobListResponse, JobPriority, JobUpdate,
        ListJobsQuery, PatchJobPayload, QuoteUpload, UpdateJobPayload,
    },
};

// =============================================================================
//  MULTIPART FORM
// =============================================================================

fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}

fn optional_id(field: &str, value: &str) -> Result<Option<Uuid>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(value)
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{field} must be a valid id")))
}

fn parse_priority(value: &str) -> Result<JobPriority, AppError> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase()))
        .map_err(|_| AppError::BadRequest(format!("Unknown priority: {value}")))
}

/// Accepts a JSON array or a comma separated list.
fn parse_tags(value: &str) -> Vec<String> {
    if let Ok(tags) = serde_json::from_str::<Vec<String>>(value) {
        return tags;
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits the creation form into its text fields and the optional `quoteFile`.
async fn read_job_form(mut multipart: Multipart) -> Result<(CreateJobForm, Option<QuoteUpload>), AppError> {
    let mut form = CreateJobForm::default();
    let mut quote = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "quoteFile" {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            quote = Some(QuoteUpload {
                file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "jobName" => form.job_name = value.trim().to_string(),
            "jobNumber" => form.job_number = value.trim().to_string(),
            "customerId" => form.customer_id = optional_id("customerId", &value)?,
            "priority" if !value.trim().is_empty() => form.priority = parse_priority(&value)?,
            "quotedAmount" if !value.trim().is_empty() => {
                let amount = value
                    .trim()
                    .parse::<Decimal>()
                    .map_err(|_| AppError::BadRequest("quotedAmount must be a number".into()))?;
                form.quoted_amount = Some(amount);
            }
            "estimatorId" => form.estimator_id = optional_id("estimatorId", &value)?,
            "drafterId" => form.drafter_id = optional_id("drafterId", &value)?,
            "projectManagerId" => form.project_manager_id = optional_id("projectManagerId", &value)?,
            "notes" if !value.trim().is_empty() => form.notes = Some(value),
            "tags" => form.tags = parse_tags(&value),
            _ => {}
        }
    }

    Ok((form, quote))
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/jobs
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "Jobs",
    request_body(content = CreateJobMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Job created", body = ApiResponse<JobDetail>),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Caller cannot create jobs"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Job number already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_job(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermCreateJobs>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (form, quote) = read_job_form(multipart).await?;

    let job = app_state.job_service.create(&user, form, quote).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(job))))
}

// GET /api/jobs
#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "Jobs",
    params(ListJobsQuery),
    responses(
        (status = 200, description = "One page of jobs", body = JobListResponse),
        (status = 400, description = "Unknown filter value"),
        (status = 403, description = "includeDeleted is admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_jobs(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<JobListResponse>, AppError> {
    let (data, pagination) = app_state.job_service.list(&user, query).await?;

    Ok(Json(JobListResponse {
        success: true,
        data,
        pagination,
    }))
}

// GET /api/jobs/{id}
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "The job with customer and personnel", body = ApiResponse<JobDetail>),
        (status = 404, description = "No such job")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_job(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<JobDetail>>, AppError> {
    let job = app_state.job_service.get(id).await?;
    Ok(Json(ApiResponse::ok(job)))
}

// PUT /api/jobs/{id}
#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = ApiResponse<JobDetail>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller cannot edit this job"),
        (status = 404, description = "No such job")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_job(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateJobPayload>,
) -> Result<Json<ApiResponse<JobDetail>>, AppError> {
    payload.validate()?;

    let update = JobUpdate {
        job_name: payload.job_name,
        customer_id: payload.customer_id,
        status: payload.status,
        priority: payload.priority,
        estimator_id: payload.estimator_id,
        drafter_id: payload.drafter_id,
        project_manager_id: payload.project_manager_id,
        estimate_due_date: payload.estimate_due_date,
        quoted_amount: payload.quoted_amount,
        notes: payload.notes,
        tags: payload.tags,
    };

    let job = app_state.job_service.update(&user, id, update).await?;
    Ok(Json(ApiResponse::ok(job)))
}

// PATCH /api/jobs/{id}
#[utoipa::path(
    patch,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = PatchJobPayload,
    responses(
        (status = 200, description = "Job updated", body = ApiResponse<JobDetail>),
        (status = 403, description = "Caller cannot edit this job"),
        (status = 404, description = "No such job")
    ),
    security(("api_jwt" = []))
)]
pub async fn patch_job(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<PatchJobPayload>,
) -> Result<Json<ApiResponse<JobDetail>>, AppError> {
    payload.validate()?;

    let update = JobUpdate {
        status: payload.status,
        priority: payload.priority,
        notes: payload.notes,
        estimator_id: payload.estimator_id,
        drafter_id: payload.drafter_id,
        project_manager_id: payload.project_manager_id,
        ..JobUpdate::default()
    };

    let job = app_state.job_service.update(&user, id, update).await?;
    Ok(Json(ApiResponse::ok(job)))
}

// DELETE /api/jobs/{id}
#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job soft-deleted", body = MessageResponse),
        (status = 403, description = "Caller cannot delete this job"),
        (status = 404, description = "No such job")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_job(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.job_service.soft_delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Job deleted successfully")))
}
