// src/models/job.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{auth::UserSummary, customer::CustomerSummary, estimate::validate_amount};

// --- ENUMS ---

/// The eight pipeline stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_status")]
pub enum JobStatus {
    Estimation,
    Drafting,
    #[serde(rename = "PM Review")]
    #[sqlx(rename = "PM Review")]
    PmReview,
    Submitted,
    #[serde(rename = "Under Revision")]
    #[sqlx(rename = "Under Revision")]
    UnderRevision,
    Accepted,
    #[serde(rename = "In Production")]
    #[sqlx(rename = "In Production")]
    InProduction,
    Delivered,
}

impl JobStatus {
    pub const PIPELINE: [JobStatus; 8] = [
        JobStatus::Estimation,
        JobStatus::Drafting,
        JobStatus::PmReview,
        JobStatus::Submitted,
        JobStatus::UnderRevision,
        JobStatus::Accepted,
        JobStatus::InProduction,
        JobStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Estimation => "Estimation",
            JobStatus::Drafting => "Drafting",
            JobStatus::PmReview => "PM Review",
            JobStatus::Submitted => "Submitted",
            JobStatus::UnderRevision => "Under Revision",
            JobStatus::Accepted => "Accepted",
            JobStatus::InProduction => "In Production",
            JobStatus::Delivered => "Delivered",
        }
    }

    pub fn phase(&self) -> JobPhase {
        match self {
            JobStatus::Estimation => JobPhase::Estimation,
            JobStatus::Drafting => JobPhase::Drafting,
            JobStatus::PmReview => JobPhase::PmReview,
            JobStatus::Submitted => JobPhase::Submitted,
            JobStatus::UnderRevision => JobPhase::Revision,
            JobStatus::Accepted => JobPhase::Accepted,
            JobStatus::InProduction => JobPhase::Production,
            JobStatus::Delivered => JobPhase::Delivered,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-friendly twin of [`JobStatus`], kept in sync on every status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_phase", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Estimation,
    Drafting,
    PmReview,
    Submitted,
    Revision,
    Accepted,
    Production,
    Delivered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

// --- JOB ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    #[schema(example = "LP-001")]
    pub job_number: String,
    #[schema(example = "Wet Well")]
    pub job_name: String,
    pub customer_id: Uuid,
    pub status: JobStatus,
    pub current_phase: JobPhase,
    pub priority: JobPriority,

    // Personnel
    pub estimator_id: Option<Uuid>,
    pub drafter_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
    pub created_by: Option<Uuid>,

    // Dates
    pub created_date: DateTime<Utc>,
    pub estimate_date: Option<DateTime<Utc>>,
    pub estimate_due_date: Option<DateTime<Utc>>,
    pub draft_start_date: Option<DateTime<Utc>>,
    pub draft_completion_date: Option<DateTime<Utc>>,
    pub submission_date: Option<DateTime<Utc>>,
    pub acceptance_date: Option<DateTime<Utc>>,
    pub production_start_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,

    #[schema(example = 12500.0)]
    pub quoted_amount: Decimal,
    pub quote_pdf_url: Option<String>,

    pub notes: Option<String>,
    pub tags: Vec<String>,

    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A job with its customer and personnel resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub customer: Option<CustomerSummary>,
    pub estimator: Option<UserSummary>,
    pub drafter: Option<UserSummary>,
    pub project_manager: Option<UserSummary>,
    pub creator: Option<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub job_number: String,
    pub job_name: String,
    pub customer_id: Uuid,
    pub priority: JobPriority,
    pub estimator_id: Option<Uuid>,
    pub drafter_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
    pub created_by: Uuid,
    pub quoted_amount: Decimal,
    pub quote_pdf_url: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

/// Requested edit of a job, as received from PUT or PATCH.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub job_name: Option<String>,
    pub customer_id: Option<Uuid>,
    pub status: Option<JobStatus>,
    pub priority: Option<JobPriority>,
    pub estimator_id: Option<Uuid>,
    pub drafter_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
    pub estimate_due_date: Option<DateTime<Utc>>,
    pub quoted_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Column-level changes handed to the store. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobChanges {
    pub job_name: Option<String>,
    pub customer_id: Option<Uuid>,
    pub status: Option<JobStatus>,
    pub current_phase: Option<JobPhase>,
    pub priority: Option<JobPriority>,
    pub estimator_id: Option<Uuid>,
    pub drafter_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
    pub estimate_date: Option<DateTime<Utc>>,
    pub estimate_due_date: Option<DateTime<Utc>>,
    pub draft_start_date: Option<DateTime<Utc>>,
    pub production_start_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub quoted_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub priority: Option<JobPriority>,
    pub job_number: Option<String>,
    pub project_manager_id: Option<Uuid>,
    pub include_deleted: bool,
    pub limit: i64,
    pub skip: i64,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            job_number: None,
            project_manager_id: None,
            include_deleted: false,
            limit: 50,
            skip: 0,
        }
    }
}

/// Aggregates behind the dashboard cards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobStats {
    pub active_jobs: i64,
    pub in_production: i64,
    pub distinct_customers: i64,
    pub quoted_in_range: Decimal,
}

// --- PAYLOADS ---

/// Text fields of the multipart job creation form.
#[derive(Debug, Default, Validate)]
pub struct CreateJobForm {
    #[validate(length(min = 1, max = 200, message = "Job name is required and must be less than 200 characters"))]
    pub job_name: String,

    #[validate(length(min = 1, max = 100, message = "Job number is required and must be less than 100 characters"))]
    pub job_number: String,

    pub customer_id: Option<Uuid>,

    pub priority: JobPriority,

    #[validate(custom(function = "validate_amount"))]
    pub quoted_amount: Option<Decimal>,

    pub estimator_id: Option<Uuid>,
    pub drafter_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,

    #[validate(length(max = 5000, message = "Notes must be less than 5000 characters"))]
    pub notes: Option<String>,

    pub tags: Vec<String>,
}

/// An uploaded quote PDF travelling with the creation form.
#[derive(Debug, Clone)]
pub struct QuoteUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Documents the multipart body of `POST /api/jobs` for OpenAPI.
#[allow(dead_code)]
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CreateJobMultipart {
    pub job_name: String,
    pub job_number: String,
    pub customer_id: Uuid,
    pub priority: Option<JobPriority>,
    pub quoted_amount: Option<f64>,
    pub estimator_id: Option<Uuid>,
    pub drafter_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
    pub notes: Option<String>,
    /// Comma separated.
    pub tags: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub quote_file: Option<Vec<u8>>,
}

/// Body of `PUT /api/jobs/{id}`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub job_name: Option<String>,
    pub customer_id: Option<Uuid>,
    pub status: Option<JobStatus>,
    pub priority: Option<JobPriority>,
    pub estimator_id: Option<Uuid>,
    pub drafter_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
    #[serde(alias = "estimateDue")]
    pub estimate_due_date: Option<DateTime<Utc>>,
    #[validate(custom(function = "validate_amount"))]
    pub quoted_amount: Option<Decimal>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body of `PATCH /api/jobs/{id}`: the quick status/personnel edit.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatchJobPayload {
    pub status: Option<JobStatus>,
    pub priority: Option<JobPriority>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    pub estimator_id: Option<Uuid>,
    pub drafter_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListJobsQuery {
    /// A pipeline stage, or `all`.
    pub status: Option<String>,
    /// A priority, or `all`.
    pub priority: Option<String>,
    pub job_number: Option<String>,
    pub project_manager_id: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    /// Admin only.
    pub include_deleted: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub skip: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub success: bool,
    pub data: Vec<JobDetail>,
    pub pagination: Pagination,
}
