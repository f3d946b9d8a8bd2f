// src/models/estimate.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::{auth::UserSummary, job::JobStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estimate_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EstimateStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Revised,
}

// --- LINE ITEMS ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructureSpecifications {
    pub diameter: Option<f64>,
    pub height: Option<f64>,
    pub wall_thickness: Option<f64>,
    pub riser_height: Option<f64>,
    pub ship_lap_joint: Option<bool>,
    pub custom_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructureItem {
    #[validate(length(min = 1, message = "Structure type is required"))]
    #[schema(example = "Wet Well")]
    pub structure_type: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(range(min = 1, max = 1_000_000, message = "Quantity must be between 1 and 1,000,000"))]
    pub quantity: i32,

    #[validate(custom(function = "validate_amount"))]
    pub unit_cost: Decimal,

    /// Recomputed as `quantity * unit_cost` on every save.
    #[serde(default)]
    pub total_cost: Decimal,

    #[serde(default)]
    pub specifications: StructureSpecifications,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub item_name: String,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,

    pub supplier: Option<String>,

    #[validate(range(min = 1, max = 1_000_000, message = "Quantity must be between 1 and 1,000,000"))]
    pub quantity: i32,

    #[validate(custom(function = "validate_amount"))]
    pub unit_cost: Decimal,

    #[serde(default)]
    pub total_cost: Decimal,

    #[serde(default = "default_needs_ordering")]
    pub needs_ordering: bool,
}

fn default_needs_ordering() -> bool {
    true
}

// --- ESTIMATE ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub id: Uuid,
    pub job_id: Uuid,
    pub version: i32,
    pub estimator_id: Uuid,
    pub status: EstimateStatus,

    #[schema(value_type = Vec<StructureItem>)]
    pub structures: Json<Vec<StructureItem>>,
    #[schema(value_type = Vec<PurchaseItem>)]
    pub items_to_purchase: Json<Vec<PurchaseItem>>,

    pub labor_cost: Decimal,
    pub material_cost: Decimal,
    pub equipment_cost: Decimal,
    pub overhead_cost: Decimal,
    /// Percentage, 0..=100.
    pub profit_margin: Decimal,
    pub total_cost: Decimal,
    pub quoted_price: Decimal,

    pub notes: Option<String>,
    pub revision_reason: Option<String>,

    #[serde(rename = "assignedPMId")]
    pub assigned_pm_id: Option<Uuid>,
    pub assigned_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the store needs to insert a new version. The version number is
/// allocated by the store.
#[derive(Debug, Clone)]
pub struct EstimateDraft {
    pub job_id: Uuid,
    pub estimator_id: Uuid,
    pub status: EstimateStatus,
    pub structures: Vec<StructureItem>,
    pub items_to_purchase: Vec<PurchaseItem>,
    pub labor_cost: Decimal,
    pub material_cost: Decimal,
    pub equipment_cost: Decimal,
    pub overhead_cost: Decimal,
    pub profit_margin: Decimal,
    pub total_cost: Decimal,
    pub quoted_price: Decimal,
    pub notes: Option<String>,
    pub assigned_pm_id: Option<Uuid>,
    pub assigned_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct EstimateFilter {
    pub estimator_id: Option<Uuid>,
    pub assigned_pm_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub status: Option<EstimateStatus>,
}

/// Job fields shown next to an estimate.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateJobSummary {
    pub id: Uuid,
    pub job_number: String,
    pub job_name: String,
    pub status: JobStatus,
    pub customer_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateDetail {
    #[serde(flatten)]
    pub estimate: Estimate,
    pub job: Option<EstimateJobSummary>,
    pub estimator: Option<UserSummary>,
    #[serde(rename = "assignedPM")]
    pub assigned_pm: Option<UserSummary>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateEstimatePayload {
    pub job_id: Uuid,

    #[serde(default)]
    #[validate(nested)]
    pub structures: Vec<StructureItem>,

    #[serde(default)]
    #[validate(nested)]
    pub items_to_purchase: Vec<PurchaseItem>,

    #[validate(custom(function = "validate_amount"))]
    #[serde(default)]
    pub labor_cost: Decimal,
    #[validate(custom(function = "validate_amount"))]
    #[serde(default)]
    pub material_cost: Decimal,
    #[validate(custom(function = "validate_amount"))]
    #[serde(default)]
    pub equipment_cost: Decimal,
    #[validate(custom(function = "validate_amount"))]
    #[serde(default)]
    pub overhead_cost: Decimal,

    #[validate(custom(function = "validate_margin"))]
    #[serde(default = "default_margin")]
    #[schema(example = 30.0)]
    pub profit_margin: Decimal,

    #[validate(length(max = 2000, message = "Notes must be less than 2000 characters"))]
    pub notes: Option<String>,

    #[serde(default)]
    pub status: EstimateStatus,

    #[serde(rename = "assignedPMId")]
    pub assigned_pm_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateEstimatePayload {
    #[validate(nested)]
    pub structures: Option<Vec<StructureItem>>,
    #[validate(nested)]
    pub items_to_purchase: Option<Vec<PurchaseItem>>,

    #[validate(custom(function = "validate_amount"))]
    pub labor_cost: Option<Decimal>,
    #[validate(custom(function = "validate_amount"))]
    pub material_cost: Option<Decimal>,
    #[validate(custom(function = "validate_amount"))]
    pub equipment_cost: Option<Decimal>,
    #[validate(custom(function = "validate_amount"))]
    pub overhead_cost: Option<Decimal>,

    #[validate(custom(function = "validate_margin"))]
    pub profit_margin: Option<Decimal>,

    #[validate(length(max = 2000, message = "Notes must be less than 2000 characters"))]
    pub notes: Option<String>,

    #[validate(length(max = 500, message = "Revision reason must be less than 500 characters"))]
    pub revision_reason: Option<String>,

    pub status: Option<EstimateStatus>,

    #[serde(rename = "assignedPMId")]
    pub assigned_pm_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListEstimatesQuery {
    pub job_id: Option<Uuid>,
    pub status: Option<EstimateStatus>,
}

fn default_margin() -> Decimal {
    Decimal::from(30)
}

/// Largest amount a `NUMERIC(14, 2)` column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Money input: 0 up to [`MAX_AMOUNT`].
pub fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("negative");
        err.message = Some("Value must be 0 or greater".into());
        return Err(err);
    }
    if *value > MAX_AMOUNT {
        let mut err = ValidationError::new("too_large");
        err.message = Some("Value must be at most 999999999999.99".into());
        return Err(err);
    }
    Ok(())
}

fn validate_margin(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("margin_range");
        err.message = Some("Profit margin must be between 0 and 100".into());
        return Err(err);
    }
    Ok(())
}
