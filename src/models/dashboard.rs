// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// The four cards at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_jobs: i64,
    pub in_production: i64,
    pub total_customers: i64,
    /// Quoted amount of the jobs created in the current calendar month.
    pub this_month: Decimal,
}
