// src/services/dashboard_service.rs

use std::sync::Arc;

use chrono::{DateTime, Datelike, Months, Utc};

use crate::{
    common::error::AppError,
    db::store::{CustomerStore, JobStore},
    models::{
        auth::{User, UserRole},
        dashboard::DashboardStats,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    jobs: Arc<dyn JobStore>,
    customers: Arc<dyn CustomerStore>,
}

/// `[first of this month, first of next month)` in UTC.
fn month_bounds(now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = now.date_naive().with_day(1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((
        first.and_hms_opt(0, 0, 0)?.and_utc(),
        next.and_hms_opt(0, 0, 0)?.and_utc(),
    ))
}

impl DashboardService {
    pub fn new(jobs: Arc<dyn JobStore>, customers: Arc<dyn CustomerStore>) -> Self {
        Self { jobs, customers }
    }

    /// Admins see the whole shop, project managers their own jobs, everyone
    /// else zeros.
    pub async fn stats(&self, user: &User) -> Result<DashboardStats, AppError> {
        let (from, to) = month_bounds(Utc::now()).ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("could not compute month bounds"))
        })?;

        match user.role {
            UserRole::Admin => {
                let stats = self.jobs.stats(None, from, to).await?;
                Ok(DashboardStats {
                    active_jobs: stats.active_jobs,
                    in_production: stats.in_production,
                    total_customers: self.customers.count_active().await?,
                    this_month: stats.quoted_in_range,
                })
            }
            UserRole::ProjectManager => {
                let stats = self.jobs.stats(Some(user.id), from, to).await?;
                Ok(DashboardStats {
                    active_jobs: stats.active_jobs,
                    in_production: stats.in_production,
                    total_customers: stats.distinct_customers,
                    ..DashboardStats::default()
                })
            }
            _ => Ok(DashboardStats::default()),
        }
    }
}
