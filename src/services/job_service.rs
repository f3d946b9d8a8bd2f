// src/services/job_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::store::{CustomerStore, JobStore, UserStore},
    models::{
        auth::{User, UserRole, UserSummary},
        customer::CustomerSummary,
        job::{
            CreateJobForm, Job, JobDetail, JobFilter, JobPriority, JobStatus, JobUpdate,
            ListJobsQuery, NewJob, Pagination, QuoteUpload,
        },
    },
    services::{
        job_lifecycle::plan_update,
        notification_service::{DomainEvent, NotificationService},
        quote_storage::QuoteStorage,
        rbac_service::{can_delete_job, can_edit_job, ensure},
    },
};

/// What a purge run removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub jobs: u64,
    pub customers: u64,
}

#[derive(Clone)]
pub struct JobService {
    jobs: Arc<dyn JobStore>,
    customers: Arc<dyn CustomerStore>,
    users: Arc<dyn UserStore>,
    notifications: NotificationService,
    quotes: Arc<dyn QuoteStorage>,
}

impl JobService {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        customers: Arc<dyn CustomerStore>,
        users: Arc<dyn UserStore>,
        notifications: NotificationService,
        quotes: Arc<dyn QuoteStorage>,
    ) -> Self {
        Self {
            jobs,
            customers,
            users,
            notifications,
            quotes,
        }
    }

    // =========================================================================
    //  CREATE
    // =========================================================================

    /// The caller's `canCreateJobs` is checked by the route guard.
    pub async fn create(
        &self,
        actor: &User,
        form: CreateJobForm,
        quote: Option<QuoteUpload>,
    ) -> Result<JobDetail, AppError> {
        form.validate()?;

        let customer_id = form
            .customer_id
            .ok_or_else(|| AppError::BadRequest("Customer is required".into()))?;
        if self.customers.find_by_id(customer_id).await?.is_none() {
            return Err(AppError::NotFound("Customer not found".into()));
        }

        let job_number = form.job_number.trim().to_string();

        // An attachment that cannot be stored never blocks the job itself.
        let quote_pdf_url = match quote {
            Some(upload) if !upload.bytes.is_empty() => {
                match self.quotes.store(&job_number, &upload.bytes).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        warn!("Failed to store quote PDF for job {}: {:#}", job_number, e);
                        None
                    }
                }
            }
            _ => None,
        };

        let job = self
            .jobs
            .create(NewJob {
                job_number,
                job_name: form.job_name.trim().to_string(),
                customer_id,
                priority: form.priority,
                estimator_id: form.estimator_id,
                drafter_id: form.drafter_id,
                project_manager_id: form.project_manager_id,
                created_by: actor.id,
                quoted_amount: form.quoted_amount.unwrap_or(Decimal::ZERO),
                quote_pdf_url,
                notes: form.notes,
                tags: form.tags,
            })
            .await?;

        info!("Job {} created by {}", job.job_number, actor.email);
        self.notifications.dispatch(DomainEvent::JobCreated { job: job.clone() });

        self.detail(job).await
    }

    // =========================================================================
    //  READ
    // =========================================================================

    pub async fn list(
        &self,
        actor: &User,
        query: ListJobsQuery,
    ) -> Result<(Vec<JobDetail>, Pagination), AppError> {
        let include_deleted = query.include_deleted.unwrap_or(false);
        if include_deleted {
            ensure(
                actor.role == UserRole::Admin,
                "Only admins can list deleted jobs",
            )?;
        }

        let limit = query.limit.unwrap_or(50).clamp(1, 200);
        let skip = query.skip.unwrap_or(0).max(0);

        // An unparseable PM id matches nothing rather than failing the request.
        let project_manager_id = match non_empty(query.project_manager_id.as_deref()) {
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => return Ok((vec![], Pagination { total: 0, limit, skip })),
            },
            None => None,
        };

        let filter = JobFilter {
            status: parse_filter(query.status.as_deref(), parse_status)?,
            priority: parse_filter(query.priority.as_deref(), parse_priority)?,
            job_number: non_empty(query.job_number.as_deref()).map(str::to_string),
            project_manager_id,
            include_deleted,
            limit,
            skip,
        };

        let (rows, total) = self.jobs.list(&filter).await?;
        let mut data = Vec::with_capacity(rows.len());
        for job in rows {
            data.push(self.detail(job).await?);
        }

        Ok((data, Pagination { total, limit, skip }))
    }

    pub async fn get(&self, id: Uuid) -> Result<JobDetail, AppError> {
        let job = self.find(id).await?;
        self.detail(job).await
    }

    // =========================================================================
    //  UPDATE / DELETE
    // =========================================================================

    /// Runs the lifecycle rules, persists in one write, then fans out.
    pub async fn update(&self, actor: &User, id: Uuid, update: JobUpdate) -> Result<JobDetail, AppError> {
        let job = self.find(id).await?;
        ensure(
            can_edit_job(actor, &job),
            "You do not have permission to edit this job",
        )?;

        if let Some(customer_id) = update.customer_id {
            if customer_id != job.customer_id && self.customers.find_by_id(customer_id).await?.is_none() {
                return Err(AppError::NotFound("Customer not found".into()));
            }
        }

        let plan = plan_update(&job, &update, Utc::now());
        let admin_changes = plan.admin_changes();

        let updated = self
            .jobs
            .update(id, plan.changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".into()))?;

        info!("Job {} updated by {}", updated.job_number, actor.email);
        self.notifications.dispatch(DomainEvent::JobUpdated {
            actor: actor.into(),
            job: updated.clone(),
            pm: plan.pm,
            changes: plan.changed_fields,
            admin_changes,
        });

        self.detail(updated).await
    }

    pub async fn soft_delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let job = self.find(id).await?;
        ensure(
            can_delete_job(actor, &job),
            "You do not have permission to delete this job",
        )?;

        if !self.jobs.soft_delete(id).await? {
            return Err(AppError::NotFound("Job not found".into()));
        }

        info!("Job {} soft-deleted by {}", job.job_number, actor.email);
        self.notifications.dispatch(DomainEvent::JobDeleted {
            actor: actor.into(),
            job,
        });
        Ok(())
    }

    /// Permanently removes soft-deleted jobs, then soft-deleted customers
    /// nothing refers to any more.
    pub async fn purge_deleted(&self) -> Result<PurgeReport, AppError> {
        let jobs = self.jobs.purge_deleted().await?;
        let customers = self.customers.purge_deleted().await?;
        info!("Purged {} job(s) and {} customer(s)", jobs, customers);
        Ok(PurgeReport { jobs, customers })
    }

    // --- Helpers ---

    async fn find(&self, id: Uuid) -> Result<Job, AppError> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".into()))
    }

    async fn person(&self, id: Option<Uuid>) -> Result<Option<UserSummary>, AppError> {
        match id {
            Some(id) => Ok(self.users.find_by_id(id).await?.as_ref().map(UserSummary::from)),
            None => Ok(None),
        }
    }

    async fn detail(&self, job: Job) -> Result<JobDetail, AppError> {
        let customer = self
            .customers
            .find_by_id(job.customer_id)
            .await?
            .as_ref()
            .map(CustomerSummary::from);

        Ok(JobDetail {
            customer,
            estimator: self.person(job.estimator_id).await?,
            drafter: self.person(job.drafter_id).await?,
            project_manager: self.person(job.project_manager_id).await?,
            creator: self.person(job.created_by).await?,
            job,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `None`, blank and `all` mean "no filter".
fn parse_filter<T>(raw: Option<&str>, parse: fn(&str) -> Option<T>) -> Result<Option<T>, AppError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => parse(v)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown filter value: {v}"))),
    }
}

fn parse_status(raw: &str) -> Option<JobStatus> {
    JobStatus::PIPELINE.into_iter().find(|s| s.as_str() == raw)
}

fn parse_priority(raw: &str) -> Option<JobPriority> {
    match raw.to_ascii_lowercase().as_str() {
        "low" => Some(JobPriority::Low),
        "medium" => Some(JobPriority::Medium),
        "high" => Some(JobPriority::High),
        "urgent" => Some(JobPriority::Urgent),
        _ => None,
    }
}
