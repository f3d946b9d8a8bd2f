// src/db/job_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::conflict_on_unique, error::AppError},
    db::store::JobStore,
    models::job::{Job, JobChanges, JobFilter, JobStats, NewJob},
};

const JOB_COLUMNS: &str = r#"
    id, job_number, job_name, customer_id, status, current_phase, priority,
    estimator_id, drafter_id, project_manager_id, created_by,
    created_date, estimate_date, estimate_due_date, draft_start_date, draft_completion_date,
    submission_date, acceptance_date, production_start_date, delivery_date,
    quoted_amount, quote_pdf_url, notes, tags, deleted_at, created_at, updated_at
"#;

const DUPLICATE_NUMBER: &str = "Job number already exists";

#[derive(Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for JobRepository {
    async fn create(&self, new_job: NewJob) -> Result<Job, AppError> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (
                job_number, job_name, customer_id, priority,
                estimator_id, drafter_id, project_manager_id, created_by,
                quoted_amount, quote_pdf_url, notes, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(&new_job.job_number)
        .bind(&new_job.job_name)
        .bind(new_job.customer_id)
        .bind(new_job.priority)
        .bind(new_job.estimator_id)
        .bind(new_job.drafter_id)
        .bind(new_job.project_manager_id)
        .bind(new_job.created_by)
        .bind(new_job.quoted_amount)
        .bind(&new_job.quote_pdf_url)
        .bind(&new_job.notes)
        .bind(&new_job.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_NUMBER))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn list(&self, filter: &JobFilter) -> Result<(Vec<Job>, i64), AppError> {
        const WHERE: &str = r#"
            WHERE ($1 OR deleted_at IS NULL)
              AND ($2::job_status IS NULL OR status = $2)
              AND ($3::job_priority IS NULL OR priority = $3)
              AND ($4::text IS NULL OR job_number = $4)
              AND ($5::uuid IS NULL OR project_manager_id = $5)
        "#;

        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs {WHERE} ORDER BY created_date DESC LIMIT $6 OFFSET $7"
        ))
        .bind(filter.include_deleted)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(&filter.job_number)
        .bind(filter.project_manager_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM jobs {WHERE}"))
            .bind(filter.include_deleted)
            .bind(filter.status)
            .bind(filter.priority)
            .bind(&filter.job_number)
            .bind(filter.project_manager_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((jobs, total))
    }

    async fn update(&self, id: Uuid, changes: JobChanges) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs SET
                job_name              = COALESCE($2, job_name),
                customer_id           = COALESCE($3, customer_id),
                status                = COALESCE($4, status),
                current_phase         = COALESCE($5, current_phase),
                priority              = COALESCE($6, priority),
                estimator_id          = COALESCE($7, estimator_id),
                drafter_id            = COALESCE($8, drafter_id),
                project_manager_id    = COALESCE($9, project_manager_id),
                estimate_date         = COALESCE($10, estimate_date),
                estimate_due_date     = COALESCE($11, estimate_due_date),
                draft_start_date      = COALESCE($12, draft_start_date),
                production_start_date = COALESCE($13, production_start_date),
                delivery_date         = COALESCE($14, delivery_date),
                quoted_amount         = COALESCE($15, quoted_amount),
                notes                 = COALESCE($16, notes),
                tags                  = COALESCE($17, tags),
                updated_at            = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.job_name)
        .bind(changes.customer_id)
        .bind(changes.status)
        .bind(changes.current_phase)
        .bind(changes.priority)
        .bind(changes.estimator_id)
        .bind(changes.drafter_id)
        .bind(changes.project_manager_id)
        .bind(changes.estimate_date)
        .bind(changes.estimate_due_date)
        .bind(changes.draft_start_date)
        .bind(changes.production_start_date)
        .bind(changes.delivery_date)
        .bind(changes.quoted_amount)
        .bind(changes.notes)
        .bind(changes.tags)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_deleted(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE deleted_at IS NOT NULL")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn stats(
        &self,
        project_manager_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<JobStats, AppError> {
        let (active_jobs, in_production, distinct_customers, quoted_in_range) =
            sqlx::query_as::<_, (i64, i64, i64, Decimal)>(
                r#"
                SELECT
                    COUNT(*) FILTER (WHERE status <> 'Delivered'),
                    COUNT(*) FILTER (WHERE status = 'In Production'),
                    COUNT(DISTINCT customer_id),
                    COALESCE(SUM(quoted_amount) FILTER (WHERE created_date >= $2 AND created_date < $3), 0)
                FROM jobs
                WHERE deleted_at IS NULL
                  AND ($1::uuid IS NULL OR project_manager_id = $1)
                "#,
            )
            .bind(project_manager_id)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await?;

        Ok(JobStats {
            active_jobs,
            in_production,
            distinct_customers,
            quoted_in_range,
        })
    }
}
