// src/db/estimate_repo.rs

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::conflict_on_unique, error::AppError},
    db::store::EstimateStore,
    models::estimate::{Estimate, EstimateDraft, EstimateFilter},
};

const ESTIMATE_COLUMNS: &str = r#"
    id, job_id, version, estimator_id, status, structures, items_to_purchase,
    labor_cost, material_cost, equipment_cost, overhead_cost, profit_margin,
    total_cost, quoted_price, notes, revision_reason, assigned_pm_id, assigned_date,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct EstimateRepository {
    pool: PgPool,
}

impl EstimateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EstimateStore for EstimateRepository {
    async fn create_next_version(&self, draft: EstimateDraft) -> Result<Estimate, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serialises version allocation per job.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1 AND deleted_at IS NULL FOR UPDATE")
                .bind(draft.job_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::NotFound("Job not found".into()));
        }

        let version: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM estimates WHERE job_id = $1",
        )
        .bind(draft.job_id)
        .fetch_one(&mut *tx)
        .await?;

        let estimate = sqlx::query_as::<_, Estimate>(&format!(
            r#"
            INSERT INTO estimates (
                job_id, version, estimator_id, status, structures, items_to_purchase,
                labor_cost, material_cost, equipment_cost, overhead_cost, profit_margin,
                total_cost, quoted_price, notes, assigned_pm_id, assigned_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {ESTIMATE_COLUMNS}
            "#
        ))
        .bind(draft.job_id)
        .bind(version)
        .bind(draft.estimator_id)
        .bind(draft.status)
        .bind(Json(&draft.structures))
        .bind(Json(&draft.items_to_purchase))
        .bind(draft.labor_cost)
        .bind(draft.material_cost)
        .bind(draft.equipment_cost)
        .bind(draft.overhead_cost)
        .bind(draft.profit_margin)
        .bind(draft.total_cost)
        .bind(draft.quoted_price)
        .bind(&draft.notes)
        .bind(draft.assigned_pm_id)
        .bind(draft.assigned_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "Estimate version already exists, retry"))?;

        tx.commit().await?;
        Ok(estimate)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Estimate>, AppError> {
        let estimate = sqlx::query_as::<_, Estimate>(&format!(
            "SELECT {ESTIMATE_COLUMNS} FROM estimates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(estimate)
    }

    async fn list(&self, filter: &EstimateFilter) -> Result<Vec<Estimate>, AppError> {
        let estimates = sqlx::query_as::<_, Estimate>(&format!(
            r#"
            SELECT {ESTIMATE_COLUMNS}
            FROM estimates
            WHERE ($1::uuid IS NULL OR estimator_id = $1)
              AND ($2::uuid IS NULL OR assigned_pm_id = $2)
              AND ($3::uuid IS NULL OR job_id = $3)
              AND ($4::estimate_status IS NULL OR status = $4)
            ORDER BY created_at DESC
            LIMIT 100
            "#
        ))
        .bind(filter.estimator_id)
        .bind(filter.assigned_pm_id)
        .bind(filter.job_id)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(estimates)
    }

    async fn save(&self, estimate: &Estimate) -> Result<Estimate, AppError> {
        let saved = sqlx::query_as::<_, Estimate>(&format!(
            r#"
            UPDATE estimates SET
                status            = $2,
                structures        = $3,
                items_to_purchase = $4,
                labor_cost        = $5,
                material_cost     = $6,
                equipment_cost    = $7,
                overhead_cost     = $8,
                profit_margin     = $9,
                total_cost        = $10,
                quoted_price      = $11,
                notes             = $12,
                revision_reason   = $13,
                assigned_pm_id    = $14,
                assigned_date     = $15,
                updated_at        = NOW()
            WHERE id = $1
            RETURNING {ESTIMATE_COLUMNS}
            "#
        ))
        .bind(estimate.id)
        .bind(estimate.status)
        .bind(&estimate.structures)
        .bind(&estimate.items_to_purchase)
        .bind(estimate.labor_cost)
        .bind(estimate.material_cost)
        .bind(estimate.equipment_cost)
        .bind(estimate.overhead_cost)
        .bind(estimate.profit_margin)
        .bind(estimate.total_cost)
        .bind(estimate.quoted_price)
        .bind(&estimate.notes)
        .bind(&estimate.revision_reason)
        .bind(estimate.assigned_pm_id)
        .bind(estimate.assigned_date)
        .fetch_optional(&self.pool)
        .await?;

        saved.ok_or_else(|| AppError::NotFound("Estimate not found".into()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM estimates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
