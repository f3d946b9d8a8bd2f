// src/services/estimate_service.rs

use std::sync::Arc;

use chrono::Utc;
use sqlx::types::Json;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::store::{EstimateStore, JobStore, UserStore},
    models::{
        auth::{User, UserRole, UserSummary},
        estimate::{
            CreateEstimatePayload, Estimate, EstimateDetail, EstimateDraft, EstimateFilter,
            EstimateJobSummary, EstimateStatus, ListEstimatesQuery, UpdateEstimatePayload,
        },
        job::{Job, JobChanges},
    },
    services::{
        estimate_calculator::{self, CostInputs},
        notification_service::{DomainEvent, NotificationService},
        rbac_service::{can_modify_estimate, ensure},
    },
};

#[derive(Clone)]
pub struct EstimateService {
    estimates: Arc<dyn EstimateStore>,
    jobs: Arc<dyn JobStore>,
    users: Arc<dyn UserStore>,
    notifications: NotificationService,
}

impl EstimateService {
    pub fn new(
        estimates: Arc<dyn EstimateStore>,
        jobs: Arc<dyn JobStore>,
        users: Arc<dyn UserStore>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            estimates,
            jobs,
            users,
            notifications,
        }
    }

    /// Stores the next version of the job's estimate. `canCreateEstimates`
    /// is checked by the route guard.
    pub async fn create(&self, actor: &User, payload: CreateEstimatePayload) -> Result<EstimateDetail, AppError> {
        payload.validate()?;

        let mut structures = payload.structures;
        let mut items = payload.items_to_purchase;
        estimate_calculator::recompute_lines(&mut structures, &mut items)?;
        let totals = estimate_calculator::totals(CostInputs {
            labor: payload.labor_cost,
            material: payload.material_cost,
            equipment: payload.equipment_cost,
            overhead: payload.overhead_cost,
            margin: payload.profit_margin,
        })?;

        let estimate = self
            .estimates
            .create_next_version(EstimateDraft {
                job_id: payload.job_id,
                estimator_id: actor.id,
                status: payload.status,
                structures,
                items_to_purchase: items,
                labor_cost: payload.labor_cost,
                material_cost: payload.material_cost,
                equipment_cost: payload.equipment_cost,
                overhead_cost: payload.overhead_cost,
                profit_margin: payload.profit_margin,
                total_cost: totals.total_cost,
                quoted_price: totals.quoted_price,
                notes: payload.notes,
                assigned_pm_id: payload.assigned_pm_id,
                assigned_date: payload.assigned_pm_id.map(|_| Utc::now()),
            })
            .await?;

        info!(
            "Estimate v{} for job {} created by {}",
            estimate.version, estimate.job_id, actor.email
        );

        let submitted = estimate.status == EstimateStatus::Submitted;
        if submitted || estimate.assigned_pm_id.is_some() {
            let job = self.job_for(&estimate).await?;
            if submitted {
                self.notifications.dispatch(DomainEvent::EstimateSubmitted {
                    actor: actor.into(),
                    job: job.clone(),
                    estimate: estimate.clone(),
                });
            }
            if let Some(pm_id) = estimate.assigned_pm_id {
                self.announce_assignment(actor, job, &estimate, pm_id).await?;
            }
        }

        self.detail(estimate).await
    }

    /// Estimators see their own, project managers what is assigned to them,
    /// everybody else sees all.
    pub async fn list(&self, actor: &User, query: ListEstimatesQuery) -> Result<Vec<EstimateDetail>, AppError> {
        let mut filter = EstimateFilter {
            job_id: query.job_id,
            status: query.status,
            ..EstimateFilter::default()
        };
        match actor.role {
            UserRole::Estimator => filter.estimator_id = Some(actor.id),
            UserRole::ProjectManager => filter.assigned_pm_id = Some(actor.id),
            _ => {}
        }

        let rows = self.estimates.list(&filter).await?;
        let mut out = Vec::with_capacity(rows.len());
        for estimate in rows {
            out.push(self.detail(estimate).await?);
        }
        Ok(out)
    }

    pub async fn get(&self, id: Uuid) -> Result<EstimateDetail, AppError> {
        let estimate = self.find(id).await?;
        self.detail(estimate).await
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateEstimatePayload,
    ) -> Result<EstimateDetail, AppError> {
        payload.validate()?;

        let mut estimate = self.find(id).await?;
        ensure(
            can_modify_estimate(actor, &estimate),
            "You do not have permission to modify this estimate",
        )?;

        let previous_status = estimate.status;
        let previous_pm = estimate.assigned_pm_id;

        if let Some(structures) = payload.structures {
            estimate.structures = Json(structures);
        }
        if let Some(items) = payload.items_to_purchase {
            estimate.items_to_purchase = Json(items);
        }
        if let Some(v) = payload.labor_cost {
            estimate.labor_cost = v;
        }
        if let Some(v) = payload.material_cost {
            estimate.material_cost = v;
        }
        if let Some(v) = payload.equipment_cost {
            estimate.equipment_cost = v;
        }
        if let Some(v) = payload.overhead_cost {
            estimate.overhead_cost = v;
        }
        if let Some(v) = payload.profit_margin {
            estimate.profit_margin = v;
        }
        if payload.notes.is_some() {
            estimate.notes = payload.notes;
        }
        if payload.revision_reason.is_some() {
            estimate.revision_reason = payload.revision_reason;
        }
        if let Some(status) = payload.status {
            estimate.status = status;
        }

        let pm_changed = payload.assigned_pm_id.is_some_and(|pm| Some(pm) != previous_pm);
        if pm_changed {
            estimate.assigned_pm_id = payload.assigned_pm_id;
            estimate.assigned_date = Some(Utc::now());
        }

        estimate_calculator::apply(&mut estimate)?;
        let saved = self.estimates.save(&estimate).await?;
        info!("Estimate {} updated by {}", saved.id, actor.email);

        let submitted_now =
            saved.status == EstimateStatus::Submitted && previous_status != EstimateStatus::Submitted;
        if submitted_now || pm_changed {
            let job = self.job_for(&saved).await?;
            if submitted_now {
                self.notifications.dispatch(DomainEvent::EstimateSubmitted {
                    actor: actor.into(),
                    job: job.clone(),
                    estimate: saved.clone(),
                });
            }
            if let (true, Some(pm_id)) = (pm_changed, saved.assigned_pm_id) {
                self.announce_assignment(actor, job, &saved, pm_id).await?;
            }
        }

        self.detail(saved).await
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let estimate = self.find(id).await?;
        ensure(
            can_modify_estimate(actor, &estimate),
            "You do not have permission to delete this estimate",
        )?;
        if !self.estimates.delete(id).await? {
            return Err(AppError::NotFound("Estimate not found".into()));
        }
        info!("Estimate {} deleted by {}", id, actor.email);
        Ok(())
    }

    // --- Helpers ---

    async fn find(&self, id: Uuid) -> Result<Estimate, AppError> {
        self.estimates
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Estimate not found".into()))
    }

    async fn job_for(&self, estimate: &Estimate) -> Result<Job, AppError> {
        self.jobs
            .find_by_id(estimate.job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".into()))
    }

    /// Gives the job a PM if it has none, then tells the PM and the admins.
    async fn announce_assignment(
        &self,
        actor: &User,
        mut job: Job,
        estimate: &Estimate,
        pm_id: Uuid,
    ) -> Result<(), AppError> {
        let Some(pm) = self.users.find_by_id(pm_id).await? else {
            warn!("Estimate {} assigned to unknown user {}", estimate.id, pm_id);
            return Ok(());
        };

        if job.project_manager_id.is_none() {
            let changes = JobChanges {
                project_manager_id: Some(pm.id),
                ..JobChanges::default()
            };
            if let Some(updated) = self.jobs.update(job.id, changes).await? {
                job = updated;
            }
        }

        self.notifications.dispatch(DomainEvent::EstimateAssigned {
            actor: actor.into(),
            job,
            estimate: estimate.clone(),
            pm,
        });
        Ok(())
    }

    async fn summary(&self, id: Option<Uuid>) -> Result<Option<UserSummary>, AppError> {
        match id {
            Some(id) => Ok(self.users.find_by_id(id).await?.as_ref().map(UserSummary::from)),
            None => Ok(None),
        }
    }

    async fn detail(&self, estimate: Estimate) -> Result<EstimateDetail, AppError> {
        let job = self.jobs.find_by_id(estimate.job_id).await?.map(|j| EstimateJobSummary {
            id: j.id,
            job_number: j.job_number,
            job_name: j.job_name,
            status: j.status,
            customer_id: j.customer_id,
        });

        Ok(EstimateDetail {
            job,
            estimator: self.summary(Some(estimate.estimator_id)).await?,
            assigned_pm: self.summary(estimate.assigned_pm_id).await?,
            estimate,
        })
    }
}
