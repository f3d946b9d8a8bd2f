// src/db/memory.rs
//
// In-memory stores used by the test suite. One mutex guards all tables, which
// also makes version allocation and uniqueness checks atomic.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{CustomerStore, EstimateStore, JobStore, NotificationStore, Stores, UserStore},
    models::{
        auth::{NewUser, User, UserChanges, UserRole},
        customer::{Customer, NewCustomer},
        estimate::{Estimate, EstimateDraft, EstimateFilter},
        job::{Job, JobChanges, JobFilter, JobStats, JobStatus, NewJob},
        notification::{NewNotification, Notification},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    customers: Vec<Customer>,
    jobs: Vec<Job>,
    estimates: Vec<Estimate>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_notifications: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stores(self: &Arc<Self>) -> Stores {
        Stores {
            users: self.clone(),
            customers: self.clone(),
            jobs: self.clone(),
            estimates: self.clone(),
            notifications: self.clone(),
        }
    }

    /// Makes every notification insert fail, to exercise the best-effort path.
    pub fn fail_notifications(&self, fail: bool) {
        self.fail_notifications.store(fail, Ordering::SeqCst);
    }

    pub async fn all_jobs(&self) -> Vec<Job> {
        self.tables.lock().await.jobs.clone()
    }

    pub async fn all_estimates(&self) -> Vec<Estimate> {
        self.tables.lock().await.estimates.clone()
    }

    pub async fn all_notifications(&self) -> Vec<Notification> {
        self.tables.lock().await.notifications.clone()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let t = self.tables.lock().await;
        let email = email.trim().to_lowercase();
        Ok(t.users.iter().find(|u| u.email.to_lowercase() == email).cloned())
    }

    async fn list_active(&self, role: Option<UserRole>) -> Result<Vec<User>, AppError> {
        let t = self.tables.lock().await;
        let mut users: Vec<User> = t
            .users
            .iter()
            .filter(|u| u.is_active && role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut t = self.tables.lock().await;
        let email = new_user.email.to_lowercase();
        if t.users.iter().any(|u| u.email.to_lowercase() == email) {
            return Err(AppError::Conflict("User with this email already exists".into()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            is_active: new_user.is_active,
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut t = self.tables.lock().await;
        if let Some(email) = &changes.email {
            let email = email.to_lowercase();
            if t.users.iter().any(|u| u.id != id && u.email.to_lowercase() == email) {
                return Err(AppError::Conflict("User with this email already exists".into()));
            }
        }
        let Some(user) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(active) = changes.is_active {
            user.is_active = active;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn create(&self, c: NewCustomer) -> Result<Customer, AppError> {
        let mut t = self.tables.lock().await;
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            company_name: c.company_name,
            name: c.name,
            email: c.email,
            phone: c.phone,
            address: c.address.map(Json),
            notes: c.notes,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        t.customers.push(customer.clone());
        Ok(customer)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.customers.iter().find(|c| c.id == id && !c.is_deleted()).cloned())
    }

    async fn list(&self) -> Result<Vec<Customer>, AppError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Customer> =
            t.customers.iter().filter(|c| !c.is_deleted()).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count_active(&self) -> Result<i64, AppError> {
        let t = self.tables.lock().await;
        Ok(t.customers.iter().filter(|c| !c.is_deleted()).count() as i64)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut t = self.tables.lock().await;
        match t.customers.iter_mut().find(|c| c.id == id && !c.is_deleted()) {
            Some(c) => {
                c.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_deleted(&self) -> Result<u64, AppError> {
        let mut t = self.tables.lock().await;
        let referenced: HashSet<Uuid> = t.jobs.iter().map(|j| j.customer_id).collect();
        let before = t.customers.len();
        t.customers
            .retain(|c| !c.is_deleted() || referenced.contains(&c.id));
        Ok((before - t.customers.len()) as u64)
    }
}

fn job_matches(job: &Job, f: &JobFilter) -> bool {
    (f.include_deleted || !job.is_deleted())
        && f.status.is_none_or(|s| job.status == s)
        && f.priority.is_none_or(|p| job.priority == p)
        && f.job_number.as_ref().is_none_or(|n| &job.job_number == n)
        && f.project_manager_id.is_none_or(|pm| job.project_manager_id == Some(pm))
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create(&self, j: NewJob) -> Result<Job, AppError> {
        let mut t = self.tables.lock().await;
        if t
            .jobs
            .iter()
            .any(|x| !x.is_deleted() && x.job_number == j.job_number)
        {
            return Err(AppError::Conflict("Job number already exists".into()));
        }
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            job_number: j.job_number,
            job_name: j.job_name,
            customer_id: j.customer_id,
            status: JobStatus::Estimation,
            current_phase: JobStatus::Estimation.phase(),
            priority: j.priority,
            estimator_id: j.estimator_id,
            drafter_id: j.drafter_id,
            project_manager_id: j.project_manager_id,
            created_by: Some(j.created_by),
            created_date: now,
            estimate_date: None,
            estimate_due_date: None,
            draft_start_date: None,
            draft_completion_date: None,
            submission_date: None,
            acceptance_date: None,
            production_start_date: None,
            delivery_date: None,
            quoted_amount: j.quoted_amount,
            quote_pdf_url: j.quote_pdf_url,
            notes: j.notes,
            tags: j.tags,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        t.jobs.push(job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.jobs.iter().find(|j| j.id == id && !j.is_deleted()).cloned())
    }

    async fn list(&self, filter: &JobFilter) -> Result<(Vec<Job>, i64), AppError> {
        let t = self.tables.lock().await;
        let mut matching: Vec<Job> =
            t.jobs.iter().filter(|j| job_matches(j, filter)).cloned().collect();
        matching.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, id: Uuid, c: JobChanges) -> Result<Option<Job>, AppError> {
        let mut t = self.tables.lock().await;
        let Some(job) = t.jobs.iter_mut().find(|j| j.id == id && !j.is_deleted()) else {
            return Ok(None);
        };
        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $( if let Some(v) = c.$field { job.$field = v; } )*
            };
        }
        macro_rules! apply_opt {
            ($($field:ident),* $(,)?) => {
                $( if let Some(v) = c.$field { job.$field = Some(v); } )*
            };
        }
        apply!(job_name, customer_id, status, current_phase, priority, quoted_amount, tags);
        apply_opt!(
            estimator_id,
            drafter_id,
            project_manager_id,
            estimate_date,
            estimate_due_date,
            draft_start_date,
            production_start_date,
            delivery_date,
            notes,
        );
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut t = self.tables.lock().await;
        match t.jobs.iter_mut().find(|j| j.id == id && !j.is_deleted()) {
            Some(j) => {
                j.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_deleted(&self) -> Result<u64, AppError> {
        let mut t = self.tables.lock().await;
        let purged: HashSet<Uuid> =
            t.jobs.iter().filter(|j| j.is_deleted()).map(|j| j.id).collect();
        t.jobs.retain(|j| !purged.contains(&j.id));
        t.estimates.retain(|e| !purged.contains(&e.job_id));
        Ok(purged.len() as u64)
    }

    async fn stats(
        &self,
        project_manager_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<JobStats, AppError> {
        let t = self.tables.lock().await;
        let live: Vec<&Job> = t
            .jobs
            .iter()
            .filter(|j| !j.is_deleted())
            .filter(|j| project_manager_id.is_none_or(|pm| j.project_manager_id == Some(pm)))
            .collect();
        Ok(JobStats {
            active_jobs: live.iter().filter(|j| j.status != JobStatus::Delivered).count() as i64,
            in_production: live
                .iter()
                .filter(|j| j.status == JobStatus::InProduction)
                .count() as i64,
            distinct_customers: live
                .iter()
                .map(|j| j.customer_id)
                .collect::<HashSet<_>>()
                .len() as i64,
            quoted_in_range: live
                .iter()
                .filter(|j| j.created_date >= from && j.created_date < to)
                .map(|j| j.quoted_amount)
                .sum::<Decimal>(),
        })
    }
}

#[async_trait]
impl EstimateStore for MemoryStore {
    async fn create_next_version(&self, d: EstimateDraft) -> Result<Estimate, AppError> {
        let mut t = self.tables.lock().await;
        if !t.jobs.iter().any(|j| j.id == d.job_id && !j.is_deleted()) {
            return Err(AppError::NotFound("Job not found".into()));
        }
        let version = t
            .estimates
            .iter()
            .filter(|e| e.job_id == d.job_id)
            .map(|e| e.version)
            .max()
            .unwrap_or(0)
            + 1;
        let now = Utc::now();
        let estimate = Estimate {
            id: Uuid::new_v4(),
            job_id: d.job_id,
            version,
            estimator_id: d.estimator_id,
            status: d.status,
            structures: Json(d.structures),
            items_to_purchase: Json(d.items_to_purchase),
            labor_cost: d.labor_cost,
            material_cost: d.material_cost,
            equipment_cost: d.equipment_cost,
            overhead_cost: d.overhead_cost,
            profit_margin: d.profit_margin,
            total_cost: d.total_cost,
            quoted_price: d.quoted_price,
            notes: d.notes,
            revision_reason: None,
            assigned_pm_id: d.assigned_pm_id,
            assigned_date: d.assigned_date,
            created_at: now,
            updated_at: now,
        };
        t.estimates.push(estimate.clone());
        Ok(estimate)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Estimate>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.estimates.iter().find(|e| e.id == id).cloned())
    }

    async fn list(&self, f: &EstimateFilter) -> Result<Vec<Estimate>, AppError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Estimate> = t
            .estimates
            .iter()
            .filter(|e| f.estimator_id.is_none_or(|id| e.estimator_id == id))
            .filter(|e| f.assigned_pm_id.is_none_or(|id| e.assigned_pm_id == Some(id)))
            .filter(|e| f.job_id.is_none_or(|id| e.job_id == id))
            .filter(|e| f.status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(100);
        Ok(rows)
    }

    async fn save(&self, estimate: &Estimate) -> Result<Estimate, AppError> {
        let mut t = self.tables.lock().await;
        let slot = t
            .estimates
            .iter_mut()
            .find(|e| e.id == estimate.id)
            .ok_or_else(|| AppError::NotFound("Estimate not found".into()))?;
        let mut saved = estimate.clone();
        saved.updated_at = Utc::now();
        *slot = saved.clone();
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut t = self.tables.lock().await;
        let before = t.estimates.len();
        t.estimates.retain(|e| e.id != id);
        Ok(t.estimates.len() < before)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, n: NewNotification) -> Result<Notification, AppError> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "notification store unavailable"
            )));
        }
        let mut t = self.tables.lock().await;
        let row = Notification {
            id: Uuid::new_v4(),
            user_id: n.user_id,
            notification_type: n.notification_type,
            title: n.title,
            message: n.message,
            job_id: n.job_id,
            customer_id: n.customer_id,
            estimate_id: n.estimate_id,
            read: false,
            created_at: Utc::now(),
        };
        t.notifications.push(row.clone());
        Ok(row)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, AppError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Notification> = t
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn count_unread(&self, user_id: Uuid) -> Result<i64, AppError> {
        let t = self.tables.lock().await;
        Ok(t.notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }

    async fn set_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        read: bool,
    ) -> Result<Option<Notification>, AppError> {
        let mut t = self.tables.lock().await;
        Ok(t.notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.read = read;
                n.clone()
            }))
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut t = self.tables.lock().await;
        let mut count = 0;
        for n in t.notifications.iter_mut().filter(|n| n.user_id == user_id && !n.read) {
            n.read = true;
            count += 1;
        }
        Ok(count)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut t = self.tables.lock().await;
        let before = t.notifications.len();
        t.notifications.retain(|n| !(n.id == id && n.user_id == user_id));
        Ok(t.notifications.len() < before)
    }

    async fn delete_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut t = self.tables.lock().await;
        let before = t.notifications.len();
        t.notifications.retain(|n| !(n.user_id == user_id && n.read));
        Ok((before - t.notifications.len()) as u64)
    }
}
