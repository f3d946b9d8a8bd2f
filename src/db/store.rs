// src/db/store.rs
//
// Storage seams. The services only ever see these traits; the Postgres
// repositories implement them in production and an in-memory store backs tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{NewUser, User, UserChanges, UserRole},
        customer::{Customer, NewCustomer},
        estimate::{Estimate, EstimateDraft, EstimateFilter},
        job::{Job, JobChanges, JobFilter, JobStats, NewJob},
        notification::{NewNotification, Notification},
    },
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Active users, optionally of a single role, ordered by name.
    async fn list_active(&self, role: Option<UserRole>) -> Result<Vec<User>, AppError>;
    /// `Conflict` when the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn create(&self, new_customer: NewCustomer) -> Result<Customer, AppError>;
    /// Soft-deleted customers are invisible here.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError>;
    /// Live customers, newest first.
    async fn list(&self) -> Result<Vec<Customer>, AppError>;
    async fn count_active(&self) -> Result<i64, AppError>;
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError>;
    /// Removes soft-deleted customers no job refers to any more.
    async fn purge_deleted(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// `Conflict` when a live job already uses the number.
    async fn create(&self, new_job: NewJob) -> Result<Job, AppError>;
    /// Soft-deleted jobs are invisible here.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, AppError>;
    /// One page of jobs, newest first, plus the total matching count.
    async fn list(&self, filter: &JobFilter) -> Result<(Vec<Job>, i64), AppError>;
    /// Applies the changes in one write and returns the stored row.
    async fn update(&self, id: Uuid, changes: JobChanges) -> Result<Option<Job>, AppError>;
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError>;
    /// Permanently removes soft-deleted jobs.
    async fn purge_deleted(&self) -> Result<u64, AppError>;
    /// Counts over live jobs, optionally restricted to one project manager.
    /// `quoted_in_range` sums jobs created in `[from, to)`.
    async fn stats(
        &self,
        project_manager_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<JobStats, AppError>;
}

#[async_trait]
pub trait EstimateStore: Send + Sync {
    /// Inserts the draft as version `max(existing) + 1` of its job, atomically.
    async fn create_next_version(&self, draft: EstimateDraft) -> Result<Estimate, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Estimate>, AppError>;
    /// Newest first, at most 100.
    async fn list(&self, filter: &EstimateFilter) -> Result<Vec<Estimate>, AppError>;
    /// Writes back every mutable column of `estimate`.
    async fn save(&self, estimate: &Estimate) -> Result<Estimate, AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification, AppError>;
    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, AppError>;
    async fn count_unread(&self, user_id: Uuid) -> Result<i64, AppError>;
    /// Only touches the row when it belongs to `user_id`.
    async fn set_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        read: bool,
    ) -> Result<Option<Notification>, AppError>;
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
    async fn delete_read(&self, user_id: Uuid) -> Result<u64, AppError>;
}

/// Every store the services need, behind shared handles.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub jobs: Arc<dyn JobStore>,
    pub estimates: Arc<dyn EstimateStore>,
    pub notifications: Arc<dyn NotificationStore>,
}
