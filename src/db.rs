// src/db.rs

pub mod customer_repo;
pub mod estimate_repo;
pub mod job_repo;
#[cfg(test)]
pub mod memory;
pub mod notification_repo;
pub mod store;
pub mod user_repo;

use std::sync::Arc;

use sqlx::PgPool;

pub use customer_repo::CustomerRepository;
pub use estimate_repo::EstimateRepository;
pub use job_repo::JobRepository;
pub use notification_repo::NotificationRepository;
pub use store::Stores;
pub use user_repo::UserRepository;

impl Stores {
    /// Wires every store to the same Postgres pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            customers: Arc::new(CustomerRepository::new(pool.clone())),
            jobs: Arc::new(JobRepository::new(pool.clone())),
            estimates: Arc::new(EstimateRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool)),
        }
    }
}
