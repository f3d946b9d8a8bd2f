// src/services/notification_service.rs
//
// Fan-out of domain events into per-user notifications. Planning is pure;
// delivery runs on a spawned task and never reports failure to the caller.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{NotificationStore, UserStore},
    models::{
        auth::{User, UserRole},
        customer::Customer,
        estimate::Estimate,
        job::Job,
        notification::{NewNotification, Notification, NotificationType},
    },
    services::job_lifecycle::{join_changes, PmAssignment},
};

/// Who performed the mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DomainEvent {
    CustomerCreated {
        actor: Actor,
        customer: Customer,
    },
    JobCreated {
        job: Job,
    },
    JobUpdated {
        actor: Actor,
        job: Job,
        pm: PmAssignment,
        changes: Vec<&'static str>,
        admin_changes: Vec<&'static str>,
    },
    JobDeleted {
        actor: Actor,
        job: Job,
    },
    EstimateSubmitted {
        actor: Actor,
        job: Job,
        estimate: Estimate,
    },
    EstimateAssigned {
        actor: Actor,
        job: Job,
        estimate: Estimate,
        pm: User,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    User(Uuid),
    /// Every active user holding the role, resolved at delivery time.
    ActiveRole(UserRole),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub audience: Audience,
    pub kind: NotificationType,
    pub title: &'static str,
    pub message: String,
    pub job_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub estimate_id: Option<Uuid>,
}

impl Delivery {
    fn for_job(audience: Audience, kind: NotificationType, title: &'static str, message: String, job: &Job) -> Self {
        Self {
            audience,
            kind,
            title,
            message,
            job_id: Some(job.id),
            customer_id: None,
            estimate_id: None,
        }
    }

    fn with_estimate(mut self, estimate: &Estimate) -> Self {
        self.estimate_id = Some(estimate.id);
        self
    }

    fn to_user(&self, user_id: Uuid) -> NewNotification {
        NewNotification {
            user_id,
            notification_type: self.kind,
            title: self.title.to_string(),
            message: self.message.clone(),
            job_id: self.job_id,
            customer_id: self.customer_id,
            estimate_id: self.estimate_id,
        }
    }
}

fn price(value: Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

fn assigned_message(job: &Job) -> String {
    format!(
        "You have been assigned to job \"{}\" ({})",
        job.job_name, job.job_number
    )
}

// =============================================================================
//  PLANNING
// =============================================================================

/// Maps one event to the notifications it should produce.
pub fn plan(event: &DomainEvent) -> Vec<Delivery> {
    use NotificationType::*;

    let mut out = Vec::new();

    match event {
        DomainEvent::CustomerCreated { actor, customer } => {
            if actor.role == UserRole::ProjectManager {
                out.push(Delivery {
                    audience: Audience::ActiveRole(UserRole::Admin),
                    kind: CustomerCreated,
                    title: "New Customer Added",
                    message: format!(
                        "{} (Project Manager) added a new customer: \"{}\"",
                        actor.name, customer.company_name
                    ),
                    job_id: None,
                    customer_id: Some(customer.id),
                    estimate_id: None,
                });
            }
        }

        DomainEvent::JobCreated { job } => {
            if let Some(pm) = job.project_manager_id {
                out.push(Delivery::for_job(
                    Audience::User(pm),
                    JobAssigned,
                    "New Job Assigned",
                    assigned_message(job),
                    job,
                ));
            }
        }

        DomainEvent::JobUpdated {
            actor,
            job,
            pm,
            changes,
            admin_changes,
        } => {
            match *pm {
                PmAssignment::NewlyAssigned(to) | PmAssignment::Reassigned { to, .. } => {
                    out.push(Delivery::for_job(
                        Audience::User(to),
                        JobAssigned,
                        "New Job Assigned",
                        assigned_message(job),
                        job,
                    ));
                }
                PmAssignment::Unchanged(Some(current)) if !changes.is_empty() => {
                    out.push(Delivery::for_job(
                        Audience::User(current),
                        JobUpdated,
                        "Job Updated",
                        format!(
                            "Job \"{}\" ({}) has been updated. Changes: {}",
                            job.job_name,
                            job.job_number,
                            join_changes(changes)
                        ),
                        job,
                    ));
                }
                PmAssignment::Unchanged(_) => {}
            }

            if actor.role != UserRole::Admin && !admin_changes.is_empty() {
                out.push(Delivery::for_job(
                    Audience::ActiveRole(UserRole::Admin),
                    JobUpdated,
                    "Job Updated",
                    format!(
                        "{} ({}) updated job \"{}\" ({}). Changes: {}",
                        actor.name,
                        actor.role,
                        job.job_name,
                        job.job_number,
                        join_changes(admin_changes)
                    ),
                    job,
                ));
            }
        }

        DomainEvent::JobDeleted { actor, job } => {
            if let Some(pm) = job.project_manager_id {
                out.push(Delivery::for_job(
                    Audience::User(pm),
                    JobDeleted,
                    "Job Deleted",
                    format!(
                        "Job \"{}\" ({}) has been deleted by {} ({})",
                        job.job_name, job.job_number, actor.name, actor.role
                    ),
                    job,
                ));
            }
            if actor.role != UserRole::Admin {
                out.push(Delivery::for_job(
                    Audience::ActiveRole(UserRole::Admin),
                    JobDeleted,
                    "Job Deleted",
                    format!(
                        "{} ({}) deleted job \"{}\" ({})",
                        actor.name, actor.role, job.job_name, job.job_number
                    ),
                    job,
                ));
            }
        }

        DomainEvent::EstimateSubmitted {
            actor,
            job,
            estimate,
        } => {
            let message = format!(
                "{} submitted a quote for job \"{}\" ({}). Quoted price: {}",
                actor.name,
                job.job_name,
                job.job_number,
                price(estimate.quoted_price)
            );
            out.push(
                Delivery::for_job(
                    Audience::ActiveRole(UserRole::Admin),
                    QuoteCreated,
                    "New Quote Submitted",
                    message.clone(),
                    job,
                )
                .with_estimate(estimate),
            );
            out.push(
                Delivery::for_job(
                    Audience::ActiveRole(UserRole::ProjectManager),
                    QuoteCreated,
                    "New Quote Available",
                    message,
                    job,
                )
                .with_estimate(estimate),
            );
        }

        DomainEvent::EstimateAssigned {
            actor,
            job,
            estimate,
            pm,
        } => {
            out.push(
                Delivery::for_job(
                    Audience::User(pm.id),
                    QuoteAssigned,
                    "Quote Assigned to You",
                    format!(
                        "{} assigned you a quote for job \"{}\" ({}). Quoted price: {}",
                        actor.name,
                        job.job_name,
                        job.job_number,
                        price(estimate.quoted_price)
                    ),
                    job,
                )
                .with_estimate(estimate),
            );
            out.push(
                Delivery::for_job(
                    Audience::ActiveRole(UserRole::Admin),
                    QuoteAssigned,
                    "Quote Assigned to PM",
                    format!(
                        "{} assigned a quote to {} for job \"{}\" ({})",
                        actor.name, pm.name, job.job_name, job.job_number
                    ),
                    job,
                )
                .with_estimate(estimate),
            );
        }
    }

    out
}

// =============================================================================
//  DELIVERY
// =============================================================================

#[derive(Clone)]
pub struct NotificationService {
    users: Arc<dyn UserStore>,
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(users: Arc<dyn UserStore>, store: Arc<dyn NotificationStore>) -> Self {
        Self { users, store }
    }

    /// Hands the event to a background task and returns immediately.
    pub fn dispatch(&self, event: DomainEvent) -> JoinHandle<usize> {
        let service = self.clone();
        tokio::spawn(async move { service.deliver(event).await })
    }

    /// Writes the notifications for `event`. Failures are logged and skipped;
    /// returns how many notifications were stored.
    pub async fn deliver(&self, event: DomainEvent) -> usize {
        let mut created = 0;

        for delivery in plan(&event) {
            let recipients = match self.resolve(delivery.audience).await {
                Ok(r) => r,
                Err(e) => {
                    error!("Failed to resolve recipients for {:?}: {}", delivery.audience, e);
                    continue;
                }
            };

            for user_id in recipients {
                match self.store.create(delivery.to_user(user_id)).await {
                    Ok(_) => created += 1,
                    Err(e) => error!(
                        "Failed to create {:?} notification for user {}: {}",
                        delivery.kind, user_id, e
                    ),
                }
            }
        }

        if created > 0 {
            info!("Created {} notification(s)", created);
        }
        created
    }

    async fn resolve(&self, audience: Audience) -> Result<Vec<Uuid>, AppError> {
        match audience {
            Audience::User(id) => match self.users.find_by_id(id).await? {
                Some(user) => Ok(vec![user.id]),
                None => {
                    warn!("Skipping notification for unknown user {}", id);
                    Ok(vec![])
                }
            },
            Audience::ActiveRole(role) => Ok(self
                .users
                .list_active(Some(role))
                .await?
                .into_iter()
                .map(|u| u.id)
                .collect()),
        }
    }

    // --- Inbox ---

    /// Latest 50 notifications plus the unread count.
    pub async fn inbox(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<(Vec<Notification>, i64), AppError> {
        let rows = self.store.list_for_user(user_id, unread_only, 50).await?;
        let unread = self.store.count_unread(user_id).await?;
        Ok((rows, unread))
    }

    pub async fn set_read(&self, id: Uuid, user_id: Uuid, read: bool) -> Result<Notification, AppError> {
        self.store
            .set_read(id, user_id, read)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".into()))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.store.mark_all_read(user_id).await
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if self.store.delete(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Notification not found".into()))
        }
    }

    pub async fn clear_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.store.delete_read(user_id).await
    }
}
