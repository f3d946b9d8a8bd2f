// src/services/customer_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::CustomerStore,
    models::{
        auth::User,
        customer::{CreateCustomerPayload, Customer},
    },
    services::notification_service::{DomainEvent, NotificationService},
};

#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerStore>,
    notifications: NotificationService,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerStore>, notifications: NotificationService) -> Self {
        Self {
            customers,
            notifications,
        }
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        self.customers.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Customer, AppError> {
        self.customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".into()))
    }

    pub async fn create(&self, actor: &User, payload: CreateCustomerPayload) -> Result<Customer, AppError> {
        let customer = self.customers.create(payload.into()).await?;
        tracing::info!("Customer {} created by {}", customer.company_name, actor.email);

        self.notifications.dispatch(DomainEvent::CustomerCreated {
            actor: actor.into(),
            customer: customer.clone(),
        });

        Ok(customer)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.customers.soft_delete(id).await? {
            return Err(AppError::NotFound("Customer not found".into()));
        }
        tracing::info!("Customer {} soft-deleted", id);
        Ok(())
    }
}
