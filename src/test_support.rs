// src/test_support.rs
//
// Fixtures shared by the unit and router tests. Everything runs against the
// in-memory stores.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    config::AppState,
    db::{
        memory::MemoryStore,
        store::{CustomerStore, JobStore, UserStore},
    },
    models::{
        auth::{NewUser, User, UserChanges, UserRole},
        customer::{Customer, NewCustomer},
        estimate::{Estimate, EstimateStatus},
        job::{Job, JobPhase, JobPriority, JobStatus, NewJob},
        notification::Notification,
    },
    services::{
        auth::hash_password,
        quote_storage::{LocalQuoteStorage, QuoteStorage},
    },
};

const JWT_SECRET: &str = "test-secret";

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    /// admin@lindsay.com / Admin123
    pub admin: User,
    pub pm: User,
    pub estimator: User,
    pub drafter: User,
    /// viewer@lindsay.com / Viewer123
    pub viewer: User,
    pub default_customer: Customer,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("precast-quotes-{}", Uuid::new_v4()));
        Self::with_quote_storage(Arc::new(LocalQuoteStorage::new(dir))).await
    }

    pub async fn with_quote_storage(quote_storage: Arc<dyn QuoteStorage>) -> Self {
        let store = MemoryStore::new();
        let state = AppState::from_stores(
            store.stores(),
            JWT_SECRET.to_string(),
            chrono::Duration::days(30),
            quote_storage,
        );

        let admin = insert_user(&store, "Ada Admin", "admin@lindsay.com", "Admin123", UserRole::Admin).await;
        let pm = insert_user(&store, "Mike Manager", "pm@lindsay.com", "Manager123", UserRole::ProjectManager).await;
        let estimator = insert_user(&store, "Eve Estimator", "estimator@lindsay.com", "Estimate123", UserRole::Estimator).await;
        let drafter = insert_user(&store, "Dee Drafter", "drafter@lindsay.com", "Drafter123", UserRole::Drafter).await;
        let viewer = insert_user(&store, "Val Viewer", "viewer@lindsay.com", "Viewer123", UserRole::Viewer).await;

        let default_customer = CustomerStore::create(
            &*store,
            NewCustomer {
                company_name: "City of Lindsay".into(),
                name: None,
                email: None,
                phone: None,
                address: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        Self {
            state,
            store,
            admin,
            pm,
            estimator,
            drafter,
            viewer,
            default_customer,
        }
    }

    pub fn router(&self) -> Router {
        crate::routes::router(self.state.clone())
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state.auth_service.create_token(user).unwrap()
    }

    pub async fn add_user(&self, name: &str, email: &str, role: UserRole) -> User {
        insert_user(&self.store, name, email, "Passw0rd1", role).await
    }

    pub async fn deactivate(&self, id: Uuid) {
        let changes = UserChanges {
            is_active: Some(false),
            ..UserChanges::default()
        };
        UserStore::update(&*self.store, id, changes).await.unwrap();
    }

    /// A customer written straight to the store, without notifications.
    pub async fn customer(&self, company: &str) -> Customer {
        CustomerStore::create(
            &*self.store,
            NewCustomer {
                company_name: company.into(),
                name: None,
                email: None,
                phone: None,
                address: None,
                notes: None,
            },
        )
        .await
        .unwrap()
    }

    /// A job for the default customer quoted at 1000, written straight to the store.
    pub async fn insert_job(&self, number: &str, name: &str, created_by: Uuid, pm: Option<Uuid>) -> Job {
        JobStore::create(
            &*self.store,
            NewJob {
                job_number: number.into(),
                job_name: name.into(),
                customer_id: self.default_customer.id,
                priority: JobPriority::Low,
                estimator_id: None,
                drafter_id: None,
                project_manager_id: pm,
                created_by,
                quoted_amount: Decimal::from(1000),
                quote_pdf_url: None,
                notes: None,
                tags: vec![],
            },
        )
        .await
        .unwrap()
    }
}

async fn insert_user(store: &Arc<MemoryStore>, name: &str, email: &str, password: &str, role: UserRole) -> User {
    UserStore::create(
        &**store,
        NewUser {
            name: name.into(),
            email: email.to_lowercase(),
            password_hash: hash_password(password).await.unwrap(),
            role,
            is_active: true,
        },
    )
    .await
    .unwrap()
}

/// Polls until at least `n` notifications exist (or about a second passed),
/// then gives stragglers a moment and returns everything stored.
pub async fn wait_for_notifications(store: &Arc<MemoryStore>, n: usize) -> Vec<Notification> {
    for _ in 0..100 {
        if store.all_notifications().await.len() >= n {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    store.all_notifications().await
}

/// Quote storage that always fails.
pub struct FailingQuoteStorage;

#[async_trait]
impl QuoteStorage for FailingQuoteStorage {
    async fn store(&self, _job_number: &str, _bytes: &[u8]) -> anyhow::Result<String> {
        anyhow::bail!("disk full")
    }
}

// --- Detached rows for pure tests ---

pub fn user_row(name: &str, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: name.into(),
        email: format!("{}@lindsay.com", name.to_lowercase()),
        password_hash: String::new(),
        role,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn customer_row(company: &str) -> Customer {
    let now = Utc::now();
    Customer {
        id: Uuid::new_v4(),
        company_name: company.into(),
        name: None,
        email: None,
        phone: None,
        address: None,
        notes: None,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn job_row(number: &str, name: &str) -> Job {
    let now = Utc::now();
    Job {
        id: Uuid::new_v4(),
        job_number: number.into(),
        job_name: name.into(),
        customer_id: Uuid::new_v4(),
        status: JobStatus::Estimation,
        current_phase: JobPhase::Estimation,
        priority: JobPriority::Medium,
        estimator_id: None,
        drafter_id: None,
        project_manager_id: None,
        created_by: None,
        created_date: now,
        estimate_date: None,
        estimate_due_date: None,
        draft_start_date: None,
        draft_completion_date: None,
        submission_date: None,
        acceptance_date: None,
        production_start_date: None,
        delivery_date: None,
        quoted_amount: Decimal::ZERO,
        quote_pdf_url: None,
        notes: None,
        tags: vec![],
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn estimate_row(job_id: Uuid) -> Estimate {
    let now = Utc::now();
    Estimate {
        id: Uuid::new_v4(),
        job_id,
        version: 1,
        estimator_id: Uuid::new_v4(),
        status: EstimateStatus::Draft,
        structures: Json(vec![]),
        items_to_purchase: Json(vec![]),
        labor_cost: Decimal::ZERO,
        material_cost: Decimal::ZERO,
        equipment_cost: Decimal::ZERO,
        overhead_cost: Decimal::ZERO,
        profit_margin: Decimal::from(30),
        total_cost: Decimal::ZERO,
        quoted_price: Decimal::ZERO,
        notes: None,
        revision_reason: None,
        assigned_pm_id: None,
        assigned_date: None,
        created_at: now,
        updated_at: now,
    }
}
