// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::Stores,
    services::{
        auth::AuthService,
        customer_service::CustomerService,
        dashboard_service::DashboardService,
        estimate_service::EstimateService,
        job_service::JobService,
        notification_service::NotificationService,
        quote_storage::{LocalQuoteStorage, QuoteStorage},
        user_service::UserService,
    },
};

/// Process settings, read from the environment after `.env` is loaded.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub session_ttl_days: i64,
    pub upload_dir: PathBuf,
}

fn var_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{key} has an invalid value")),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            max_connections: var_or("DATABASE_MAX_CONNECTIONS", 5)?,
            session_ttl_days: var_or("SESSION_TTL_DAYS", 30)?,
            upload_dir: var_or("UPLOAD_DIR", PathBuf::from("./uploads/quotes"))?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub customer_service: CustomerService,
    pub job_service: JobService,
    pub estimate_service: EstimateService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Builds the service graph over any set of stores.
    pub fn from_stores(
        stores: Stores,
        jwt_secret: String,
        session_ttl: chrono::Duration,
        quote_storage: Arc<dyn QuoteStorage>,
    ) -> Self {
        let notification_service =
            NotificationService::new(stores.users.clone(), stores.notifications.clone());

        Self {
            auth_service: AuthService::new(stores.users.clone(), jwt_secret, session_ttl),
            user_service: UserService::new(stores.users.clone()),
            customer_service: CustomerService::new(
                stores.customers.clone(),
                notification_service.clone(),
            ),
            job_service: JobService::new(
                stores.jobs.clone(),
                stores.customers.clone(),
                stores.users.clone(),
                notification_service.clone(),
                quote_storage,
            ),
            estimate_service: EstimateService::new(
                stores.estimates.clone(),
                stores.jobs.clone(),
                stores.users.clone(),
                notification_service.clone(),
            ),
            dashboard_service: DashboardService::new(stores.jobs, stores.customers),
            notification_service,
        }
    }

    /// Connects to Postgres and wires the Postgres repositories.
    pub async fn connect(settings: &Settings) -> anyhow::Result<(PgPool, Self)> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("could not connect to the database")?;

        tracing::info!("Database connection established");

        let state = Self::from_stores(
            Stores::postgres(db_pool.clone()),
            settings.jwt_secret.clone(),
            chrono::Duration::days(settings.session_ttl_days),
            Arc::new(LocalQuoteStorage::new(settings.upload_dir.clone())),
        );

        Ok((db_pool, state))
    }
}
