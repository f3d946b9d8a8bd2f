// src/main.rs

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use crate::{
    config::{AppState, Settings},
    models::auth::UserRole,
};

#[derive(Parser)]
#[command(name = "precast-tracker", version, about = "Precast concrete job tracker API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Create the initial admin and one sample user per role, if missing.
    Seed,
    /// Permanently remove soft-deleted jobs and customers.
    PurgeDeleted,
}

/// Accounts created by `seed`: name, email, password, role.
const SEED_USERS: &[(&str, &str, &str, UserRole)] = &[
    ("System Admin", "admin@lindsay.com", "Admin123", UserRole::Admin),
    ("Sample Estimator", "estimator@lindsay.com", "Estimator123", UserRole::Estimator),
    ("Sample Drafter", "drafter@lindsay.com", "Drafter123", UserRole::Drafter),
    ("Sample Manager", "pm@lindsay.com", "Manager123", UserRole::ProjectManager),
    ("Sample Production", "production@lindsay.com", "Production123", UserRole::Production),
    ("Sample Inventory", "inventory@lindsay.com", "Inventory123", UserRole::InventoryManager),
    ("Sample Viewer", "viewer@lindsay.com", "Viewer123", UserRole::Viewer),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let (db_pool, app_state) = AppState::connect(&settings).await?;

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("database migrations failed")?;
    tracing::info!("Database migrations applied");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&settings, app_state).await,
        Command::Seed => seed(&app_state).await,
        Command::PurgeDeleted => {
            let report = app_state.job_service.purge_deleted().await?;
            tracing::info!(
                "Purge finished: {} job(s), {} customer(s) removed",
                report.jobs,
                report.customers
            );
            Ok(())
        }
    }
}

async fn serve(settings: &Settings, app_state: AppState) -> anyhow::Result<()> {
    let app = routes::router(app_state);

    let listener = TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("could not bind {}", settings.bind_addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn seed(app_state: &AppState) -> anyhow::Result<()> {
    for (name, email, password, role) in SEED_USERS {
        match app_state.user_service.ensure(name, email, password, *role).await? {
            Some(user) => tracing::info!("Created {} user {}", role, user.email),
            None => tracing::info!("User {} already exists, skipping", email),
        }
    }
    Ok(())
}
