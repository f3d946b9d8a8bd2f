// src/handlers.rs

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod estimates;
pub mod jobs;
pub mod maintenance;
pub mod notifications;
pub mod rbac;
pub mod users;
