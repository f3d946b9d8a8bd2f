// src/services.rs

pub mod auth;
pub mod customer_service;
pub mod dashboard_service;
pub mod estimate_calculator;
pub mod estimate_service;
pub mod job_lifecycle;
pub mod job_service;
pub mod notification_service;
pub mod quote_storage;
pub mod rbac_service;
pub mod user_service;
