// src/models.rs

pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod estimate;
pub mod job;
pub mod notification;
pub mod rbac;
