// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::rbac::{has_all_permissions, Capability},
};

/// Capabilities a route demands from the caller's role.
pub trait PermissionDef: Send + Sync + 'static {
    fn capabilities() -> &'static [Capability];
    /// Completes "You do not have permission to ...".
    fn action() -> &'static str;
}

/// Rejects with 403 unless the caller's role holds every `T::capabilities()`.
/// Runs before the body is read.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::Unauthorized)?;

        if !has_all_permissions(user.0.role, T::capabilities()) {
            return Err(AppError::Forbidden(format!(
                "You do not have permission to {}",
                T::action()
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// CAPABILITY MARKERS
// ---

pub struct PermCreateJobs;
impl PermissionDef for PermCreateJobs {
    fn capabilities() -> &'static [Capability] { &[Capability::CanCreateJobs] }
    fn action() -> &'static str { "create jobs" }
}

pub struct PermCreateEstimates;
impl PermissionDef for PermCreateEstimates {
    fn capabilities() -> &'static [Capability] { &[Capability::CanCreateEstimates] }
    fn action() -> &'static str { "create estimates" }
}

pub struct PermManageUsers;
impl PermissionDef for PermManageUsers {
    fn capabilities() -> &'static [Capability] { &[Capability::CanManageUsers] }
    fn action() -> &'static str { "manage users" }
}

pub struct PermViewDashboard;
impl PermissionDef for PermViewDashboard {
    fn capabilities() -> &'static [Capability] { &[Capability::CanViewDashboard] }
    fn action() -> &'static str { "view the dashboard" }
}
