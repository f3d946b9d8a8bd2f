// src/services/rbac_service.rs
//
// The ownership overlay on top of the static role table.

use crate::{
    common::error::AppError,
    models::{
        auth::{User, UserRole},
        estimate::Estimate,
        job::Job,
        rbac::{capabilities_of, RolePermissionsResponse},
    },
};

fn is_creator(user: &User, job: &Job) -> bool {
    job.created_by == Some(user.id)
}

/// Admin or the job's creator. Holding `CanEditJobs` alone is not enough.
pub fn can_edit_job(user: &User, job: &Job) -> bool {
    user.role == UserRole::Admin || is_creator(user, job)
}

/// Admin or the job's creator.
pub fn can_delete_job(user: &User, job: &Job) -> bool {
    user.role == UserRole::Admin || is_creator(user, job)
}

/// Admin or the estimate's author.
pub fn can_modify_estimate(user: &User, estimate: &Estimate) -> bool {
    user.role == UserRole::Admin || estimate.estimator_id == user.id
}

pub fn ensure(allowed: bool, message: &str) -> Result<(), AppError> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}

pub fn permissions_for(user: &User) -> RolePermissionsResponse {
    RolePermissionsResponse {
        role: user.role,
        permissions: capabilities_of(user.role),
    }
}
