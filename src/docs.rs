// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::common;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,

        // --- RBAC ---
        handlers::rbac::my_permissions,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::create_customer,
        handlers::customers::get_customer,
        handlers::customers::delete_customer,

        // --- Jobs ---
        handlers::jobs::create_job,
        handlers::jobs::list_jobs,
        handlers::jobs::get_job,
        handlers::jobs::update_job,
        handlers::jobs::patch_job,
        handlers::jobs::delete_job,

        // --- Estimates ---
        handlers::estimates::list_estimates,
        handlers::estimates::create_estimate,
        handlers::estimates::get_estimate,
        handlers::estimates::update_estimate,
        handlers::estimates::delete_estimate,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification,
        handlers::notifications::notification_action,
        handlers::notifications::delete_notifications,

        // --- Dashboard ---
        handlers::dashboard::get_stats,

        // --- Maintenance ---
        handlers::maintenance::purge_deleted,
    ),
    components(
        schemas(
            common::response::MessageResponse,

            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::UserSummary,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- RBAC ---
            models::rbac::Capability,
            models::rbac::Permissions,
            models::rbac::RolePermissionsResponse,

            // --- Customers ---
            models::customer::Address,
            models::customer::Customer,
            models::customer::CustomerSummary,
            models::customer::CreateCustomerPayload,

            // --- Jobs ---
            models::job::JobStatus,
            models::job::JobPhase,
            models::job::JobPriority,
            models::job::Job,
            models::job::JobDetail,
            models::job::CreateJobMultipart,
            models::job::UpdateJobPayload,
            models::job::PatchJobPayload,
            models::job::Pagination,
            models::job::JobListResponse,

            // --- Estimates ---
            models::estimate::EstimateStatus,
            models::estimate::StructureSpecifications,
            models::estimate::StructureItem,
            models::estimate::PurchaseItem,
            models::estimate::Estimate,
            models::estimate::EstimateJobSummary,
            models::estimate::EstimateDetail,
            models::estimate::CreateEstimatePayload,
            models::estimate::UpdateEstimatePayload,

            // --- Notifications ---
            models::notification::NotificationType,
            models::notification::Notification,
            models::notification::MarkNotificationPayload,
            models::notification::NotificationAction,
            models::notification::NotificationActionPayload,
            models::notification::NotificationListResponse,
            models::notification::AffectedResponse,

            // --- Dashboard ---
            models::dashboard::DashboardStats,

            // --- Maintenance ---
            handlers::maintenance::PurgeResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Sign-in"),
        (name = "Users", description = "User accounts and roles"),
        (name = "RBAC", description = "Role capabilities"),
        (name = "Customers", description = "Customer records"),
        (name = "Jobs", description = "Job pipeline"),
        (name = "Estimates", description = "Versioned cost estimates"),
        (name = "Notifications", description = "Per-user inbox"),
        (name = "Dashboard", description = "Card counters"),
        (name = "Maintenance", description = "Purging soft-deleted records")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
