// src/models/rbac.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::auth::UserRole;

/// One capability of the fixed role table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    CanViewDashboard,
    CanManageUsers,
    CanCreateJobs,
    CanEditJobs,
    CanDeleteJobs,
    CanCreateEstimates,
    CanApproveEstimates,
    CanUploadDrawings,
    CanApproveDrawings,
    CanCreateSubmittals,
    CanManageProduction,
    CanManageDelivery,
    CanManageInventory,
    CanViewReports,
    CanExportData,
}

impl Capability {
    pub const ALL: [Capability; 15] = [
        Capability::CanViewDashboard,
        Capability::CanManageUsers,
        Capability::CanCreateJobs,
        Capability::CanEditJobs,
        Capability::CanDeleteJobs,
        Capability::CanCreateEstimates,
        Capability::CanApproveEstimates,
        Capability::CanUploadDrawings,
        Capability::CanApproveDrawings,
        Capability::CanCreateSubmittals,
        Capability::CanManageProduction,
        Capability::CanManageDelivery,
        Capability::CanManageInventory,
        Capability::CanViewReports,
        Capability::CanExportData,
    ];
}

/// The capability row of a role. Serialized as the flat `canXxx` object the UI expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_view_dashboard: bool,
    pub can_manage_users: bool,
    pub can_create_jobs: bool,
    pub can_edit_jobs: bool,
    pub can_delete_jobs: bool,
    pub can_create_estimates: bool,
    pub can_approve_estimates: bool,
    pub can_upload_drawings: bool,
    pub can_approve_drawings: bool,
    pub can_create_submittals: bool,
    pub can_manage_production: bool,
    pub can_manage_delivery: bool,
    pub can_manage_inventory: bool,
    pub can_view_reports: bool,
    pub can_export_data: bool,
}

impl Permissions {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CanViewDashboard => self.can_view_dashboard,
            Capability::CanManageUsers => self.can_manage_users,
            Capability::CanCreateJobs => self.can_create_jobs,
            Capability::CanEditJobs => self.can_edit_jobs,
            Capability::CanDeleteJobs => self.can_delete_jobs,
            Capability::CanCreateEstimates => self.can_create_estimates,
            Capability::CanApproveEstimates => self.can_approve_estimates,
            Capability::CanUploadDrawings => self.can_upload_drawings,
            Capability::CanApproveDrawings => self.can_approve_drawings,
            Capability::CanCreateSubmittals => self.can_create_submittals,
            Capability::CanManageProduction => self.can_manage_production,
            Capability::CanManageDelivery => self.can_manage_delivery,
            Capability::CanManageInventory => self.can_manage_inventory,
            Capability::CanViewReports => self.can_view_reports,
            Capability::CanExportData => self.can_export_data,
        }
    }
}

// =============================================================================
//  THE TABLE
// =============================================================================

const NONE: Permissions = Permissions {
    can_view_dashboard: false,
    can_manage_users: false,
    can_create_jobs: false,
    can_edit_jobs: false,
    can_delete_jobs: false,
    can_create_estimates: false,
    can_approve_estimates: false,
    can_upload_drawings: false,
    can_approve_drawings: false,
    can_create_submittals: false,
    can_manage_production: false,
    can_manage_delivery: false,
    can_manage_inventory: false,
    can_view_reports: false,
    can_export_data: false,
};

const ADMIN: Permissions = Permissions {
    can_view_dashboard: true,
    can_manage_users: true,
    can_create_jobs: true,
    can_edit_jobs: true,
    can_delete_jobs: true,
    can_create_estimates: true,
    can_approve_estimates: true,
    can_upload_drawings: true,
    can_approve_drawings: true,
    can_create_submittals: true,
    can_manage_production: true,
    can_manage_delivery: true,
    can_manage_inventory: true,
    can_view_reports: true,
    can_export_data: true,
};

const ESTIMATOR: Permissions = Permissions {
    can_view_dashboard: true,
    can_create_estimates: true,
    can_view_reports: true,
    ..NONE
};

const DRAFTER: Permissions = Permissions {
    can_view_dashboard: true,
    can_upload_drawings: true,
    can_view_reports: true,
    ..NONE
};

const PROJECT_MANAGER: Permissions = Permissions {
    can_view_dashboard: true,
    can_create_jobs: true,
    can_edit_jobs: true,
    can_approve_estimates: true,
    can_approve_drawings: true,
    can_create_submittals: true,
    can_view_reports: true,
    can_export_data: true,
    ..NONE
};

const PRODUCTION: Permissions = Permissions {
    can_view_dashboard: true,
    can_manage_production: true,
    can_manage_delivery: true,
    can_view_reports: true,
    ..NONE
};

const INVENTORY_MANAGER: Permissions = Permissions {
    can_view_dashboard: true,
    can_manage_inventory: true,
    can_view_reports: true,
    can_export_data: true,
    ..NONE
};

const VIEWER: Permissions = Permissions {
    can_view_dashboard: true,
    can_view_reports: true,
    ..NONE
};

pub const fn capabilities_of(role: UserRole) -> Permissions {
    match role {
        UserRole::Admin => ADMIN,
        UserRole::Estimator => ESTIMATOR,
        UserRole::Drafter => DRAFTER,
        UserRole::ProjectManager => PROJECT_MANAGER,
        UserRole::Production => PRODUCTION,
        UserRole::InventoryManager => INVENTORY_MANAGER,
        UserRole::Viewer => VIEWER,
    }
}

pub fn has_permission(role: UserRole, capability: Capability) -> bool {
    capabilities_of(role).allows(capability)
}

#[allow(dead_code)]
pub fn has_any_permission(role: UserRole, capabilities: &[Capability]) -> bool {
    capabilities.iter().any(|c| has_permission(role, *c))
}

pub fn has_all_permissions(role: UserRole, capabilities: &[Capability]) -> bool {
    capabilities.iter().all(|c| has_permission(role, *c))
}

/// Response of `GET /api/permissions`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionsResponse {
    pub role: UserRole,
    pub permissions: Permissions,
}
