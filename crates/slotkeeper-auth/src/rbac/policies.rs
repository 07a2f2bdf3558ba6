//! Role-to-permission mapping definitions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use slotkeeper_entity::user::UserRole;

/// A back-office permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPermission {
    // Time slots
    /// Generate, toggle, edit, clear and delete time slots.
    SlotManage,

    // Catalog
    /// Create, update and delete scenarios, chapters and prices.
    CatalogManage,

    // Reservations
    /// List and inspect reservations.
    ReservationRead,
    /// Move pending reservations to another bucket.
    ReservationTriage,
    /// Move reservations from any bucket.
    ReservationManage,

    // Bulk
    /// Apply one action to many chapters or reservations.
    BulkOperate,

    // Notifications
    /// Read the notification feed.
    NotificationRead,
    /// Mark notifications read and delete them.
    NotificationManage,

    // System
    /// Access detailed health endpoints.
    SystemHealth,
}

/// Defines the mapping from each role to its set of allowed permissions.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    /// Role → set of permissions.
    policies: HashMap<UserRole, HashSet<SystemPermission>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        let mut policies = HashMap::new();

        // User: nothing in the back office
        policies.insert(UserRole::User, HashSet::new());

        // Subadmin: front desk triage
        let subadmin: HashSet<SystemPermission> = [
            SystemPermission::ReservationRead,
            SystemPermission::ReservationTriage,
            SystemPermission::NotificationRead,
            SystemPermission::NotificationManage,
        ]
        .into_iter()
        .collect();
        policies.insert(UserRole::Subadmin, subadmin);

        // Admin: everything
        let admin: HashSet<SystemPermission> = [
            SystemPermission::SlotManage,
            SystemPermission::CatalogManage,
            SystemPermission::ReservationRead,
            SystemPermission::ReservationTriage,
            SystemPermission::ReservationManage,
            SystemPermission::BulkOperate,
            SystemPermission::NotificationRead,
            SystemPermission::NotificationManage,
            SystemPermission::SystemHealth,
        ]
        .into_iter()
        .collect();
        policies.insert(UserRole::Admin, admin);

        Self { policies }
    }

    /// Returns the set of permissions for the given role.
    pub fn permissions_for_role(&self, role: &UserRole) -> HashSet<SystemPermission> {
        self.policies.get(role).cloned().unwrap_or_default()
    }

    /// Checks whether the given role has the specified permission.
    pub fn has_permission(&self, role: &UserRole, permission: &SystemPermission) -> bool {
        self.policies
            .get(role)
            .is_some_and(|perms| perms.contains(permission))
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
