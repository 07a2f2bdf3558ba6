//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::reservation::ReservationStatus;

/// Roles carried in access tokens.
///
/// Roles are ordered by privilege level: Admin > Subadmin > User.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full back-office access.
    Admin,
    /// Front-desk staff: may triage pending reservations.
    Subadmin,
    /// Customer-facing account with no back-office rights.
    User,
}

impl UserRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Subadmin => 2,
            Self::User => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: &UserRole) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may move a reservation currently in `current`.
    ///
    /// Admins may act on any bucket; subadmins only on pending reservations.
    pub fn can_act_on(&self, current: ReservationStatus) -> bool {
        match self {
            Self::Admin => true,
            Self::Subadmin => current == ReservationStatus::Pending,
            Self::User => false,
        }
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Subadmin => "subadmin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = slotkeeper_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "subadmin" => Ok(Self::Subadmin),
            "user" => Ok(Self::User),
            _ => Err(slotkeeper_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, subadmin, user"
            ))),
        }
    }
}
