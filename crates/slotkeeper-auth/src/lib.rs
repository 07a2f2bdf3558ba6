//! # slotkeeper-auth
//!
//! Authentication and authorization for the Slotkeeper back office.
//!
//! ## Modules
//!
//! - `jwt`: access token creation and validation (HS256)
//! - `rbac`: role-to-permission policies and their enforcement

pub mod jwt;
pub mod rbac;

pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use rbac::{RbacEnforcer, RbacPolicies, SystemPermission};
