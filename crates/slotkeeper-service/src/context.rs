//! Request context carrying the caller identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slotkeeper_entity::user::UserRole;

/// Context for the current request.
///
/// Built by the HTTP extractors (or the CLI) and passed into service
/// methods so every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Token subject, `None` for the public booking flow.
    pub subject: Option<String>,
    /// The caller's role at the time the token was issued.
    pub role: UserRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for an authenticated staff member.
    pub fn new(subject: impl Into<String>, role: UserRole) -> Self {
        Self {
            subject: Some(subject.into()),
            role,
            request_time: Utc::now(),
        }
    }

    /// Context for an anonymous caller.
    pub fn public() -> Self {
        Self {
            subject: None,
            role: UserRole::User,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name used in logs and events.
    pub fn actor(&self) -> &str {
        self.subject.as_deref().unwrap_or("public")
    }
}
