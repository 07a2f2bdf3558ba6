//! Reservation status and its transition rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use slotkeeper_core::AppError;

/// Which bucket a reservation sits in.
///
/// ```text
/// pending  -> approved | declined | deleted
/// approved -> declined | deleted
/// declined -> approved | deleted
/// deleted  (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Awaiting an admin decision. Holds its slot.
    Pending,
    /// Confirmed. Holds its slot.
    Approved,
    /// Refused. The slot is released.
    Declined,
    /// Soft-deleted. The slot is released.
    Deleted,
}

impl ReservationStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Approved, Self::Declined, Self::Deleted];

    /// Whether a reservation in this status keeps its slot unavailable.
    pub fn holds_slot(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Check if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Check whether moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: Self) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Approved | Declined | Deleted)
                | (Approved, Declined | Deleted)
                | (Declined, Approved | Deleted)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Deleted => "deleted",
        }
    }

    /// Resolve a bucket name as sent by admin clients.
    ///
    /// Accepts the status names as well as the collection names used by the
    /// dashboard (`reservations`, `approvedReservations`, ...).
    pub fn from_bucket(bucket: &str) -> Result<Self, AppError> {
        match bucket {
            "reservations" => Ok(Self::Pending),
            "approvedReservations" => Ok(Self::Approved),
            "declinedReservations" => Ok(Self::Declined),
            "deletedReservations" => Ok(Self::Deleted),
            other => other.parse(),
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "declined" => Ok(Self::Declined),
            "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::validation(format!(
                "Invalid reservation status: '{s}'. Expected one of: pending, approved, declined, deleted"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationStatus::*;

    #[test]
    fn test_transition_table() {
        let allowed = [
            (Pending, Approved),
            (Pending, Declined),
            (Pending, Deleted),
            (Approved, Declined),
            (Approved, Deleted),
            (Declined, Approved),
            (Declined, Deleted),
        ];
        for from in ReservationStatus::ALL {
            for to in ReservationStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_deleted_is_terminal() {
        assert!(Deleted.is_terminal());
        assert!(!Deleted.holds_slot());
        assert!(Pending.holds_slot());
        assert!(Approved.holds_slot());
    }

    #[test]
    fn test_bucket_names() {
        assert_eq!(ReservationStatus::from_bucket("reservations").unwrap(), Pending);
        assert_eq!(
            ReservationStatus::from_bucket("declinedReservations").unwrap(),
            Declined
        );
        assert_eq!(ReservationStatus::from_bucket("approved").unwrap(), Approved);
        assert!(ReservationStatus::from_bucket("archive").is_err());
    }
}
