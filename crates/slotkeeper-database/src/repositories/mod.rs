//! PostgreSQL implementations of the storage traits.

pub mod chapter;
pub mod notification;
pub mod price;
pub mod reservation;
pub mod scenario;
pub mod time_slot;

pub use chapter::ChapterRepository;
pub use notification::NotificationRepository;
pub use price::PriceRepository;
pub use reservation::ReservationRepository;
pub use scenario::ScenarioRepository;
pub use time_slot::TimeSlotRepository;

use slotkeeper_core::error::{AppError, ErrorKind};

/// SQL list of the statuses that hold a slot.
pub(crate) const ACTIVE_STATUSES: &str = "('pending', 'approved')";

/// Map a sqlx error to an [`AppError`], keeping constraint violations
/// distinguishable from infrastructure failures.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let kind = match &e {
            sqlx::Error::Database(db) if db.is_check_violation() => ErrorKind::Validation,
            sqlx::Error::Database(db)
                if db.is_unique_violation() || db.is_foreign_key_violation() =>
            {
                ErrorKind::Conflict
            }
            _ => ErrorKind::Database,
        };
        let message = match &e {
            sqlx::Error::Database(db) if kind != ErrorKind::Database => {
                format!("{context}: {}", db.message())
            }
            _ => context.to_string(),
        };
        AppError::with_source(kind, message, e)
    }
}
