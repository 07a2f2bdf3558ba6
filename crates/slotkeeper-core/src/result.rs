//! Convenience result type alias for Slotkeeper.

use crate::error::AppError;

/// A specialized `Result` type for Slotkeeper operations.
pub type AppResult<T> = Result<T, AppError>;
