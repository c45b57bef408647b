//! Convenience result type alias for ClinicDesk.

use crate::error::AppError;

/// A specialized `Result` type for ClinicDesk operations.
pub type AppResult<T> = Result<T, AppError>;
