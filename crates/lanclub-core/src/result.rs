//! Convenience result type alias for LanClub.

use crate::error::AppError;

/// A specialized `Result` type for LanClub backend operations.
pub type AppResult<T> = Result<T, AppError>;
