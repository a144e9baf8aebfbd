//! Convenience result type alias for FileRepo.

use crate::error::AppError;

/// A specialized `Result` type for FileRepo operations.
pub type AppResult<T> = Result<T, AppError>;
