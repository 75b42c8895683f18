//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not business
//! logic. Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Archive could not be read or written.
    #[error("Archive error: {reason}")]
    ArchiveError { reason: String },

    /// Output already exists and overwriting was not requested.
    #[error("Output already exists at {path}")]
    OutputExists { path: PathBuf },

    /// Rollback failed (best-effort cleanup failed).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },

    /// A process-wide registry was already installed.
    #[error("A generator registry is already installed")]
    RegistryAlreadyInstalled,
}

impl ApplicationError {
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn archive(reason: impl ToString) -> Self {
        Self::ArchiveError {
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::ArchiveError { .. } => vec![
                "The archive is malformed or not a zip file".into(),
                "Re-create the archive and try again".into(),
            ],
            Self::OutputExists { path } => vec![
                format!("Already exists: {}", path.display()),
                "Use --force to overwrite (destructive)".into(),
                "Choose a different output location".into(),
            ],
            Self::RollbackFailed { path, .. } => vec![format!(
                "Partially written output may remain at {}",
                path.display()
            )],
            Self::RegistryAlreadyInstalled => {
                vec!["Build the registry once at startup and share it".into()]
            }
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::RollbackFailed { .. } => ErrorCategory::Internal,
            Self::ArchiveError { .. } => ErrorCategory::Validation,
            Self::OutputExists { .. } => ErrorCategory::Conflict,
            Self::RegistryAlreadyInstalled => ErrorCategory::Internal,
        }
    }
}
