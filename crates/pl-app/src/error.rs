//! Error types for the pl-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and provides a unified error interface for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Failed to read catalog file: {path}")]
    CatalogFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Catalog validation failed: {0}")]
    Validation(String),

    #[error("Resolution failed: {0}")]
    Resolve(String),

    #[error("Part limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Failed to write report: {path}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read report: {path}")]
    ReportRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Report error: {0}")]
    Report(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for pl-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<pl_catalog::CatalogError> for AppError {
    fn from(err: pl_catalog::CatalogError) -> Self {
        match err {
            pl_catalog::CatalogError::Validation(err) => AppError::Validation(err.to_string()),
            other => AppError::Catalog(other.to_string()),
        }
    }
}

impl From<pl_bom::BomError> for AppError {
    fn from(err: pl_bom::BomError) -> Self {
        if err.is_limit_exceeded() {
            AppError::LimitExceeded(err.to_string())
        } else {
            AppError::Resolve(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Report(err.to_string())
    }
}
