//! Application error types

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Contract violations (caller bug, never recovered) =====
    #[error("Inconsistency: {0}")]
    Inconsistency(String),

    #[error("Unknown image: {0}")]
    UnknownImage(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    // ===== Recoverable Errors (log, continue) =====
    #[error("Catalog error: {0}")]
    Catalog(#[from] app_db::DbError),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Is this a programming error in the caller?
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            AppError::Inconsistency(_) | AppError::UnknownImage(_) | AppError::InvalidValue(_)
        )
    }

    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        !self.is_contract_violation()
    }
}

impl From<ipc_proto::ProtoError> for AppError {
    fn from(e: ipc_proto::ProtoError) -> Self {
        AppError::Backend(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
