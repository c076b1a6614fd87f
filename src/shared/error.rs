use thiserror::Error;
use serde::Serialize;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Network Error: {0}")]
    Network(String),

    #[error("Timeout Error: request exceeded {0} ms")]
    Timeout(u64),

    #[error("Parse Error: {0}")]
    Parse(String),

    #[error("Storage Error: {0}")]
    Storage(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("System Error: {0}")]
    System(String),
}

// Implement conversion from standard errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(format!("Serialization error: {}", err))
    }
}

impl From<redb::DatabaseError> for AppError {
    fn from(err: redb::DatabaseError) -> Self {
        AppError::Storage(format!("Failed to open database: {}", err))
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(err: redb::TransactionError) -> Self {
        AppError::Storage(format!("Failed to begin transaction: {}", err))
    }
}

impl From<redb::TableError> for AppError {
    fn from(err: redb::TableError) -> Self {
        AppError::Storage(format!("Failed to open table: {}", err))
    }
}

impl From<redb::StorageError> for AppError {
    fn from(err: redb::StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(err: redb::CommitError) -> Self {
        AppError::Storage(format!("Failed to commit: {}", err))
    }
}

impl AppError {
    /// True for failures that happened before or during the exchange with the
    /// completion endpoint (as opposed to local storage or input problems).
    pub fn is_request_failure(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Timeout(_) | AppError::Parse(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let err = AppError::Network("connection refused".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Network");
        assert_eq!(json["message"], "connection refused");
    }

    #[test]
    fn test_request_failure_classification() {
        assert!(AppError::Timeout(30_000).is_request_failure());
        assert!(AppError::Parse("bad json".into()).is_request_failure());
        assert!(!AppError::Storage("disk full".into()).is_request_failure());
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(
            AppError::Timeout(250).to_string(),
            "Timeout Error: request exceeded 250 ms"
        );
    }
}
