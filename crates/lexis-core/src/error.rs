//! Error types for lexis operations.
//!
//! Every error carries a structured [`ErrorCode`] so callers (and the HTTP layer)
//! can branch on the kind of failure without parsing messages.
//!
//! "Nothing to review" outcomes are not errors; see [`crate::types::Selection`].

use thiserror::Error;

/// Result type alias for lexis operations.
pub type LexisResult<T> = Result<T, LexisError>;

/// Main error type for all lexis operations.
#[derive(Error, Debug)]
pub enum LexisError {
    /// A referenced record does not exist.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        sense_id: Option<i64>,
    },

    /// Caller supplied a malformed value (e.g. an unknown judgment label).
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// The underlying store failed or is unavailable.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A persisted value could not be decoded.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// A computed review time falls outside the storable range.
    #[error("Scheduling error: {message}")]
    Schedule { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValInvalidJudgment,
    ValInvalidAlgorithm,

    // Catalog (SENSE_xxx)
    SenseNotFound,

    // Plans (PLAN_xxx)
    PlanEmpty,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Parse (PARSE_xxx)
    ParseInvalidTimestamp,
    ParseInvalidValue,

    // Scheduling (SCHED_xxx)
    SchedOutOfRange,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValInvalidJudgment => "VAL_002",
            ErrorCode::ValInvalidAlgorithm => "VAL_003",
            ErrorCode::SenseNotFound => "SENSE_001",
            ErrorCode::PlanEmpty => "PLAN_001",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::ParseInvalidTimestamp => "PARSE_001",
            ErrorCode::ParseInvalidValue => "PARSE_002",
            ErrorCode::SchedOutOfRange => "SCHED_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl LexisError {
    /// Create a not-found error for a sense id.
    pub fn sense_not_found(sense_id: i64) -> Self {
        Self::NotFound {
            message: format!("Sense with id '{}' not found", sense_id),
            code: ErrorCode::SenseNotFound,
            sense_id: Some(sense_id),
        }
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: None,
        }
    }

    /// Create an invalid-input error for an unrecognized judgment label.
    pub fn invalid_judgment(label: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: format!("Unknown judgment '{}'", label.into()),
            code: ErrorCode::ValInvalidJudgment,
            suggestion: Some("Use one of: known, fuzzy, unknown".to_string()),
        }
    }

    /// Create an invalid-input error for an unrecognized algorithm name.
    pub fn invalid_algorithm(name: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: format!("Unknown scheduling algorithm '{}'", name.into()),
            code: ErrorCode::ValInvalidAlgorithm,
            suggestion: Some("Use one of: sspmmc, legacy".to_string()),
        }
    }

    /// Create an invalid-input error for a plan with no senses.
    pub fn empty_plan() -> Self {
        Self::InvalidInput {
            message: "A daily plan needs at least one sense".to_string(),
            code: ErrorCode::PlanEmpty,
            suggestion: None,
        }
    }

    /// Create a database connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbConnectionFailed,
            source: None,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidValue,
        }
    }

    /// Create a parse error for a malformed stored timestamp.
    pub fn timestamp(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidTimestamp,
        }
    }

    /// Create an error for a review time that cannot be stored.
    pub fn schedule_out_of_range(message: impl Into<String>) -> Self {
        Self::Schedule {
            message: message.into(),
            code: ErrorCode::SchedOutOfRange,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { code, .. } => *code,
            Self::InvalidInput { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::Schedule { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether this error came from the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Database { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::NotFound { .. } => Some("Please check the sense ID and ensure it exists"),
            Self::InvalidInput { suggestion, .. } => suggestion.as_deref(),
            Self::Database { .. } => Some("Please check that the database is reachable and retry"),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for LexisError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_judgment_error() {
        let err = LexisError::invalid_judgment("maybe");
        assert_eq!(err.code(), ErrorCode::ValInvalidJudgment);
        assert!(err.to_string().contains("maybe"));
        assert!(err.suggestion().unwrap().contains("fuzzy"));
    }

    #[test]
    fn test_sense_not_found_error() {
        let err = LexisError::sense_not_found(42);
        assert_eq!(err.code(), ErrorCode::SenseNotFound);
        assert!(err.suggestion().is_some());
        assert!(matches!(err, LexisError::NotFound { sense_id: Some(42), .. }));
    }

    #[test]
    fn test_rusqlite_error_is_storage() {
        let err: LexisError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.is_storage());
        assert_eq!(err.code(), ErrorCode::DbOperationFailed);
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ValInvalidInput.as_str(), "VAL_001");
        assert_eq!(ErrorCode::SenseNotFound.as_str(), "SENSE_001");
        assert_eq!(ErrorCode::DbOperationFailed.as_str(), "DB_002");
    }
}
