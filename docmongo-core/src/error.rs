// docmongo-core/src/error.rs
// Error taxonomy for the access layer

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by every docmongo operation
#[derive(Debug, Error)]
pub enum DocMongoError {
    /// Connection URI could not be parsed or names no database
    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),

    /// An operation was issued before `connect` (or after `disconnect`)
    #[error("Not connected: call connect before issuing operations")]
    NotConnected,

    /// Single-document lookup matched nothing
    #[error("No document found in collection '{collection}'")]
    NotFound { collection: String },

    #[error("Invalid sort specification: {0}")]
    InvalidSortSpec(String),

    #[error("Invalid update mode: '{0}' (expected UpdateOne, UpdateMany, ReplaceOne or softDelete)")]
    InvalidUpdateMode(String),

    /// Option object does not belong to the resolved update mode
    #[error("Invalid option type for {mode}: expected {expected}")]
    InvalidOptionType {
        mode: &'static str,
        expected: &'static str,
    },

    #[error("Invalid ObjectId '{0}'")]
    InvalidObjectId(String),

    /// Operation exceeded the per-call timeout
    #[error("Operation '{operation}' timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver / server failure, passed through untouched
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
}

impl DocMongoError {
    /// True for the "no document found" outcome of `find_one`
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocMongoError::NotFound { .. })
    }

    /// True for input rejected before any driver interaction
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DocMongoError::InvalidSortSpec(_)
                | DocMongoError::InvalidUpdateMode(_)
                | DocMongoError::InvalidOptionType { .. }
                | DocMongoError::InvalidObjectId(_)
        )
    }
}

impl From<mongodb::bson::ser::Error> for DocMongoError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        DocMongoError::Serialization(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for DocMongoError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        DocMongoError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DocMongoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguishable() {
        let err = DocMongoError::NotFound {
            collection: "users".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_validation());
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn test_validation_kinds() {
        assert!(DocMongoError::InvalidUpdateMode("Upsert".into()).is_validation());
        assert!(DocMongoError::InvalidSortSpec("x".into()).is_validation());
        assert!(DocMongoError::InvalidOptionType {
            mode: "ReplaceOne",
            expected: "ReplaceOptions"
        }
        .is_validation());
        assert!(!DocMongoError::NotConnected.is_validation());
    }

    #[test]
    fn test_timeout_message_names_operation() {
        let err = DocMongoError::Timeout {
            operation: "count",
            timeout: Duration::from_secs(3),
        };
        assert_eq!(err.to_string(), "Operation 'count' timed out after 3s");
    }
}
