//! Error types for kom operations

use crate::models::TextNo;

/// Errors returned by models and backend services
#[derive(Debug, thiserror::Error)]
pub enum KomError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Authentication required")]
    AuthRequired,

    #[error("HTTP status {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Malformed response: {message}")]
    Parse { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl KomError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

impl From<serde_json::Error> for KomError {
    fn from(e: serde_json::Error) -> Self {
        KomError::Parse {
            message: e.to_string(),
        }
    }
}

impl From<rusqlite::Error> for KomError {
    fn from(e: rusqlite::Error) -> Self {
        KomError::Storage {
            message: e.to_string(),
        }
    }
}

impl From<rusqlite_migration::Error> for KomError {
    fn from(e: rusqlite_migration::Error) -> Self {
        KomError::Storage {
            message: format!("migration failed: {}", e),
        }
    }
}

pub type Result<T, E = KomError> = std::result::Result<T, E>;

/// Errors returned by the read queue
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// An advancement is already waiting for text `in_flight`
    #[error("Read queue is busy fetching text {in_flight}")]
    Busy { in_flight: TextNo },

    #[error("Read queue has no advancement in flight")]
    NotAdvancing,

    #[error("Expected text {expected} to complete the advancement, got {got}")]
    UnexpectedText { expected: TextNo, got: TextNo },

    #[error("Failed to fetch text {text_no}")]
    Fetch {
        text_no: TextNo,
        #[source]
        source: KomError,
    },
}
