/// Error handling for the subnet monitor
///
/// One error enum covers the whole taxonomy: transport failures talking to
/// the backend, validation of operator input, and persistence problems.
/// Background loops log these and carry on; only startup errors are fatal.
use thiserror::Error;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Request could not be sent or the connection dropped
    #[error("Network error on {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// Backend answered with a non-success status
    #[error("HTTP {status} from {endpoint}: {}", body.as_deref().unwrap_or("No body"))]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: Option<String>,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Operator input rejected before contacting the backend
    #[error("{0}")]
    Validation(String),

    /// Persisted state could not be read or written
    #[error("Storage error for '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notification delivery failed: {0}")]
    Notification(String),
}

impl MonitorError {
    pub fn network(endpoint: impl Into<String>, err: impl std::fmt::Display) -> Self {
        MonitorError::Network {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, err: impl std::fmt::Display) -> Self {
        MonitorError::Decode {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }

    pub fn storage(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        MonitorError::Storage {
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// True for failures caused by the backend being unreachable or unhappy
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            MonitorError::Network { .. } | MonitorError::HttpStatus { .. } | MonitorError::Decode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = MonitorError::HttpStatus {
            endpoint: "/miners".to_string(),
            status: 502,
            body: None,
        };
        assert_eq!(err.to_string(), "HTTP 502 from /miners: No body");

        let err = MonitorError::Validation("Please enter a valid subnet.".to_string());
        assert_eq!(err.to_string(), "Please enter a valid subnet.");
    }

    #[test]
    fn test_transport_classification() {
        assert!(MonitorError::network("/price", "connection refused").is_transport());
        assert!(MonitorError::decode("/price", "missing field").is_transport());
        assert!(!MonitorError::storage("symbolNotes", "quota").is_transport());
        assert!(!MonitorError::Validation("x".to_string()).is_transport());
    }
}
