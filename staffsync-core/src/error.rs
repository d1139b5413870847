//! Error types for StaffSync operations

use thiserror::Error;

/// Failure of a single backend call, as seen by the gateway adapter.
///
/// The four variants exist for logging; callers only ever see the
/// rendered message inside a failed [`crate::Envelope`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, timeout).
    #[error("Connection error: {reason}")]
    Transport { reason: String },

    /// The backend answered with a status outside the 2xx range.
    #[error("HTTP {status}: {reason}")]
    Protocol { status: u16, reason: String },

    /// The body was not a valid envelope, or its payload did not match the
    /// expected schema.
    #[error("Invalid response: {reason}")]
    Decode { reason: String },

    /// A well-formed envelope with `success: false`.
    #[error("{message}")]
    Application { message: String },
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Transport { .. } => "transport",
            GatewayError::Protocol { .. } => "protocol",
            GatewayError::Decode { .. } => "decode",
            GatewayError::Application { .. } => "application",
        }
    }
}

impl From<TransportError> for GatewayError {
    fn from(err: TransportError) -> Self {
        GatewayError::Transport { reason: err.0 }
    }
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        GatewayError::Decode {
            reason: err.to_string(),
        }
    }
}

/// Error raised by a [`crate::Transport`] implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_message_is_verbatim() {
        let err = GatewayError::Application {
            message: "Email already exists".to_string(),
        };
        assert_eq!(err.to_string(), "Email already exists");
        assert_eq!(err.kind(), "application");
    }

    #[test]
    fn test_protocol_message_names_status() {
        let err = GatewayError::Protocol {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    }

    #[test]
    fn test_validation_becomes_decode_failure() {
        let err: GatewayError = ValidationError::RequiredFieldMissing {
            field: "nom".to_string(),
        }
        .into();
        assert!(matches!(err, GatewayError::Decode { .. }));
    }
}
