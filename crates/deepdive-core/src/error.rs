//! Error types for the Deep Dive engine.

use thiserror::Error;

/// A shared error type for the whole Deep Dive workspace.
///
/// Most of these never reach the presentation layer: the engine degrades to a
/// continuable default and logs instead. They exist so adapters can report
/// what went wrong with enough structure for that decision.
#[derive(Error, Debug, Clone)]
pub enum DeepDiveError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON"
        message: String,
    },

    /// Persisted session exists but cannot be used
    #[error("Malformed session: {0}")]
    MalformedSession(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeepDiveError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a MalformedSession error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSession(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a serialization or malformed-session error.
    ///
    /// Both mean "the bytes are there but unusable", which callers treat the
    /// same as an absent session.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Serialization { .. } | Self::MalformedSession(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DeepDiveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DeepDiveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, DeepDiveError>`.
pub type Result<T> = std::result::Result<T, DeepDiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_unreadable() {
        let err: DeepDiveError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(err.is_unreadable());
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: DeepDiveError = io.into();
        assert!(err.to_string().contains("PermissionDenied"));
    }
}
