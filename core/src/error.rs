//! Error types for the Petfinder client.
//!
//! # Design
//! Precondition and validation failures are raised before any request leaves
//! the process, so they never consume a retry. `Transport` is only produced
//! after the retry budget is spent and records how many attempts were made.
//! `Decode` covers every body that matches neither expected shape, including
//! upstream error envelopes delivered with a 200 status.

use thiserror::Error;

/// Errors returned by `PetfinderClient` and `Petfinder` operations.
#[derive(Debug, Error)]
pub enum PetfinderError {
    /// An option the operation requires was left empty.
    #[error("missing required parameter `{field}`")]
    MissingParameter { field: &'static str },

    /// An enumerated option holds a value outside its closed set.
    #[error("invalid value {value:?} for `{field}`")]
    Validation { field: &'static str, value: String },

    /// The request never produced an HTTP response, even after retrying.
    #[error("transport failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The response body matched neither the single-object nor the array shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The client could not be constructed from the supplied settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Broad classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Dns,
    Io,
    Other,
}

/// A failure that prevented an HTTP status from being received.
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: TransportErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Status block the upstream embeds in its `header`, kept as context on
/// decode failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamStatus {
    pub code: String,
    pub message: String,
}

/// The response body could not be turned into the expected wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode response: {reason}{}", upstream_suffix(.upstream))]
pub struct DecodeError {
    reason: String,
    upstream: Option<UpstreamStatus>,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            upstream: None,
        }
    }

    pub(crate) fn with_upstream(mut self, upstream: Option<UpstreamStatus>) -> Self {
        self.upstream = upstream;
        self
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Upstream status code and message, when the body carried a header.
    pub fn upstream(&self) -> Option<&UpstreamStatus> {
        self.upstream.as_ref()
    }
}

fn upstream_suffix(upstream: &Option<UpstreamStatus>) -> String {
    match upstream {
        Some(status) => format!(" (upstream status {}: {})", status.code, status.message),
        None => String::new(),
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_includes_upstream_status() {
        let err = DecodeError::new("missing field `shelter`").with_upstream(Some(UpstreamStatus {
            code: "201".to_string(),
            message: "shelter opt-out".to_string(),
        }));
        assert_eq!(
            err.to_string(),
            "failed to decode response: missing field `shelter` (upstream status 201: shelter opt-out)"
        );
    }

    #[test]
    fn decode_error_display_without_upstream_status() {
        let err = DecodeError::new("expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "failed to decode response: expected value at line 1 column 1"
        );
    }

    #[test]
    fn transport_error_reports_attempts() {
        let err = PetfinderError::Transport {
            attempts: 5,
            source: TransportError::new(TransportErrorKind::Connect, "connection refused"),
        };
        assert_eq!(
            err.to_string(),
            "transport failed after 5 attempt(s): Connect: connection refused"
        );
    }

    #[test]
    fn validation_error_names_field_and_value() {
        let err = PetfinderError::Validation {
            field: "size",
            value: "XXL".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value \"XXL\" for `size`");
    }
}
