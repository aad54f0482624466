//! Error types for the recycling API client.
//!
//! # Design
//! The network layer distinguishes four failure categories: the host could
//! not be reached, the server answered with something other than JSON, the
//! server claimed JSON but sent garbage, and the server answered with an
//! error status. `Transport` keeps any other transport failure with the
//! URL attached. The remaining variants are local to a typed client.

use thiserror::Error;

/// Maximum number of characters of a raw body kept for diagnostics.
pub const SNIPPET_LIMIT: usize = 200;

/// Errors produced while dispatching a request or interpreting its response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The call never completed: host unreachable or connection failed.
    #[error("network unavailable: could not reach {url} ({message})")]
    NetworkUnavailable { url: String, message: String },

    /// The call failed for a reason other than reachability.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The response did not declare `application/json`.
    #[error("server returned a non-JSON response (status {status} {status_text}): {snippet}")]
    ServerResponseNotJson {
        status: u16,
        status_text: String,
        snippet: String,
    },

    /// The response declared JSON but the body did not parse.
    #[error("server returned malformed JSON (status {status} {status_text}): {snippet}")]
    ServerResponseInvalid {
        status: u16,
        status_text: String,
        snippet: String,
    },

    /// Error status with a JSON body. `message` is what callers surface.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    #[error("failed to serialize request body: {0}")]
    Serialization(String),

    #[error("unexpected response shape: {0}")]
    Deserialization(String),
}

/// Fieldless mirror of `ApiError` for hosts that switch on a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkUnavailable,
    Transport,
    ServerResponseNotJson,
    ServerResponseInvalid,
    RequestFailed,
    Serialization,
    Deserialization,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NetworkUnavailable { .. } => ErrorKind::NetworkUnavailable,
            ApiError::Transport { .. } => ErrorKind::Transport,
            ApiError::ServerResponseNotJson { .. } => ErrorKind::ServerResponseNotJson,
            ApiError::ServerResponseInvalid { .. } => ErrorKind::ServerResponseInvalid,
            ApiError::RequestFailed { .. } => ErrorKind::RequestFailed,
            ApiError::Serialization(_) => ErrorKind::Serialization,
            ApiError::Deserialization(_) => ErrorKind::Deserialization,
        }
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServerResponseNotJson { status, .. }
            | ApiError::ServerResponseInvalid { status, .. }
            | ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify a failure reported by whoever executed the request.
    pub fn from_transport(url: &str, err: TransportError) -> Self {
        match err {
            TransportError::Unreachable(message) => ApiError::NetworkUnavailable {
                url: url.to_string(),
                message,
            },
            TransportError::Other(message) => ApiError::Transport {
                url: url.to_string(),
                message,
            },
        }
    }
}

/// Failure of the underlying call, before any response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("host unreachable: {0}")]
    Unreachable(String),

    #[error("{0}")]
    Other(String),
}

/// Truncate `text` to `SNIPPET_LIMIT` characters, marking the cut.
pub fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_keeps_short_text() {
        assert_eq!(snippet("<html>oops</html>"), "<html>oops</html>");
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        let long = "é".repeat(SNIPPET_LIMIT + 10);
        let cut = snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.trim_end_matches("...").chars().count(), SNIPPET_LIMIT);
    }

    #[test]
    fn request_failed_displays_message_verbatim() {
        let err = ApiError::RequestFailed {
            status: 500,
            message: "db down".to_string(),
        };
        assert_eq!(err.to_string(), "db down");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.kind(), ErrorKind::RequestFailed);
    }

    #[test]
    fn unreachable_transport_is_network_unavailable() {
        let err = ApiError::from_transport(
            "http://10.0.0.1/ranking/students",
            TransportError::Unreachable("connection refused".to_string()),
        );
        assert_eq!(err.kind(), ErrorKind::NetworkUnavailable);
        assert!(err.status().is_none());
    }

    #[test]
    fn other_transport_failure_keeps_context() {
        let err = ApiError::from_transport(
            "http://api/ranking/students",
            TransportError::Other("timed out".to_string()),
        );
        assert_eq!(err.kind(), ErrorKind::Transport);
        let msg = err.to_string();
        assert!(msg.contains("http://api/ranking/students"));
        assert!(msg.contains("timed out"));
    }
}
