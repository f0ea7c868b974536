//! Remote failure types and the conflict-aware [`Outcome`].
//!
//! Local I/O and configuration problems travel as plain `anyhow` errors with
//! context attached at the call site. Failures reported by the remote service
//! are wrapped in [`ApiError`] so callers (and tests) can tell a bad status
//! code apart from a response that could not be decoded.

use reqwest::StatusCode;
use thiserror::Error;

/// A failure reported by, or while talking to, the remote service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a status code the caller did not expect.
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The service answered, but the payload could not be decoded.
    #[error("malformed response from {url}: {reason}")]
    Protocol { url: String, reason: String },

    /// The request never produced a response (connection refused, DNS, TLS).
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result of a remote call that treats `409 Conflict` as benign.
///
/// Failures are carried by the surrounding `Result`; this type only separates
/// a fresh success from "the resource is already there".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The call created or accepted something new.
    Success(T),
    /// The resource already exists. The pre-existing value is attached when the
    /// service returned one.
    Conflict(Option<T>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_includes_body() {
        let err = ApiError::Status {
            method: "POST",
            url: "http://localhost/customers/1/folders".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }
}
