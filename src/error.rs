//! Failure taxonomy for the alert pipeline.
//!
//! Remote failures (`Network`, `Server`) are transient and eligible for the
//! retry loop in [`crate::retry`]; local failures (`Validation`, `Parse`) are
//! fatal to the current operation and surface immediately.

use thiserror::Error;

// ---

/// Errors produced while sourcing or validating pipeline data.
///
/// Variants carry plain data rather than wrapped transport errors so that a
/// failure observed on the last retry attempt can be handed back to the
/// caller unchanged and compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response reached the upstream API (connect, timeout, body I/O).
    #[error("network error: {0}")]
    Network(String),

    /// Upstream responded with a non-2xx status.
    #[error("upstream returned {status}: {message}")]
    Server { status: u16, message: String },

    /// Malformed or incomplete caller input (e.g. an inverted date range).
    #[error("invalid request: {0}")]
    Validation(String),

    /// Response payload that could not be decoded.
    #[error("unparseable response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Whether a retry can plausibly change the outcome.
    ///
    /// Only remote failures qualify; `Validation` and `Parse` are local and
    /// deterministic, so retrying them would repeat the same failure.
    pub fn is_retryable(&self) -> bool {
        // ---
        matches!(self, FetchError::Network(_) | FetchError::Server { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // ---
        if let Some(status) = err.status() {
            FetchError::Server {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn remote_failures_are_retryable() {
        // ---
        assert!(FetchError::Network("connection refused".into()).is_retryable());
        assert!(FetchError::Server {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
    }

    #[test]
    fn local_failures_are_not_retryable() {
        // ---
        assert!(!FetchError::Validation("start after end".into()).is_retryable());
        assert!(!FetchError::Parse("not a date".into()).is_retryable());
    }
}
