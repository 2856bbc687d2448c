//! Error types for model and search clients

use thiserror::Error;

/// Errors raised at the hosted-API boundary
#[derive(Debug, Error)]
pub enum LlmError {
    /// A required credential is not set
    #[error("{0} is not set")]
    MissingCredential(&'static str),

    /// Transport failure (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Response carried no choices
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl LlmError {
    /// Whether a retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_connect() || e.is_timeout(),
            LlmError::Status { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Rate limits and server errors are worth retrying; other statuses are not
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(404));
    }

    #[test]
    fn test_status_error_retryable() {
        let err = LlmError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(err.is_retryable());
        assert!(!LlmError::EmptyResponse.is_retryable());
        assert!(!LlmError::MissingCredential("OPENAI_API_KEY").is_retryable());
    }

    #[test]
    fn test_missing_credential_message() {
        let err = LlmError::MissingCredential("OPENAI_API_KEY");
        assert_eq!(err.to_string(), "OPENAI_API_KEY is not set");
    }
}
