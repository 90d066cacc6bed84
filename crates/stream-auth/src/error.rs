//! Error types for provider credential operations

/// Errors from provider credential operations.
///
/// Every variant is recoverable from the caller's perspective: a failed
/// exchange aborts one authorization attempt, never the hosting process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("code exchange failed: {0}")]
    Exchange(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Result alias for credential operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages_are_descriptive() {
        assert!(
            Error::Http("connection refused".into())
                .to_string()
                .contains("connection refused")
        );
        assert_eq!(
            Error::Exchange("code expired".into()).to_string(),
            "code exchange failed: code expired"
        );
        assert!(
            Error::InvalidResponse("missing field".into())
                .to_string()
                .starts_with("invalid provider response:")
        );
    }
}
