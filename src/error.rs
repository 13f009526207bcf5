use thiserror::Error;

/// Errors raised while forwarding a single alert.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Missing or unreadable configuration, or an unknown webhook name.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The alert string has a bad status code or too few fields.
    #[error("Malformed alert: {0}")]
    MalformedAlert(String),

    /// Network failure, non-2xx status, or a response without `thread.name`.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The thread mapping file could not be written.
    ///
    /// Returned by `ThreadStore` only. The forwarder logs it and carries on, so
    /// the binary never exits with this kind; its exit code is reserved.
    #[error("Thread store error: {0}")]
    Store(String),

    /// The card could not be serialized to JSON.
    #[error("Failed to encode card: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ForwardError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ForwardError::Config(_) => 2,
            ForwardError::MalformedAlert(_) => 3,
            ForwardError::Delivery(_) => 4,
            ForwardError::Store(_) => 5,
            ForwardError::Encode(_) => 6,
        }
    }
}

impl From<reqwest::Error> for ForwardError {
    fn from(e: reqwest::Error) -> Self {
        ForwardError::Delivery(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_and_non_zero() {
        let errors = [
            ForwardError::Config("x".to_string()),
            ForwardError::MalformedAlert("x".to_string()),
            ForwardError::Delivery("x".to_string()),
            ForwardError::Store("x".to_string()),
            ForwardError::Encode(serde_json::from_str::<u8>("x").unwrap_err()),
        ];

        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 5);
    }

    #[test]
    fn test_encode_error_is_not_a_delivery_error() {
        let err: ForwardError = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert!(matches!(err, ForwardError::Encode(_)));
        assert_ne!(err.exit_code(), ForwardError::Delivery(String::new()).exit_code());
    }

    #[test]
    fn test_error_display() {
        let err = ForwardError::Config("unknown webhook 'ops'".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown webhook 'ops'");
    }
}
