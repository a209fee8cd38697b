//! Error types for the fintrack library.

/// All errors that can occur when using the fintrack library.
#[derive(Debug, thiserror::Error)]
pub enum FinTrackError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// A storage key contains characters that cannot be persisted.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A textual value could not be parsed into a domain type.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The background write-through worker could not be started.
    #[error("write-through worker unavailable: {0}")]
    WriterUnavailable(String),
}

/// A specialized `Result` type for fintrack operations.
pub type Result<T> = core::result::Result<T, FinTrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = FinTrackError::from(serde_err);
        assert!(matches!(err, FinTrackError::Serialization(_)));
        let msg = err.to_string();
        assert!(msg.contains("serialization error"));
    }

    #[test]
    fn error_storage_display() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = FinTrackError::Storage(Box::new(inner));
        let msg = err.to_string();
        assert!(msg.contains("storage error"));
        assert!(msg.contains("file missing"));
    }

    #[test]
    fn error_invalid_key_quotes_key() {
        let err = FinTrackError::InvalidKey("../etc".to_owned());
        assert_eq!(err.to_string(), r#"invalid storage key: "../etc""#);
    }

    #[test]
    fn error_writer_unavailable_display() {
        let err = FinTrackError::WriterUnavailable("no runtime".to_owned());
        assert!(err.to_string().contains("no runtime"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FinTrackError>();
    }
}
