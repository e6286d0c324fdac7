//! SDK Error Types

use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors raised synchronously, before any network traffic.
///
/// This is the only error class the SDK ever raises. Once a request payload
/// has been accepted for send, every failure (initiation or streaming) is
/// folded into the event sequence as a single terminal error event instead.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid file descriptor, missing keys: [{}]", .missing.join(", "))]
    InvalidFileDescriptor { missing: Vec<String> },

    #[error("too many files: {count} attached, maximum is {max} per request")]
    TooManyFiles { count: usize, max: usize },

    #[error("files must be paths or filename/content_type/base64 descriptors")]
    UnsupportedFileInput,

    #[error(transparent)]
    FileLoad(#[from] crate::files::FileLoadError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to build http client: {0}")]
    ClientBuild(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_are_named_in_message() {
        let err = SdkError::InvalidFileDescriptor {
            missing: vec!["content_type".to_string(), "base64".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("content_type"));
        assert!(message.contains("base64"));
    }

    #[test]
    fn test_too_many_files_message_carries_counts() {
        let err = SdkError::TooManyFiles { count: 12, max: 10 };
        let message = err.to_string();
        assert!(message.contains("12"));
        assert!(message.contains("10"));
    }
}
