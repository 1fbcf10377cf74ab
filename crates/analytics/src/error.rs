use thiserror::Error;

/// Result type for analytics decoding and configuration
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur while reading back an analytics string
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// The string does not start with a `<version>:<format>:` header
    #[error("Missing analytics header in {0:?}")]
    MissingHeader(String),

    /// Header names a format version other than `v2`
    #[error("Unsupported analytics version: {0}")]
    UnsupportedVersion(String),

    /// Header names a payload format other than `plaintext` or `deflate64`
    #[error("Unknown analytics format: {0}")]
    UnknownFormat(String),

    /// Compressed payload is not valid base64
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Gzip stream could not be inflated
    #[error("Decompression failed: {0}")]
    Decompress(#[from] std::io::Error),

    /// Inflated payload exceeds the configured limit
    #[error("Analytics payload too large (more than {limit} bytes)")]
    PayloadTooLarge { limit: usize },

    /// Inflated payload is not UTF-8
    #[error("Analytics payload is not valid UTF-8")]
    InvalidUtf8,

    /// Prefix-encoded list does not follow the grouping grammar
    #[error("Malformed analytics payload at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalyticsError {
    /// Create a malformed-payload error
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
