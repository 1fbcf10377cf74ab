use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Default gzip level (zlib's default)
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Default cap on the inflated size of a `deflate64` payload
pub const DEFAULT_MAX_DECODED_BYTES: usize = 1024 * 1024;

/// Configuration for analytics encoding and decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Always emit the plaintext variant, regardless of size
    pub force_plaintext: bool,

    /// Gzip compression level (0-9)
    pub compression_level: u32,

    /// Maximum inflated payload size accepted when decoding
    pub max_decoded_bytes: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            force_plaintext: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_decoded_bytes: DEFAULT_MAX_DECODED_BYTES,
        }
    }
}

impl AnalyticsConfig {
    /// Create config with deterministic, human-readable output
    pub fn for_testing() -> Self {
        Self {
            force_plaintext: true,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > 9 {
            return Err(AnalyticsError::invalid_config(format!(
                "compression_level ({}) must be between 0 and 9",
                self.compression_level
            )));
        }

        if self.max_decoded_bytes == 0 {
            return Err(AnalyticsError::invalid_config(
                "max_decoded_bytes must be > 0",
            ));
        }

        Ok(())
    }
}
