use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{Compression, GzBuilder};
use std::io::Write;

use crate::config::AnalyticsConfig;
use crate::decode::decode_payload;
use crate::error::Result;
use crate::grouping::VersionGroups;
use crate::types::{ConstructInfo, EncodedAnalytics, PayloadFormat};

/// OS byte zlib writes into gzip headers on Unix
const GZIP_OS_UNIX: u8 = 3;

/// Encodes construct usage into the tagged analytics string
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEncoder {
    config: AnalyticsConfig,
}

impl AnalyticsEncoder {
    /// Create an encoder with the given configuration
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Group, prefix-encode and pick the smaller of plaintext and deflate64
    pub fn encode(&self, infos: &[ConstructInfo]) -> EncodedAnalytics {
        let plaintext = VersionGroups::from_infos(infos).encode();
        if self.config.force_plaintext {
            return EncodedAnalytics::new(PayloadFormat::Plaintext, plaintext);
        }

        let compressed = match gzip(plaintext.as_bytes(), self.config.compression_level) {
            Ok(bytes) => STANDARD.encode(bytes),
            Err(err) => {
                log::warn!("analytics compression failed, using plaintext: {err}");
                return EncodedAnalytics::new(PayloadFormat::Plaintext, plaintext);
            }
        };

        let format = choose_format(plaintext.len(), compressed.len());
        log::debug!(
            "analytics for {} constructs: plaintext={}B deflate64={}B -> {format}",
            infos.len(),
            plaintext.len(),
            compressed.len()
        );
        match format {
            PayloadFormat::Plaintext => EncodedAnalytics::new(format, plaintext),
            PayloadFormat::Deflate64 => EncodedAnalytics::new(format, compressed),
        }
    }

    /// Read an analytics string back into `(fqn, version)` pairs
    pub fn decode(&self, analytics: &str) -> Result<Vec<ConstructInfo>> {
        let encoded: EncodedAnalytics = analytics.parse()?;
        decode_payload(&encoded, self.config.max_decoded_bytes)
    }
}

/// Format a list of constructs into a (possibly compressed) prefix-encoded string.
///
/// `[1.90.0!aws-cdk-lib.Stack, 1.90.0!aws-cdk-lib.Construct, 0.42.1!aws-cdk-lib-experiments.NewStuff]`
/// becomes `1.90.0!aws-cdk-lib.{Stack,Construct},0.42.1!aws-cdk-lib-experiments.NewStuff`,
/// carried either as `v2:plaintext:<list>` or `v2:deflate64:<base64(gzip(list))>`,
/// whichever is shorter. `force_plaintext` always picks the former.
#[must_use]
pub fn format_analytics(infos: &[ConstructInfo], force_plaintext: bool) -> String {
    let encoder = AnalyticsEncoder {
        config: AnalyticsConfig {
            force_plaintext,
            ..AnalyticsConfig::default()
        },
    };
    encoder.encode(infos).to_string()
}

/// Plaintext wins unless the compressed form is strictly shorter
#[must_use]
pub const fn choose_format(plaintext_len: usize, compressed_len: usize) -> PayloadFormat {
    if plaintext_len <= compressed_len {
        PayloadFormat::Plaintext
    } else {
        PayloadFormat::Deflate64
    }
}

fn gzip(bytes: &[u8], level: u32) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .operating_system(GZIP_OS_UNIX)
        .write(Vec::new(), Compression::new(level));
    encoder.write_all(bytes)?;
    encoder.finish()
}
