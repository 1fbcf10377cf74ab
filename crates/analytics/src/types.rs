use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalyticsError, Result};

/// Format version written in front of every analytics string
pub const FORMAT_VERSION: &str = "v2";

/// One construct class observed during synthesis
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstructInfo {
    /// Fully-qualified name, e.g. `aws-cdk-lib.Stack`
    pub fqn: String,

    /// Version of the library that defines the construct
    pub version: String,
}

impl ConstructInfo {
    /// Create a construct info
    pub fn new(fqn: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            version: version.into(),
        }
    }
}

/// How the prefix-encoded list is carried in the analytics string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// Prefix-encoded list as-is
    Plaintext,

    /// Base64 of the gzip-compressed prefix-encoded list
    Deflate64,
}

impl PayloadFormat {
    /// Tag used in the analytics header
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Plaintext => "plaintext",
            Self::Deflate64 => "deflate64",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "plaintext" => Some(Self::Plaintext),
            "deflate64" => Some(Self::Deflate64),
            _ => None,
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A tagged analytics payload
///
/// Renders as `v2:<format>:<payload>`, the value stored in the metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAnalytics {
    pub format: PayloadFormat,
    pub payload: String,
}

impl EncodedAnalytics {
    #[must_use]
    pub const fn new(format: PayloadFormat, payload: String) -> Self {
        Self { format, payload }
    }

    #[must_use]
    pub const fn is_compressed(&self) -> bool {
        matches!(self.format, PayloadFormat::Deflate64)
    }
}

impl fmt::Display for EncodedAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{FORMAT_VERSION}:{}:{}", self.format.tag(), self.payload)
    }
}

impl FromStr for EncodedAnalytics {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let (Some(version), Some(tag), Some(payload)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(AnalyticsError::MissingHeader(s.to_string()));
        };
        if version != FORMAT_VERSION {
            return Err(AnalyticsError::UnsupportedVersion(version.to_string()));
        }
        let format = PayloadFormat::from_tag(tag)
            .ok_or_else(|| AnalyticsError::UnknownFormat(tag.to_string()))?;
        Ok(Self::new(format, payload.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_version_and_tag() {
        let encoded = EncodedAnalytics::new(PayloadFormat::Plaintext, "1.0!a.B".to_string());
        assert_eq!(encoded.to_string(), "v2:plaintext:1.0!a.B");

        let encoded = EncodedAnalytics::new(PayloadFormat::Deflate64, "H4sI".to_string());
        assert_eq!(encoded.to_string(), "v2:deflate64:H4sI");
        assert!(encoded.is_compressed());
    }

    #[test]
    fn parse_keeps_colons_inside_payload() {
        let encoded: EncodedAnalytics = "v2:plaintext:1.0!a:b".parse().unwrap();
        assert_eq!(encoded.format, PayloadFormat::Plaintext);
        assert_eq!(encoded.payload, "1.0!a:b");
    }

    #[test]
    fn parse_rejects_bad_headers() {
        assert!(matches!(
            "plaintext".parse::<EncodedAnalytics>(),
            Err(AnalyticsError::MissingHeader(_))
        ));
        assert!(matches!(
            "v1:plaintext:x".parse::<EncodedAnalytics>(),
            Err(AnalyticsError::UnsupportedVersion(v)) if v == "v1"
        ));
        assert!(matches!(
            "v2:zstd64:x".parse::<EncodedAnalytics>(),
            Err(AnalyticsError::UnknownFormat(t)) if t == "zstd64"
        ));
    }

    #[test]
    fn construct_info_serializes_as_plain_object() {
        let info = ConstructInfo::new("aws-cdk-lib.Stack", "1.90.0");
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"fqn":"aws-cdk-lib.Stack","version":"1.90.0"}"#);
    }
}
