//! # Construct Analytics
//!
//! Compact encoding of the construct classes used in a deployment, for the
//! `Analytics` property of the deployment metadata record.
//!
//! ## Architecture
//!
//! ```text
//! [(fqn, version), ...]
//!     │
//!     ├──> Version grouping (first-seen order, FQNs deduplicated)
//!     │
//!     ├──> Per-version token trie (split after non-alphanumerics)
//!     │
//!     ├──> Prefix encoding: version!lib.{A,B},other!x.Y
//!     │
//!     └──> Smaller of:
//!          ├─> v2:plaintext:<list>
//!          └─> v2:deflate64:<base64(gzip(list))>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use construct_analytics::{format_analytics, ConstructInfo};
//!
//! let infos = vec![
//!     ConstructInfo::new("aws-cdk-lib.Stack", "1.90.0"),
//!     ConstructInfo::new("aws-cdk-lib.Construct", "1.90.0"),
//!     ConstructInfo::new("aws-cdk-lib-experiments.NewStuff", "0.42.1"),
//! ];
//!
//! assert_eq!(
//!     format_analytics(&infos, true),
//!     "v2:plaintext:1.90.0!aws-cdk-lib.{Stack,Construct},0.42.1!aws-cdk-lib-experiments.NewStuff"
//! );
//! ```

mod config;
mod decode;
mod error;
mod format;
mod grouping;
mod resource;
mod trie;
mod types;

pub use config::{AnalyticsConfig, DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DECODED_BYTES};
pub use decode::{decode_analytics, decode_payload, parse_prefix_encoded_list};
pub use error::{AnalyticsError, Result};
pub use format::{choose_format, format_analytics, AnalyticsEncoder};
pub use grouping::VersionGroups;
pub use resource::{
    MetadataProperties, MetadataResource, METADATA_LOGICAL_ID, METADATA_RESOURCE_TYPE,
};
pub use trie::{tokenize, NodeId, Trie};
pub use types::{ConstructInfo, EncodedAnalytics, PayloadFormat, FORMAT_VERSION};
