use serde::{Deserialize, Serialize};

use crate::format::AnalyticsEncoder;
use crate::types::ConstructInfo;

/// Logical id under which the metadata resource is rendered
pub const METADATA_LOGICAL_ID: &str = "CDKMetadata";

/// Resource type of the deployment metadata record
pub const METADATA_RESOURCE_TYPE: &str = "AWS::CDK::Metadata";

/// Deployment metadata resource carrying the analytics string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(rename = "Properties")]
    pub properties: MetadataProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataProperties {
    #[serde(rename = "Analytics")]
    pub analytics: String,
}

impl MetadataResource {
    pub fn new(analytics: impl Into<String>) -> Self {
        Self {
            resource_type: METADATA_RESOURCE_TYPE.to_string(),
            properties: MetadataProperties {
                analytics: analytics.into(),
            },
        }
    }

    pub fn from_infos(infos: &[ConstructInfo], encoder: &AnalyticsEncoder) -> Self {
        Self::new(encoder.encode(infos).to_string())
    }

    /// `{"CDKMetadata": {...}}`, ready to merge into a template's `Resources`
    pub fn to_template_fragment(&self) -> serde_json::Result<serde_json::Value> {
        let mut resources = serde_json::Map::new();
        resources.insert(METADATA_LOGICAL_ID.to_string(), serde_json::to_value(self)?);
        Ok(serde_json::Value::Object(resources))
    }
}
