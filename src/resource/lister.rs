//! Resource Lister
//!
//! Reads one collection endpoint and decodes its items into
//! [`ResourceSummary`] values.

use super::fetcher::fetch_items;
use crate::error::Result;
use crate::intersight::client::IntersightClient;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Registry key of the mixed blade/rack-unit inventory
pub const PHYSICAL_SUMMARIES: &str = "compute-physical-summaries";

/// One entry of a collection listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    #[serde(rename = "Moid")]
    pub id: String,
    #[serde(rename = "SourceObjectType")]
    pub declared_type: String,
    #[serde(rename = "Name", default, deserialize_with = "string_or_null")]
    pub display_name: String,
    #[serde(rename = "Serial", default, deserialize_with = "string_or_null")]
    pub serial_number: String,
    /// Fields the pipeline does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn string_or_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lists a registered collection as resource summaries
#[derive(Debug, Clone, Copy)]
pub struct ResourceLister {
    resource_key: &'static str,
}

impl ResourceLister {
    /// Lister over `compute/PhysicalSummaries`
    pub fn physical_summaries() -> Self {
        Self {
            resource_key: PHYSICAL_SUMMARIES,
        }
    }

    /// Issue the listing request. Any failure here is fatal to the caller's batch.
    pub async fn list(&self, client: &IntersightClient) -> Result<Vec<ResourceSummary>> {
        let items = fetch_items(self.resource_key, client).await?;

        let summaries = items
            .into_iter()
            .map(serde_json::from_value::<ResourceSummary>)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::info!("Listed {} resources from {}", summaries.len(), self.resource_key);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_summary_keeps_extra_fields() {
        let summary: ResourceSummary = serde_json::from_value(json!({
            "Moid": "5f2a",
            "SourceObjectType": "compute.Blade",
            "Name": "chassis-1-blade-3",
            "Serial": "FCH2233",
            "ManagementMode": "Intersight",
            "NumCpus": 2
        }))
        .unwrap();

        assert_eq!(summary.id, "5f2a");
        assert_eq!(summary.declared_type, "compute.Blade");
        assert_eq!(summary.display_name, "chassis-1-blade-3");
        assert_eq!(summary.serial_number, "FCH2233");
        assert_eq!(summary.extra["ManagementMode"], "Intersight");
        assert_eq!(summary.extra.len(), 2);
    }

    #[test]
    fn test_null_name_and_serial_decode_as_empty() {
        let summary: ResourceSummary = serde_json::from_value(json!({
            "Moid": "x",
            "SourceObjectType": "compute.RackUnit",
            "Name": null
        }))
        .unwrap();

        assert_eq!(summary.display_name, "");
        assert_eq!(summary.serial_number, "");
    }

    #[test]
    fn test_missing_moid_fails_to_decode() {
        let result = serde_json::from_value::<ResourceSummary>(json!({
            "SourceObjectType": "compute.Blade"
        }));
        assert!(result.is_err());
    }
}
