//! Resource Fetcher
//!
//! Handles fetching collections from the Intersight API based on resource
//! definitions. Only the first response page is read.

use super::registry::get_resource;
use crate::error::{Error, Result};
use crate::intersight::client::IntersightClient;
use serde_json::Value;

/// Fetch the raw response body of a registered collection
pub async fn fetch_resource(resource_key: &str, client: &IntersightClient) -> Result<Value> {
    let Some(resource_def) = get_resource(resource_key) else {
        return Err(Error::Configuration(format!(
            "unknown resource: {}",
            resource_key
        )));
    };

    tracing::debug!("Fetching {} from {}", resource_def.display_name, resource_def.path);
    client.get(&resource_def.path).await
}

/// Fetch a registered collection and extract its items
pub async fn fetch_items(resource_key: &str, client: &IntersightClient) -> Result<Vec<Value>> {
    let response = fetch_resource(resource_key, client).await?;
    // fetch_resource already rejected unknown keys
    let response_path = get_resource(resource_key)
        .map(|r| r.response_path.as_str())
        .unwrap_or_default();
    extract_items(&response, response_path)
}

/// Extract items from response using a dot-notation `path`.
///
/// A response without the field is a decode failure, not an empty list.
pub fn extract_items(response: &Value, path: &str) -> Result<Vec<Value>> {
    if path.is_empty() {
        return response
            .as_array()
            .cloned()
            .ok_or_else(|| Error::Transport("response is not a JSON array".to_string()));
    }

    let mut current = response;
    for part in path.split('.') {
        current = current.get(part).ok_or_else(|| {
            Error::Transport(format!("response has no `{}` field", path))
        })?;
    }

    // `Results` may be null on an empty collection
    if current.is_null() {
        return Ok(Vec::new());
    }

    current
        .as_array()
        .cloned()
        .ok_or_else(|| Error::Transport(format!("response field `{}` is not an array", path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_results() {
        let response = json!({"ObjectType": "compute.PhysicalSummary.List", "Results": [{"Moid": "a"}, {"Moid": "b"}]});
        let items = extract_items(&response, "Results").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["Moid"], "b");
    }

    #[test]
    fn test_extract_nested_path() {
        let response = json!({"data": {"items": [1, 2, 3]}});
        assert_eq!(extract_items(&response, "data.items").unwrap().len(), 3);
    }

    #[test]
    fn test_null_results_is_empty() {
        let response = json!({"Results": null});
        assert!(extract_items(&response, "Results").unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_is_transport_error() {
        let response = json!({"Count": 3});
        assert!(matches!(
            extract_items(&response, "Results"),
            Err(Error::Transport(_))
        ));
    }

    #[test]
    fn test_non_array_field_is_transport_error() {
        let response = json!({"Results": "nope"});
        assert!(matches!(
            extract_items(&response, "Results"),
            Err(Error::Transport(_))
        ));
    }
}
