//! Resource Registry - Load endpoint definitions from JSON
//!
//! This module loads the Intersight collection endpoints and create templates
//! from embedded JSON files and provides lookup functions for the rest of the
//! application.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/compute.json"),
    include_str!("../resources/license.json"),
    include_str!("../resources/asset.json"),
    include_str!("../resources/policy.json"),
];

/// Read-only collection endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    /// Path relative to the API base URL
    pub path: String,
    /// Field of the response body that holds the items
    pub response_path: String,
}

/// Fixed-payload create request
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDef {
    pub display_name: String,
    pub path: String,
    pub payload: Value,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
    #[serde(default)]
    pub templates: HashMap<String, TemplateDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig::default();

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
            final_config.templates.extend(partial.templates);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get a create template by key
pub fn get_template(key: &str) -> Option<&'static TemplateDef> {
    get_registry().templates.get(key)
}

/// All resource keys, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}
