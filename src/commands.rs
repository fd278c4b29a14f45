//! Single-request commands: collection reads, device claims and default
//! policy creation

use crate::error::{Error, Result};
use crate::intersight::client::IntersightClient;
use crate::resource::{fetch_resource, get_template};
use serde::Serialize;
use serde_json::Value;

/// Request body of `asset/DeviceClaims`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceClaim {
    pub security_token: String,
    pub serial_number: String,
}

impl DeviceClaim {
    /// Both values are required and checked before anything is sent
    pub fn new(device_id: Option<String>, claim_id: Option<String>) -> Result<Self> {
        match (device_id, claim_id) {
            (Some(serial_number), Some(security_token))
                if !serial_number.is_empty() && !security_token.is_empty() =>
            {
                Ok(Self {
                    security_token,
                    serial_number,
                })
            }
            _ => Err(Error::Configuration(
                "both --device-id and --claim-id are required".to_string(),
            )),
        }
    }
}

/// Read a registered collection and return its body untouched
pub async fn get(client: &IntersightClient, resource_key: &str) -> Result<Value> {
    fetch_resource(resource_key, client).await
}

/// Claim a device into the account
pub async fn claim(client: &IntersightClient, claim: &DeviceClaim) -> Result<Value> {
    tracing::info!("Claiming device {}", claim.serial_number);
    client.post("asset/DeviceClaims", claim).await
}

/// Create one of the built-in default policies
pub async fn create_default(client: &IntersightClient, template_key: &str) -> Result<Value> {
    let Some(template) = get_template(template_key) else {
        return Err(Error::Configuration(format!(
            "unknown default policy: {}",
            template_key
        )));
    };

    tracing::info!("Creating {}", template.display_name);
    client.post(&template.path, &template.payload).await
}
