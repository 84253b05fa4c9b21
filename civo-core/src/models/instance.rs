//! Compute instances, `/v2/instances`
use serde::{Deserialize, Serialize};

/// Normalized lifecycle of an instance
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "String")]
pub enum InstancePhase {
    /// Running and reachable
    Active,
    /// Building, rebooting or otherwise transitioning
    Provisioning,
    /// Powered off
    Stopped,
    /// Provisioning failed for good
    Failed,
    /// A status this client does not know
    #[default]
    Unknown,
}

impl From<String> for InstancePhase {
    fn from(status: String) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "ACTIVE" => Self::Active,
            "BUILDING" | "BUILD_PENDING" | "REBOOTING" | "HARD_REBOOTING" | "STARTING" | "SHUTTING_DOWN"
            | "STOPPING" | "UPGRADING" | "RESTORING" => Self::Provisioning,
            "SHUTOFF" | "STOPPED" => Self::Stopped,
            "FAILED" | "ERROR" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// A compute instance
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Instance {
    pub id: String,
    pub hostname: String,
    pub status: InstancePhase,
    pub size: String,
    pub public_ip: String,
    pub private_ip: String,
    pub network_id: String,
    pub firewall_id: String,
    pub source_id: String,
    pub initial_user: String,
    pub ssh_key_id: String,
    pub notes: String,
    pub tags: Vec<String>,
    pub reverse_dns: String,
    pub created_at: String,
}

impl_resource!(Instance, "instance", "/v2/instances", |i| &i.hostname);

/// Body of `POST /v2/instances`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceConfig {
    pub hostname: String,
    pub size: String,
    pub region: String,
    /// Disk image identifier
    pub template_id: String,
    /// `create` or `none`
    pub public_ip: String,
    pub count: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub network_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub initial_user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_id: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub script: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// Space separated tags
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tags: String,
}

/// Body of `PUT /v2/instances/{id}`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceUpdate {
    pub region: String,
    pub hostname: String,
    pub notes: String,
    /// Space separated tags
    pub tags: String,
}
