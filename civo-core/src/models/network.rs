//! Private networks, `/v2/networks`
use serde::{Deserialize, Serialize};

/// Normalized lifecycle of a network
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "String")]
pub enum NetworkPhase {
    /// Usable
    Active,
    /// Teardown has started
    Deleting,
    /// Anything else the API reports while setting up
    #[default]
    Provisioning,
}

impl From<String> for NetworkPhase {
    fn from(status: String) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "deleting" => Self::Deleting,
            _ => Self::Provisioning,
        }
    }
}

/// A private network
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Network {
    pub id: String,
    /// Internal name derived by the API
    pub name: String,
    /// The user facing name
    pub label: String,
    pub default: bool,
    pub cidr: String,
    pub status: NetworkPhase,
    pub nameservers_v4: Vec<String>,
    pub region: String,
}

impl_resource!(Network, "network", "/v2/networks", |n| &n.label);

/// Body of `POST /v2/networks` and `PUT /v2/networks/{id}`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkConfig {
    pub label: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_v4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers_v4: Option<Vec<String>>,
}
