//! Firewalls and their rules, `/v2/firewalls`
use serde::{Deserialize, Serialize};

/// A single firewall rule as reported by the API
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FirewallRule {
    pub id: String,
    pub firewall_id: String,
    pub protocol: String,
    pub start_port: String,
    pub end_port: String,
    pub cidr: Vec<String>,
    /// `ingress` or `egress`
    pub direction: String,
    /// `allow` or `deny`
    pub action: String,
    pub label: String,
}

/// A firewall
///
/// Firewalls have no lifecycle of their own; presence means usable.
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Firewall {
    pub id: String,
    pub name: String,
    pub network_id: String,
    pub rules_count: u32,
    pub instance_count: u32,
    pub cluster_count: u32,
    pub rules: Vec<FirewallRule>,
}

impl_resource!(Firewall, "firewall", "/v2/firewalls", |f| &f.name);

/// Body of `POST /v2/firewalls`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FirewallConfig {
    pub name: String,
    pub network_id: String,
    pub region: String,
    /// Whether the API should seed its default rule set
    pub create_rules: bool,
}

/// Body of `POST /v2/firewalls/{id}/rules`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FirewallRuleConfig {
    pub protocol: String,
    pub start_port: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub end_port: String,
    pub cidr: Vec<String>,
    pub direction: String,
    pub action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub region: String,
}
