//! Firewalls and their rules
use civo_runtime::{DeletionPolicy, ProviderConfigReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ManagedStatus;

/// A managed Civo firewall
///
/// The rules are reconciled as a set: rules missing remotely are created and
/// remote rules not declared here are deleted.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "firewall.civo.crossplane.io",
    version = "v1alpha1",
    kind = "CivoFirewall",
    status = "CivoFirewallStatus",
    category = "crossplane",
    category = "managed",
    category = "civo",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"Rules","type":"integer","jsonPath":".status.atProvider.rulesCount"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CivoFirewallSpec {
    /// Name of the firewall
    pub name: String,
    /// Network the firewall belongs to, fixed at creation; the region default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Rules of the firewall
    #[serde(default)]
    pub rules: Vec<FirewallRuleSpec>,
    /// The provider configuration to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    /// What happens to the firewall when this resource is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// A rule of a [`CivoFirewall`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRuleSpec {
    /// `tcp`, `udp` or `icmp`
    pub protocol: String,
    #[allow(missing_docs)]
    pub start_port: u16,
    /// Last port of the range; a single port when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_port: Option<u16>,
    /// Source or destination ranges
    pub cidr: Vec<String>,
    /// `ingress` or `egress`
    pub direction: String,
    /// `allow` or `deny`
    #[serde(default = "default_action")]
    pub action: String,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

fn default_action() -> String {
    "allow".to_string()
}

/// Observed state of a [`CivoFirewall`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FirewallObservation {
    /// Identifier assigned by Civo
    pub id: String,
    #[allow(missing_docs)]
    pub network_id: String,
    #[allow(missing_docs)]
    pub rules_count: u32,
    /// Instances using the firewall
    pub instance_count: u32,
    /// Clusters using the firewall
    pub cluster_count: u32,
}

/// Status of a [`CivoFirewall`]
pub type CivoFirewallStatus = ManagedStatus<FirewallObservation>;

impl_managed!(CivoFirewall);
