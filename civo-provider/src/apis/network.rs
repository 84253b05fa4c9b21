//! Private networks
use civo_runtime::{DeletionPolicy, ProviderConfigReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ManagedStatus;

/// A managed Civo network
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "network.civo.crossplane.io",
    version = "v1alpha1",
    kind = "CivoNetwork",
    status = "CivoNetworkStatus",
    category = "crossplane",
    category = "managed",
    category = "civo",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"CIDR","type":"string","jsonPath":".status.atProvider.cidr"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CivoNetworkSpec {
    /// Label of the network
    pub label: String,
    /// IPv4 range, fixed at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    /// IPv4 nameservers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>,
    /// The provider configuration to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    /// What happens to the network when this resource is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// Observed state of a [`CivoNetwork`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkObservation {
    /// Identifier assigned by Civo
    pub id: String,
    #[allow(missing_docs)]
    pub label: String,
    #[allow(missing_docs)]
    pub cidr: String,
    /// Remote lifecycle status
    pub status: String,
    /// Whether this is the default network of the region
    pub default: bool,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>,
}

/// Status of a [`CivoNetwork`]
pub type CivoNetworkStatus = ManagedStatus<NetworkObservation>;

impl_managed!(CivoNetwork);
