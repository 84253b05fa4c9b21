//! Reserved IPs
use civo_runtime::{ConnectionSecretTarget, DeletionPolicy, ProviderConfigReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ManagedStatus;

/// A managed Civo reserved IP
///
/// Instances bind to it through `spec.reservedIP`.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "ip.civo.crossplane.io",
    version = "v1alpha1",
    kind = "CivoIP",
    status = "CivoIPStatus",
    category = "crossplane",
    category = "managed",
    category = "civo",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"Address","type":"string","jsonPath":".status.atProvider.address"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CivoIPSpec {
    /// Name of the reserved IP; the resource name when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Where to publish the address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_details: Option<ConnectionSecretTarget>,
    /// The provider configuration to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    /// What happens to the IP when this resource is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// Observed state of a [`CivoIP`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IPObservation {
    /// Identifier assigned by Civo
    pub id: String,
    /// The reserved address
    pub address: String,
    /// What the address is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<AssignedTo>,
}

/// The binding of a reserved IP
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct AssignedTo {
    /// Identifier of the bound resource
    pub id: String,
    /// Kind of the bound resource, e.g. `instance`
    #[serde(rename = "type")]
    pub type_: String,
    /// Name of the bound resource
    pub name: String,
}

/// Status of a [`CivoIP`]
pub type CivoIPStatus = ManagedStatus<IPObservation>;

impl_managed!(CivoIP, connection);
