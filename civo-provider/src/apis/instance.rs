//! Compute instances
use civo_runtime::{ConnectionSecretTarget, DeletionPolicy, ProviderConfigReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ManagedStatus, ResourceReference, SecretKeySelector};

/// A managed Civo compute instance
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    group = "instance.civo.crossplane.io",
    version = "v1alpha1",
    kind = "CivoInstance",
    status = "CivoInstanceStatus",
    category = "crossplane",
    category = "managed",
    category = "civo",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"IP","type":"string","jsonPath":".status.atProvider.ipv4"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CivoInstanceSpec {
    /// The desired instance
    pub instance_config: InstanceConfig,
    /// A `CivoIP` to bind to the instance once it exists
    #[serde(default, rename = "reservedIP", skip_serializing_if = "Option::is_none")]
    pub reserved_ip: Option<ResourceReference>,
    /// Where to publish the address of the instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_details: Option<ConnectionSecretTarget>,
    /// The provider configuration to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    /// What happens to the instance when this resource is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// Parameters of a [`CivoInstance`]
///
/// Only `hostname`, `notes` and `tags` can be changed after creation.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanceConfig {
    /// Hostname, also used to find the instance before it has an identifier
    pub hostname: String,
    /// Instance size, e.g. `g3.small`
    pub size: String,
    /// Disk image identifier or name
    pub disk_image: String,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// Initialization script
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub script: String,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Secret key holding an SSH public key to install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_pub_key_ref: Option<SecretKeySelector>,
    /// Name of the initial user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_user: Option<String>,
    /// `create` or `none`
    #[serde(default, rename = "publicIPRequired", skip_serializing_if = "Option::is_none")]
    pub public_ip_required: Option<String>,
    /// Network of the instance; the region default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Firewall of the instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_id: Option<String>,
}

/// Observed state of a [`CivoInstance`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanceObservation {
    /// Identifier assigned by Civo
    pub id: String,
    /// Remote lifecycle status
    pub state: String,
    /// Public address
    pub ipv4: String,
    /// Address within the network
    pub private_ipv4: String,
    /// Identifier of the installed SSH key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ssh_key_id: String,
    /// Creation time reported by Civo
    pub created_at: String,
}

/// Status of a [`CivoInstance`]
pub type CivoInstanceStatus = ManagedStatus<InstanceObservation>;

impl_managed!(CivoInstance, connection);
