//! Block storage volumes
use civo_runtime::{DeletionPolicy, ProviderConfigReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ManagedStatus;

/// A managed Civo volume
///
/// Volumes can grow but never shrink.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "volume.civo.crossplane.io",
    version = "v1alpha1",
    kind = "CivoVolume",
    status = "CivoVolumeStatus",
    category = "crossplane",
    category = "managed",
    category = "civo",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"Size","type":"integer","jsonPath":".status.atProvider.sizeGb"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CivoVolumeSpec {
    /// Name of the volume
    pub name: String,
    /// Size in gigabytes
    pub size_gb: u32,
    /// Network of the volume, fixed at creation; the region default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Instance to attach the volume to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// The provider configuration to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    /// What happens to the volume when this resource is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// Observed state of a [`CivoVolume`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeObservation {
    /// Identifier assigned by Civo
    pub id: String,
    #[allow(missing_docs)]
    pub name: String,
    /// Size in gigabytes
    pub size_gb: u32,
    /// Instance the volume is attached to
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance_id: String,
    /// Device path on the instance
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mountpoint: String,
    /// Remote lifecycle status
    pub status: String,
}

/// Status of a [`CivoVolume`]
pub type CivoVolumeStatus = ManagedStatus<VolumeObservation>;

impl_managed!(CivoVolume);
