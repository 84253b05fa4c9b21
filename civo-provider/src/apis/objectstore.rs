//! Object storage buckets
use civo_runtime::{ConnectionSecretTarget, DeletionPolicy, ProviderConfigReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ManagedStatus;

/// A managed Civo object store
///
/// The endpoint and the owning access keys are published as connection details.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "objectstore.civo.crossplane.io",
    version = "v1alpha1",
    kind = "CivoObjectStore",
    status = "CivoObjectStoreStatus",
    category = "crossplane",
    category = "managed",
    category = "civo",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"Endpoint","type":"string","priority":1,"jsonPath":".status.atProvider.bucketURL"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CivoObjectStoreSpec {
    /// Name of the bucket
    pub name: String,
    /// Maximum size in gigabytes, in steps of 500
    #[serde(default = "default_max_size")]
    pub max_size_gb: u32,
    /// Access key of an existing credential to own the bucket
    #[serde(default, rename = "accessKeyID", skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Where to publish the endpoint and keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_details: Option<ConnectionSecretTarget>,
    /// The provider configuration to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    /// What happens to the bucket when this resource is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

fn default_max_size() -> u32 {
    500
}

/// Observed state of a [`CivoObjectStore`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStoreObservation {
    /// Identifier assigned by Civo
    pub id: String,
    #[allow(missing_docs)]
    pub name: String,
    /// Maximum size in gigabytes
    pub max_size_gb: u32,
    /// Public endpoint of the bucket
    #[serde(rename = "bucketURL")]
    pub bucket_url: String,
    /// Access key of the owning credential
    #[serde(rename = "accessKeyID")]
    pub access_key_id: String,
    /// Remote lifecycle status
    pub status: String,
}

/// Status of a [`CivoObjectStore`]
pub type CivoObjectStoreStatus = ManagedStatus<ObjectStoreObservation>;

impl_managed!(CivoObjectStore, connection);
