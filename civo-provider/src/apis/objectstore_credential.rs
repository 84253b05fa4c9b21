//! Object storage credentials
use civo_runtime::{ConnectionSecretTarget, DeletionPolicy, ProviderConfigReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ManagedStatus;

/// A managed Civo object store credential
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "objectstorecredential.civo.crossplane.io",
    version = "v1alpha1",
    kind = "CivoObjectStoreCredential",
    status = "CivoObjectStoreCredentialStatus",
    category = "crossplane",
    category = "managed",
    category = "civo",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"Access-Key","type":"string","jsonPath":".status.atProvider.accessKeyID"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CivoObjectStoreCredentialSpec {
    /// Name of the credential
    pub name: String,
    /// Access key to import instead of generating one
    #[serde(default, rename = "accessKeyID", skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Total storage the credential may own, in gigabytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_gb: Option<u32>,
    /// Whether the credential is suspended
    #[serde(default)]
    pub suspended: bool,
    /// Where to publish the access keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_details: Option<ConnectionSecretTarget>,
    /// The provider configuration to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    /// What happens to the credential when this resource is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// Observed state of a [`CivoObjectStoreCredential`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialObservation {
    /// Identifier assigned by Civo
    pub id: String,
    /// The public half of the key pair
    #[serde(rename = "accessKeyID")]
    pub access_key_id: String,
    #[allow(missing_docs)]
    pub max_size_gb: u32,
    #[allow(missing_docs)]
    pub suspended: bool,
    /// Remote lifecycle status
    pub status: String,
}

/// Status of a [`CivoObjectStoreCredential`]
pub type CivoObjectStoreCredentialStatus = ManagedStatus<CredentialObservation>;

impl_managed!(CivoObjectStoreCredential, connection);
