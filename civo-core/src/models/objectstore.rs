//! Object storage buckets and their credentials
//!
//! Buckets live under `/v2/objectstores`, credentials under
//! `/v2/objectstore/credentials`. Both share one lifecycle.
use serde::{Deserialize, Serialize};

/// Normalized lifecycle of a bucket or credential
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "String")]
pub enum ObjectStorePhase {
    /// Usable
    Ready,
    /// Still being provisioned
    Creating,
    /// Provisioning failed for good
    Failed,
    /// A status this client does not know
    #[default]
    Unknown,
}

impl From<String> for ObjectStorePhase {
    fn from(status: String) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "ready" => Self::Ready,
            "creating" | "pending" => Self::Creating,
            "failed" | "error" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// The credential that owns a bucket
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BucketOwner {
    pub access_key_id: String,
    pub name: String,
    pub credential_id: String,
}

/// An object storage bucket
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ObjectStore {
    pub id: String,
    pub name: String,
    /// Maximum size in gigabytes
    pub max_size: u32,
    pub owner_info: BucketOwner,
    #[serde(rename = "objectstore_endpoint")]
    pub bucket_url: String,
    pub status: ObjectStorePhase,
}

impl_resource!(ObjectStore, "object store", "/v2/objectstores", |o| &o.name);

/// Body of `POST /v2/objectstores` and `PUT /v2/objectstores/{id}`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectStoreConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub max_size_gb: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    pub region: String,
}

/// Access keys for object storage
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ObjectStoreCredential {
    pub id: String,
    pub name: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub max_size_gb: u32,
    pub suspended: bool,
    pub status: ObjectStorePhase,
}

impl_resource!(
    ObjectStoreCredential,
    "object store credential",
    "/v2/objectstore/credentials",
    |c| &c.name
);

/// Body of `POST /v2/objectstore/credentials` and `PUT /v2/objectstore/credentials/{id}`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectStoreCredentialConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
    pub region: String,
}
