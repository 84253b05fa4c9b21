//! Custom resources served by the provider
//!
//! Every managed kind lives in its own API group `<kind>.civo.crossplane.io`
//! and is cluster-scoped. They share the reference, policy and status types
//! defined here.
use civo_runtime::Condition;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::CustomResourceExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use civo_runtime::{ConnectionSecretTarget, DeletionPolicy, ProviderConfigReference};

macro_rules! impl_managed {
    ($kind:ty) => {
        impl civo_runtime::Managed for $kind {
            fn provider_config_ref(&self) -> Option<&civo_runtime::ProviderConfigReference> {
                self.spec.provider_config_ref.as_ref()
            }

            fn deletion_policy(&self) -> civo_runtime::DeletionPolicy {
                self.spec.deletion_policy
            }

            fn conditions(&self) -> &[civo_runtime::Condition] {
                self.status
                    .as_ref()
                    .map(|s| s.conditions.as_slice())
                    .unwrap_or_default()
            }
        }
    };
    ($kind:ty, connection) => {
        impl civo_runtime::Managed for $kind {
            fn provider_config_ref(&self) -> Option<&civo_runtime::ProviderConfigReference> {
                self.spec.provider_config_ref.as_ref()
            }

            fn deletion_policy(&self) -> civo_runtime::DeletionPolicy {
                self.spec.deletion_policy
            }

            fn connection_secret(&self) -> Option<&civo_runtime::ConnectionSecretTarget> {
                self.spec.connection_details.as_ref()
            }

            fn conditions(&self) -> &[civo_runtime::Condition] {
                self.status
                    .as_ref()
                    .map(|s| s.conditions.as_slice())
                    .unwrap_or_default()
            }
        }
    };
}

pub mod cluster;
pub mod firewall;
pub mod instance;
pub mod ip;
pub mod network;
pub mod objectstore;
pub mod objectstore_credential;
pub mod provider_config;
pub mod volume;

pub use cluster::{CivoKubernetes, CivoKubernetesSpec};
pub use firewall::{CivoFirewall, CivoFirewallSpec};
pub use instance::{CivoInstance, CivoInstanceSpec};
pub use ip::{CivoIP, CivoIPSpec};
pub use network::{CivoNetwork, CivoNetworkSpec};
pub use objectstore::{CivoObjectStore, CivoObjectStoreSpec};
pub use objectstore_credential::{CivoObjectStoreCredential, CivoObjectStoreCredentialSpec};
pub use provider_config::{ProviderConfig, ProviderConfigSpec};
pub use volume::{CivoVolume, CivoVolumeSpec};

/// The observed state of a managed resource
///
/// `atProvider` is a projection of the last observation and never read back
/// as desired state.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedStatus<O> {
    /// Last observed remote state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<O>,
    /// `Ready` and `Synced` conditions
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Human readable summary of the remote state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A reference to a key of a Kubernetes secret
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct SecretKeySelector {
    /// Namespace of the secret
    pub namespace: String,
    /// Name of the secret
    pub name: String,
    /// Key within the secret
    pub key: String,
}

/// A reference to another managed resource by name
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct ResourceReference {
    /// Name of the referenced resource
    pub name: String,
}

/// Definitions of every custom resource the provider serves
pub fn crds() -> Vec<CustomResourceDefinition> {
    vec![
        ProviderConfig::crd(),
        CivoKubernetes::crd(),
        CivoInstance::crd(),
        CivoNetwork::crd(),
        CivoVolume::crd(),
        CivoIP::crd(),
        CivoObjectStore::crd(),
        CivoObjectStoreCredential::crd(),
        CivoFirewall::crd(),
    ]
}
