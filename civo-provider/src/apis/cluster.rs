//! Kubernetes clusters
use std::collections::BTreeMap;

use civo_runtime::{ConnectionSecretTarget, DeletionPolicy, ProviderConfigReference};
use k8s_openapi::api::core::v1::Taint;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ManagedStatus;

/// A managed Civo Kubernetes cluster
///
/// Pools, tags, applications, the firewall and the Kubernetes version can be
/// changed after creation; the version only ever moves forward.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    group = "cluster.civo.crossplane.io",
    version = "v1alpha1",
    kind = "CivoKubernetes",
    status = "CivoKubernetesStatus",
    category = "crossplane",
    category = "managed",
    category = "civo",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.atProvider.status"}"#,
    printcolumn = r#"{"name":"Version","type":"string","priority":1,"jsonPath":".status.atProvider.kubernetesVersion"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CivoKubernetesSpec {
    /// Name of the cluster
    pub name: String,
    /// Node pools
    pub pools: Vec<ClusterPool>,
    /// Marketplace applications to install
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<String>,
    /// Tags of the cluster
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// CNI plugin, fixed at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cni: Option<String>,
    /// Kubernetes version, e.g. `1.28.7-k3s1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Network the cluster lives in, fixed at creation; the region default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Firewall applied to the cluster nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_id: Option<String>,
    /// Where to publish the kubeconfig and its credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_details: Option<ConnectionSecretTarget>,
    /// The provider configuration to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    /// What happens to the cluster when this resource is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// A node pool of a [`CivoKubernetes`] cluster
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPool {
    /// Identifier of the pool, unique within the cluster
    pub id: String,
    /// Number of nodes
    pub count: u32,
    /// Node size, e.g. `g4s.kube.medium`
    pub size: String,
    /// Labels applied to the nodes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Taints applied to the nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
    /// Whether the nodes get public IPs
    #[serde(default)]
    pub public_ip_node_pool: bool,
}

/// Observed state of a [`CivoKubernetes`] cluster
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterObservation {
    /// Identifier assigned by Civo
    pub id: String,
    /// Remote lifecycle status
    pub status: String,
    /// Whether the control plane reports ready
    pub ready: bool,
    /// Running Kubernetes version
    pub kubernetes_version: String,
    /// API server endpoint
    pub api_endpoint: String,
    /// Public IP of the control plane
    pub master_ip: String,
    /// DNS name of the cluster
    pub dns_entry: String,
    /// Network of the cluster
    pub network_id: String,
    /// Firewall of the cluster
    pub firewall_id: String,
    /// Creation time reported by Civo
    pub created_at: String,
}

/// Status of a [`CivoKubernetes`] cluster
pub type CivoKubernetesStatus = ManagedStatus<ClusterObservation>;

impl_managed!(CivoKubernetes, connection);
