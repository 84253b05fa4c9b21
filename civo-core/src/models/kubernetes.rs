//! Managed Kubernetes clusters, `/v2/kubernetes/clusters`
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalized lifecycle of a cluster
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "String")]
pub enum ClusterPhase {
    /// The control plane is serving and a kubeconfig is available
    Active,
    /// Being built, scaled or upgraded
    Provisioning,
    /// Teardown has started
    Deleting,
    /// Provisioning failed for good
    Failed,
    /// A status this client does not know
    #[default]
    Unknown,
}

impl From<String> for ClusterPhase {
    fn from(status: String) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "ACTIVE" => Self::Active,
            "BUILDING" | "BUILD_PENDING" | "INSTANCE-CREATE" | "UPGRADING" | "SCALING" => Self::Provisioning,
            "DELETING" => Self::Deleting,
            "FAILED" | "ERROR" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// A Kubernetes taint applied to every node of a pool
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Taint {
    /// Taint key
    pub key: String,
    /// Taint value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// `NoSchedule`, `PreferNoSchedule` or `NoExecute`
    pub effect: String,
}

/// A node pool as reported by the API
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KubernetesPool {
    pub id: String,
    pub count: u32,
    pub size: String,
    pub instance_names: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<Taint>,
    pub public_ip_node_pool: bool,
}

/// An application installed from the marketplace
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct InstalledApplication {
    pub application: String,
    pub name: String,
    pub version: String,
    pub installed: bool,
}

/// A managed Kubernetes cluster
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KubernetesCluster {
    pub id: String,
    pub name: String,
    pub status: ClusterPhase,
    pub ready: bool,
    pub version: String,
    pub kubernetes_version: String,
    pub num_target_nodes: u32,
    pub target_nodes_size: String,
    pub kubeconfig: Option<String>,
    pub api_endpoint: String,
    pub master_ip: String,
    pub dns_entry: String,
    pub network_id: String,
    pub firewall_id: String,
    pub tags: Vec<String>,
    pub installed_applications: Vec<InstalledApplication>,
    pub pools: Vec<KubernetesPool>,
    pub created_at: String,
}

impl_resource!(KubernetesCluster, "cluster", "/v2/kubernetes/clusters", |c| &c.name);

/// A node pool as sent on create and update
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolConfig {
    pub id: String,
    pub count: u32,
    pub size: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub public_ip_node_pool: bool,
}

/// Body of `POST /v2/kubernetes/clusters`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct KubernetesClusterConfig {
    pub name: String,
    pub region: String,
    pub network_id: String,
    pub pools: Vec<PoolConfig>,
    /// Marketplace applications, comma separated
    #[serde(skip_serializing_if = "String::is_empty")]
    pub applications: String,
    /// Space separated tags
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cni_plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_firewall: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_rule: Option<String>,
}

/// Body of `PUT /v2/kubernetes/clusters/{id}`
///
/// Only the set fields are changed.
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct KubernetesClusterUpdate {
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pools: Option<Vec<PoolConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_firewall: Option<String>,
    /// Space separated tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Marketplace applications, space separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
}
