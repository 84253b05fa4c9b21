//! Civo Kubernetes clusters
use std::sync::Arc;

use civo_client::Api;
use civo_core::models::{
    ClusterPhase, KubernetesCluster, KubernetesClusterConfig, KubernetesClusterUpdate, Network, PoolConfig, Taint,
};
use civo_runtime::{Connector, ExternalClient, ExternalCreation, ExternalObservation, Readiness};
use tracing::{debug, info};

use super::{lookup, network_or_default, phase_name};
use crate::{
    apis::{
        cluster::{ClusterObservation, ClusterPool},
        CivoKubernetes, CivoKubernetesSpec,
    },
    connector::{CivoConnector, Defaults},
    diff,
    error::{Context, Error, Result},
    kubeconfig,
};

/// Drives [`CivoKubernetes`] resources through the clusters API
pub struct ClusterClient {
    clusters: Api<KubernetesCluster>,
    networks: Api<Network>,
    defaults: Arc<Defaults>,
}

impl ClusterClient {
    /// Create a client for clusters in the region of `client`
    pub fn new(client: civo_client::Client, defaults: Arc<Defaults>) -> Self {
        Self {
            clusters: Api::new(client.clone()),
            networks: Api::new(client),
            defaults,
        }
    }

    fn desired_tags(&self, spec: &CivoKubernetesSpec) -> Vec<String> {
        let mut tags = spec.tags.clone();
        for tag in &self.defaults.cluster_tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }

    fn drift(&self, spec: &CivoKubernetesSpec, cluster: &KubernetesCluster) -> Drift {
        let desired_pools = spec
            .pools
            .iter()
            .map(|p| (p.id.as_str(), p.count, p.size.as_str()))
            .collect::<Vec<_>>();
        let observed_pools = cluster
            .pools
            .iter()
            .map(|p| (p.id.as_str(), p.count, p.size.as_str()))
            .collect::<Vec<_>>();
        let installed = cluster
            .installed_applications
            .iter()
            .flat_map(|app| [app.application.to_lowercase(), app.name.to_lowercase()])
            .collect::<Vec<_>>();
        Drift {
            pools: diff::needs_update(&desired_pools, &observed_pools),
            firewall: spec
                .firewall_id
                .as_deref()
                .is_some_and(|id| !id.is_empty() && id != cluster.firewall_id),
            tags: diff::needs_update(&self.desired_tags(spec), &cluster.tags),
            applications: spec
                .applications
                .iter()
                .filter(|app| !installed.contains(&app.to_lowercase()))
                .cloned()
                .collect(),
            version: spec
                .version
                .as_deref()
                .is_some_and(|v| diff::version_upgrade_needed(v, &cluster.kubernetes_version)),
        }
    }
}

/// The update groups a cluster differs from its spec in
#[derive(Debug, Default, PartialEq, Eq)]
struct Drift {
    pools: bool,
    firewall: bool,
    tags: bool,
    /// Requested applications that are not installed yet
    applications: Vec<String>,
    version: bool,
}

impl Drift {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn pool_config(pool: &ClusterPool) -> PoolConfig {
    PoolConfig {
        id: pool.id.clone(),
        count: pool.count,
        size: pool.size.clone(),
        labels: pool.labels.clone(),
        taints: pool
            .taints
            .iter()
            .map(|t| Taint {
                key: t.key.clone(),
                value: t.value.clone(),
                effect: t.effect.clone(),
            })
            .collect(),
        public_ip_node_pool: pool.public_ip_node_pool,
    }
}

fn observation(cluster: &KubernetesCluster) -> ClusterObservation {
    ClusterObservation {
        id: cluster.id.clone(),
        status: phase_name(&cluster.status),
        ready: cluster.ready,
        kubernetes_version: cluster.kubernetes_version.clone(),
        api_endpoint: cluster.api_endpoint.clone(),
        master_ip: cluster.master_ip.clone(),
        dns_entry: cluster.dns_entry.clone(),
        network_id: cluster.network_id.clone(),
        firewall_id: cluster.firewall_id.clone(),
        created_at: cluster.created_at.clone(),
    }
}

impl ExternalClient<CivoKubernetes> for ClusterClient {
    type Error = Error;
    type Observation = ClusterObservation;

    async fn observe(&self, obj: &CivoKubernetes) -> Result<ExternalObservation<ClusterObservation>> {
        let Some(cluster) = lookup(&self.clusters, obj, &obj.spec.name).await? else {
            return Ok(ExternalObservation::absent());
        };
        let observed = ExternalObservation::present(observation(&cluster));
        match cluster.status {
            ClusterPhase::Active => {
                let drift = self.drift(&obj.spec, &cluster);
                if !drift.is_empty() {
                    debug!(cluster = %cluster.id, ?drift, "cluster drifted");
                }
                let details = match cluster.kubeconfig.as_deref().filter(|k| !k.is_empty()) {
                    Some(kubeconfig) => kubeconfig::connection_details(kubeconfig, &cluster.name)?,
                    None => Default::default(),
                };
                Ok(observed
                    .up_to_date(drift.is_empty())
                    .ready(Readiness::Available)
                    .with_details(details)
                    .with_message("Cluster is active"))
            }
            ClusterPhase::Provisioning | ClusterPhase::Unknown => Ok(observed
                .ready(Readiness::Creating)
                .with_message("Cluster is being created")),
            ClusterPhase::Deleting => Ok(observed
                .ready(Readiness::Deleting)
                .with_message("Cluster is being deleted")),
            ClusterPhase::Failed => Err(Error::RemoteFailed {
                kind: "cluster",
                id: cluster.id,
                status: phase_name(&cluster.status),
            }),
        }
    }

    async fn create(&self, obj: &CivoKubernetes) -> Result<ExternalCreation> {
        let spec = &obj.spec;
        if let Some(existing) = self.clusters.find(&spec.name).await.context("cannot find cluster")? {
            return Ok(ExternalCreation::named(existing.id));
        }
        let config = KubernetesClusterConfig {
            name: spec.name.clone(),
            region: self.clusters.region().to_string(),
            network_id: network_or_default(&self.networks, spec.network_id.as_deref()).await?,
            pools: spec.pools.iter().map(pool_config).collect(),
            applications: spec.applications.join(","),
            tags: self.desired_tags(spec).join(" "),
            kubernetes_version: Some(
                spec.version
                    .clone()
                    .unwrap_or_else(|| self.defaults.kubernetes_version.clone()),
            ),
            cni_plugin: Some(spec.cni.clone().unwrap_or_else(|| self.defaults.cni_plugin.clone())),
            instance_firewall: spec.firewall_id.clone().filter(|id| !id.is_empty()),
            firewall_rule: None,
        };
        let created = self.clusters.create(&config).await.context("cannot create cluster")?;
        info!(cluster = %created.id, name = %spec.name, "created cluster");
        Ok(ExternalCreation::named(created.id))
    }

    async fn update(&self, obj: &CivoKubernetes) -> Result<()> {
        let spec = &obj.spec;
        let Some(cluster) = lookup(&self.clusters, obj, &spec.name).await? else {
            return Ok(());
        };
        let drift = self.drift(spec, &cluster);
        let region = self.clusters.region().to_string();
        let base = || KubernetesClusterUpdate {
            region: region.clone(),
            ..Default::default()
        };

        if drift.pools {
            let update = KubernetesClusterUpdate {
                pools: Some(spec.pools.iter().map(pool_config).collect()),
                ..base()
            };
            self.clusters
                .update(&cluster.id, &update)
                .await
                .context("cannot update cluster pools")?;
            info!(cluster = %cluster.id, "updated pools");
        }
        if drift.firewall {
            let update = KubernetesClusterUpdate {
                instance_firewall: spec.firewall_id.clone(),
                ..base()
            };
            self.clusters
                .update(&cluster.id, &update)
                .await
                .context("cannot update cluster firewall")?;
            info!(cluster = %cluster.id, "updated firewall");
        }
        if drift.tags {
            let update = KubernetesClusterUpdate {
                tags: Some(self.desired_tags(spec).join(" ")),
                ..base()
            };
            self.clusters
                .update(&cluster.id, &update)
                .await
                .context("cannot update cluster tags")?;
            info!(cluster = %cluster.id, "updated tags");
        }
        if !drift.applications.is_empty() {
            let update = KubernetesClusterUpdate {
                applications: Some(drift.applications.join(",")),
                ..base()
            };
            self.clusters
                .update(&cluster.id, &update)
                .await
                .context("cannot install cluster applications")?;
            info!(cluster = %cluster.id, applications = ?drift.applications, "installed applications");
        }
        if drift.version {
            let update = KubernetesClusterUpdate {
                kubernetes_version: spec.version.clone(),
                ..base()
            };
            self.clusters
                .update(&cluster.id, &update)
                .await
                .context("cannot upgrade cluster")?;
            info!(cluster = %cluster.id, version = ?spec.version, "upgrading cluster");
        }
        Ok(())
    }

    async fn delete(&self, obj: &CivoKubernetes) -> Result<()> {
        let Some(cluster) = lookup(&self.clusters, obj, &obj.spec.name).await? else {
            debug!(name = %obj.spec.name, "cluster already gone");
            return Ok(());
        };
        self.clusters
            .delete(&cluster.id)
            .await
            .or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })
            .context("cannot delete cluster")?;
        info!(cluster = %cluster.id, "deleted cluster");
        Ok(())
    }
}

impl Connector<CivoKubernetes> for CivoConnector {
    type Error = Error;
    type External = ClusterClient;

    async fn connect(&self, obj: &CivoKubernetes) -> Result<ClusterClient> {
        Ok(ClusterClient::new(self.civo_client(obj).await?, self.defaults()))
    }
}
