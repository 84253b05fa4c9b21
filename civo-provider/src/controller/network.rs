//! Civo private networks
use civo_client::Api;
use civo_core::models::{Network, NetworkConfig, NetworkPhase};
use civo_runtime::{external_name, Connector, ExternalClient, ExternalCreation, ExternalObservation, Readiness};
use tracing::info;

use super::{lookup, phase_name};
use crate::{
    apis::{network::NetworkObservation, CivoNetwork, CivoNetworkSpec},
    connector::CivoConnector,
    diff,
    error::{Context, Error, Result},
};

/// Drives [`CivoNetwork`] resources through the networks API
pub struct NetworkClient {
    networks: Api<Network>,
}

impl NetworkClient {
    /// Create a client for networks in the region of `client`
    pub fn new(client: civo_client::Client) -> Self {
        Self {
            networks: Api::new(client),
        }
    }
}

fn up_to_date(spec: &CivoNetworkSpec, network: &Network, named: bool) -> bool {
    // before the id is recorded the label is what found the network
    let label = !named || spec.label == network.label;
    let nameservers = spec.nameservers.is_empty() || !diff::needs_update(&spec.nameservers, &network.nameservers_v4);
    label && nameservers
}

impl ExternalClient<CivoNetwork> for NetworkClient {
    type Error = Error;
    type Observation = NetworkObservation;

    async fn observe(&self, obj: &CivoNetwork) -> Result<ExternalObservation<NetworkObservation>> {
        let Some(network) = lookup(&self.networks, obj, &obj.spec.label).await? else {
            return Ok(ExternalObservation::absent());
        };
        let observed = ExternalObservation::present(NetworkObservation {
            id: network.id.clone(),
            label: network.label.clone(),
            cidr: network.cidr.clone(),
            status: phase_name(&network.status),
            default: network.default,
            nameservers: network.nameservers_v4.clone(),
        });
        Ok(match network.status {
            NetworkPhase::Active => observed
                .up_to_date(up_to_date(&obj.spec, &network, external_name(obj).is_some()))
                .ready(Readiness::Available)
                .with_message("Network is active"),
            NetworkPhase::Provisioning => observed
                .ready(Readiness::Creating)
                .with_message("Network is being created"),
            NetworkPhase::Deleting => observed
                .ready(Readiness::Deleting)
                .with_message("Network is being deleted"),
        })
    }

    async fn create(&self, obj: &CivoNetwork) -> Result<ExternalCreation> {
        let spec = &obj.spec;
        if let Some(existing) = self.networks.find(&spec.label).await.context("cannot find network")? {
            return Ok(ExternalCreation::named(existing.id));
        }
        let config = NetworkConfig {
            label: spec.label.clone(),
            region: self.networks.region().to_string(),
            cidr_v4: spec.cidr.clone().filter(|c| !c.is_empty()),
            nameservers_v4: (!spec.nameservers.is_empty()).then(|| spec.nameservers.clone()),
        };
        let created = self.networks.create(&config).await.context("cannot create network")?;
        info!(network = %created.id, label = %spec.label, "created network");
        Ok(ExternalCreation::named(created.id))
    }

    async fn update(&self, obj: &CivoNetwork) -> Result<()> {
        let spec = &obj.spec;
        let Some(network) = lookup(&self.networks, obj, &spec.label).await? else {
            return Ok(());
        };
        let config = NetworkConfig {
            label: spec.label.clone(),
            region: self.networks.region().to_string(),
            cidr_v4: None,
            nameservers_v4: (!spec.nameservers.is_empty()).then(|| spec.nameservers.clone()),
        };
        self.networks
            .update(&network.id, &config)
            .await
            .context("cannot update network")?;
        info!(network = %network.id, "updated network");
        Ok(())
    }

    async fn delete(&self, obj: &CivoNetwork) -> Result<()> {
        let Some(network) = lookup(&self.networks, obj, &obj.spec.label).await? else {
            return Ok(());
        };
        self.networks
            .delete(&network.id)
            .await
            .or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })
            .context("cannot delete network")?;
        info!(network = %network.id, "deleted network");
        Ok(())
    }
}

impl Connector<CivoNetwork> for CivoConnector {
    type Error = Error;
    type External = NetworkClient;

    async fn connect(&self, obj: &CivoNetwork) -> Result<NetworkClient> {
        Ok(NetworkClient::new(self.civo_client(obj).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::{civo_client, timeout_after_1s};

    use civo_runtime::managed::EXTERNAL_NAME_ANNOTATION;
    use http::Method;
    use serde_json::json;

    fn network(label: &str, nameservers: &[&str]) -> CivoNetwork {
        let mut obj = CivoNetwork::new("lab", CivoNetworkSpec {
            label: label.into(),
            cidr: None,
            nameservers: nameservers.iter().map(|n| n.to_string()).collect(),
            provider_config_ref: None,
            deletion_policy: Default::default(),
        });
        obj.metadata.annotations = Some([(EXTERNAL_NAME_ANNOTATION.to_string(), "net-2".to_string())].into());
        obj
    }

    #[tokio::test]
    async fn relabelled_network_is_updated() {
        let (client, mut server) = civo_client();
        let external = NetworkClient::new(client);
        let obj = network("lab-renamed", &["1.1.1.1"]);
        let mocksrv = tokio::spawn(async move {
            let remote = json!({"id": "net-2", "label": "lab", "status": "Active", "nameservers_v4": ["1.1.1.1"]});
            server.ok(Method::GET, "/v2/networks/net-2?region=LON1", remote.clone()).await;
            server.ok(Method::GET, "/v2/networks/net-2?region=LON1", remote).await;
            let body = server
                .ok(Method::PUT, "/v2/networks/net-2?region=LON1", json!({"result": "success"}))
                .await;
            assert_eq!(
                body,
                json!({"label": "lab-renamed", "region": "LON1", "nameservers_v4": ["1.1.1.1"]})
            );
        });

        let observed = external.observe(&obj).await.unwrap();
        assert!(!observed.resource_up_to_date);
        assert_eq!(observed.at_provider.as_ref().unwrap().status, "Active");
        external.update(&obj).await.unwrap();
        timeout_after_1s(mocksrv).await;
    }

    #[tokio::test]
    async fn pending_network_is_creating() {
        let (client, mut server) = civo_client();
        let external = NetworkClient::new(client);
        let obj = network("lab", &[]);
        let mocksrv = tokio::spawn(async move {
            server
                .ok(
                    Method::GET,
                    "/v2/networks/net-2?region=LON1",
                    json!({"id": "net-2", "label": "lab", "status": "Building"}),
                )
                .await;
        });

        let observed = external.observe(&obj).await.unwrap();
        assert!(observed.resource_exists);
        assert_eq!(observed.readiness, Some(Readiness::Creating));
        timeout_after_1s(mocksrv).await;
    }

    #[tokio::test]
    async fn create_sends_cidr_and_nameservers() {
        let (client, mut server) = civo_client();
        let external = NetworkClient::new(client);
        let mut obj = network("lab", &["8.8.8.8"]);
        obj.spec.cidr = Some("10.0.0.0/24".into());
        let mocksrv = tokio::spawn(async move {
            server
                .ok(Method::GET, "/v2/networks?region=LON1", json!([{"id": "net-1", "label": "Default"}]))
                .await;
            let body = server
                .ok(Method::POST, "/v2/networks?region=LON1", json!({"id": "net-3", "result": "success"}))
                .await;
            assert_eq!(
                body,
                json!({"label": "lab", "region": "LON1", "cidr_v4": "10.0.0.0/24", "nameservers_v4": ["8.8.8.8"]})
            );
        });

        assert_eq!(external.create(&obj).await.unwrap(), ExternalCreation::named("net-3"));
        timeout_after_1s(mocksrv).await;
    }
}
