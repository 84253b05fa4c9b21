//! Civo block storage volumes
use civo_client::Api;
use civo_core::models::{Network, Volume, VolumeConfig, VolumePhase};
use civo_runtime::{Connector, ExternalClient, ExternalCreation, ExternalObservation, Readiness};
use tracing::{info, warn};

use super::{lookup, network_or_default, phase_name};
use crate::{
    apis::{volume::VolumeObservation, CivoVolume, CivoVolumeSpec},
    connector::CivoConnector,
    error::{Context, Error, Result},
};

/// Drives [`CivoVolume`] resources through the volumes API
///
/// Volumes only grow; a smaller size in the spec is ignored.
pub struct VolumeClient {
    volumes: Api<Volume>,
    networks: Api<Network>,
}

impl VolumeClient {
    /// Create a client for volumes in the region of `client`
    pub fn new(client: civo_client::Client) -> Self {
        Self {
            volumes: Api::new(client.clone()),
            networks: Api::new(client),
        }
    }
}

fn needs_resize(spec: &CivoVolumeSpec, volume: &Volume) -> bool {
    spec.size_gb > volume.size_gigabytes
}

fn needs_attach(spec: &CivoVolumeSpec, volume: &Volume) -> bool {
    spec.instance_id
        .as_deref()
        .is_some_and(|id| !id.is_empty() && id != volume.instance_id)
}

impl ExternalClient<CivoVolume> for VolumeClient {
    type Error = Error;
    type Observation = VolumeObservation;

    async fn observe(&self, obj: &CivoVolume) -> Result<ExternalObservation<VolumeObservation>> {
        let Some(volume) = lookup(&self.volumes, obj, &obj.spec.name).await? else {
            return Ok(ExternalObservation::absent());
        };
        if obj.spec.size_gb < volume.size_gigabytes {
            warn!(volume = %volume.id, desired = obj.spec.size_gb, observed = volume.size_gigabytes, "volumes cannot shrink");
        }
        let observed = ExternalObservation::present(VolumeObservation {
            id: volume.id.clone(),
            name: volume.name.clone(),
            size_gb: volume.size_gigabytes,
            instance_id: volume.instance_id.clone(),
            mountpoint: volume.mountpoint.clone(),
            status: phase_name(&volume.status),
        });
        match volume.status {
            VolumePhase::Available | VolumePhase::Attached => Ok(observed
                .up_to_date(!needs_resize(&obj.spec, &volume) && !needs_attach(&obj.spec, &volume))
                .ready(Readiness::Available)
                .with_message(format!("Volume is {}", phase_name(&volume.status).to_lowercase()))),
            VolumePhase::PendingInstanceStart => Ok(observed
                .ready(Readiness::Creating)
                .with_message("Volume is waiting for its instance to start")),
            VolumePhase::Provisioning | VolumePhase::Unknown => Ok(observed
                .ready(Readiness::Creating)
                .with_message("Volume is being provisioned")),
            VolumePhase::Deleting => Ok(observed
                .ready(Readiness::Deleting)
                .with_message("Volume is being deleted")),
            VolumePhase::Failed => Err(Error::RemoteFailed {
                kind: "volume",
                id: volume.id,
                status: phase_name(&volume.status),
            }),
        }
    }

    async fn create(&self, obj: &CivoVolume) -> Result<ExternalCreation> {
        let spec = &obj.spec;
        if let Some(existing) = self.volumes.find(&spec.name).await.context("cannot find volume")? {
            return Ok(ExternalCreation::named(existing.id));
        }
        let config = VolumeConfig {
            name: spec.name.clone(),
            size_gb: spec.size_gb,
            region: self.volumes.region().to_string(),
            network_id: network_or_default(&self.networks, spec.network_id.as_deref()).await?,
            cluster_id: None,
            bootable: false,
        };
        let created = self.volumes.create(&config).await.context("cannot create volume")?;
        info!(volume = %created.id, name = %spec.name, size_gb = spec.size_gb, "created volume");
        Ok(ExternalCreation::named(created.id))
    }

    async fn update(&self, obj: &CivoVolume) -> Result<()> {
        let spec = &obj.spec;
        let Some(volume) = lookup(&self.volumes, obj, &spec.name).await? else {
            return Ok(());
        };
        if needs_resize(spec, &volume) {
            self.volumes
                .resize(&volume.id, spec.size_gb)
                .await
                .context("cannot resize volume")?;
            info!(volume = %volume.id, size_gb = spec.size_gb, "resized volume");
        }
        if let Some(instance) = spec.instance_id.as_deref().filter(|_| needs_attach(spec, &volume)) {
            self.volumes
                .attach(&volume.id, instance)
                .await
                .context("cannot attach volume")?;
            info!(volume = %volume.id, instance, "attached volume");
        }
        Ok(())
    }

    async fn delete(&self, obj: &CivoVolume) -> Result<()> {
        let Some(volume) = lookup(&self.volumes, obj, &obj.spec.name).await? else {
            return Ok(());
        };
        self.volumes
            .delete(&volume.id)
            .await
            .or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })
            .context("cannot delete volume")?;
        info!(volume = %volume.id, "deleted volume");
        Ok(())
    }
}

impl Connector<CivoVolume> for CivoConnector {
    type Error = Error;
    type External = VolumeClient;

    async fn connect(&self, obj: &CivoVolume) -> Result<VolumeClient> {
        Ok(VolumeClient::new(self.civo_client(obj).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::{civo_client, timeout_after_1s};

    use http::Method;
    use serde_json::json;

    fn volume(size_gb: u32, instance: Option<&str>) -> CivoVolume {
        CivoVolume::new("data", CivoVolumeSpec {
            name: "data".into(),
            size_gb,
            network_id: None,
            instance_id: instance.map(Into::into),
            provider_config_ref: None,
            deletion_policy: Default::default(),
        })
    }

    fn listed(size: u32, instance: &str) -> serde_json::Value {
        json!([{"id": "v-1", "name": "data", "size_gigabytes": size, "instance_id": instance, "status": "available"}])
    }

    #[tokio::test]
    async fn grown_and_attached_volume() {
        let (client, mut server) = civo_client();
        let external = VolumeClient::new(client);
        let obj = volume(50, Some("i-1"));
        let mocksrv = tokio::spawn(async move {
            server.ok(Method::GET, "/v2/volumes?region=LON1", listed(20, "")).await;
            server.ok(Method::GET, "/v2/volumes?region=LON1", listed(20, "")).await;
            let body = server
                .ok(Method::PUT, "/v2/volumes/v-1/resize?region=LON1", json!({"result": "success"}))
                .await;
            assert_eq!(body, json!({"size_gb": 50, "region": "LON1"}));
            let body = server
                .ok(Method::PUT, "/v2/volumes/v-1/attach?region=LON1", json!({"result": "success"}))
                .await;
            assert_eq!(body, json!({"instance_id": "i-1", "region": "LON1"}));
        });

        let observed = external.observe(&obj).await.unwrap();
        assert!(!observed.resource_up_to_date);
        external.update(&obj).await.unwrap();
        timeout_after_1s(mocksrv).await;
    }

    #[tokio::test]
    async fn smaller_size_never_shrinks() {
        let (client, mut server) = civo_client();
        let external = VolumeClient::new(client);
        let obj = volume(10, None);
        let mocksrv = tokio::spawn(async move {
            server.ok(Method::GET, "/v2/volumes?region=LON1", listed(20, "i-1")).await;
        });

        let observed = external.observe(&obj).await.unwrap();
        assert!(observed.resource_up_to_date);
        assert_eq!(observed.readiness, Some(Readiness::Available));
        assert_eq!(observed.at_provider.unwrap().size_gb, 20);
        timeout_after_1s(mocksrv).await;
    }

    #[tokio::test]
    async fn delete_of_missing_volume_succeeds() {
        let (client, mut server) = civo_client();
        let external = VolumeClient::new(client);
        let mocksrv = tokio::spawn(async move {
            server.ok(Method::GET, "/v2/volumes?region=LON1", json!([])).await;
        });

        external.delete(&volume(10, None)).await.unwrap();
        timeout_after_1s(mocksrv).await;
    }
}
