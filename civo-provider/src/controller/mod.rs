//! Lifecycle strategies of every managed kind
//!
//! Each submodule implements [`civo_runtime::Connector`] for [`CivoConnector`]
//! and an [`civo_runtime::ExternalClient`] translating one kind onto the Civo
//! API. [`run_all`] starts a controller per kind.
use std::fmt::Debug;

use civo_client::Api;
use civo_core::models::Network;
use civo_runtime::{events::EventPublisher, external_name, Config, Managed};
use tracing::info;

use crate::{
    apis::{
        CivoFirewall, CivoIP, CivoInstance, CivoKubernetes, CivoNetwork, CivoObjectStore,
        CivoObjectStoreCredential, CivoVolume,
    },
    connector::CivoConnector,
    error::{Context, Result},
};

pub mod cluster;
pub mod firewall;
pub mod instance;
pub mod ip;
pub mod network;
pub mod objectstore;
pub mod objectstore_credential;
pub mod volume;

#[cfg(test)] mod testing;

/// Name the provider reports as the source of its events
pub const CONTROLLER_NAME: &str = "provider-civo";

/// Run the controllers of every managed kind until a termination signal arrives
pub async fn run_all(client: kube::Client, connector: CivoConnector, config: Config, publish_events: bool) {
    let events = || publish_events.then(|| EventPublisher::new(client.clone(), CONTROLLER_NAME));
    info!(
        poll_interval = ?config.poll_interval,
        sync_period = ?config.sync_period,
        "starting controllers"
    );
    futures::join!(
        civo_runtime::run::<CivoKubernetes, _>(client.clone(), connector.clone(), config.clone(), events()),
        civo_runtime::run::<CivoInstance, _>(client.clone(), connector.clone(), config.clone(), events()),
        civo_runtime::run::<CivoNetwork, _>(client.clone(), connector.clone(), config.clone(), events()),
        civo_runtime::run::<CivoVolume, _>(client.clone(), connector.clone(), config.clone(), events()),
        civo_runtime::run::<CivoIP, _>(client.clone(), connector.clone(), config.clone(), events()),
        civo_runtime::run::<CivoObjectStore, _>(client.clone(), connector.clone(), config.clone(), events()),
        civo_runtime::run::<CivoObjectStoreCredential, _>(
            client.clone(),
            connector.clone(),
            config.clone(),
            events()
        ),
        civo_runtime::run::<CivoFirewall, _>(client.clone(), connector, config, events()),
    );
}

/// Find the remote object of `obj`
///
/// The identifier recorded in the external-name annotation is authoritative;
/// before one is recorded the object is looked up by `name`.
pub(crate) async fn lookup<K, R>(api: &Api<R>, obj: &K, name: &str) -> Result<Option<R>>
where
    K: Managed,
    R: civo_core::Resource + Debug,
{
    match external_name(obj) {
        Some(id) => api.get_opt(id).await.context("cannot get remote object"),
        None => api.find(name).await.context("cannot find remote object"),
    }
}

/// The network to create into: `desired`, else the default network of the region
pub(crate) async fn network_or_default(api: &Api<Network>, desired: Option<&str>) -> Result<String> {
    match desired.filter(|id| !id.is_empty()) {
        Some(id) => Ok(id.to_string()),
        None => Ok(api.default_network().await.context("cannot find default network")?.id),
    }
}

/// Name of a remote phase as shown in `status.atProvider`
pub(crate) fn phase_name(phase: &impl Debug) -> String {
    format!("{phase:?}")
}
