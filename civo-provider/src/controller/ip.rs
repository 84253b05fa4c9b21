//! Civo reserved IPs
use civo_client::Api;
use civo_core::models::{Ip, IpConfig};
use civo_runtime::{ConnectionDetails, Connector, ExternalClient, ExternalCreation, ExternalObservation, Readiness};
use kube::ResourceExt;
use tracing::info;

use super::lookup;
use crate::{
    apis::{
        ip::{AssignedTo, IPObservation},
        CivoIP,
    },
    connector::CivoConnector,
    error::{Context, Error, Result},
};

/// Drives [`CivoIP`] resources through the reserved IP API
///
/// A reserved IP has no mutable fields; instances bind themselves to it.
pub struct IpClient {
    ips: Api<Ip>,
}

impl IpClient {
    /// Create a client for reserved IPs in the region of `client`
    pub fn new(client: civo_client::Client) -> Self {
        Self { ips: Api::new(client) }
    }
}

/// Remote name of the IP: the spec name, else the resource name
fn ip_name(obj: &CivoIP) -> String {
    obj.spec
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| obj.name_any())
}

impl ExternalClient<CivoIP> for IpClient {
    type Error = Error;
    type Observation = IPObservation;

    async fn observe(&self, obj: &CivoIP) -> Result<ExternalObservation<IPObservation>> {
        let Some(ip) = lookup(&self.ips, obj, &ip_name(obj)).await? else {
            return Ok(ExternalObservation::absent());
        };
        let mut details = ConnectionDetails::new();
        if !ip.ip.is_empty() {
            details.insert("endpoint".into(), ip.ip.clone().into_bytes());
        }
        let assigned_to = ip.assignee().and(ip.assigned_to.as_ref()).map(|a| AssignedTo {
            id: a.id.clone(),
            type_: a.type_.clone(),
            name: a.name.clone(),
        });
        Ok(ExternalObservation::present(IPObservation {
            id: ip.id.clone(),
            address: ip.ip.clone(),
            assigned_to,
        })
        .ready(Readiness::Available)
        .with_details(details))
    }

    async fn create(&self, obj: &CivoIP) -> Result<ExternalCreation> {
        let name = ip_name(obj);
        if let Some(existing) = self.ips.find(&name).await.context("cannot find reserved ip")? {
            return Ok(ExternalCreation::named(existing.id));
        }
        let config = IpConfig {
            name: name.clone(),
            region: self.ips.region().to_string(),
        };
        let created = self.ips.create(&config).await.context("cannot create reserved ip")?;
        info!(ip = %created.id, %name, "reserved ip");
        Ok(ExternalCreation::named(created.id))
    }

    async fn update(&self, _obj: &CivoIP) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, obj: &CivoIP) -> Result<()> {
        let Some(ip) = lookup(&self.ips, obj, &ip_name(obj)).await? else {
            return Ok(());
        };
        if let Some(instance) = ip.assignee() {
            self.ips.unassign(&ip.id).await.context("cannot unassign reserved ip")?;
            info!(ip = %ip.id, instance, "unassigned reserved ip");
        }
        self.ips
            .delete(&ip.id)
            .await
            .or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })
            .context("cannot delete reserved ip")?;
        info!(ip = %ip.id, "released reserved ip");
        Ok(())
    }
}

impl Connector<CivoIP> for CivoConnector {
    type Error = Error;
    type External = IpClient;

    async fn connect(&self, obj: &CivoIP) -> Result<IpClient> {
        Ok(IpClient::new(self.civo_client(obj).await?))
    }
}
