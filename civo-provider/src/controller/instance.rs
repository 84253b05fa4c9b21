//! Civo compute instances
//!
//! Besides the instance itself this strategy owns the SSH key uploaded for it,
//! named `<resource>-ssh`, and binds the reserved IP the spec references once
//! that IP has been observed.
use civo_client::Api;
use civo_core::models::{Instance, InstanceConfig, InstancePhase, InstanceUpdate, Ip, Network, SshKey, SshKeyConfig};
use civo_runtime::{ConnectionDetails, Connector, ExternalClient, ExternalCreation, ExternalObservation, Readiness};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use tracing::{info, warn};

use super::{lookup, network_or_default, phase_name};
use crate::{
    apis::{instance::InstanceObservation, CivoIP, CivoInstance, SecretKeySelector},
    connector::CivoConnector,
    diff,
    error::{Context, Error, Result},
};

/// Drives [`CivoInstance`] resources through the instances API
pub struct InstanceClient {
    instances: Api<Instance>,
    networks: Api<Network>,
    ips: Api<Ip>,
    keys: Api<SshKey>,
    kube: kube::Client,
}

impl InstanceClient {
    /// Create a client for instances in the region of `client`
    ///
    /// `kube` reads SSH keys and the reserved IPs instances refer to.
    pub fn new(client: civo_client::Client, kube: kube::Client) -> Self {
        Self {
            instances: Api::new(client.clone()),
            networks: Api::new(client.clone()),
            ips: Api::new(client.clone()),
            keys: Api::new(client),
            kube,
        }
    }

    /// The remote id of the referenced reserved IP, once it has been observed
    async fn reserved_ip(&self, obj: &CivoInstance) -> Result<Option<String>> {
        let Some(reference) = &obj.spec.reserved_ip else {
            return Ok(None);
        };
        let ip = kube::Api::<CivoIP>::all(self.kube.clone())
            .get_opt(&reference.name)
            .await
            .context("cannot get reserved ip")?;
        ip.and_then(|ip| ip.status)
            .and_then(|status| status.at_provider)
            .map(|observed| observed.id)
            .filter(|id| !id.is_empty())
            .map(Some)
            .ok_or_else(|| Error::DependencyNotReady(format!("CivoIP {}", reference.name)))
    }

    async fn public_key(&self, selector: &SecretKeySelector) -> Result<String> {
        let not_ready = || Error::DependencyNotReady(format!("secret {}/{}", selector.namespace, selector.name));
        let secret = kube::Api::<Secret>::namespaced(self.kube.clone(), &selector.namespace)
            .get_opt(&selector.name)
            .await
            .context("cannot get ssh key secret")?
            .ok_or_else(not_ready)?;
        secret
            .data
            .as_ref()
            .and_then(|data| data.get(&selector.key))
            .and_then(|key| std::str::from_utf8(&key.0).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(not_ready)
    }

    /// Upload the SSH key of `obj` unless a key of the same name exists
    async fn ssh_key(&self, obj: &CivoInstance) -> Result<Option<String>> {
        let Some(selector) = &obj.spec.instance_config.ssh_pub_key_ref else {
            return Ok(None);
        };
        let name = key_name(obj);
        if let Some(existing) = self.keys.find(&name).await.context("cannot find ssh key")? {
            return Ok(Some(existing.id));
        }
        let key = SshKeyConfig {
            public_key: self.public_key(selector).await?,
            name,
        };
        let created = self.keys.create(&key).await.context("cannot upload ssh key")?;
        info!(key = %created.id, name = %key.name, "uploaded ssh key");
        Ok(Some(created.id))
    }

    /// Whether the reserved IP is bound to `instance`
    ///
    /// An IP that is not observed yet counts as unbound so that the update
    /// reports the missing dependency.
    async fn ip_bound(&self, obj: &CivoInstance, instance: &Instance) -> Result<bool> {
        match self.reserved_ip(obj).await {
            Ok(None) => Ok(true),
            Ok(Some(id)) => Ok(self
                .ips
                .get_opt(&id)
                .await
                .context("cannot get reserved ip")?
                .is_some_and(|ip| ip.assignee() == Some(instance.id.as_str()))),
            Err(Error::DependencyNotReady(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn key_name(obj: &CivoInstance) -> String {
    format!("{}-ssh", obj.name_any())
}

fn fields_up_to_date(obj: &CivoInstance, instance: &Instance) -> bool {
    let config = &obj.spec.instance_config;
    // unnamed instances were found by hostname
    let hostname = civo_runtime::external_name(obj).is_none() || config.hostname == instance.hostname;
    hostname && config.notes == instance.notes && !diff::needs_update(&config.tags, &instance.tags)
}

fn details(instance: &Instance) -> ConnectionDetails {
    let mut details = ConnectionDetails::new();
    if !instance.public_ip.is_empty() {
        details.insert("endpoint".into(), instance.public_ip.clone().into_bytes());
        details.insert("port".into(), b"22".to_vec());
    }
    if !instance.initial_user.is_empty() {
        details.insert("username".into(), instance.initial_user.clone().into_bytes());
    }
    details
}

impl ExternalClient<CivoInstance> for InstanceClient {
    type Error = Error;
    type Observation = InstanceObservation;

    async fn observe(&self, obj: &CivoInstance) -> Result<ExternalObservation<InstanceObservation>> {
        let Some(instance) = lookup(&self.instances, obj, &obj.spec.instance_config.hostname).await? else {
            return Ok(ExternalObservation::absent());
        };
        let observed = ExternalObservation::present(InstanceObservation {
            id: instance.id.clone(),
            state: phase_name(&instance.status),
            ipv4: instance.public_ip.clone(),
            private_ipv4: instance.private_ip.clone(),
            ssh_key_id: instance.ssh_key_id.clone(),
            created_at: instance.created_at.clone(),
        });
        match instance.status {
            InstancePhase::Active => {
                let up_to_date = fields_up_to_date(obj, &instance) && self.ip_bound(obj, &instance).await?;
                Ok(observed
                    .up_to_date(up_to_date)
                    .ready(Readiness::Available)
                    .with_details(details(&instance))
                    .with_message("Instance is active"))
            }
            InstancePhase::Provisioning | InstancePhase::Unknown => Ok(observed
                .ready(Readiness::Creating)
                .with_message("Instance is being created")),
            InstancePhase::Stopped => Ok(observed
                .ready(Readiness::Unavailable)
                .with_message("Instance is stopped")),
            InstancePhase::Failed => Err(Error::RemoteFailed {
                kind: "instance",
                id: instance.id,
                status: phase_name(&instance.status),
            }),
        }
    }

    async fn create(&self, obj: &CivoInstance) -> Result<ExternalCreation> {
        let config = &obj.spec.instance_config;
        if let Some(existing) = self
            .instances
            .find(&config.hostname)
            .await
            .context("cannot find instance")?
        {
            return Ok(ExternalCreation::named(existing.id));
        }
        let reserved_ip = self.reserved_ip(obj).await?;
        let request = InstanceConfig {
            hostname: config.hostname.clone(),
            size: config.size.clone(),
            region: self.instances.region().to_string(),
            template_id: config.disk_image.clone(),
            public_ip: config
                .public_ip_required
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "create".to_string()),
            count: 1,
            network_id: network_or_default(&self.networks, config.network_id.as_deref()).await?,
            initial_user: config.initial_user.clone().unwrap_or_default(),
            ssh_key_id: self.ssh_key(obj).await?,
            firewall_id: config.firewall_id.clone().filter(|id| !id.is_empty()),
            script: config.script.clone(),
            notes: config.notes.clone(),
            tags: config.tags.join(" "),
        };
        let created = self.instances.create(&request).await.context("cannot create instance")?;
        info!(instance = %created.id, hostname = %config.hostname, "created instance");
        if let Some(ip) = reserved_ip {
            // retried by the next update once the instance is active
            if let Err(err) = self.ips.assign(&ip, &created.id).await {
                warn!(instance = %created.id, %ip, error = %err, "cannot assign reserved ip yet");
            }
        }
        Ok(ExternalCreation::named(created.id))
    }

    async fn update(&self, obj: &CivoInstance) -> Result<()> {
        let config = &obj.spec.instance_config;
        let Some(instance) = lookup(&self.instances, obj, &config.hostname).await? else {
            return Ok(());
        };
        if !fields_up_to_date(obj, &instance) {
            let update = InstanceUpdate {
                region: self.instances.region().to_string(),
                hostname: config.hostname.clone(),
                notes: config.notes.clone(),
                tags: config.tags.join(" "),
            };
            self.instances
                .update(&instance.id, &update)
                .await
                .context("cannot update instance")?;
            info!(instance = %instance.id, "updated instance");
        }
        if let Some(ip) = self.reserved_ip(obj).await? {
            let current = self.ips.get_opt(&ip).await.context("cannot get reserved ip")?;
            if current.as_ref().and_then(Ip::assignee) != Some(instance.id.as_str()) {
                self.ips
                    .assign(&ip, &instance.id)
                    .await
                    .context("cannot assign reserved ip")?;
                info!(instance = %instance.id, %ip, "assigned reserved ip");
            }
        }
        Ok(())
    }

    async fn delete(&self, obj: &CivoInstance) -> Result<()> {
        if let Some(instance) = lookup(&self.instances, obj, &obj.spec.instance_config.hostname).await? {
            self.instances
                .delete(&instance.id)
                .await
                .or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })
                .context("cannot delete instance")?;
            info!(instance = %instance.id, "deleted instance");
        }
        if obj.spec.instance_config.ssh_pub_key_ref.is_some() {
            if let Some(key) = self.keys.find(&key_name(obj)).await.context("cannot find ssh key")? {
                self.keys
                    .delete(&key.id)
                    .await
                    .or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })
                    .context("cannot delete ssh key")?;
                info!(key = %key.id, "deleted ssh key");
            }
        }
        Ok(())
    }
}

impl Connector<CivoInstance> for CivoConnector {
    type Error = Error;
    type External = InstanceClient;

    async fn connect(&self, obj: &CivoInstance) -> Result<InstanceClient> {
        Ok(InstanceClient::new(self.civo_client(obj).await?, self.kube().clone()))
    }
}
