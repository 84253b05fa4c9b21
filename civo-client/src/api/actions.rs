//! Kind specific calls that do not fit the generic CRUD surface
use http::Method;

use civo_core::{
    models::{Firewall, FirewallRule, FirewallRuleConfig, Ip, IpAction, Network, Volume, VolumeAttach, VolumeResize},
    Created, ListResponse,
};

use super::Api;
use crate::{Error, Result};

impl Api<Volume> {
    /// Grow a volume to `size_gb` gigabytes
    pub async fn resize(&self, id: &str, size_gb: u32) -> Result<()> {
        let body = VolumeResize {
            size_gb,
            region: self.region().to_string(),
        };
        let req = self
            .request
            .action(Method::PUT, id, "resize", &body)
            .map_err(Error::BuildRequest)?;
        self.client.request_text(req).await.map(|_| ())
    }

    /// Attach a volume to an instance
    pub async fn attach(&self, id: &str, instance_id: &str) -> Result<()> {
        let body = VolumeAttach {
            instance_id: instance_id.to_string(),
            region: self.region().to_string(),
        };
        let req = self
            .request
            .action(Method::PUT, id, "attach", &body)
            .map_err(Error::BuildRequest)?;
        self.client.request_text(req).await.map(|_| ())
    }
}

impl Api<Ip> {
    /// Bind a reserved IP to an instance
    pub async fn assign(&self, id: &str, instance_id: &str) -> Result<()> {
        let action = IpAction::Assign {
            assign_to_id: instance_id.to_string(),
            assign_to_type: "instance".to_string(),
            region: self.region().to_string(),
        };
        self.ip_action(id, &action).await
    }

    /// Release a reserved IP from whatever it is bound to
    pub async fn unassign(&self, id: &str) -> Result<()> {
        let action = IpAction::Unassign {
            region: self.region().to_string(),
        };
        self.ip_action(id, &action).await
    }

    async fn ip_action(&self, id: &str, action: &IpAction) -> Result<()> {
        let req = self
            .request
            .action(Method::POST, id, "actions", action)
            .map_err(Error::BuildRequest)?;
        self.client.request_text(req).await.map(|_| ())
    }
}

impl Api<Firewall> {
    /// List the rules of a firewall
    pub async fn rules(&self, id: &str) -> Result<Vec<FirewallRule>> {
        let req = self.request.list_nested(id, "rules").map_err(Error::BuildRequest)?;
        let response = self.client.request::<ListResponse<FirewallRule>>(req).await?;
        Ok(response.into_items())
    }

    /// Add a rule to a firewall
    pub async fn create_rule(&self, id: &str, rule: &FirewallRuleConfig) -> Result<Created> {
        let req = self
            .request
            .action(Method::POST, id, "rules", rule)
            .map_err(Error::BuildRequest)?;
        self.client.request::<Created>(req).await
    }

    /// Remove a rule from a firewall
    pub async fn delete_rule(&self, id: &str, rule_id: &str) -> Result<()> {
        let req = self
            .request
            .delete_nested(id, "rules", rule_id)
            .map_err(Error::BuildRequest)?;
        self.client.request_text(req).await.map(|_| ())
    }
}

impl Api<Network> {
    /// The network the region flags as default
    pub async fn default_network(&self) -> Result<Network> {
        self.list()
            .await?
            .into_iter()
            .find(|n| n.default)
            .ok_or_else(|| Error::NoDefaultNetwork(self.region().to_string()))
    }
}
