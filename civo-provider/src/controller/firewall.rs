//! Civo firewalls and their rules
use civo_client::Api;
use civo_core::models::{Firewall, FirewallConfig, FirewallRule, FirewallRuleConfig, Network};
use civo_runtime::{Connector, ExternalClient, ExternalCreation, ExternalObservation, Readiness};
use tracing::{debug, info, warn};

use super::{lookup, network_or_default};
use crate::{
    apis::{
        firewall::{FirewallObservation, FirewallRuleSpec},
        CivoFirewall,
    },
    connector::CivoConnector,
    error::{Context, Error, Result},
};

/// Drives [`CivoFirewall`] resources through the firewalls API
///
/// Rules are reconciled as a set: remote rules missing from the spec are
/// deleted and declared rules missing remotely are created.
pub struct FirewallClient {
    firewalls: Api<Firewall>,
    networks: Api<Network>,
}

impl FirewallClient {
    /// Create a client for firewalls in the region of `client`
    pub fn new(client: civo_client::Client) -> Self {
        Self {
            firewalls: Api::new(client.clone()),
            networks: Api::new(client),
        }
    }

    fn rule_config(&self, rule: &FirewallRuleSpec) -> FirewallRuleConfig {
        FirewallRuleConfig {
            protocol: rule.protocol.to_lowercase(),
            start_port: rule.start_port.to_string(),
            end_port: rule.end_port.unwrap_or(rule.start_port).to_string(),
            cidr: rule.cidr.clone(),
            direction: rule.direction.to_lowercase(),
            action: rule.action.to_lowercase(),
            label: rule.label.clone(),
            region: self.firewalls.region().to_string(),
        }
    }
}

/// What makes two rules the same rule
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RuleKey {
    protocol: String,
    start_port: String,
    end_port: String,
    cidr: Vec<String>,
    direction: String,
    action: String,
}

impl RuleKey {
    fn new(protocol: &str, start: &str, end: &str, cidr: &[String], direction: &str, action: &str) -> Self {
        let mut cidr = cidr.to_vec();
        cidr.sort();
        Self {
            protocol: protocol.to_lowercase(),
            start_port: start.to_string(),
            end_port: (if end.is_empty() { start } else { end }).to_string(),
            cidr,
            direction: direction.to_lowercase(),
            action: action.to_lowercase(),
        }
    }
}

impl From<&FirewallRuleSpec> for RuleKey {
    fn from(rule: &FirewallRuleSpec) -> Self {
        let end = rule.end_port.unwrap_or(rule.start_port);
        Self::new(
            &rule.protocol,
            &rule.start_port.to_string(),
            &end.to_string(),
            &rule.cidr,
            &rule.direction,
            &rule.action,
        )
    }
}

impl From<&FirewallRule> for RuleKey {
    fn from(rule: &FirewallRule) -> Self {
        Self::new(
            &rule.protocol,
            &rule.start_port,
            &rule.end_port,
            &rule.cidr,
            &rule.direction,
            &rule.action,
        )
    }
}

/// Rules to create and remote rules to delete
fn plan<'a>(
    desired: &'a [FirewallRuleSpec],
    observed: &'a [FirewallRule],
) -> (Vec<&'a FirewallRuleSpec>, Vec<&'a FirewallRule>) {
    let desired_keys = desired.iter().map(RuleKey::from).collect::<Vec<_>>();
    let observed_keys = observed.iter().map(RuleKey::from).collect::<Vec<_>>();
    let missing = desired
        .iter()
        .zip(&desired_keys)
        .filter(|(_, key)| !observed_keys.contains(key))
        .map(|(rule, _)| rule)
        .collect();
    let extra = observed
        .iter()
        .zip(&observed_keys)
        .filter(|(_, key)| !desired_keys.contains(key))
        .map(|(rule, _)| rule)
        .collect();
    (missing, extra)
}

impl ExternalClient<CivoFirewall> for FirewallClient {
    type Error = Error;
    type Observation = FirewallObservation;

    async fn observe(&self, obj: &CivoFirewall) -> Result<ExternalObservation<FirewallObservation>> {
        let Some(firewall) = lookup(&self.firewalls, obj, &obj.spec.name).await? else {
            return Ok(ExternalObservation::absent());
        };
        let rules = self
            .firewalls
            .rules(&firewall.id)
            .await
            .context("cannot list firewall rules")?;
        let (missing, extra) = plan(&obj.spec.rules, &rules);
        if !missing.is_empty() || !extra.is_empty() {
            debug!(firewall = %firewall.id, missing = missing.len(), extra = extra.len(), "firewall rules drifted");
        }
        Ok(ExternalObservation::present(FirewallObservation {
            id: firewall.id.clone(),
            network_id: firewall.network_id.clone(),
            rules_count: rules.len() as u32,
            instance_count: firewall.instance_count,
            cluster_count: firewall.cluster_count,
        })
        .up_to_date(missing.is_empty() && extra.is_empty())
        .ready(Readiness::Available))
    }

    async fn create(&self, obj: &CivoFirewall) -> Result<ExternalCreation> {
        let spec = &obj.spec;
        if let Some(existing) = self.firewalls.find(&spec.name).await.context("cannot find firewall")? {
            return Ok(ExternalCreation::named(existing.id));
        }
        let config = FirewallConfig {
            name: spec.name.clone(),
            network_id: network_or_default(&self.networks, spec.network_id.as_deref()).await?,
            region: self.firewalls.region().to_string(),
            create_rules: false,
        };
        let created = self.firewalls.create(&config).await.context("cannot create firewall")?;
        info!(firewall = %created.id, name = %spec.name, "created firewall");
        // rules left out here are added by the next update
        for rule in &spec.rules {
            if let Err(err) = self.firewalls.create_rule(&created.id, &self.rule_config(rule)).await {
                warn!(firewall = %created.id, error = %err, "cannot create firewall rule yet");
                break;
            }
        }
        Ok(ExternalCreation::named(created.id))
    }

    async fn update(&self, obj: &CivoFirewall) -> Result<()> {
        let Some(firewall) = lookup(&self.firewalls, obj, &obj.spec.name).await? else {
            return Ok(());
        };
        let rules = self
            .firewalls
            .rules(&firewall.id)
            .await
            .context("cannot list firewall rules")?;
        let (missing, extra) = plan(&obj.spec.rules, &rules);
        for rule in missing {
            let created = self
                .firewalls
                .create_rule(&firewall.id, &self.rule_config(rule))
                .await
                .context("cannot create firewall rule")?;
            info!(firewall = %firewall.id, rule = %created.id, "created firewall rule");
        }
        for rule in extra {
            self.firewalls
                .delete_rule(&firewall.id, &rule.id)
                .await
                .context("cannot delete firewall rule")?;
            info!(firewall = %firewall.id, rule = %rule.id, "deleted firewall rule");
        }
        Ok(())
    }

    async fn delete(&self, obj: &CivoFirewall) -> Result<()> {
        let Some(firewall) = lookup(&self.firewalls, obj, &obj.spec.name).await? else {
            return Ok(());
        };
        self.firewalls
            .delete(&firewall.id)
            .await
            .or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })
            .context("cannot delete firewall")?;
        info!(firewall = %firewall.id, "deleted firewall");
        Ok(())
    }
}

impl Connector<CivoFirewall> for CivoConnector {
    type Error = Error;
    type External = FirewallClient;

    async fn connect(&self, obj: &CivoFirewall) -> Result<FirewallClient> {
        Ok(FirewallClient::new(self.civo_client(obj).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        apis::CivoFirewallSpec,
        controller::testing::{civo_client, timeout_after_1s},
    };

    use http::{Method, StatusCode};
    use serde_json::json;

    fn rule(port: u16, cidr: &[&str]) -> FirewallRuleSpec {
        FirewallRuleSpec {
            protocol: "TCP".into(),
            start_port: port,
            end_port: None,
            cidr: cidr.iter().map(|c| c.to_string()).collect(),
            direction: "ingress".into(),
            action: "allow".into(),
            label: String::new(),
        }
    }

    fn firewall(rules: Vec<FirewallRuleSpec>) -> CivoFirewall {
        CivoFirewall::new("edge", CivoFirewallSpec {
            name: "edge".into(),
            network_id: Some("net-1".into()),
            rules,
            provider_config_ref: None,
            deletion_policy: Default::default(),
        })
    }

    fn remote_rule(id: &str, port: &str, cidr: &[&str]) -> FirewallRule {
        FirewallRule {
            id: id.into(),
            protocol: "tcp".into(),
            start_port: port.into(),
            end_port: port.into(),
            cidr: cidr.iter().map(|c| c.to_string()).collect(),
            direction: "ingress".into(),
            action: "allow".into(),
            ..Default::default()
        }
    }

    #[test]
    fn rules_match_regardless_of_case_and_cidr_order() {
        let desired = vec![rule(443, &["10.0.0.0/8", "0.0.0.0/0"]), rule(22, &["10.0.0.0/8"])];
        let observed = vec![
            remote_rule("r-1", "443", &["0.0.0.0/0", "10.0.0.0/8"]),
            remote_rule("r-2", "80", &["0.0.0.0/0"]),
        ];
        let (missing, extra) = plan(&desired, &observed);
        assert_eq!(missing.iter().map(|r| r.start_port).collect::<Vec<_>>(), vec![22]);
        assert_eq!(extra.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["r-2"]);
    }

    #[tokio::test]
    async fn drifted_rules_are_created_and_deleted() {
        let (client, mut server) = civo_client();
        let external = FirewallClient::new(client);
        let obj = firewall(vec![rule(443, &["0.0.0.0/0"])]);
        let mocksrv = tokio::spawn(async move {
            let listed = json!([{"id": "fw-1", "name": "edge", "network_id": "net-1"}]);
            let rules = json!([{"id": "r-2", "protocol": "tcp", "start_port": "80", "end_port": "80",
                "cidr": ["0.0.0.0/0"], "direction": "ingress", "action": "allow"}]);
            server.ok(Method::GET, "/v2/firewalls?region=LON1", listed.clone()).await;
            server
                .ok(Method::GET, "/v2/firewalls/fw-1/rules?region=LON1", rules.clone())
                .await;
            server.ok(Method::GET, "/v2/firewalls?region=LON1", listed).await;
            server.ok(Method::GET, "/v2/firewalls/fw-1/rules?region=LON1", rules).await;
            let body = server
                .ok(Method::POST, "/v2/firewalls/fw-1/rules?region=LON1", json!({"id": "r-3"}))
                .await;
            assert_eq!(
                body,
                json!({"protocol": "tcp", "start_port": "443", "end_port": "443", "cidr": ["0.0.0.0/0"],
                    "direction": "ingress", "action": "allow", "region": "LON1"})
            );
            server
                .ok(Method::DELETE, "/v2/firewalls/fw-1/rules/r-2?region=LON1", json!({"result": "success"}))
                .await;
        });

        let observed = external.observe(&obj).await.unwrap();
        assert!(!observed.resource_up_to_date);
        assert_eq!(observed.at_provider.as_ref().unwrap().rules_count, 1);
        external.update(&obj).await.unwrap();
        timeout_after_1s(mocksrv).await;
    }

    #[tokio::test]
    async fn create_adds_declared_rules() {
        let (client, mut server) = civo_client();
        let external = FirewallClient::new(client);
        let obj = firewall(vec![rule(22, &["10.0.0.0/8"])]);
        let mocksrv = tokio::spawn(async move {
            server.ok(Method::GET, "/v2/firewalls?region=LON1", json!([])).await;
            let body = server
                .ok(Method::POST, "/v2/firewalls?region=LON1", json!({"id": "fw-9", "result": "success"}))
                .await;
            assert_eq!(
                body,
                json!({"name": "edge", "network_id": "net-1", "region": "LON1", "create_rules": false})
            );
            server
                .ok(Method::POST, "/v2/firewalls/fw-9/rules?region=LON1", json!({"id": "r-1"}))
                .await;
        });

        assert_eq!(external.create(&obj).await.unwrap(), ExternalCreation::named("fw-9"));
        timeout_after_1s(mocksrv).await;
    }

    #[tokio::test]
    async fn firewall_is_named_even_when_a_rule_fails() {
        let (client, mut server) = civo_client();
        let external = FirewallClient::new(client);
        let obj = firewall(vec![rule(22, &["10.0.0.0/8"]), rule(443, &["0.0.0.0/0"])]);
        let mocksrv = tokio::spawn(async move {
            server.ok(Method::GET, "/v2/firewalls?region=LON1", json!([])).await;
            server
                .ok(Method::POST, "/v2/firewalls?region=LON1", json!({"id": "fw-9", "result": "success"}))
                .await;
            server
                .expect(
                    Method::POST,
                    "/v2/firewalls/fw-9/rules?region=LON1",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"code": "internal_error", "reason": "boom"}),
                )
                .await;
        });

        assert_eq!(external.create(&obj).await.unwrap(), ExternalCreation::named("fw-9"));
        timeout_after_1s(mocksrv).await;
    }
}
