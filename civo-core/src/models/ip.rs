//! Reserved public IPs, `/v2/ips`
use serde::{Deserialize, Serialize};

/// What a reserved IP is bound to
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct IpAssignment {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub name: String,
}

/// A reserved IP
///
/// IPs have no lifecycle of their own; presence means usable.
#[allow(missing_docs)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Ip {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub assigned_to: Option<IpAssignment>,
}

impl Ip {
    /// The id of the object this IP is bound to, if any
    pub fn assignee(&self) -> Option<&str> {
        self.assigned_to
            .as_ref()
            .map(|a| a.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

impl_resource!(Ip, "reserved ip", "/v2/ips", |i| &i.name);

/// Body of `POST /v2/ips`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IpConfig {
    pub name: String,
    pub region: String,
}

/// Body of `POST /v2/ips/{id}/actions`
#[allow(missing_docs)]
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum IpAction {
    Assign {
        assign_to_id: String,
        assign_to_type: String,
        region: String,
    },
    Unassign {
        region: String,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_assignment_is_no_assignee() {
        let ip: Ip = serde_json::from_str(
            r#"{"id":"ip-1","name":"web","ip":"1.2.3.4","assigned_to":{"id":"","type":"","name":""}}"#,
        )
        .unwrap();
        assert_eq!(ip.assignee(), None);
        let ip: Ip = serde_json::from_str(
            r#"{"id":"ip-1","name":"web","ip":"1.2.3.4","assigned_to":{"id":"i-1","type":"instance","name":"web"}}"#,
        )
        .unwrap();
        assert_eq!(ip.assignee(), Some("i-1"));
    }

    #[test]
    fn actions_are_tagged() {
        let body = serde_json::to_string(&IpAction::Unassign { region: "LON1".into() }).unwrap();
        assert_eq!(body, r#"{"action":"unassign","region":"LON1"}"#);
    }
}
