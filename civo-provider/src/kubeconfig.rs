//! Connection details of a cluster from its kubeconfig
use base64::{engine::general_purpose::STANDARD, Engine};
use civo_runtime::ConnectionDetails;
use serde::Deserialize;
use thiserror::Error;

/// The parts of a kubeconfig needed to reach a cluster
#[derive(Deserialize, Debug, Default)]
struct Kubeconfig {
    #[serde(default)]
    clusters: Vec<NamedCluster>,
    #[serde(default)]
    contexts: Vec<NamedContext>,
    #[serde(default)]
    users: Vec<NamedUser>,
    #[serde(rename = "current-context")]
    current_context: Option<String>,
}

#[derive(Deserialize, Debug)]
struct NamedCluster {
    name: String,
    cluster: Option<Cluster>,
}

#[derive(Deserialize, Debug)]
struct Cluster {
    server: Option<String>,
    #[serde(rename = "certificate-authority-data")]
    certificate_authority_data: Option<String>,
}

#[derive(Deserialize, Debug)]
struct NamedContext {
    name: String,
    context: Option<Context>,
}

#[derive(Deserialize, Debug)]
struct Context {
    cluster: String,
    #[serde(default)]
    user: String,
}

#[derive(Deserialize, Debug)]
struct NamedUser {
    name: String,
    user: Option<User>,
}

#[derive(Deserialize, Debug)]
struct User {
    #[serde(rename = "client-certificate-data")]
    client_certificate_data: Option<String>,
    #[serde(rename = "client-key-data")]
    client_key_data: Option<String>,
}

/// Errors extracting connection details from a kubeconfig
#[derive(Error, Debug)]
pub enum Error {
    /// The kubeconfig is not valid YAML
    #[error("cannot parse kubeconfig: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// No context matches the cluster and no current context is set
    #[error("context configuration is not found for cluster: {0}")]
    MissingContext(String),

    /// The context points at a missing cluster entry
    #[error("cluster configuration is not found: {0}")]
    MissingCluster(String),

    /// The context points at a missing user entry
    #[error("auth-info configuration is not found: {0}")]
    MissingUser(String),

    /// Embedded certificate data is not valid base64
    #[error("cannot decode {field}: {source}")]
    Decode {
        /// The kubeconfig field
        field: &'static str,
        /// Decoding failure
        #[source]
        source: base64::DecodeError,
    },
}

/// Extract the endpoint and credentials of `cluster` from its kubeconfig
///
/// The context named after the cluster is used, falling back to the current
/// context. Certificate data is published decoded; the full kubeconfig is
/// published as is.
pub fn connection_details(kubeconfig: &str, cluster: &str) -> Result<ConnectionDetails, Error> {
    let config: Kubeconfig = serde_yaml::from_str(kubeconfig).map_err(Error::Parse)?;
    let context = config
        .contexts
        .iter()
        .find(|c| c.name == cluster)
        .or_else(|| {
            let current = config.current_context.as_deref()?;
            config.contexts.iter().find(|c| c.name == current)
        })
        .and_then(|c| c.context.as_ref())
        .ok_or_else(|| Error::MissingContext(cluster.to_string()))?;

    let server = config
        .clusters
        .iter()
        .find(|c| c.name == context.cluster)
        .and_then(|c| c.cluster.as_ref())
        .ok_or_else(|| Error::MissingCluster(context.cluster.clone()))?;
    let auth = config
        .users
        .iter()
        .find(|u| u.name == context.user)
        .and_then(|u| u.user.as_ref())
        .ok_or_else(|| Error::MissingUser(context.user.clone()))?;

    let mut details = ConnectionDetails::new();
    if let Some(endpoint) = &server.server {
        details.insert("endpoint".into(), endpoint.clone().into_bytes());
    }
    if let Some(ca) = &server.certificate_authority_data {
        details.insert("ca".into(), decode("certificate-authority-data", ca)?);
    }
    if let Some(cert) = &auth.client_certificate_data {
        details.insert("client-cert".into(), decode("client-certificate-data", cert)?);
    }
    if let Some(key) = &auth.client_key_data {
        details.insert("client-key".into(), decode("client-key-data", key)?);
    }
    details.insert("kubeconfig".into(), kubeconfig.as_bytes().to_vec());
    Ok(details)
}

fn decode(field: &'static str, data: &str) -> Result<Vec<u8>, Error> {
    STANDARD
        .decode(data.trim())
        .map_err(|source| Error::Decode { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
clusters:
- cluster:
    certificate-authority-data: Y2EtZGF0YQ==
    server: https://74.220.1.2:6443
  name: prod
contexts:
- context:
    cluster: prod
    user: prod
  name: prod
current-context: prod
users:
- name: prod
  user:
    client-certificate-data: Y2VydC1kYXRh
    client-key-data: a2V5LWRhdGE=
"#;

    #[test]
    fn extracts_decoded_credentials() {
        let details = connection_details(KUBECONFIG, "prod").unwrap();
        assert_eq!(details["endpoint"], b"https://74.220.1.2:6443".to_vec());
        assert_eq!(details["ca"], b"ca-data".to_vec());
        assert_eq!(details["client-cert"], b"cert-data".to_vec());
        assert_eq!(details["client-key"], b"key-data".to_vec());
        assert_eq!(details["kubeconfig"], KUBECONFIG.as_bytes().to_vec());
    }

    #[test]
    fn falls_back_to_current_context() {
        let details = connection_details(KUBECONFIG, "renamed").unwrap();
        assert_eq!(details["endpoint"], b"https://74.220.1.2:6443".to_vec());
    }

    #[test]
    fn missing_context_is_an_error() {
        let config = KUBECONFIG.replace("current-context: prod", "");
        let err = connection_details(&config, "other").unwrap_err();
        assert!(matches!(err, Error::MissingContext(name) if name == "other"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(connection_details("clusters: [", "prod").is_err());
    }
}
