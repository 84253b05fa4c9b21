//! Resolving credentials into Civo API clients
use std::sync::Arc;

use civo_runtime::Managed;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, ResourceExt};
use tracing::debug;

use crate::{
    apis::ProviderConfig,
    error::{Context, Error, Result},
};

/// The `ProviderConfig` used by resources without a reference
pub const DEFAULT_PROVIDER_CONFIG: &str = "default";

/// Values used when a resource leaves them unset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Defaults {
    /// Kubernetes version of new clusters
    pub kubernetes_version: String,
    /// CNI plugin of new clusters
    pub cni_plugin: String,
    /// Tags added to every new cluster
    pub cluster_tags: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            kubernetes_version: "1.28.7-k3s1".to_string(),
            cni_plugin: "flannel".to_string(),
            cluster_tags: vec![],
        }
    }
}

/// Connects managed resources to the Civo API
///
/// Each connection reads the `ProviderConfig` the resource references and the
/// secret holding the API token, so rotated credentials apply on the next
/// reconciliation.
#[derive(Clone)]
pub struct CivoConnector {
    kube: kube::Client,
    defaults: Arc<Defaults>,
    api_url: Option<String>,
}

impl CivoConnector {
    /// Create a connector reading credentials through `kube`
    pub fn new(kube: kube::Client, defaults: Defaults) -> Self {
        Self {
            kube,
            defaults: Arc::new(defaults),
            api_url: None,
        }
    }

    /// Use `url` for configs that do not set their own endpoint
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// The Kubernetes client
    pub fn kube(&self) -> &kube::Client {
        &self.kube
    }

    /// Creation defaults
    pub fn defaults(&self) -> Arc<Defaults> {
        self.defaults.clone()
    }

    /// Resolve the credentials of `obj` into an authenticated client
    pub async fn civo_client<K: Managed>(&self, obj: &K) -> Result<civo_client::Client> {
        let config = self.resolve(obj).await?;
        civo_client::Client::try_from(config).map_err(|source| Error::Civo {
            context: "cannot build civo client",
            source,
        })
    }

    async fn resolve<K: Managed>(&self, obj: &K) -> Result<civo_client::Config> {
        let config_name = obj
            .provider_config_ref()
            .map(|r| r.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PROVIDER_CONFIG);
        let provider_config = Api::<ProviderConfig>::all(self.kube.clone())
            .get_opt(config_name)
            .await
            .context("cannot get provider config")?
            .ok_or_else(|| Error::ConfigNotFound(config_name.to_string()))?;

        let secret_ref = &provider_config.spec.credentials.secret_ref;
        let secret = Api::<Secret>::namespaced(self.kube.clone(), &secret_ref.namespace)
            .get_opt(&secret_ref.name)
            .await
            .context("cannot get credentials secret")?
            .ok_or_else(|| Error::SecretNotFound {
                namespace: secret_ref.namespace.clone(),
                name: secret_ref.name.clone(),
            })?;
        let token = secret
            .data
            .as_ref()
            .and_then(|data| data.get(&secret_ref.key))
            .ok_or_else(|| {
                Error::InvalidCredentials(format!("secret {} has no key {:?}", secret.name_any(), secret_ref.key))
            })?;
        let token = std::str::from_utf8(&token.0)
            .map_err(|_| Error::InvalidCredentials("api key is not valid utf-8".to_string()))?;

        let mut config = civo_client::Config::new(token, &provider_config.spec.region)
            .map_err(|e| Error::InvalidCredentials(e.to_string()))?;
        if let Some(url) = provider_config.spec.api_url.as_ref().or(self.api_url.as_ref()) {
            config = config
                .with_api_url(url)
                .map_err(|e| Error::InvalidCredentials(e.to_string()))?;
        }
        debug!(provider_config = config_name, region = %config.region, "resolved credentials");
        Ok(config)
    }
}
