//! Provider configuration: credentials and region for managed resources
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The secret key holding the API token unless configured otherwise
pub const DEFAULT_CREDENTIALS_KEY: &str = "credentials";

/// Where to find the Civo API token and which region to manage
///
/// ```yaml
/// apiVersion: civo.crossplane.io/v1alpha1
/// kind: ProviderConfig
/// metadata:
///   name: default
/// spec:
///   region: LON1
///   credentials:
///     secretRef:
///       namespace: crossplane-system
///       name: civo-provider-secret
///       key: credentials
/// ```
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[kube(
    group = "civo.crossplane.io",
    version = "v1alpha1",
    kind = "ProviderConfig",
    category = "crossplane",
    category = "provider",
    category = "civo",
    printcolumn = r#"{"name":"Region","type":"string","jsonPath":".spec.region"}"#,
    printcolumn = r#"{"name":"Secret","type":"string","priority":1,"jsonPath":".spec.credentials.secretRef.name"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigSpec {
    /// Credentials used to authenticate against the API
    pub credentials: ProviderCredentials,
    /// Region every resource using this config is created in
    pub region: String,
    /// Override of the API endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Credentials of a [`ProviderConfig`]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    /// The secret holding the API token
    pub secret_ref: CredentialsSecretRef,
}

/// Location of the API token
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct CredentialsSecretRef {
    /// Namespace of the secret
    pub namespace: String,
    /// Name of the secret
    pub name: String,
    /// Key of the token within the secret
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    DEFAULT_CREDENTIALS_KEY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_defaults_to_credentials() {
        let spec: ProviderConfigSpec = serde_json::from_value(serde_json::json!({
            "region": "LON1",
            "credentials": {"secretRef": {"namespace": "crossplane-system", "name": "civo"}}
        }))
        .unwrap();
        assert_eq!(spec.credentials.secret_ref.key, "credentials");
        assert_eq!(spec.api_url, None);
    }
}
