//! Traits and types shared by every managed resource kind
use std::{collections::BTreeMap, error::Error as StdError, fmt::Debug, future::Future};

use kube::{Resource, ResourceExt};
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::conditions::Condition;

/// Annotation holding the identifier the external system assigned
pub const EXTERNAL_NAME_ANNOTATION: &str = "crossplane.io/external-name";

/// Credentials and endpoints published for consumers of an external resource
pub type ConnectionDetails = BTreeMap<String, Vec<u8>>;

/// Reference to the cluster-scoped `ProviderConfig` holding credentials
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct ProviderConfigReference {
    /// Name of the referenced `ProviderConfig`
    pub name: String,
}

/// What happens to the external resource when its managed resource is deleted
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
pub enum DeletionPolicy {
    /// Delete the external resource
    #[default]
    Delete,
    /// Leave the external resource behind
    Orphan,
}

/// Where to publish the connection secret of a managed resource
///
/// The secret is named `<connectionSecretNamePrefix>-<resource name>`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSecretTarget {
    /// Prefix of the secret name
    pub connection_secret_name_prefix: String,
    /// Namespace of the secret
    pub connection_secret_namespace: String,
}

impl ConnectionSecretTarget {
    /// The deterministic secret name for the managed resource `owner`
    pub fn secret_name(&self, owner: &str) -> String {
        format!("{}-{}", self.connection_secret_name_prefix, owner)
    }
}

/// A cluster-scoped custom resource that declares an external resource
pub trait Managed:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The `ProviderConfig` credentials are resolved from
    fn provider_config_ref(&self) -> Option<&ProviderConfigReference>;

    /// Whether deleting the resource deletes the external resource
    fn deletion_policy(&self) -> DeletionPolicy {
        DeletionPolicy::Delete
    }

    /// Where connection details are published, if anywhere
    fn connection_secret(&self) -> Option<&ConnectionSecretTarget> {
        None
    }

    /// The conditions currently recorded in the status
    fn conditions(&self) -> &[Condition];
}

/// The identifier the external system assigned to `obj`, once recorded
pub fn external_name<K: Managed>(obj: &K) -> Option<&str> {
    obj.annotations()
        .get(EXTERNAL_NAME_ANNOTATION)
        .map(String::as_str)
        .filter(|name| !name.is_empty())
}

/// Readiness of an external resource, surfaced as the `Ready` condition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// Being provisioned
    Creating,
    /// Ready for use
    Available,
    /// Being torn down
    Deleting,
    /// Failed or otherwise unusable
    Unavailable,
}

/// The result of observing an external resource
#[derive(Clone, Debug, PartialEq)]
pub struct ExternalObservation<O> {
    /// Whether the external resource exists; absence triggers a create
    pub resource_exists: bool,
    /// Whether it matches the desired spec; a mismatch triggers an update
    pub resource_up_to_date: bool,
    /// Details to publish to the connection secret
    pub connection_details: ConnectionDetails,
    /// Projection of the remote state into `status.atProvider`
    pub at_provider: Option<O>,
    /// The readiness the remote state maps to
    pub readiness: Option<Readiness>,
    /// Human readable summary for `status.message`
    pub message: Option<String>,
}

impl<O> ExternalObservation<O> {
    /// The external resource does not exist
    pub fn absent() -> Self {
        Self {
            resource_exists: false,
            resource_up_to_date: false,
            connection_details: ConnectionDetails::new(),
            at_provider: None,
            readiness: None,
            message: None,
        }
    }

    /// The external resource exists; it is up to date until told otherwise
    pub fn present(at_provider: O) -> Self {
        Self {
            resource_exists: true,
            resource_up_to_date: true,
            at_provider: Some(at_provider),
            ..Self::absent()
        }
    }

    /// Set whether the external resource matches the spec
    #[must_use]
    pub fn up_to_date(mut self, up_to_date: bool) -> Self {
        self.resource_up_to_date = up_to_date;
        self
    }

    /// Set the readiness the remote state maps to
    #[must_use]
    pub fn ready(mut self, readiness: Readiness) -> Self {
        self.readiness = Some(readiness);
        self
    }

    /// Set the details to publish
    #[must_use]
    pub fn with_details(mut self, details: ConnectionDetails) -> Self {
        self.connection_details = details;
        self
    }

    /// Set the status message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// The result of creating an external resource
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalCreation {
    /// The identifier the external system assigned, recorded once
    pub external_name: Option<String>,
    /// Details only known at creation time
    pub connection_details: ConnectionDetails,
}

impl ExternalCreation {
    /// A creation that assigned `id`
    pub fn named(id: impl Into<String>) -> Self {
        Self {
            external_name: Some(id.into()),
            ..Self::default()
        }
    }
}

/// Failure of an external call
///
/// Terminal failures mark the resource `Unavailable`; any other failure only
/// fails the reconciliation and leaves readiness as last observed.
pub trait ExternalError: StdError + Send + Sync + 'static {
    /// Whether the external resource reached a state it cannot recover from
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Operations on the external resource of one managed resource kind
///
/// Implementations receive the typed managed resource; no downcasting is needed.
pub trait ExternalClient<K: Managed>: Send + Sync {
    /// Projection of the remote state written to `status.atProvider`
    type Observation: Serialize + Send;

    /// Failure of any external call
    type Error: ExternalError;

    /// Compare the external resource against the desired state
    fn observe(&self, obj: &K) -> impl Future<Output = Result<ExternalObservation<Self::Observation>, Self::Error>> + Send;

    /// Create the external resource; must succeed without effect if it already exists
    fn create(&self, obj: &K) -> impl Future<Output = Result<ExternalCreation, Self::Error>> + Send;

    /// Converge the external resource onto the desired state
    fn update(&self, obj: &K) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Delete the external resource; must succeed if it is already gone
    fn delete(&self, obj: &K) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Produces an [`ExternalClient`] with credentials resolved for a managed resource
pub trait Connector<K: Managed>: Send + Sync + 'static {
    /// The client produced
    type External: ExternalClient<K>;

    /// Failure to resolve credentials
    type Error: StdError + Send + Sync + 'static;

    /// Resolve the provider config of `obj` and build a client for it
    fn connect(&self, obj: &K) -> impl Future<Output = Result<Self::External, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_name_is_prefixed() {
        let target = ConnectionSecretTarget {
            connection_secret_name_prefix: "cluster-details".into(),
            connection_secret_namespace: "crossplane-system".into(),
        };
        assert_eq!(target.secret_name("prod"), "cluster-details-prod");
    }

    #[test]
    fn observation_builders() {
        let obs: ExternalObservation<()> = ExternalObservation::absent();
        assert!(!obs.resource_exists);

        let obs = ExternalObservation::present(1u8).up_to_date(false).ready(Readiness::Creating);
        assert!(obs.resource_exists);
        assert!(!obs.resource_up_to_date);
        assert_eq!(obs.at_provider, Some(1));
        assert_eq!(obs.readiness, Some(Readiness::Creating));
    }
}
