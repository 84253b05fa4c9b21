//! Errors of the provider
use thiserror::Error;

/// Errors resolving credentials or driving Civo resources
#[derive(Error, Debug)]
pub enum Error {
    /// The referenced `ProviderConfig` does not exist
    #[error("cannot get provider config {0:?}")]
    ConfigNotFound(String),

    /// The credentials secret does not exist
    #[error("cannot get credentials secret {namespace}/{name}")]
    SecretNotFound {
        /// Namespace of the secret
        namespace: String,
        /// Name of the secret
        name: String,
    },

    /// The credentials are missing, empty or malformed
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// A Kubernetes API call failed
    #[error("{context}: {source}")]
    Kube {
        /// What was attempted
        context: &'static str,
        /// The failure
        #[source]
        source: kube::Error,
    },

    /// A Civo API call failed
    #[error("{context}: {source}")]
    Civo {
        /// What was attempted
        context: &'static str,
        /// The failure
        #[source]
        source: civo_client::Error,
    },

    /// A referenced resource is not ready yet
    #[error("dependency {0} is not ready")]
    DependencyNotReady(String),

    /// The remote resource reached a terminal failure
    #[error("{kind} {id} failed: {status}")]
    RemoteFailed {
        /// Kind of the remote resource
        kind: &'static str,
        /// Its identifier
        id: String,
        /// The status it reported
        status: String,
    },

    /// The cluster kubeconfig could not be read
    #[error(transparent)]
    Kubeconfig(#[from] crate::kubeconfig::Error),
}

impl civo_runtime::ExternalError for Error {
    fn is_terminal(&self) -> bool {
        matches!(self, Error::RemoteFailed { .. })
    }
}

/// Convient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Attach a static operation context to API failures
pub(crate) trait Context<T> {
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> Context<T> for Result<T, civo_client::Error> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| Error::Civo { context, source })
    }
}

impl<T> Context<T> for Result<T, kube::Error> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| Error::Kube { context, source })
    }
}
