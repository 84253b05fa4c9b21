//! Error handling in [`civo_client`][crate]
use thiserror::Error;

pub use civo_core::ErrorResponse;

use crate::config::ConfigError;

/// Possible errors when working with [`civo_client`][crate]
#[derive(Error, Debug)]
pub enum Error {
    /// ApiError for when things fail
    ///
    /// Carries the HTTP status alongside the code the API reported.
    #[error("ApiError: {0} ({0:?})")]
    Api(#[source] ErrorResponse),

    /// Hyper error
    #[error("HyperError: {0}")]
    HyperError(#[source] hyper_util::client::legacy::Error),

    /// Service error
    #[error("ServiceError: {0}")]
    Service(#[source] tower::BoxError),

    /// UTF-8 Error
    #[error("UTF-8 Error: {0}")]
    FromUtf8(#[source] std::string::FromUtf8Error),

    /// Common error case when requesting parsing into own structs
    #[error("Error deserializing response: {0}")]
    SerdeError(#[source] serde_json::Error),

    /// Failed to build request
    #[error("Failed to build request: {0}")]
    BuildRequest(#[source] civo_core::Error),

    /// Configuration error
    #[error("Invalid configuration: {0}")]
    Config(#[source] ConfigError),

    /// An error with configuring TLS occured
    #[error("TlsError: {0}")]
    Tls(#[source] std::io::Error),

    /// A name lookup matched more than one remote object
    #[error("{count} {kind} objects are named {name:?}")]
    MultipleMatches {
        /// Kind of the remote objects
        kind: &'static str,
        /// The name that was looked up
        name: String,
        /// Number of matches
        count: usize,
    },

    /// The region has no network flagged as default
    #[error("no default network in region {0}")]
    NoDefaultNetwork(String),
}

impl Error {
    /// Whether this error means the addressed resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_not_found())
    }
}
