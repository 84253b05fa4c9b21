//! Types and traits necessary for interacting with the Civo API
//!
//! This crate provides the minimal client-less abstractions that the
//! [`civo-client`](https://docs.rs/civo-client) crate builds upon:
//! request builders for the REST conventions of the API, the remote
//! resource models returned by it, and the normalized lifecycle phases
//! those models report.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub use error::ErrorResponse;

pub mod request;
pub use request::Request;

mod resource;
pub use resource::{Created, ListResponse, Resource};

pub mod models;

/// Errors that can occur while building Civo API requests
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A request body could not be serialized
    #[error("failed to serialize body: {0}")]
    SerializeBody(#[source] serde_json::Error),

    /// Http based error
    #[error("failed to build request: {0}")]
    BuildRequest(#[source] http::Error),

    /// A path segment was empty or contained a separator
    #[error("invalid path segment: {0:?}")]
    InvalidPathSegment(String),
}

/// Convient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;
