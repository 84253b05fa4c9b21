//! Common components for building providers of managed external resources
//!
//! A managed resource is a cluster-scoped custom resource whose spec declares
//! an object living outside the cluster. This crate drives such resources
//! through a four step lifecycle on top of [`kube::runtime::Controller`]:
//!
//! - [`Connector::connect`] resolves credentials into an [`ExternalClient`],
//! - [`ExternalClient::observe`] reports whether the external object exists and is up to date,
//! - [`ExternalClient::create`] or [`ExternalClient::update`] converge it,
//! - [`ExternalClient::delete`] tears it down once the resource is deleted.
//!
//! The driver owns the finalizer, the `Ready` and `Synced` [`conditions`],
//! the external-name annotation, the [`connection`] secret and requeue backoff.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backoff;
pub mod conditions;
pub mod connection;
pub mod controller;
pub mod events;
pub mod managed;
pub mod reconciler;

pub use conditions::{Condition, ConditionReason, ConditionStatus, ConditionType};
pub use controller::run;
pub use managed::{
    external_name, ConnectionDetails, ConnectionSecretTarget, Connector, DeletionPolicy, ExternalClient,
    ExternalCreation, ExternalError, ExternalObservation, Managed, ProviderConfigReference, Readiness,
};
pub use reconciler::{Config, Context, Error};

/// Convient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;
