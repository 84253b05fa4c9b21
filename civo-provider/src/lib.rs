//! Kubernetes provider for Civo cloud resources
//!
//! Clusters, instances, networks, volumes, reserved IPs, object stores, object
//! store credentials and firewalls are declared as cluster-scoped custom
//! resources in [`apis`]. The strategies in [`controller`] translate each kind
//! onto the Civo API, and [`civo_runtime`] drives them through observe, create,
//! update and delete.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod apis;
pub mod connector;
pub mod controller;
pub mod diff;
pub mod error;
pub mod kubeconfig;

pub use connector::{CivoConnector, Defaults};
pub use error::{Error, Result};
