//! Crate for interacting with the Civo API
//!
//! This crate includes the tools for manipulating Civo resources as well as
//! keeping track of those resources as they change over time.
//!
//! The [`Client`] sends authenticated requests to the API through a
//! [`tower`] service stack, and [`Api`] offers typed access to one kind of
//! remote resource on top of it.
//!
//! # Example
//!
//! ```rust,no_run
//! use civo_client::{Api, Client, Config};
//! use civo_core::models::Network;
//!
//! # async fn doc() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new("my-api-key", "LON1")?;
//! let client = Client::try_from(config)?;
//! let networks: Api<Network> = Api::new(client);
//! let default = networks.default_network().await?;
//! println!("default network is {}", default.id);
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub use api::Api;

pub mod client;
pub use client::Client;

pub mod config;
pub use config::Config;

pub mod error;
pub use error::Error;

pub use civo_core as core;

/// Convient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;
