//! OCSF Schema Client
//!
//! A version-aware client for the [OCSF](https://schema.ocsf.io/) (Open
//! Cybersecurity Schema Framework) schema server.
//!
//! ## Features
//!
//! - **Version Selection**: resolve `latest`, `latest_stable`, the server default,
//!   or an explicit version using semver precedence
//! - **Schema Fetching**: classes and objects for one version, with optional
//!   profiles and extensions
//! - **Layered Configuration**: defaults, `ocsf.toml`, `OCSF__*` environment
//!
//! ## Example
//!
//! ```no_run
//! use ocsf_api::{ClientConfig, OcsfApiClient, VersionSelector};
//!
//! let client = OcsfApiClient::new(ClientConfig::default().fetch_profiles(true))?;
//! let schema = client.get_schema(VersionSelector::LatestStable)?;
//! println!("{}: {} classes", schema.version, schema.classes.len());
//! # Ok::<(), ocsf_api::OcsfApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod schema;
pub mod version;

pub use client::OcsfApiClient;
pub use config::ClientConfig;
pub use error::{OcsfApiError, Result};
pub use schema::{OcsfAttribute, OcsfClass, OcsfExtension, OcsfObject, OcsfProfile, OcsfSchema};
pub use version::{SchemaVersion, SchemaVersions, VersionSelector};
