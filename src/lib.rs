//! kresources - Kubernetes manifests as generic resources
//!
//! Loads YAML manifests into schema-less [`Resource`] values, resolves the
//! API path each resource lives at, and runs create/read/update/delete calls
//! for them through an explicitly passed [`ClusterClient`].

pub mod bulk;
pub mod clusters;
pub mod config;
pub mod error;
pub mod manifests;
pub mod resources;

pub use bulk::{from_cluster, from_files};
pub use clusters::{ClusterClient, ClusterResource, ClusterResourceInput, KubeClusterClient};
pub use config::ClientConfig;
pub use error::{Error, Field, Result};
pub use manifests::Manifest;
pub use resources::{Resource, ResourceAddress};
