//! Create, read, update and delete resources on a live cluster

pub mod client;
pub mod connection;
pub mod kube_client;
pub mod resource;

pub use client::{ApiError, ClusterClient};
pub use connection::connect;
pub use kube_client::KubeClusterClient;
pub use resource::{ClusterResource, ClusterResourceInput};
