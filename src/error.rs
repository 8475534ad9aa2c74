/// Error types for manifest loading and cluster operations
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::clusters::ApiError;
use crate::manifests::Manifest;
use crate::resources::{ConversionError, ResourceAddress};

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A required identity field of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Version,
    Kind,
    Name,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Version => "version",
            Field::Kind => "kind",
            Field::Name => "name",
        };
        f.write_str(name)
    }
}

/// Main error type for kresources operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Manifest path does not exist
    #[error("unable to locate file {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Manifest path exists but could not be read
    #[error("unable to read file {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document in the manifest is not valid YAML
    #[error("error decoding document {document} of manifest {}", path.display())]
    YamlDecode {
        path: PathBuf,
        document: usize,
        #[source]
        source: serde_yaml::Error,
        /// Everything loaded before the failing document
        partial: Box<Manifest>,
    },

    /// A document decoded fine but is not a Kubernetes object
    #[error("unable to convert document {document} of manifest {} to a resource", path.display())]
    Conversion {
        path: PathBuf,
        document: usize,
        #[source]
        source: ConversionError,
        partial: Box<Manifest>,
    },

    /// A required identity field is empty
    #[error("missing {0} on resource input")]
    MissingField(Field),

    /// Create, update or delete was requested without a local object
    #[error("missing resource object on cluster resource")]
    MissingResource,

    /// The server answered 404 on a read.
    ///
    /// This is also what an address whose plural does not match the server's
    /// looks like, so it does not necessarily mean the object is absent.
    #[error("{address} {name} not found in namespace {namespace:?}")]
    NotFound {
        address: ResourceAddress,
        namespace: String,
        name: String,
    },

    /// Reading a resource from the cluster failed
    #[error("unable to read {address} {name} from cluster")]
    ClusterRead {
        address: ResourceAddress,
        name: String,
        #[source]
        source: ApiError,
    },

    /// Creating or updating a resource on the cluster failed
    #[error("unable to write {address} {name} to cluster")]
    ClusterWrite {
        address: ResourceAddress,
        name: String,
        #[source]
        source: ApiError,
    },

    /// Deleting a resource from the cluster failed
    #[error("unable to delete {address} {name} from cluster")]
    ClusterDelete {
        address: ResourceAddress,
        name: String,
        #[source]
        source: ApiError,
    },

    /// Client configuration file could not be loaded
    #[error("invalid client configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Kubeconfig could not be read or did not contain the requested context
    #[error(transparent)]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// No usable cluster configuration could be inferred from the environment
    #[error(transparent)]
    InferConfig(#[from] kube::config::InferConfigError),

    /// Cluster client could not be constructed
    #[error("unable to create kubernetes client: {0}")]
    Client(#[from] kube::Error),
}

impl Error {
    /// Create a configuration error for the given file
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The manifest loaded before a decode or conversion failure, if any
    pub fn partial_manifest(&self) -> Option<&Manifest> {
        match self {
            Error::YamlDecode { partial, .. } | Error::Conversion { partial, .. } => Some(&**partial),
            _ => None,
        }
    }

    /// Whether the server reported the addressed object as missing
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::ClusterWrite { source, .. } | Error::ClusterDelete { source, .. } => {
                source.is_not_found()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_display() {
        assert_eq!(Field::Kind.to_string(), "kind");
        assert_eq!(
            Error::MissingField(Field::Name).to_string(),
            "missing name on resource input"
        );
    }

    #[test]
    fn test_missing_kind_and_name_are_distinct() {
        let kind = Error::MissingField(Field::Kind);
        let name = Error::MissingField(Field::Name);
        assert_ne!(kind.to_string(), name.to_string());
    }

    #[test]
    fn test_not_found_classification() {
        let address = ResourceAddress::new("", "v1", "pods");
        let err = Error::NotFound {
            address: address.clone(),
            namespace: "default".to_string(),
            name: "web".to_string(),
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("pods.v1 web"));

        let err = Error::ClusterDelete {
            address: address.clone(),
            name: "web".to_string(),
            source: ApiError::not_found("web"),
        };
        assert!(err.is_not_found());

        let err = Error::ClusterWrite {
            address,
            name: "web".to_string(),
            source: ApiError::conflict("web"),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_partial_manifest_only_on_load_errors() {
        assert!(Error::MissingResource.partial_manifest().is_none());
    }
}
