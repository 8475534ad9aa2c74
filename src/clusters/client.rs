/// Client capability used to reach a live cluster
use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::resources::{Resource, ResourceAddress};

/// Failure reported by the cluster or by the transport underneath it
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API server answered with a Kubernetes `Status`
    #[error("{message} (reason: {reason}, code: {code})")]
    Status {
        code: u16,
        reason: String,
        message: String,
    },

    /// The request never produced a server answer
    #[error("request failed: {0}")]
    Transport(#[source] Box<kube::Error>),

    /// The object could not be converted to or from the wire format
    #[error("unable to convert object: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// A 404 status for the named object
    pub fn not_found(name: &str) -> Self {
        Self::Status {
            code: 404,
            reason: "NotFound".to_string(),
            message: format!("{:?} not found", name),
        }
    }

    /// A 409 status for the named object
    pub fn conflict(name: &str) -> Self {
        Self::Status {
            code: 409,
            reason: "Conflict".to_string(),
            message: format!(
                "Operation cannot be fulfilled on {:?}: the object has been modified",
                name
            ),
        }
    }

    /// HTTP status code of the server answer, if there was one
    pub fn code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.code() == Some(409)
    }
}

impl From<kube::Error> for ApiError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ref status) => Self::Status {
                code: status.code,
                reason: status.reason.clone(),
                message: status.message.clone(),
            },
            other => Self::Transport(Box::new(other)),
        }
    }
}

/// Verbs of a dynamic Kubernetes API client.
///
/// Every call is addressed by a resolved [`ResourceAddress`] and a namespace;
/// an empty namespace addresses a cluster-scoped collection. Implementations
/// must not retry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetch the current server state of an object
    async fn get(
        &self,
        address: &ResourceAddress,
        namespace: &str,
        name: &str,
    ) -> Result<Resource, ApiError>;

    /// Submit a new object and return the server's copy
    async fn create(
        &self,
        address: &ResourceAddress,
        namespace: &str,
        resource: &Resource,
    ) -> Result<Resource, ApiError>;

    /// Replace the object `name`; `metadata.resourceVersion` must be current
    async fn update(
        &self,
        address: &ResourceAddress,
        namespace: &str,
        name: &str,
        resource: &Resource,
    ) -> Result<Resource, ApiError>;

    async fn delete(
        &self,
        address: &ResourceAddress,
        namespace: &str,
        name: &str,
    ) -> Result<(), ApiError>;
}
