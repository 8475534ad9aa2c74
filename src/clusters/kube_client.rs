/// [`ClusterClient`] backed by the kube dynamic API
use async_trait::async_trait;
use kube::api::{Api, DeleteParams, DynamicObject, PostParams};
use kube::Client;
use tracing::debug;

use super::client::{ApiError, ClusterClient};
use crate::resources::{Resource, ResourceAddress};

/// Dynamic client for arbitrary group/version/resource collections
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying kube client
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn api(&self, address: &ResourceAddress, namespace: &str) -> Api<DynamicObject> {
        let api_resource = address.to_api_resource();
        if namespace.is_empty() {
            Api::all_with(self.client.clone(), &api_resource)
        } else {
            Api::namespaced_with(self.client.clone(), namespace, &api_resource)
        }
    }
}

fn to_object(resource: &Resource) -> Result<DynamicObject, ApiError> {
    Ok(serde_json::from_value(resource.clone().into_value())?)
}

fn from_object(object: DynamicObject) -> Result<Resource, ApiError> {
    let value = serde_json::to_value(object)?;
    Resource::from_value(value)
        .map_err(|err| ApiError::Serialization(serde::de::Error::custom(err)))
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn get(
        &self,
        address: &ResourceAddress,
        namespace: &str,
        name: &str,
    ) -> Result<Resource, ApiError> {
        debug!(%address, namespace, name, "GET");
        let object = self.api(address, namespace).get(name).await?;
        from_object(object)
    }

    async fn create(
        &self,
        address: &ResourceAddress,
        namespace: &str,
        resource: &Resource,
    ) -> Result<Resource, ApiError> {
        debug!(%address, namespace, name = resource.name(), "POST");
        let object = to_object(resource)?;
        let created = self
            .api(address, namespace)
            .create(&PostParams::default(), &object)
            .await?;
        from_object(created)
    }

    async fn update(
        &self,
        address: &ResourceAddress,
        namespace: &str,
        name: &str,
        resource: &Resource,
    ) -> Result<Resource, ApiError> {
        debug!(%address, namespace, name, "PUT");
        let object = to_object(resource)?;
        let updated = self
            .api(address, namespace)
            .replace(name, &PostParams::default(), &object)
            .await?;
        from_object(updated)
    }

    async fn delete(
        &self,
        address: &ResourceAddress,
        namespace: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        debug!(%address, namespace, name, "DELETE");
        self.api(address, namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}
