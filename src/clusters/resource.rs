/// A single resource bound to its address on a live cluster
use std::fmt;

use kube::core::GroupVersionKind;
use tracing::{debug, info};

use super::client::{ApiError, ClusterClient};
use crate::error::{Error, Field, Result};
use crate::resources::{Resource, ResourceAddress};

/// Identity of the object a [`ClusterResource`] operates on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterResourceInput {
    /// API group, empty for the core group
    pub group: String,
    pub version: String,
    pub kind: String,
    pub name: String,
    /// Empty for cluster-scoped objects
    pub namespace: String,
}

impl ClusterResourceInput {
    /// Take the identity of an existing resource
    pub fn from_resource(resource: &Resource) -> Self {
        let gvk = resource.group_version_kind();
        Self {
            group: gvk.group,
            version: gvk.version,
            kind: gvk.kind,
            name: resource.name().to_string(),
            namespace: resource.namespace().to_string(),
        }
    }

    /// Ensure every field needed to address the object is set
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(Error::MissingField(Field::Version));
        }

        if self.kind.is_empty() {
            return Err(Error::MissingField(Field::Kind));
        }

        if self.name.is_empty() {
            return Err(Error::MissingField(Field::Name));
        }

        Ok(())
    }

    pub fn group_version_kind(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }
}

/// A resource addressed on a cluster, with the client used to reach it.
///
/// Every operation is a single awaited round trip (two for
/// [`update`](Self::update)); on success the local object is replaced with
/// what the server returned.
pub struct ClusterResource<'c> {
    client: &'c dyn ClusterClient,
    address: ResourceAddress,
    namespace: String,
    name: String,
    resource: Option<Resource>,
}

impl fmt::Debug for ClusterResource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterResource")
            .field("address", &self.address)
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

impl<'c> ClusterResource<'c> {
    /// Address an object by identity; the local object starts as a skeleton
    /// carrying only group/version/kind, name and namespace
    pub fn new(client: &'c dyn ClusterClient, input: ClusterResourceInput) -> Result<Self> {
        input.validate()?;

        let gvk = input.group_version_kind();
        let resource = Resource::from_gvk(&gvk, &input.name, &input.namespace);
        let address = ResourceAddress::from_gvk(&gvk)?;

        Ok(Self {
            client,
            address,
            namespace: input.namespace,
            name: input.name,
            resource: Some(resource),
        })
    }

    /// Address an object and keep its full content for create and update
    pub fn from_resource(client: &'c dyn ClusterClient, resource: Resource) -> Result<Self> {
        let input = ClusterResourceInput::from_resource(&resource);
        Ok(Self::new(client, input)?.with_resource(resource))
    }

    /// Replace the local object.
    ///
    /// The handle keeps its address, namespace and name; every request is
    /// still sent to that object.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn address(&self) -> &ResourceAddress {
        &self.address
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The local object, `None` once it has been deleted
    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    pub fn into_resource(self) -> Option<Resource> {
        self.resource
    }

    /// Submit the local object as a new object
    pub async fn create(&mut self) -> Result<()> {
        let object = self.object()?;

        info!("Creating {} {}", self.address, self.describe());
        let created = self
            .client
            .create(&self.address, &self.namespace, object)
            .await
            .map_err(|source| self.write_error(source))?;

        self.resource = Some(created);
        Ok(())
    }

    /// Replace the local object with the current server state
    pub async fn read(&mut self) -> Result<()> {
        let current = self.fetch().await?;
        self.resource = Some(current);
        Ok(())
    }

    /// Overwrite the server object with the local one.
    ///
    /// The server's current `resourceVersion` is read first and stamped onto
    /// the local object. If that read fails nothing is written.
    pub async fn update(&mut self) -> Result<()> {
        self.object()?;

        let current = self.fetch().await?;
        let version = current.resource_version().to_string();
        debug!(
            "Stamping resourceVersion {:?} on {} {}",
            version,
            self.address,
            self.describe()
        );

        info!("Updating {} {}", self.address, self.describe());

        let object = match self.resource.as_mut() {
            Some(object) => object,
            None => return Err(Error::MissingResource),
        };
        object.set_resource_version(&version);

        let updated = self
            .client
            .update(&self.address, &self.namespace, &self.name, object)
            .await
            .map_err(|source| Error::ClusterWrite {
                address: self.address.clone(),
                name: self.name.clone(),
                source,
            })?;

        self.resource = Some(updated);
        Ok(())
    }

    /// Delete the object; the local object is cleared on success
    pub async fn delete(&mut self) -> Result<()> {
        self.object()?;

        info!("Deleting {} {}", self.address, self.describe());
        self.client
            .delete(&self.address, &self.namespace, &self.name)
            .await
            .map_err(|source| Error::ClusterDelete {
                address: self.address.clone(),
                name: self.name.clone(),
                source,
            })?;

        self.resource = None;
        Ok(())
    }

    async fn fetch(&self) -> Result<Resource> {
        debug!("Reading {} {}", self.address, self.describe());
        self.client
            .get(&self.address, &self.namespace, &self.name)
            .await
            .map_err(|source| {
                if source.is_not_found() {
                    Error::NotFound {
                        address: self.address.clone(),
                        namespace: self.namespace.clone(),
                        name: self.name.clone(),
                    }
                } else {
                    Error::ClusterRead {
                        address: self.address.clone(),
                        name: self.name.clone(),
                        source,
                    }
                }
            })
    }

    /// The local object, refusing unset or empty ones
    fn object(&self) -> Result<&Resource> {
        match &self.resource {
            Some(object) if !object.is_empty() => Ok(object),
            _ => Err(Error::MissingResource),
        }
    }

    fn write_error(&self, source: ApiError) -> Error {
        Error::ClusterWrite {
            address: self.address.clone(),
            name: self.name.clone(),
            source,
        }
    }

    fn describe(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}
