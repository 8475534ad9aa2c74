//! Generic, schema-less Kubernetes objects

pub mod address;

pub use address::{plural_resource_name, ResourceAddress};

use kube::core::GroupVersionKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a decoded document cannot be treated as a Kubernetes object
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("document is not a mapping")]
    NotAMapping,

    #[error("document is missing {0}")]
    MissingField(&'static str),

    #[error("document uses unsupported tag {0}")]
    Tagged(String),

    #[error("document cannot be represented as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One Kubernetes object as an ordered key/value tree.
///
/// Follows the unstructured object convention: `apiVersion`, `kind` and
/// `metadata` at the top level, everything else (`spec`, `status`, `data`, ...)
/// kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Map<String, Value>);

impl Resource {
    /// Create an empty resource
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a skeleton resource carrying only its identity
    pub fn from_gvk(gvk: &GroupVersionKind, name: &str, namespace: &str) -> Self {
        let mut resource = Self::new();
        resource.set_group_version_kind(gvk);
        resource.set_name(name);
        resource.set_namespace(namespace);
        resource
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ConversionError::NotAMapping),
        }
    }

    /// Convert a decoded YAML document into a resource.
    ///
    /// The document must be a mapping with string keys and carry
    /// `apiVersion`, `kind` and `metadata.name`. Custom tags (`!name`) have
    /// no JSON form and are refused.
    pub fn from_yaml(document: &serde_yaml::Value) -> Result<Self, ConversionError> {
        if !document.is_mapping() {
            return Err(ConversionError::NotAMapping);
        }

        if let Some(tag) = first_tag(document) {
            return Err(ConversionError::Tagged(tag.to_string()));
        }

        let resource = Self::from_value(serde_json::to_value(document)?)?;
        resource.validate()?;
        Ok(resource)
    }

    /// Check that the fields identifying the object are present
    pub fn validate(&self) -> Result<(), ConversionError> {
        if self.api_version().is_empty() {
            return Err(ConversionError::MissingField("apiVersion"));
        }
        if self.kind().is_empty() {
            return Err(ConversionError::MissingField("kind"));
        }
        if self.name().is_empty() {
            return Err(ConversionError::MissingField("metadata.name"));
        }
        Ok(())
    }

    pub fn api_version(&self) -> &str {
        self.str_field("apiVersion")
    }

    pub fn kind(&self) -> &str {
        self.str_field("kind")
    }

    /// Split `apiVersion` into group and version; the core group is empty
    pub fn group_version_kind(&self) -> GroupVersionKind {
        let (group, version) = match self.api_version().split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", self.api_version()),
        };
        GroupVersionKind::gvk(group, version, self.kind())
    }

    pub fn set_group_version_kind(&mut self, gvk: &GroupVersionKind) {
        let api_version = if gvk.group.is_empty() {
            gvk.version.clone()
        } else {
            format!("{}/{}", gvk.group, gvk.version)
        };
        self.0
            .insert("apiVersion".to_string(), Value::String(api_version));
        self.0
            .insert("kind".to_string(), Value::String(gvk.kind.clone()));
    }

    pub fn name(&self) -> &str {
        self.metadata_field("name")
    }

    pub fn set_name(&mut self, name: &str) {
        self.set_metadata_field("name", name);
    }

    /// Namespace of the object, empty for cluster-scoped objects
    pub fn namespace(&self) -> &str {
        self.metadata_field("namespace")
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.set_metadata_field("namespace", namespace);
    }

    /// Server-tracked version token used for optimistic concurrency
    pub fn resource_version(&self) -> &str {
        self.metadata_field("resourceVersion")
    }

    pub fn set_resource_version(&mut self, version: &str) {
        self.set_metadata_field("resourceVersion", version);
    }

    /// Look up a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a nested field by JSON pointer, e.g. `/spec/replicas`
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (key, rest) = rest.split_once('/').unwrap_or((rest, ""));
        let value = self.0.get(key)?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(&format!("/{}", rest))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    fn metadata_field(&self, key: &str) -> &str {
        self.0
            .get("metadata")
            .and_then(|metadata| metadata.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Set a metadata string field; an empty value removes it
    fn set_metadata_field(&mut self, key: &str, value: &str) {
        let metadata = self
            .0
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));

        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }

        if let Value::Object(fields) = metadata {
            if value.is_empty() {
                fields.remove(key);
            } else {
                fields.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }
}

fn first_tag(value: &serde_yaml::Value) -> Option<&serde_yaml::value::Tag> {
    match value {
        serde_yaml::Value::Tagged(tagged) => Some(&tagged.tag),
        serde_yaml::Value::Sequence(items) => items.iter().find_map(first_tag),
        serde_yaml::Value::Mapping(mapping) => mapping
            .iter()
            .find_map(|(key, value)| first_tag(key).or_else(|| first_tag(value))),
        _ => None,
    }
}

impl TryFrom<Value> for Resource {
    type Error = ConversionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        resource.into_value()
    }
}
