/// Mapping from group/version/kind to the plural resource path used by the API server
use std::fmt;

use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;

use super::Resource;
use crate::error::{Error, Field, Result};

/// Kinds whose resource name does not follow the suffix rules
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("endpoints", "endpoints"),
    ("nodemetrics", "nodes"),
    ("podmetrics", "pods"),
];

/// Group, version and plural resource name of a collection endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl ResourceAddress {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
        }
    }

    /// Resolve the address of a group/version/kind
    pub fn from_gvk(gvk: &GroupVersionKind) -> Result<Self> {
        let resource = plural_resource_name(&gvk.kind)?;
        Ok(Self::new(gvk.group.clone(), gvk.version.clone(), resource))
    }

    /// Resolve the address of a resource from its `apiVersion` and `kind`
    pub fn for_resource(resource: &Resource) -> Result<Self> {
        Self::from_gvk(&resource.group_version_kind())
    }

    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Build the `kube` dynamic type for this address.
    ///
    /// Request paths only use group, version and plural; the kind is left empty.
    pub fn to_api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, "");
        ApiResource::from_gvk_with_plural(&gvk, &self.resource)
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.resource, self.version)
        } else {
            write!(f, "{}.{}.{}", self.resource, self.version, self.group)
        }
    }
}

/// Lowercase plural resource name for a kind, e.g. `Pod` -> `pods`.
///
/// Follows the same suffix rules as kube-core's `ApiResource::from_gvk`, which
/// is not used here because it panics on a one-letter kind such as `Y`.
pub fn plural_resource_name(kind: &str) -> Result<String> {
    if kind.is_empty() {
        return Err(Error::MissingField(Field::Kind));
    }

    Ok(pluralize(&kind.to_lowercase()))
}

fn pluralize(word: &str) -> String {
    if let Some((_, plural)) = IRREGULAR_PLURALS
        .iter()
        .find(|(singular, _)| *singular == word)
    {
        return (*plural).to_string();
    }

    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{}es", word);
    }

    if let Some(stem) = word.strip_suffix('y') {
        let consonant_before = stem
            .chars()
            .last()
            .is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));
        if consonant_before {
            return format!("{}ies", stem);
        }
    }

    format!("{}s", word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(plural_resource_name("Pod").unwrap(), "pods");
        assert_eq!(plural_resource_name("Deployment").unwrap(), "deployments");
        assert_eq!(plural_resource_name("ConfigMap").unwrap(), "configmaps");
        assert_eq!(
            plural_resource_name("CustomResourceDefinition").unwrap(),
            "customresourcedefinitions"
        );
    }

    #[test]
    fn test_suffix_rules() {
        assert_eq!(plural_resource_name("Policy").unwrap(), "policies");
        assert_eq!(plural_resource_name("NetworkPolicy").unwrap(), "networkpolicies");
        assert_eq!(plural_resource_name("Gateway").unwrap(), "gateways");
        assert_eq!(plural_resource_name("Ingress").unwrap(), "ingresses");
        assert_eq!(plural_resource_name("ComponentStatus").unwrap(), "componentstatuses");
        assert_eq!(plural_resource_name("Box").unwrap(), "boxes");
        assert_eq!(plural_resource_name("Quiz").unwrap(), "quizes");
        assert_eq!(plural_resource_name("Patch").unwrap(), "patches");
        assert_eq!(plural_resource_name("Mesh").unwrap(), "meshes");
        assert_eq!(plural_resource_name("Y").unwrap(), "ys");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(plural_resource_name("Endpoints").unwrap(), "endpoints");
        assert_eq!(plural_resource_name("NodeMetrics").unwrap(), "nodes");
        assert_eq!(plural_resource_name("PodMetrics").unwrap(), "pods");
    }

    #[test]
    fn test_empty_kind_is_missing_field() {
        assert_matches!(
            plural_resource_name(""),
            Err(Error::MissingField(Field::Kind))
        );

        let resource = Resource::from_value(json!({"apiVersion": "v1"})).unwrap();
        assert_matches!(
            ResourceAddress::for_resource(&resource),
            Err(Error::MissingField(Field::Kind))
        );
    }

    #[test]
    fn test_address_for_resource() {
        let resource = Resource::from_value(json!({
            "apiVersion": "networking.k8s.io/v1",
            "kind": "NetworkPolicy",
            "metadata": {"name": "deny-all"}
        }))
        .unwrap();

        let address = ResourceAddress::for_resource(&resource).unwrap();
        assert_eq!(
            address,
            ResourceAddress::new("networking.k8s.io", "v1", "networkpolicies")
        );
        assert_eq!(address.api_version(), "networking.k8s.io/v1");
        assert_eq!(address.to_string(), "networkpolicies.v1.networking.k8s.io");
    }

    #[test]
    fn test_core_group_address() {
        let gvk = GroupVersionKind::gvk("", "v1", "Service");
        let address = ResourceAddress::from_gvk(&gvk).unwrap();
        assert_eq!(address.api_version(), "v1");
        assert_eq!(address.to_string(), "services.v1");

        let api_resource = address.to_api_resource();
        assert_eq!(api_resource.plural, "services");
        assert_eq!(api_resource.api_version, "v1");
        assert_eq!(api_resource.group, "");
    }
}
