/// Kubernetes manifest files: one or more YAML documents per file
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::resources::Resource;

/// The resources read from a single manifest file
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    path: PathBuf,
    content: Vec<u8>,
    documents: Vec<serde_yaml::Value>,
    resources: Vec<Resource>,
}

impl Manifest {
    /// Load every resource in a manifest file, in document order
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => Error::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::FileRead {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let manifest = Self::parse(path, content)?;
        info!(
            "Loaded {} resource(s) from {}",
            manifest.len(),
            path.display()
        );

        Ok(manifest)
    }

    /// Decode manifest content that is already in memory.
    ///
    /// `path` is only used to label errors and logs. Documents that decode to
    /// nothing (empty input, comments only, bare `---` separators) are skipped.
    pub fn parse(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Result<Self> {
        let path = path.into();
        let content = content.into();

        let mut documents = Vec::new();
        let mut resources = Vec::new();

        for (index, document) in serde_yaml::Deserializer::from_slice(&content).enumerate() {
            // merge keys (`<<: *anchor`) are resolved the way the API server's
            // YAML decoder does
            let decoded = serde_yaml::Value::deserialize(document).and_then(|mut value| {
                value.apply_merge()?;
                Ok(value)
            });
            let value = match decoded {
                Ok(value) => value,
                Err(source) => {
                    return Err(Error::YamlDecode {
                        path: path.clone(),
                        document: index,
                        source,
                        partial: Box::new(Self {
                            path: path.clone(),
                            content: content.clone(),
                            documents,
                            resources,
                        }),
                    })
                }
            };

            if value.is_null() {
                debug!("Skipping empty document {} in {}", index, path.display());
                continue;
            }

            let resource = match Resource::from_yaml(&value) {
                Ok(resource) => resource,
                Err(source) => {
                    return Err(Error::Conversion {
                        path: path.clone(),
                        document: index,
                        source,
                        partial: Box::new(Self {
                            path: path.clone(),
                            content: content.clone(),
                            documents,
                            resources,
                        }),
                    })
                }
            };

            debug!(
                kind = resource.kind(),
                name = resource.name(),
                "Decoded document {} in {}",
                index,
                path.display()
            );

            documents.push(value);
            resources.push(resource);
        }

        Ok(Self {
            path,
            content,
            documents,
            resources,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw bytes of the file
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Decoded YAML documents, one per resource
    pub fn documents(&self) -> &[serde_yaml::Value] {
        &self.documents
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Mutable access to the resources; the sequence itself stays fixed
    pub fn resources_mut(&mut self) -> &mut [Resource] {
        &mut self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn into_resources(self) -> Vec<Resource> {
        self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio_test::{assert_err, assert_ok};

    use crate::resources::ConversionError;
    use serde_json::json;

    fn manifest_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_single_document() {
        let file = manifest_file(
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n  namespace: prod\nspec:\n  replicas: 2\n",
        );

        let manifest = assert_ok!(Manifest::from_file(file.path()));
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.documents().len(), 1);
        assert_eq!(manifest.path(), file.path());

        let resource = &manifest.resources()[0];
        let gvk = resource.group_version_kind();
        assert_eq!(gvk.group, "apps");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk.kind, "Deployment");
        assert_eq!(resource.name(), "web");
        assert_eq!(resource.namespace(), "prod");
    }

    #[test]
    fn test_multiple_documents_keep_file_order() {
        let file = manifest_file(
            "---\napiVersion: v1\nkind: Namespace\nmetadata:\n  name: first\n\
             ---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: second\n\
             ---\napiVersion: v1\nkind: Secret\nmetadata:\n  name: third\n",
        );

        let manifest = Manifest::from_file(file.path()).unwrap();
        let names: Vec<&str> = manifest.resources().iter().map(Resource::name).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn test_empty_file_has_no_resources() {
        let file = manifest_file("");
        let manifest = Manifest::from_file(file.path()).unwrap();
        assert!(manifest.is_empty());

        let file = manifest_file("# nothing here yet\n");
        let manifest = Manifest::from_file(file.path()).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_empty_documents_are_skipped() {
        let manifest = Manifest::parse(
            "inline.yaml",
            "---\n---\napiVersion: v1\nkind: Pod\nmetadata:\n  name: only\n---\n",
        )
        .unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.resources()[0].name(), "only");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = assert_err!(Manifest::from_file(&path));
        assert_matches!(err, Error::FileNotFound { path: missing } if missing == path);
    }

    #[test]
    fn test_directory_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            Manifest::from_file(dir.path()),
            Err(Error::FileRead { .. })
        );
    }

    #[test]
    fn test_decode_error_keeps_partial_manifest() {
        let content = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: good\n---\nkind: [unclosed\n";
        let err = Manifest::parse("broken.yaml", content).unwrap_err();

        assert_matches!(err, Error::YamlDecode { document: 1, .. });
        let partial = err.partial_manifest().unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial.resources()[0].name(), "good");
        assert_eq!(partial.content(), content.as_bytes());
    }

    #[test]
    fn test_conversion_error_aborts_load() {
        let content = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: good\n---\n- not\n- an\n- object\n---\napiVersion: v1\nkind: Pod\nmetadata:\n  name: never\n";
        let err = Manifest::parse("list.yaml", content).unwrap_err();

        assert_matches!(
            err,
            Error::Conversion {
                document: 1,
                source: ConversionError::NotAMapping,
                ..
            }
        );
        assert_eq!(err.partial_manifest().map(Manifest::len), Some(1));
    }

    #[test]
    fn test_merge_keys_are_resolved() {
        let content = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: web\n  labels: &labels\n    app: web\n    tier: frontend\n  annotations:\n    <<: {owner: team-a}\n    note: cache\ndata:\n  <<: *labels\n  tier: backend\n";
        let manifest = Manifest::parse("merged.yaml", content).unwrap();

        let resource = &manifest.resources()[0];
        assert_eq!(resource.pointer("/metadata/annotations/owner"), Some(&json!("team-a")));
        assert_eq!(resource.pointer("/metadata/annotations/note"), Some(&json!("cache")));
        assert!(resource.pointer("/metadata/annotations/<<").is_none());

        // keys written next to the merge key win over merged ones
        assert_eq!(resource.pointer("/data/app"), Some(&json!("web")));
        assert_eq!(resource.pointer("/data/tier"), Some(&json!("backend")));
        assert!(resource.pointer("/data/<<").is_none());
        assert_eq!(resource.pointer("/metadata/labels/tier"), Some(&json!("frontend")));
    }

    #[test]
    fn test_invalid_merge_is_a_decode_error() {
        let content = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: good\n---\napiVersion: v1\nkind: Pod\nmetadata:\n  name: bad\n  labels:\n    <<: 3\n";
        let err = Manifest::parse("merge.yaml", content).unwrap_err();

        assert_matches!(err, Error::YamlDecode { document: 1, .. });
        assert_eq!(err.partial_manifest().map(Manifest::len), Some(1));
    }

    #[test]
    fn test_custom_tags_are_rejected() {
        let content = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: tagged\ndata:\n  t: !custom 3\n";
        let err = Manifest::parse("tagged.yaml", content).unwrap_err();

        assert_matches!(
            err,
            Error::Conversion {
                document: 0,
                source: ConversionError::Tagged(ref tag),
                ..
            } if tag == "!custom"
        );
    }

    #[test]
    fn test_document_without_name_is_rejected() {
        let err = Manifest::parse("anon.yaml", "apiVersion: v1\nkind: Pod\nmetadata: {}\n").unwrap_err();
        assert_matches!(
            err,
            Error::Conversion {
                source: ConversionError::MissingField("metadata.name"),
                ..
            }
        );
    }
}
