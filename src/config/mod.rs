/// Client configuration for reaching a cluster
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// How to build the cluster client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Kubeconfig file to read (falls back to KUBECONFIG, ~/.kube/config or
    /// the in-cluster service account)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Read timeout for API requests, in seconds
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

fn default_read_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::config(path, e.to_string()))?;
        let config: ClientConfig =
            serde_yaml::from_str(&content).map_err(|e| Error::config(path, e.to_string()))?;
        config
            .validate()
            .map_err(|message| Error::config(path, message))?;
        Ok(config)
    }

    /// Load configuration from a YAML file, or use defaults if it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.read_timeout_secs == 0 {
            return Err("read_timeout_secs must be greater than zero".to_string());
        }

        if self.context.as_deref() == Some("") {
            return Err("context cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Apply command-line overrides on top of the file values
    pub fn with_overrides(mut self, kubeconfig: Option<PathBuf>, context: Option<String>) -> Self {
        if kubeconfig.is_some() {
            self.kubeconfig = kubeconfig;
        }
        if context.is_some() {
            self.context = context;
        }
        self
    }

    /// Generate an example configuration file
    pub fn example() -> Self {
        Self {
            kubeconfig: Some(PathBuf::from("/etc/kubernetes/admin.conf")),
            context: Some("kind-kind".to_string()),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::example();
        assert!(config.validate().is_ok());

        config.read_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::example();
        config.context = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "context: staging").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.context.as_deref(), Some("staging"));
        assert_eq!(config.kubeconfig, None);
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_file_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "contxt: typo").unwrap();

        assert_matches!(
            ClientConfig::from_file(file.path()),
            Err(Error::Config { .. })
        );
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_or_default(dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_overrides_win() {
        let config = ClientConfig::example()
            .with_overrides(None, Some("prod".to_string()));
        assert_eq!(config.context.as_deref(), Some("prod"));
        assert_eq!(config.kubeconfig, ClientConfig::example().kubeconfig);
    }

    #[test]
    fn test_example_round_trips() {
        let yaml = serde_yaml::to_string(&ClientConfig::example()).unwrap();
        let parsed: ClientConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, ClientConfig::example());
    }
}
