/// Configuration management for kubetools
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Namespace used when neither the command line nor the config names one.
pub const DEFAULT_NAMESPACE: &str = "prod";

/// Invocation defaults, loadable from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubetoolsConfig {
    /// Namespace applied when the command line does not name one
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// kubectl binary to invoke (name on PATH or absolute path)
    #[serde(default = "default_kubectl")]
    pub kubectl: String,

    /// Kubeconfig exported as KUBECONFIG for every invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,
}

impl Default for KubetoolsConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            kubectl: default_kubectl(),
            kubeconfig: None,
        }
    }
}

impl KubetoolsConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: KubetoolsConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file when present, fall back to defaults otherwise.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.namespace.is_empty() {
            anyhow::bail!("namespace cannot be empty");
        }
        if self.kubectl.is_empty() {
            anyhow::bail!("kubectl binary cannot be empty");
        }
        Ok(())
    }

    /// Generate an example configuration file
    pub fn example() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            kubectl: default_kubectl(),
            kubeconfig: None,
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_kubectl() -> String {
    "kubectl".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KubetoolsConfig::default();
        assert_eq!(config.namespace, "prod");
        assert_eq!(config.kubectl, "kubectl");
        assert!(config.kubeconfig.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: KubetoolsConfig = serde_yaml::from_str("namespace: staging\n").unwrap();
        assert_eq!(config.namespace, "staging");
        assert_eq!(config.kubectl, "kubectl");
    }

    #[test]
    fn test_example_round_trips() {
        let yaml = serde_yaml::to_string(&KubetoolsConfig::example()).unwrap();
        let config: KubetoolsConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.namespace, "prod");
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_namespace() {
        let config = KubetoolsConfig {
            namespace: String::new(),
            ..KubetoolsConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
