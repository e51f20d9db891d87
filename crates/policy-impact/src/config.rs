//! Configuration for the policy impact engine.
//!
//! [`AnalysisConfig`] carries the tunable approximations used by risk scoring.
//! The user-impact multipliers are placeholders with no telemetry behind them;
//! they are exposed here so deployments can override them without touching
//! the scoring code. Score caps and risk thresholds are fixed.
//!
//! [`ProjectConfig`] is the on-disk `config.yaml` used by the CLI host.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Default traversal depth for dependency graphs.
pub const DEFAULT_MAX_GRAPH_DEPTH: usize = 5;

/// Largest traversal depth accepted from configuration.
pub const MAX_ALLOWED_GRAPH_DEPTH: usize = 32;

/// Assumed users affected per workflow (approximation).
pub const DEFAULT_USERS_PER_WORKFLOW: u32 = 20;

/// Assumed users affected per module (approximation).
pub const DEFAULT_USERS_PER_MODULE: u32 = 10;

/// Name of the project directory
pub const PROJECT_DIR_NAME: &str = ".policy-impact";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default name of the policies data file
pub const POLICIES_FILE_NAME: &str = "policies.jsonl";

/// Default name of the dependencies data file
pub const DEPENDENCIES_FILE_NAME: &str = "dependencies.jsonl";

/// Tunables for graph building and impact scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalysisConfig {
    /// Default depth limit for `build_dependency_graph`
    pub max_graph_depth: usize,

    /// Users assumed affected by each workflow
    pub users_per_workflow: u32,

    /// Users assumed affected by each module
    pub users_per_module: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_graph_depth: DEFAULT_MAX_GRAPH_DEPTH,
            users_per_workflow: DEFAULT_USERS_PER_WORKFLOW,
            users_per_module: DEFAULT_USERS_PER_MODULE,
        }
    }
}

impl AnalysisConfig {
    /// Check that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the graph depth is zero or above
    /// [`MAX_ALLOWED_GRAPH_DEPTH`].
    pub fn validate(&self) -> Result<()> {
        if self.max_graph_depth == 0 || self.max_graph_depth > MAX_ALLOWED_GRAPH_DEPTH {
            return Err(Error::Config(format!(
                "max-graph-depth must be between 1 and {MAX_ALLOWED_GRAPH_DEPTH}, got {}",
                self.max_graph_depth
            )));
        }
        Ok(())
    }
}

/// Storage configuration section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Policies JSONL file, relative to the project directory
    pub policies_file: String,

    /// Dependencies JSONL file, relative to the project directory
    pub dependencies_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            policies_file: POLICIES_FILE_NAME.to_string(),
            dependencies_file: DEPENDENCIES_FILE_NAME.to_string(),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Scoring tunables
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Data file locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ProjectConfig {
    /// Parse and validate configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` on malformed YAML or out-of-range values.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, `Error::Config` if it is invalid.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` on serialization failure, `Error::Io` on write failure.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_scoring_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_graph_depth, 5);
        assert_eq!(config.users_per_workflow, 20);
        assert_eq!(config.users_per_module, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = ProjectConfig::from_yaml("analysis:\n  users-per-workflow: 35\n").unwrap();
        assert_eq!(config.analysis.users_per_workflow, 35);
        assert_eq!(config.analysis.users_per_module, 10);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[rstest]
    #[case::zero(0)]
    #[case::too_deep(33)]
    fn test_rejects_bad_depth(#[case] depth: usize) {
        let yaml = format!("analysis:\n  max-graph-depth: {depth}\n");
        let err = ProjectConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        let err = ProjectConfig::from_yaml("analysis: [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.kind().status_code(), 500);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);

        let mut config = ProjectConfig::default();
        config.analysis.max_graph_depth = 3;
        config.save(&path).await.unwrap();

        let loaded = ProjectConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }
}
