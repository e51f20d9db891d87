//! Application context for CLI command execution.
//!
//! [`App`] loads a project's configuration and JSONL data into an
//! [`InMemoryStore`], wires the engine services over it, and writes the
//! data back after mutating commands.
//!
//! # Example
//!
//! ```no_run
//! use policy_impact::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     for policy in app.store().policies().await {
//!         println!("{} {}", policy.id, policy.title);
//!     }
//!     Ok(())
//! }
//! ```

use crate::commands::init::find_project_root;
use crate::config::{CONFIG_FILE_NAME, PROJECT_DIR_NAME, ProjectConfig};
use crate::dependency::DependencyService;
use crate::error::{Error, Result};
use crate::impact::ImpactAnalysisService;
use crate::storage::in_memory::{InMemoryStore, LoadWarning, load_from_jsonl, save_to_jsonl};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loaded project and the services built over it.
#[derive(Debug)]
pub struct App {
    store: InMemoryStore,
    impact: ImpactAnalysisService,
    project_dir: PathBuf,
    policies_path: PathBuf,
    dependencies_path: PathBuf,
    load_warnings: Vec<LoadWarning>,
}

impl App {
    /// Open the project containing `working_dir`.
    ///
    /// Searches up the directory tree for `.policy-impact/`, loads the
    /// configuration and both data files.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No project is found in the directory tree
    /// - Configuration cannot be loaded or is invalid
    /// - A data file exists but cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root = find_project_root(working_dir).ok_or_else(|| {
            Error::Config(format!(
                "Not a policy-impact project (or any parent up to the filesystem root). Run 'policy-impact init' to create '{PROJECT_DIR_NAME}'"
            ))
        })?;

        let project_dir = root.join(PROJECT_DIR_NAME);
        let config = ProjectConfig::load(&project_dir.join(CONFIG_FILE_NAME)).await?;

        let policies_path = project_dir.join(&config.storage.policies_file);
        let dependencies_path = project_dir.join(&config.storage.dependencies_file);
        let (store, load_warnings) = load_from_jsonl(&policies_path, &dependencies_path).await?;

        let dependencies =
            DependencyService::new(Arc::new(store.clone()), Arc::new(store.clone()))
                .with_config(config.analysis);

        Ok(Self {
            store,
            impact: ImpactAnalysisService::new(dependencies),
            project_dir,
            policies_path,
            dependencies_path,
            load_warnings,
        })
    }

    /// The backing store.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Dependency service over the store.
    pub fn dependencies(&self) -> &DependencyService {
        self.impact.dependencies()
    }

    /// Impact analysis service over the store.
    pub fn impact(&self) -> &ImpactAnalysisService {
        &self.impact
    }

    /// The `.policy-impact` directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Problems found while loading the data files.
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }

    /// Write the store back to the data files.
    ///
    /// Call after any mutating command.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` or `Error::Json` if writing fails.
    pub async fn save(&self) -> Result<()> {
        save_to_jsonl(&self.store, &self.policies_path, &self.dependencies_path).await
    }
}
