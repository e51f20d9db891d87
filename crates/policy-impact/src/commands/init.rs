//! Implementation of the `init` command.
//!
//! Creates the `.policy-impact/` directory with a default configuration and
//! empty policy and dependency files.

use crate::config::{CONFIG_FILE_NAME, PROJECT_DIR_NAME, ProjectConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Maximum directory depth to traverse when searching for a project root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Name of the gitignore file within the project directory
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Paths created by [`init`].
#[derive(Debug)]
pub struct InitResult {
    /// The created project directory
    pub project_dir: PathBuf,
    /// The created config file
    pub config_file: PathBuf,
    /// The created policies file
    pub policies_file: PathBuf,
    /// The created dependencies file
    pub dependencies_file: PathBuf,
}

/// Initialize a new project in `base_dir`.
///
/// # Errors
///
/// Returns an error if:
/// - The project directory already exists
/// - File system operations fail
pub async fn init(base_dir: &Path) -> Result<InitResult> {
    let project_dir = base_dir.join(PROJECT_DIR_NAME);

    if project_dir.exists() {
        return Err(Error::Config(format!(
            "Project is already initialized in this directory. Found existing '{PROJECT_DIR_NAME}'"
        )));
    }

    fs::create_dir_all(&project_dir).await?;

    let config = ProjectConfig::default();
    let config_file = project_dir.join(CONFIG_FILE_NAME);
    config.save(&config_file).await?;

    let policies_file = project_dir.join(&config.storage.policies_file);
    fs::write(&policies_file, "").await?;

    let dependencies_file = project_dir.join(&config.storage.dependencies_file);
    fs::write(&dependencies_file, "").await?;

    let gitignore_content = "\
# Data files are meant to be tracked; only temporary save files are ignored
*.tmp
";
    fs::write(project_dir.join(GITIGNORE_FILE_NAME), gitignore_content).await?;

    tracing::info!(project_dir = %project_dir.display(), "Initialized project");

    Ok(InitResult {
        project_dir,
        config_file,
        policies_file,
        dependencies_file,
    })
}

/// Find the directory containing `.policy-impact/`, searching upward from `start_dir`.
///
/// Returns `None` if no project is found within [`MAX_TRAVERSAL_DEPTH`] levels.
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(PROJECT_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
