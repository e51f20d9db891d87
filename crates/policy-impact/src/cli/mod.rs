//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Create `.policy-impact/` in the target directory
//! - `policy`: Register and list policies
//! - `dep`: Add, list, remove, restore dependencies and suggest strengths
//! - `analyze`: Aggregate a policy's dependencies
//! - `graph`: Build the dependency graph of a policy
//! - `report`: Generate the impact report of a policy
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format
//! - `--dir`: Project directory (defaults to the current directory)
//!
//! # Example
//!
//! ```bash
//! policy-impact policy add --title "Falls prevention" --category clinical
//! policy-impact dep add <policy-id> workflow <workflow-id> --impact-description "Night checks"
//! policy-impact report <policy-id> --format html > impact.html
//! ```

mod args;
mod execute;
mod types;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{
    AnalyzeArgs, DepAction, DepArgs, GraphArgs, InitArgs, PolicyAction, PolicyArgs, ReportArgs,
};
pub use types::{DependentTypeArg, ReportFormatArg, StrengthArg};

/// Policy dependency graph and change-impact analysis
///
/// Record which workflows, modules and documents depend on each policy, and
/// see what a change would put at risk before publishing it. Data lives in
/// `.policy-impact/` as JSONL files.
#[derive(Parser, Debug)]
#[command(name = "policy-impact")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new project
    ///
    /// Creates `.policy-impact/` with a default configuration and empty
    /// data files.
    Init(InitArgs),

    /// Manage registered policies
    Policy(PolicyArgs),

    /// Manage policy dependencies
    Dep(DepArgs),

    /// Aggregate a policy's active dependencies by type and strength
    Analyze(AnalyzeArgs),

    /// Build the dependency graph reachable from a policy
    Graph(GraphArgs),

    /// Generate the change-impact report for a policy
    ///
    /// Prints JSON or HTML. PDF is not supported and fails.
    Report(ReportArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any error from loading the project or running the command.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(&dir, args).await,
            Some(Commands::Policy(args)) => {
                let app = App::from_directory(&dir).await?;
                execute::execute_policy(&app, args, output_mode).await
            }
            Some(Commands::Dep(args)) => {
                let app = App::from_directory(&dir).await?;
                execute::execute_dep(&app, args, output_mode).await
            }
            Some(Commands::Analyze(args)) => {
                let app = App::from_directory(&dir).await?;
                execute::execute_analyze(&app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let app = App::from_directory(&dir).await?;
                execute::execute_graph(&app, args, output_mode).await
            }
            Some(Commands::Report(args)) => {
                let app = App::from_directory(&dir).await?;
                execute::execute_report(&app, args).await
            }
            None => {
                println!("Policy impact analysis");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
