//! CLI argument structs for all commands.

use super::types::{DependentTypeArg, ReportFormatArg, StrengthArg};
use crate::config::MAX_ALLOWED_GRAPH_DEPTH;
use crate::domain::{DependencyId, EntityId, PolicyId};
use clap::{Parser, Subcommand};

fn parse_max_depth(value: &str) -> Result<usize, String> {
    let depth: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if (1..=MAX_ALLOWED_GRAPH_DEPTH).contains(&depth) {
        Ok(depth)
    } else {
        Err(format!("must be between 1 and {MAX_ALLOWED_GRAPH_DEPTH}"))
    }
}

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone, Default)]
pub struct InitArgs {
    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `policy` command
#[derive(Parser, Debug, Clone)]
pub struct PolicyArgs {
    /// Policy subcommand
    #[command(subcommand)]
    pub action: PolicyAction,
}

/// Policy registry actions
#[derive(Subcommand, Debug, Clone)]
pub enum PolicyAction {
    /// Register a policy
    Add {
        /// Policy title
        #[arg(long)]
        title: String,

        /// Policy category (e.g. "safeguarding")
        #[arg(long)]
        category: String,

        /// Version label
        #[arg(long = "version", default_value = "1.0")]
        policy_version: String,

        /// Owning organization UUID (generated when omitted)
        #[arg(long)]
        organization: Option<uuid::Uuid>,
    },

    /// List registered policies
    List,
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency subcommand
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Declare that an entity depends on a policy
    Add {
        /// Policy the entity depends on
        policy: PolicyId,

        /// Kind of dependent entity
        #[arg(value_enum)]
        dependent_type: DependentTypeArg,

        /// Dependent entity UUID
        entity: EntityId,

        /// Coupling strength (suggested from the type when omitted)
        #[arg(short, long, value_enum)]
        strength: Option<StrengthArg>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,

        /// What changes for the dependent entity
        #[arg(long)]
        impact_description: Option<String>,

        /// The dependent entity updates itself
        #[arg(long)]
        automatic_update: bool,
    },

    /// List a policy's dependencies
    List {
        /// Policy UUID
        policy: PolicyId,

        /// Include soft-deleted records
        #[arg(long)]
        include_inactive: bool,
    },

    /// List the policies an entity depends on
    Dependents {
        /// Kind of dependent entity
        #[arg(value_enum)]
        dependent_type: DependentTypeArg,

        /// Dependent entity UUID
        entity: EntityId,

        /// Include soft-deleted records
        #[arg(long)]
        include_inactive: bool,
    },

    /// Remove a dependency (soft delete unless --hard)
    Remove {
        /// Dependency record UUID
        id: DependencyId,

        /// Delete the record permanently
        #[arg(long)]
        hard: bool,
    },

    /// Re-activate a soft-deleted dependency
    Restore {
        /// Dependency record UUID
        id: DependencyId,
    },

    /// Show the default strength for a dependent type
    Suggest {
        /// Kind of dependent entity
        #[arg(value_enum)]
        dependent_type: DependentTypeArg,
    },
}

/// Arguments for the `analyze` command
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Policy UUID
    pub policy: PolicyId,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Root policy UUID
    pub policy: PolicyId,

    /// Traversal depth limit (defaults to the configured max-graph-depth)
    #[arg(long, value_parser = parse_max_depth)]
    pub max_depth: Option<usize>,
}

/// Arguments for the `report` command
#[derive(Parser, Debug, Clone)]
pub struct ReportArgs {
    /// Policy UUID
    pub policy: PolicyId,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormatArg,

    /// Name recorded as the analyst
    #[arg(long)]
    pub analyzed_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Ok(1))]
    #[case("32", Ok(32))]
    fn test_parse_max_depth_valid(#[case] input: &str, #[case] expected: Result<usize, String>) {
        assert_eq!(parse_max_depth(input), expected);
    }

    #[rstest]
    #[case::zero("0")]
    #[case::too_deep("33")]
    #[case::not_a_number("deep")]
    fn test_parse_max_depth_invalid(#[case] input: &str) {
        assert!(parse_max_depth(input).is_err());
    }
}
