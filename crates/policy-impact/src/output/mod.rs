//! Output formatting for CLI commands.
//!
//! Every printer has a text rendering and a JSON rendering selected by
//! [`OutputMode`]. Text printers write to any [`Write`] so they can be
//! tested against a buffer.

pub mod color;

use crate::dependency::{DependencyAnalysis, DependencyGraph};
use crate::domain::{DependencyRecord, DependencyStrength, DependentType, Policy};
use color::{bold, colorize_risk, colorize_strength, dimmed};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Settings that control text rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Read settings from the environment.
    ///
    /// Colors are disabled by `NO_COLOR` (any value) or by
    /// `POLICY_IMPACT_COLOR` set to `0` or `false`.
    pub fn from_env() -> Self {
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("POLICY_IMPACT_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);
        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

fn print_with<T: Serialize>(
    value: &T,
    mode: OutputMode,
    text: impl FnOnce(&mut io::StdoutLock<'static>, &OutputConfig) -> io::Result<()>,
) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(value),
        OutputMode::Text => {
            let mut handle = io::stdout().lock();
            text(&mut handle, &OutputConfig::from_env())
        }
    }
}

/// Print a registered policy.
pub fn print_policy(policy: &Policy, mode: OutputMode) -> io::Result<()> {
    print_with(policy, mode, |w, config| write_policy(w, policy, config))
}

/// Print a single dependency record.
pub fn print_record(record: &DependencyRecord, mode: OutputMode) -> io::Result<()> {
    print_with(record, mode, |w, config| write_record(w, record, config))
}

/// Print a list of dependency records.
pub fn print_records(records: &[DependencyRecord], mode: OutputMode) -> io::Result<()> {
    print_with(&records, mode, |w, config| {
        if records.is_empty() {
            return writeln!(w, "No dependencies found.");
        }
        for record in records {
            write_record(w, record, config)?;
        }
        writeln!(w)?;
        writeln!(w, "{} dependencies", records.len())
    })
}

/// Print the suggested default strength for a dependent type.
pub fn print_suggestion(
    dependent_type: DependentType,
    strength: DependencyStrength,
    mode: OutputMode,
) -> io::Result<()> {
    let value = serde_json::json!({
        "dependentType": dependent_type,
        "suggestedStrength": strength,
    });
    print_with(&value, mode, |w, config| {
        writeln!(
            w,
            "Suggested strength for {dependent_type}: {}",
            colorize_strength(strength, config)
        )
    })
}

/// Print a per-policy dependency analysis.
pub fn print_analysis(analysis: &DependencyAnalysis, mode: OutputMode) -> io::Result<()> {
    print_with(analysis, mode, |w, config| write_analysis(w, analysis, config))
}

/// Print a dependency graph as an edge list.
pub fn print_graph(graph: &DependencyGraph, mode: OutputMode) -> io::Result<()> {
    print_with(graph, mode, |w, config| write_graph(w, graph, config))
}

fn write_policy<W: Write>(w: &mut W, policy: &Policy, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{} {} (v{}, {})",
        dimmed(&policy.id.to_string(), config),
        bold(&policy.title, config),
        policy.version,
        policy.category
    )
}

fn write_record<W: Write>(
    w: &mut W,
    record: &DependencyRecord,
    config: &OutputConfig,
) -> io::Result<()> {
    let inactive = if record.is_active { "" } else { " [inactive]" };
    writeln!(
        w,
        "{} {:<10} {} {}{}",
        dimmed(&record.id.to_string(), config),
        record.dependent_type.as_str(),
        record.dependent_id,
        colorize_strength(record.strength, config),
        inactive
    )?;
    if let Some(description) = &record.metadata.impact_description {
        writeln!(w, "    {description}")?;
    }
    if let Some(notes) = &record.notes {
        writeln!(w, "    {}", dimmed(notes, config))?;
    }
    Ok(())
}

fn write_analysis<W: Write>(
    w: &mut W,
    analysis: &DependencyAnalysis,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}", bold("Dependency Analysis", config))?;
    writeln!(w, "Policy:       {}", analysis.policy_id)?;
    writeln!(w, "Dependencies: {}", analysis.total_dependencies)?;
    writeln!(w, "Risk score:   {}", analysis.risk_score)?;
    writeln!(w)?;

    writeln!(w, "{}", bold("By strength", config))?;
    for strength in DependencyStrength::ALL {
        writeln!(
            w,
            "  {:<8} {}",
            colorize_strength(strength, config),
            analysis.by_strength.get(strength)
        )?;
    }
    writeln!(w)?;

    writeln!(w, "{}", bold("By type", config))?;
    for dependent_type in DependentType::ALL {
        let count = analysis.by_type.get(dependent_type);
        if count > 0 {
            writeln!(w, "  {:<10} {count}", dependent_type.as_str())?;
        }
    }

    if !analysis.critical_dependencies.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", bold("Critical dependencies", config))?;
        for record in &analysis.critical_dependencies {
            write_record(w, record, config)?;
        }
    }
    Ok(())
}

fn write_graph<W: Write>(
    w: &mut W,
    graph: &DependencyGraph,
    config: &OutputConfig,
) -> io::Result<()> {
    let label = |id: uuid::Uuid| {
        graph
            .nodes
            .iter()
            .find(|n| n.id == id)
            .map_or_else(|| id.to_string(), |n| n.label.clone())
    };

    writeln!(
        w,
        "{} ({} nodes, {} edges, depth {})",
        bold(&label(graph.root_policy.as_uuid()), config),
        graph.nodes.len(),
        graph.edges.len(),
        graph.max_depth
    )?;
    for edge in &graph.edges {
        writeln!(
            w,
            "  {} -> {} [{}]",
            label(edge.from),
            label(edge.to),
            colorize_risk(edge.risk_level, config)
        )?;
    }
    if graph.has_cycles {
        writeln!(w, "Warning: the declared dependencies contain a cycle")?;
    }
    Ok(())
}
