//! JSONL persistence for the in-memory store.
//!
//! Policies and dependency records live in two separate JSON Lines files.
//! Loading is resilient: bad lines are skipped and reported as
//! [`LoadWarning`]s instead of failing the whole load.

use super::InMemoryStore;
use crate::domain::{DependencyRecord, DependentType, EntityId, Policy, PolicyId};
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

/// Warnings that can occur during JSONL file loading.
///
/// These are non-fatal: the offending line or record is skipped or corrected,
/// and loading continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line could not be parsed
    ///
    /// **Effect**: Line is skipped entirely.
    MalformedJson {
        /// File the line came from
        file: PathBuf,
        /// 1-based line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A second active record declares an edge that is already active
    ///
    /// **Effect**: The later record is loaded as inactive.
    DuplicateActiveDependency {
        /// Owning policy
        policy_id: PolicyId,
        /// Kind of the dependent entity
        dependent_type: DependentType,
        /// The dependent entity
        dependent_id: EntityId,
    },
}

/// Load a store from policy and dependency JSONL files.
///
/// A file that does not exist loads as empty, so a fresh project directory
/// works without special casing.
///
/// # Errors
///
/// Returns `Error::Io` if an existing file cannot be read.
pub async fn load_from_jsonl(
    policies_path: &Path,
    dependencies_path: &Path,
) -> Result<(InMemoryStore, Vec<LoadWarning>)> {
    let mut warnings = Vec::new();

    let policies: Vec<Policy> = read_lines(policies_path, &mut warnings).await?;
    let mut records: Vec<DependencyRecord> = read_lines(dependencies_path, &mut warnings).await?;

    // Oldest record keeps the active slot when the file declares an edge twice.
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    let mut active_edges = HashSet::new();
    for record in &mut records {
        if !record.is_active {
            continue;
        }
        let key = (record.policy_id, record.dependent_type, record.dependent_id);
        if !active_edges.insert(key) {
            warnings.push(LoadWarning::DuplicateActiveDependency {
                policy_id: record.policy_id,
                dependent_type: record.dependent_type,
                dependent_id: record.dependent_id,
            });
            record.is_active = false;
        }
    }

    let store = InMemoryStore::new();
    for policy in policies {
        store.add_policy(policy).await;
    }
    store.import_records(records).await;

    for warning in &warnings {
        tracing::warn!(warning = ?warning, "JSONL load warning");
    }

    Ok((store, warnings))
}

/// Save a store to policy and dependency JSONL files with atomic writes.
///
/// Each file is written to a temporary sibling first and then renamed over
/// the target, so an interrupted save leaves the previous contents intact.
///
/// # Errors
///
/// Returns `Error::Io` or `Error::Json` if writing fails.
pub async fn save_to_jsonl(
    store: &InMemoryStore,
    policies_path: &Path,
    dependencies_path: &Path,
) -> Result<()> {
    let policies = store.policies().await;
    write_lines(policies_path, &policies).await?;

    let records = store.records().await;
    write_lines(dependencies_path, &records).await?;

    tracing::debug!(
        policies = policies.len(),
        dependencies = records.len(),
        "Saved store to JSONL"
    );
    Ok(())
}

async fn read_lines<T: DeserializeOwned>(
    path: &Path,
    warnings: &mut Vec<LoadWarning>,
) -> Result<Vec<T>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(Vec::new());
    }

    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut values = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(value) => values.push(value),
            Err(e) => warnings.push(LoadWarning::MalformedJson {
                file: path.to_path_buf(),
                line_number,
                error: e.to_string(),
            }),
        }
    }

    Ok(values)
}

async fn write_lines<T: Serialize>(path: &Path, values: &[T]) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let file = File::create(&temp_path).await?;
    let mut writer = BufWriter::new(file);

    for value in values {
        let json = serde_json::to_string(value)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    tokio::fs::rename(&temp_path, path).await?;

    Ok(())
}
