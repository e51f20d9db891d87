//! Dependency graph construction using petgraph.
//!
//! The graph is derived on demand from active dependency records reachable
//! from a root policy. It is never persisted.
//!
//! # Traversal
//!
//! Breadth-first from the root (depth 0). Every node of type `policy` or
//! `template` within the depth budget has its active records expanded; all
//! other dependent types are leaves. Templates are looked up as policies
//! with the same UUID, modelling templates derived from other policies.
//!
//! Nodes are keyed by UUID and added at most once, at the depth they were
//! first reached. Edges are never deduplicated: every record along the way
//! produces one edge, including records pointing back at visited nodes.
//! The visited map plus the depth budget guarantee termination on cyclic
//! data.
//!
//! `max_depth` is the deepest first-reached node, so a new record that
//! shortcuts into a template chain can lower it. `reach_depth` instead
//! counts the longest chain of edges walkable from the root within the
//! budget; adding records never lowers it.

use super::active_dependencies;
use super::analysis::{StrengthBreakdown, TypeBreakdown};
use crate::domain::{
    DependencyId, DependencyMetadata, DependencyRecord, DependencyStrength, DependentType, Policy,
    PolicyId, RiskLevel,
};
use crate::error::Result;
use crate::storage::DependencyStore;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use uuid::Uuid;

/// Kind of graph node: the root policy or a dependent entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Root policy
    Policy,
    /// Workflow
    Workflow,
    /// Module
    Module,
    /// Template
    Template,
    /// Assessment
    Assessment,
    /// Training unit
    Training,
    /// Document
    Document,
}

impl NodeType {
    /// Whether nodes of this kind have their own dependencies expanded.
    #[must_use]
    pub fn is_traversable(self) -> bool {
        matches!(self, Self::Policy | Self::Template)
    }

    /// The dependent type, or `None` for the root policy.
    #[must_use]
    pub fn dependent_type(self) -> Option<DependentType> {
        match self {
            Self::Policy => None,
            Self::Workflow => Some(DependentType::Workflow),
            Self::Module => Some(DependentType::Module),
            Self::Template => Some(DependentType::Template),
            Self::Assessment => Some(DependentType::Assessment),
            Self::Training => Some(DependentType::Training),
            Self::Document => Some(DependentType::Document),
        }
    }
}

impl From<DependentType> for NodeType {
    fn from(dependent_type: DependentType) -> Self {
        match dependent_type {
            DependentType::Workflow => Self::Workflow,
            DependentType::Module => Self::Module,
            DependentType::Template => Self::Template,
            DependentType::Assessment => Self::Assessment,
            DependentType::Training => Self::Training,
            DependentType::Document => Self::Document,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dependent_type() {
            Some(t) => f.write_str(t.as_str()),
            None => f.write_str("policy"),
        }
    }
}

/// A node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Policy or entity UUID
    pub id: Uuid,

    /// Node kind
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Display label
    pub label: String,

    /// Policy details for the root, record metadata for dependents
    pub metadata: Map<String, Value>,

    /// Hops from the root (root = 0)
    pub depth: usize,
}

/// An edge in the dependency graph, one per dependency record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Node that owns the record
    pub from: Uuid,

    /// Dependent node
    pub to: Uuid,

    /// Record that produced this edge
    pub dependency_id: DependencyId,

    /// Declared coupling
    pub strength: DependencyStrength,

    /// Risk derived from `strength`
    pub risk_level: RiskLevel,

    /// Record metadata
    pub metadata: DependencyMetadata,
}

/// Graph of everything reachable from a root policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraph {
    /// Root of the traversal
    pub root_policy: PolicyId,

    /// Nodes in discovery order; the root is first
    pub nodes: Vec<GraphNode>,

    /// Edges in discovery order
    pub edges: Vec<GraphEdge>,

    /// Equal to `edges.len()`
    pub total_dependencies: usize,

    /// Edge counts per strength across the whole traversal
    pub strength_breakdown: StrengthBreakdown,

    /// Edge counts per dependent type across the whole traversal
    pub type_breakdown: TypeBreakdown,

    /// Deepest node depth reached
    pub max_depth: usize,

    /// Longest chain of edges from the root within the depth budget,
    /// following paths through already-visited nodes too
    pub reach_depth: usize,

    /// Whether the reachable declared data contains a directed cycle
    pub has_cycles: bool,
}

impl DependencyGraph {
    /// Dependent nodes, excluding the root.
    pub fn dependent_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| n.node_type != NodeType::Policy)
    }

    /// Node counts per dependent type, excluding the root.
    #[must_use]
    pub fn node_type_counts(&self) -> TypeBreakdown {
        let mut counts = TypeBreakdown::default();
        for node in self.dependent_nodes() {
            if let Some(t) = node.node_type.dependent_type() {
                counts.record(t);
            }
        }
        counts
    }
}

/// Build the graph rooted at `root`.
pub(super) async fn build_graph(
    store: &dyn DependencyStore,
    root: &Policy,
    max_depth: usize,
) -> Result<DependencyGraph> {
    let mut graph: DiGraph<GraphNode, GraphEdge> = DiGraph::new();
    let mut visited: HashMap<Uuid, NodeIndex> = HashMap::new();
    let mut queue: VecDeque<(NodeIndex, Uuid, usize)> = VecDeque::new();

    let mut strength_breakdown = StrengthBreakdown::default();
    let mut type_breakdown = TypeBreakdown::default();
    let mut deepest = 0;

    let root_uuid = root.id.as_uuid();
    let root_node = graph.add_node(root_node(root));
    visited.insert(root_uuid, root_node);
    queue.push_back((root_node, root_uuid, 0));

    while let Some((current, current_uuid, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }

        let records = active_dependencies(store, PolicyId::from(current_uuid)).await?;
        tracing::trace!(node = %current_uuid, depth, records = records.len(), "Expanding graph node");

        for record in records {
            strength_breakdown.record(record.strength);
            type_breakdown.record(record.dependent_type);

            let target_uuid = record.dependent_id.as_uuid();
            let target = match visited.get(&target_uuid) {
                Some(&index) => index,
                None => {
                    let next_depth = depth + 1;
                    let index = graph.add_node(dependent_node(&record, next_depth)?);
                    visited.insert(target_uuid, index);
                    deepest = deepest.max(next_depth);
                    if NodeType::from(record.dependent_type).is_traversable() {
                        queue.push_back((index, target_uuid, next_depth));
                    }
                    index
                }
            };

            graph.add_edge(
                current,
                target,
                GraphEdge {
                    from: current_uuid,
                    to: target_uuid,
                    dependency_id: record.id,
                    strength: record.strength,
                    risk_level: record.risk_level(),
                    metadata: record.metadata,
                },
            );
        }
    }

    let has_cycles = algo::is_cyclic_directed(&graph);
    let (nodes, edges) = graph.into_nodes_edges();
    let nodes: Vec<GraphNode> = nodes.into_iter().map(|n| n.weight).collect();
    let edges: Vec<GraphEdge> = edges.into_iter().map(|e| e.weight).collect();
    let reach_depth = walk_depth(root_uuid, &edges, max_depth);

    tracing::debug!(
        policy_id = %root.id,
        nodes = nodes.len(),
        edges = edges.len(),
        max_depth = deepest,
        reach_depth,
        has_cycles,
        "Built dependency graph"
    );

    Ok(DependencyGraph {
        root_policy: root.id,
        total_dependencies: edges.len(),
        nodes,
        edges,
        strength_breakdown,
        type_breakdown,
        max_depth: deepest,
        reach_depth,
        has_cycles,
    })
}

/// Number of edge layers walkable from `root`, capped at `limit`.
///
/// Only expanded nodes own outgoing edges, and any node reached within the
/// budget was expanded, so walking the built edges matches walking the
/// records.
fn walk_depth(root: Uuid, edges: &[GraphEdge], limit: usize) -> usize {
    let mut outgoing: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for edge in edges {
        outgoing.entry(edge.from).or_default().push(edge.to);
    }

    let mut frontier = HashSet::from([root]);
    let mut depth = 0;
    while depth < limit {
        let next: HashSet<Uuid> = frontier
            .iter()
            .filter_map(|id| outgoing.get(id))
            .flatten()
            .copied()
            .collect();
        if next.is_empty() {
            break;
        }
        frontier = next;
        depth += 1;
    }
    depth
}

fn root_node(policy: &Policy) -> GraphNode {
    let mut metadata = Map::new();
    metadata.insert("category".to_string(), Value::from(policy.category.clone()));
    metadata.insert("version".to_string(), Value::from(policy.version.clone()));
    metadata.insert(
        "organizationId".to_string(),
        Value::from(policy.organization_id.to_string()),
    );

    GraphNode {
        id: policy.id.as_uuid(),
        node_type: NodeType::Policy,
        label: policy.title.clone(),
        metadata,
        depth: 0,
    }
}

fn dependent_node(record: &DependencyRecord, depth: usize) -> Result<GraphNode> {
    let metadata = match serde_json::to_value(&record.metadata)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    Ok(GraphNode {
        id: record.dependent_id.as_uuid(),
        node_type: record.dependent_type.into(),
        label: format!("{}:{}", record.dependent_type, record.dependent_id),
        metadata,
        depth,
    })
}
