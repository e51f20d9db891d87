//! Domain types for policy dependency tracking.
//!
//! This module contains the identifiers, closed enumerations and records the
//! engine reasons about. Everything here is plain data; behavior lives in
//! [`crate::dependency`] and [`crate::impact`].

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const UUID_HINT: &str = "a UUID such as 67e55044-10b1-426f-9247-bb680e5fe0c8";

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| Error::InvalidArgument {
                        field: $field,
                        value: s.to_string(),
                        valid_values: UUID_HINT,
                    })
            }
        }
    };
}

uuid_id!(
    /// Unique identifier of a policy.
    PolicyId,
    "policy id"
);

uuid_id!(
    /// Unique identifier of a dependency record.
    DependencyId,
    "dependency id"
);

uuid_id!(
    /// Identifier of a dependent entity (workflow, module, template, ...).
    ///
    /// The engine never dereferences it except to follow template edges,
    /// where the template is looked up as a policy with the same UUID.
    EntityId,
    "dependent id"
);

impl From<EntityId> for PolicyId {
    fn from(id: EntityId) -> Self {
        Self(id.0)
    }
}

impl From<PolicyId> for EntityId {
    fn from(id: PolicyId) -> Self {
        Self(id.0)
    }
}

/// Kind of entity that can depend on a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependentType {
    /// Care workflow
    Workflow,

    /// Platform module
    Module,

    /// Document template; may itself carry dependencies
    Template,

    /// Assessment form
    Assessment,

    /// Training unit
    Training,

    /// Stand-alone document
    Document,
}

impl DependentType {
    /// Every dependent type, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Workflow,
        Self::Module,
        Self::Template,
        Self::Assessment,
        Self::Training,
        Self::Document,
    ];

    /// Wire name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::Module => "module",
            Self::Template => "template",
            Self::Assessment => "assessment",
            Self::Training => "training",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for DependentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| Error::InvalidArgument {
                field: "dependent type",
                value: s.to_string(),
                valid_values: "workflow, module, template, assessment, training, document",
            })
    }
}

/// Coupling tightness between a policy and a dependent entity.
///
/// - `Strong`: the dependent breaks when the policy changes
/// - `Medium`: the dependent likely needs adjustment
/// - `Weak`: impact is cosmetic or informational
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStrength {
    /// Breaks on change
    Strong,

    /// Adjustment likely required
    Medium,

    /// Informational
    Weak,
}

impl DependencyStrength {
    /// Every strength, strongest first.
    pub const ALL: [Self; 3] = [Self::Strong, Self::Medium, Self::Weak];

    /// Wire name of the strength.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Medium => "medium",
            Self::Weak => "weak",
        }
    }

    /// Numeric rank used for ordering; higher is tighter coupling.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Strong => 3,
            Self::Medium => 2,
            Self::Weak => 1,
        }
    }
}

impl fmt::Display for DependencyStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyStrength {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| Error::InvalidArgument {
                field: "strength",
                value: s.to_string(),
                valid_values: "strong, medium, weak",
            })
    }
}

/// Categorical risk, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Routine change
    Low,

    /// Needs attention
    Medium,

    /// Needs approval
    High,

    /// Needs approval and broad communication
    Critical,
}

impl RiskLevel {
    /// Wire name of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// `true` for `High` and `Critical`.
    #[must_use]
    pub fn is_elevated(self) -> bool {
        self >= Self::High
    }

    /// Risk carried by an edge of the given strength.
    ///
    /// An edge without a declared strength carries `Low` risk.
    #[must_use]
    pub fn for_strength(strength: Option<DependencyStrength>) -> Self {
        match strength {
            Some(DependencyStrength::Strong) => Self::Critical,
            Some(DependencyStrength::Medium) => Self::High,
            Some(DependencyStrength::Weak) => Self::Medium,
            None => Self::Low,
        }
    }
}

impl From<DependencyStrength> for RiskLevel {
    fn from(strength: DependencyStrength) -> Self {
        Self::for_strength(Some(strength))
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy as seen through the external lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Unique identifier
    pub id: PolicyId,

    /// Human-readable title
    pub title: String,

    /// Policy category (e.g. "safeguarding")
    pub category: String,

    /// Published version label
    pub version: String,

    /// Owning organization
    pub organization_id: Uuid,
}

/// Open metadata attached to a dependency record.
///
/// The recognized keys are typed; anything else is preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyMetadata {
    /// What changes for the dependent entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_description: Option<String>,

    /// Policy sections the dependent relies on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_sections: Vec<String>,

    /// Whether the dependent can update itself without manual work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatic_update: Option<bool>,

    /// Free-text migration guidance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_path: Option<String>,

    /// Unrecognized keys
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DependencyMetadata {
    /// Whether the dependent self-updates; absent means no.
    #[must_use]
    pub fn automatic_update(&self) -> bool {
        self.automatic_update.unwrap_or(false)
    }
}

/// One declared edge from a policy to a dependent entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    /// Unique identifier
    pub id: DependencyId,

    /// Owning policy (the graph root for this edge)
    pub policy_id: PolicyId,

    /// Kind of dependent entity
    pub dependent_type: DependentType,

    /// The dependent entity
    pub dependent_id: EntityId,

    /// Coupling tightness
    pub strength: DependencyStrength,

    /// Open metadata
    #[serde(default)]
    pub metadata: DependencyMetadata,

    /// Free-text notes, not used in scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Inactive records are kept for history but ignored by analysis
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl DependencyRecord {
    /// Risk carried by this record's edge.
    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        self.strength.into()
    }
}

/// Data for declaring a new dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDependency {
    /// Owning policy
    pub policy_id: PolicyId,

    /// Kind of dependent entity
    pub dependent_type: DependentType,

    /// The dependent entity
    pub dependent_id: EntityId,

    /// Explicit strength; `None` falls back to the per-type default
    pub strength: Option<DependencyStrength>,

    /// Open metadata
    pub metadata: DependencyMetadata,

    /// Free-text notes
    pub notes: Option<String>,
}

impl NewDependency {
    /// Declare an edge with no explicit strength, metadata or notes.
    #[must_use]
    pub fn new(policy_id: PolicyId, dependent_type: DependentType, dependent_id: EntityId) -> Self {
        Self {
            policy_id,
            dependent_type,
            dependent_id,
            strength: None,
            metadata: DependencyMetadata::default(),
            notes: None,
        }
    }

    /// Set an explicit strength.
    #[must_use]
    pub fn with_strength(mut self, strength: DependencyStrength) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: DependencyMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Data for updating an existing dependency record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyUpdate {
    /// New strength (if updating)
    pub strength: Option<DependencyStrength>,

    /// Replacement metadata (if updating)
    pub metadata: Option<DependencyMetadata>,

    /// New notes (if updating, `Some(None)` to clear)
    pub notes: Option<Option<String>>,

    /// Activate or deactivate (if updating)
    pub is_active: Option<bool>,
}

/// Filter for querying dependency records.
///
/// Every `None` field matches all records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyFilter {
    /// Filter by owning policy
    pub policy_id: Option<PolicyId>,

    /// Filter by dependent type
    pub dependent_type: Option<DependentType>,

    /// Filter by dependent entity
    pub dependent_id: Option<EntityId>,

    /// Filter by activity flag
    pub is_active: Option<bool>,
}

impl DependencyFilter {
    /// Records owned by `policy_id`.
    #[must_use]
    pub fn for_policy(policy_id: PolicyId) -> Self {
        Self {
            policy_id: Some(policy_id),
            ..Self::default()
        }
    }

    /// Records whose dependent is the given entity.
    #[must_use]
    pub fn for_dependent(dependent_type: DependentType, dependent_id: EntityId) -> Self {
        Self {
            dependent_type: Some(dependent_type),
            dependent_id: Some(dependent_id),
            ..Self::default()
        }
    }

    /// Restrict to active records.
    #[must_use]
    pub fn active_only(mut self) -> Self {
        self.is_active = Some(true);
        self
    }

    /// Whether `record` passes this filter.
    #[must_use]
    pub fn matches(&self, record: &DependencyRecord) -> bool {
        self.policy_id.is_none_or(|id| record.policy_id == id)
            && self
                .dependent_type
                .is_none_or(|t| record.dependent_type == t)
            && self.dependent_id.is_none_or(|id| record.dependent_id == id)
            && self.is_active.is_none_or(|a| record.is_active == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::strong(DependencyStrength::Strong, RiskLevel::Critical)]
    #[case::medium(DependencyStrength::Medium, RiskLevel::High)]
    #[case::weak(DependencyStrength::Weak, RiskLevel::Medium)]
    fn test_strength_to_risk_level(#[case] strength: DependencyStrength, #[case] level: RiskLevel) {
        assert_eq!(RiskLevel::from(strength), level);
    }

    #[test]
    fn test_missing_strength_is_low_risk() {
        assert_eq!(RiskLevel::for_strength(None), RiskLevel::Low);
    }

    #[rstest]
    #[case::lower("workflow", DependentType::Workflow)]
    #[case::upper("TEMPLATE", DependentType::Template)]
    #[case::padded(" training ", DependentType::Training)]
    fn test_parse_dependent_type(#[case] input: &str, #[case] expected: DependentType) {
        assert_eq!(input.parse::<DependentType>().unwrap(), expected);
    }

    #[rstest]
    #[case::unknown_type("spreadsheet")]
    #[case::empty("")]
    fn test_parse_dependent_type_rejects(#[case] input: &str) {
        let err = input.parse::<DependentType>().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument {
                field: "dependent type",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_strength_rejects_unknown() {
        let err = "critical".parse::<DependencyStrength>().unwrap_err();
        assert!(err.to_string().contains("strong, medium, weak"));
    }

    #[test]
    fn test_malformed_uuid_is_invalid_argument() {
        let err = "not-a-uuid".parse::<PolicyId>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { field: "policy id", .. }));
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert!(RiskLevel::High.is_elevated());
        assert!(!RiskLevel::Medium.is_elevated());
    }

    #[test]
    fn test_metadata_keeps_unknown_keys() {
        let json = r#"{"impactDescription":"Rota changes","automaticUpdate":true,"owner":"ops"}"#;
        let metadata: DependencyMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.impact_description.as_deref(), Some("Rota changes"));
        assert!(metadata.automatic_update());
        assert_eq!(metadata.extra["owner"], "ops");

        let back = serde_json::to_value(&metadata).unwrap();
        assert_eq!(back["automaticUpdate"], true);
        assert_eq!(back["owner"], "ops");
    }

    #[test]
    fn test_filter_matches() {
        let policy = PolicyId::new();
        let entity = EntityId::new();
        let now = Utc::now();
        let record = DependencyRecord {
            id: DependencyId::new(),
            policy_id: policy,
            dependent_type: DependentType::Module,
            dependent_id: entity,
            strength: DependencyStrength::Medium,
            metadata: DependencyMetadata::default(),
            notes: None,
            is_active: false,
            created_at: now,
            updated_at: now,
        };

        assert!(DependencyFilter::for_policy(policy).matches(&record));
        assert!(!DependencyFilter::for_policy(policy).active_only().matches(&record));
        assert!(DependencyFilter::for_dependent(DependentType::Module, entity).matches(&record));
        assert!(!DependencyFilter::for_dependent(DependentType::Workflow, entity).matches(&record));
    }
}
