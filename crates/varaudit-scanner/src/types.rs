//! Shared types for the auditor

use serde::{Deserialize, Serialize};
use std::fmt;
use varaudit_client::{GroupRecord, Owner, ProjectRecord};

/// Variable key searched for when none is configured
pub const DEFAULT_KEY: &str = "VAULT_URL";

/// Shown in place of a project path for group-level matches
pub const GROUP_LEVEL: &str = "(group level)";

/// Shown in place of a value the API withheld
pub const VALUE_UNAVAILABLE: &str = "[value unavailable]";

/// Shown in place of values when output is redacted
pub const REDACTED: &str = "***";

/// Kind of node in the organization tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Group,
    Project,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Group => f.write_str("Group"),
            EntityKind::Project => f.write_str("Project"),
        }
    }
}

/// A group or project as seen by the walker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub id: u64,
    /// Full slash-delimited path from the root
    pub path: String,
    /// Path of the containing group, empty at the top level
    pub parent_path: String,
}

impl Entity {
    /// Group reached at `path` under `parent_path`
    pub fn group(
        record: &GroupRecord,
        path: impl Into<String>,
        parent_path: impl Into<String>,
    ) -> Self {
        Self {
            kind: EntityKind::Group,
            id: record.id,
            path: path.into(),
            parent_path: parent_path.into(),
        }
    }

    /// Project owned by the group at `group_path` (empty for top-level projects)
    pub fn project(record: &ProjectRecord, group_path: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Project,
            id: record.id,
            path: record.path_with_namespace.clone(),
            parent_path: group_path.into(),
        }
    }

    /// Owner handle used to list this entity's variables
    pub fn owner(&self) -> Owner {
        match self.kind {
            EntityKind::Group => Owner::Group(self.id),
            EntityKind::Project => Owner::Project(self.id),
        }
    }

    /// Identity used for visit tracking
    pub fn key(&self) -> (EntityKind, u64) {
        (self.kind, self.id)
    }
}

/// What to look for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Exact variable key
    pub key: String,
    /// Substring the value must contain (case-sensitive)
    pub needle: String,
}

impl SearchCriteria {
    pub fn new(key: impl Into<String>, needle: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            needle: needle.into(),
        }
    }
}

/// A variable whose key and value satisfied the search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub group_path: String,
    /// `None` for group-level variables
    pub project_path: Option<String>,
    pub level: EntityKind,
    pub key: String,
    /// `None` when the API withheld the value
    pub value: Option<String>,
    pub environment_scope: Option<String>,
}

impl Match {
    pub fn project_display(&self) -> &str {
        self.project_path.as_deref().unwrap_or(GROUP_LEVEL)
    }

    pub fn value_display(&self) -> &str {
        self.value.as_deref().unwrap_or(VALUE_UNAVAILABLE)
    }
}

/// Why a node's result is incomplete or suspicious
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningReason {
    /// Key matched but the value was not returned
    MaskedValue,
    /// Variable listing failed
    VariablesUnavailable,
    /// Project listing of a group failed
    ProjectsUnavailable,
    /// Subgroup listing of a group failed
    SubgroupsUnavailable,
    /// A top-level listing failed after returning some records
    ListingIncomplete,
    /// A group was reached a second time
    CycleDetected,
}

impl WarningReason {
    /// Whether this warning means some records could not be inspected
    pub fn is_incomplete(self) -> bool {
        !matches!(self, WarningReason::CycleDetected)
    }
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WarningReason::MaskedValue => "possibly masked variable, cannot verify value",
            WarningReason::VariablesUnavailable => "failed to fetch variables",
            WarningReason::ProjectsUnavailable => "failed to fetch projects",
            WarningReason::SubgroupsUnavailable => "failed to fetch subgroups",
            WarningReason::ListingIncomplete => "top-level listing incomplete",
            WarningReason::CycleDetected => "group reached more than once",
        };
        f.write_str(text)
    }
}

/// A condition the operator should know about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub entity_kind: EntityKind,
    pub entity_path: String,
    pub reason: WarningReason,
    /// Variable key, for per-variable warnings
    pub key: Option<String>,
    pub detail: String,
}

impl Warning {
    pub fn for_entity(entity: &Entity, reason: WarningReason, detail: impl Into<String>) -> Self {
        Self {
            entity_kind: entity.kind,
            entity_path: entity.path.clone(),
            reason,
            key: None,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.entity_kind, self.entity_path, self.reason)?;
        if let Some(key) = &self.key {
            write!(f, " ({key})")?;
        }
        if !self.detail.is_empty() {
            write!(f, " - {}", self.detail)?;
        }
        Ok(())
    }
}
