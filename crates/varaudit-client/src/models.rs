//! Wire records returned by the GitLab REST API
//!
//! Only the fields the audit reads are modelled; everything else in the
//! payload is ignored.

use serde::{Deserialize, Serialize};

/// A group or subgroup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// URL slug of this group alone
    pub path: String,
    /// Slash-delimited path from the root group
    #[serde(default)]
    pub full_path: Option<String>,
    #[serde(default)]
    pub parent_id: Option<u64>,
}

impl GroupRecord {
    /// Display path of this group when it is reached under `parent_path`
    ///
    /// Top-level groups use their own `full_path` (falling back to `path`);
    /// subgroups are named by appending their slug to the parent's path.
    pub fn display_path(&self, parent_path: &str) -> String {
        if parent_path.is_empty() {
            self.full_path.clone().unwrap_or_else(|| self.path.clone())
        } else {
            format!("{parent_path}/{}", self.path)
        }
    }
}

/// A project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub path_with_namespace: String,
    #[serde(default)]
    pub archived: Option<bool>,
}

impl ProjectRecord {
    pub fn is_archived(&self) -> bool {
        self.archived.unwrap_or(false)
    }
}

/// A CI/CD variable on a group or project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub key: String,
    /// Absent (or `null`) when the API withholds the value
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub environment_scope: Option<String>,
    #[serde(default)]
    pub masked: Option<bool>,
    #[serde(default)]
    pub protected: Option<bool>,
    #[serde(default)]
    pub variable_type: Option<String>,
}

impl VariableRecord {
    /// Record with a readable value
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            environment_scope: None,
            masked: None,
            protected: None,
            variable_type: None,
        }
    }

    /// Record whose value the API did not return
    pub fn withheld(key: impl Into<String>) -> Self {
        Self {
            value: None,
            ..Self::new(key, String::new())
        }
    }
}
