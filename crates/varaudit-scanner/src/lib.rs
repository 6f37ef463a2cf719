//! varaudit scanner - CI/CD variable audit over a GitLab group tree
//!
//! Walks every group, subgroup and project reachable from the top-level
//! listings, inspects their variables, and collects matches and warnings
//! into an [`AuditReport`]. Fetch failures degrade single nodes and never
//! abort the walk.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines
)]

pub mod error;
pub mod output;
pub mod predicate;
pub mod report;
pub mod types;
pub mod variables;
pub mod walker;

pub use error::{ScanError, ScanResult};
pub use report::{Aggregator, AuditReport, AuditStats};
pub use types::{Entity, EntityKind, Match, SearchCriteria, Warning, WarningReason};
pub use walker::{AuditPolicy, Auditor};
