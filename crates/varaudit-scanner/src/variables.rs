//! Variable inspection for one group or project

use crate::predicate::{classify, Verdict};
use crate::types::{Entity, EntityKind, Match, SearchCriteria, Warning, WarningReason};
use varaudit_client::Directory;

/// Result of inspecting one entity's variables
#[derive(Debug, Default)]
pub struct VariableScan {
    pub matches: Vec<Match>,
    pub warnings: Vec<Warning>,
    /// Records evaluated
    pub inspected: usize,
}

/// Fetch and evaluate every variable of `entity`
///
/// `group_path` is the path recorded on matches: the group's own path for
/// group-level variables, the owning group's path for project variables.
/// A failed listing yields one warning and no matches.
pub async fn scan_variables<D>(
    directory: &D,
    entity: &Entity,
    group_path: &str,
    criteria: &SearchCriteria,
) -> VariableScan
where
    D: Directory + ?Sized,
{
    let collected = directory.variables(entity.owner()).await;
    let mut scan = VariableScan::default();

    if let Some(error) = collected.error {
        log::warn!("Failed to fetch variables for {} {}: {error}", entity.kind, entity.path);
        scan.warnings.push(Warning::for_entity(
            entity,
            WarningReason::VariablesUnavailable,
            error.to_string(),
        ));
        return scan;
    }

    for record in collected.items {
        scan.inspected += 1;
        match classify(&record, criteria) {
            Verdict::Match => {
                log::info!("Match in {} {}: {}", entity.kind, entity.path, record.key);
                scan.matches.push(Match {
                    group_path: group_path.to_string(),
                    project_path: match entity.kind {
                        EntityKind::Group => None,
                        EntityKind::Project => Some(entity.path.clone()),
                    },
                    level: entity.kind,
                    key: record.key,
                    value: record.value,
                    environment_scope: record.environment_scope,
                });
            }
            Verdict::Masked => {
                log::warn!(
                    "Variable '{}' in {} {} might be masked; cannot check its value",
                    record.key,
                    entity.kind,
                    entity.path
                );
                let scope = record
                    .environment_scope
                    .map(|s| format!("environment scope {s}"))
                    .unwrap_or_default();
                scan.warnings.push(
                    Warning::for_entity(entity, WarningReason::MaskedValue, scope)
                        .with_key(record.key),
                );
            }
            Verdict::Miss => {}
        }
    }

    scan
}
