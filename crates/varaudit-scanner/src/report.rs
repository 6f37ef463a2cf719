//! Accumulation of audit results

use crate::types::{Match, SearchCriteria, Warning, REDACTED};
use crate::variables::VariableScan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters gathered during a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStats {
    pub groups_visited: usize,
    pub projects_visited: usize,
    pub variables_inspected: usize,
    pub archived_skipped: usize,
    pub duplicates_skipped: usize,
}

/// Insertion-ordered collector of matches and warnings
#[derive(Debug)]
pub struct Aggregator {
    matches: Vec<Match>,
    warnings: Vec<Warning>,
    stats: AuditStats,
    started_at: DateTime<Utc>,
    interrupted: bool,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            matches: Vec::new(),
            warnings: Vec::new(),
            stats: AuditStats::default(),
            started_at: Utc::now(),
            interrupted: false,
        }
    }

    pub fn record_match(&mut self, found: Match) {
        self.matches.push(found);
    }

    pub fn record_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Fold one entity's variable scan in
    pub fn absorb(&mut self, scan: VariableScan) {
        self.stats.variables_inspected += scan.inspected;
        self.matches.extend(scan.matches);
        self.warnings.extend(scan.warnings);
    }

    pub fn stats_mut(&mut self) -> &mut AuditStats {
        &mut self.stats
    }

    /// Note that the walk stopped before visiting every node
    pub fn mark_interrupted(&mut self) {
        if !self.interrupted {
            log::warn!("Audit interrupted; remaining nodes will not be visited");
        }
        self.interrupted = true;
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn finish(self, criteria: SearchCriteria) -> AuditReport {
        AuditReport {
            criteria,
            matches: self.matches,
            warnings: self.warnings,
            stats: self.stats,
            started_at: self.started_at,
            finished_at: Utc::now(),
            interrupted: self.interrupted,
        }
    }
}

/// Final result of an audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub criteria: SearchCriteria,
    pub matches: Vec<Match>,
    pub warnings: Vec<Warning>,
    pub stats: AuditStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Walk stopped early (operator interrupt or time limit)
    pub interrupted: bool,
}

impl AuditReport {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Every node was visited and every listing succeeded
    pub fn is_complete(&self) -> bool {
        !self.interrupted && !self.warnings.iter().any(|w| w.reason.is_incomplete())
    }

    /// Paths of entities whose results are partial, first occurrence order
    pub fn incomplete_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for warning in self.warnings.iter().filter(|w| w.reason.is_incomplete()) {
            if !paths.contains(&warning.entity_path.as_str()) {
                paths.push(&warning.entity_path);
            }
        }
        paths
    }

    /// Copy with every matched value replaced by a fixed marker
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut report = self.clone();
        for found in &mut report.matches {
            if found.value.is_some() {
                found.value = Some(REDACTED.to_string());
            }
        }
        report
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, EntityKind, WarningReason};

    fn found(project: &str) -> Match {
        Match {
            group_path: "infra".to_string(),
            project_path: Some(project.to_string()),
            level: EntityKind::Project,
            key: "VAULT_URL".to_string(),
            value: Some("https://vault.prod.example.com".to_string()),
            environment_scope: None,
        }
    }

    fn entity(path: &str) -> Entity {
        Entity {
            kind: EntityKind::Project,
            id: 1,
            path: path.to_string(),
            parent_path: "infra".to_string(),
        }
    }

    #[test]
    fn keeps_insertion_order_without_dedup() {
        let mut agg = Aggregator::new();
        agg.record_match(found("infra/b"));
        agg.record_match(found("infra/a"));
        agg.record_match(found("infra/b"));

        let report = agg.finish(SearchCriteria::new("VAULT_URL", "prod"));
        let projects: Vec<&str> = report.matches.iter().map(Match::project_display).collect();
        assert_eq!(projects, vec!["infra/b", "infra/a", "infra/b"]);
    }

    #[test]
    fn cycle_warning_keeps_report_complete_but_failures_do_not() {
        let mut agg = Aggregator::new();
        agg.record_warning(Warning::for_entity(
            &entity("infra/a"),
            WarningReason::CycleDetected,
            "",
        ));
        assert!(agg
            .finish(SearchCriteria::new("K", "v"))
            .incomplete_paths()
            .is_empty());

        let mut agg = Aggregator::new();
        agg.record_warning(Warning::for_entity(
            &entity("infra/a"),
            WarningReason::VariablesUnavailable,
            "HTTP 500",
        ));
        agg.record_warning(Warning::for_entity(
            &entity("infra/a"),
            WarningReason::MaskedValue,
            "",
        ));
        let report = agg.finish(SearchCriteria::new("K", "v"));
        assert!(!report.is_complete());
        assert_eq!(report.incomplete_paths(), vec!["infra/a"]);
    }

    #[test]
    fn redaction_hides_values_only() {
        let mut agg = Aggregator::new();
        agg.record_match(found("infra/a"));
        let report = agg.finish(SearchCriteria::new("VAULT_URL", "prod")).redacted();
        assert_eq!(report.matches[0].value_display(), REDACTED);
        assert_eq!(report.matches[0].project_display(), "infra/a");
    }

    #[test]
    fn interrupted_report_is_incomplete() {
        let mut agg = Aggregator::new();
        agg.mark_interrupted();
        assert!(agg.is_interrupted());
        assert!(!agg.finish(SearchCriteria::new("K", "v")).is_complete());
    }
}
