//! Depth-first walk of the group tree

use crate::error::{ScanError, ScanResult};
use crate::report::{Aggregator, AuditReport};
use crate::types::{Entity, EntityKind, SearchCriteria, Warning, WarningReason};
use crate::variables::scan_variables;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use varaudit_client::{Collected, Directory, GroupRecord, ProjectRecord};

/// Which parts of the tree are inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditPolicy {
    /// Inspect variables defined on groups, not only on projects
    pub scan_group_variables: bool,
    /// Inspect archived projects
    pub include_archived: bool,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            scan_group_variables: true,
            include_archived: false,
        }
    }
}

/// A group waiting on the DFS stack
#[derive(Debug)]
struct PendingGroup {
    record: GroupRecord,
    path: String,
    parent_path: String,
}

impl PendingGroup {
    fn under(record: GroupRecord, parent_path: &str) -> Self {
        Self {
            path: record.display_path(parent_path),
            parent_path: parent_path.to_string(),
            record,
        }
    }
}

/// Walks every node reachable from the top-level listings
pub struct Auditor<'a, D: Directory + ?Sized> {
    directory: &'a D,
    criteria: SearchCriteria,
    policy: AuditPolicy,
    cancel: CancellationToken,
}

impl<'a, D: Directory + ?Sized> Auditor<'a, D> {
    pub fn new(directory: &'a D, criteria: SearchCriteria) -> Self {
        Self {
            directory,
            criteria,
            policy: AuditPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AuditPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stop visiting nodes once `cancel` fires
    ///
    /// The directory should observe the same token so that a listing in
    /// progress is abandoned too.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the full audit
    ///
    /// Both top-level listings are fetched before anything is walked; if
    /// either fails without returning a single record the audit is fatal.
    /// Every later failure becomes a warning on the affected node. A
    /// cancelled audit is never fatal: it returns what was collected.
    pub async fn run(&self) -> ScanResult<AuditReport> {
        log::info!(
            "Searching for variable '{}' containing '{}'",
            self.criteria.key,
            self.criteria.needle
        );
        let mut agg = Aggregator::new();
        let mut visited = HashSet::new();

        if self.should_stop(&mut agg) {
            return Ok(agg.finish(self.criteria.clone()));
        }
        let groups = initial_listing(
            "top-level groups",
            EntityKind::Group,
            self.directory.top_level_groups().await,
            &mut agg,
        )?;
        let projects = if self.should_stop(&mut agg) {
            Vec::new()
        } else {
            initial_listing(
                "top-level projects",
                EntityKind::Project,
                self.directory.top_level_projects().await,
                &mut agg,
            )?
        };

        if groups.is_empty() {
            log::info!("No top-level groups found or accessible with the provided token");
        }
        self.walk_top_level_groups(groups, &mut agg, &mut visited).await;
        self.walk_top_level_projects(projects, &mut agg, &mut visited).await;
        // A cancel during the final listing leaves no later check to notice it.
        self.should_stop(&mut agg);

        let report = agg.finish(self.criteria.clone());
        log::info!(
            "Audit complete: {} groups, {} projects, {} matches, {} warnings",
            report.stats.groups_visited,
            report.stats.projects_visited,
            report.match_count(),
            report.warning_count()
        );
        Ok(report)
    }

    async fn walk_top_level_groups(
        &self,
        groups: Vec<GroupRecord>,
        agg: &mut Aggregator,
        visited: &mut HashSet<(EntityKind, u64)>,
    ) {
        let mut stack: Vec<PendingGroup> = groups
            .into_iter()
            .rev()
            .map(|g| PendingGroup::under(g, ""))
            .collect();

        while let Some(pending) = stack.pop() {
            if self.should_stop(agg) {
                return;
            }
            let children = self.walk_group(pending, agg, visited).await;
            stack.extend(children.into_iter().rev());
        }
    }

    /// Visit one group; returns its subgroups in API order
    async fn walk_group(
        &self,
        pending: PendingGroup,
        agg: &mut Aggregator,
        visited: &mut HashSet<(EntityKind, u64)>,
    ) -> Vec<PendingGroup> {
        let entity = Entity::group(&pending.record, pending.path, pending.parent_path);
        if !visited.insert(entity.key()) {
            log::warn!("Group {} (ID: {}) reached twice; skipping", entity.path, entity.id);
            agg.stats_mut().duplicates_skipped += 1;
            agg.record_warning(Warning::for_entity(
                &entity,
                WarningReason::CycleDetected,
                format!("group {} already visited", entity.id),
            ));
            return Vec::new();
        }
        agg.stats_mut().groups_visited += 1;
        log::info!("Processing group: {} (ID: {})", entity.path, entity.id);

        if self.policy.scan_group_variables {
            let scan = scan_variables(self.directory, &entity, &entity.path, &self.criteria).await;
            agg.absorb(scan);
        }

        if self.should_stop(agg) {
            return Vec::new();
        }
        let (projects, error) = self.directory.group_projects(entity.id).await.into_parts();
        if let Some(error) = error {
            log::warn!("Failed to fetch projects for group {}: {error}", entity.path);
            agg.record_warning(Warning::for_entity(
                &entity,
                WarningReason::ProjectsUnavailable,
                error.to_string(),
            ));
        }
        for project in &projects {
            if self.should_stop(agg) {
                return Vec::new();
            }
            self.scan_project(project, &entity.path, agg, visited).await;
        }

        if self.should_stop(agg) {
            return Vec::new();
        }
        let (subgroups, error) = self.directory.subgroups(entity.id).await.into_parts();
        if let Some(error) = error {
            log::warn!("Failed to fetch subgroups for group {}: {error}", entity.path);
            agg.record_warning(Warning::for_entity(
                &entity,
                WarningReason::SubgroupsUnavailable,
                error.to_string(),
            ));
        }

        subgroups
            .into_iter()
            .map(|g| PendingGroup::under(g, &entity.path))
            .collect()
    }

    async fn walk_top_level_projects(
        &self,
        projects: Vec<ProjectRecord>,
        agg: &mut Aggregator,
        visited: &mut HashSet<(EntityKind, u64)>,
    ) {
        for project in &projects {
            if self.should_stop(agg) {
                return;
            }
            self.scan_project(project, "", agg, visited).await;
        }
    }

    async fn scan_project(
        &self,
        project: &ProjectRecord,
        group_path: &str,
        agg: &mut Aggregator,
        visited: &mut HashSet<(EntityKind, u64)>,
    ) {
        if !self.policy.include_archived && project.is_archived() {
            log::debug!("Skipping archived project {}", project.path_with_namespace);
            agg.stats_mut().archived_skipped += 1;
            return;
        }

        let entity = Entity::project(project, group_path);
        if !visited.insert(entity.key()) {
            // Top-level listings may repeat projects already reached through a group.
            log::debug!("Project {} already inspected", entity.path);
            agg.stats_mut().duplicates_skipped += 1;
            return;
        }
        agg.stats_mut().projects_visited += 1;
        log::info!("  Checking project: {}", entity.path);

        let scan = scan_variables(self.directory, &entity, group_path, &self.criteria).await;
        agg.absorb(scan);
    }

    fn should_stop(&self, agg: &mut Aggregator) -> bool {
        if self.cancel.is_cancelled() {
            agg.mark_interrupted();
            return true;
        }
        false
    }
}

/// Unwrap a top-level listing, treating a total failure as fatal
fn initial_listing<T>(
    collection: &'static str,
    kind: EntityKind,
    collected: Collected<T>,
    agg: &mut Aggregator,
) -> ScanResult<Vec<T>> {
    match collected.into_parts() {
        (items, None) => Ok(items),
        (items, Some(error)) if error.is_cancelled() => {
            log::debug!("Listing of {collection} cancelled: {error}");
            agg.mark_interrupted();
            Ok(items)
        }
        (items, Some(source)) if items.is_empty() => {
            Err(ScanError::InitialListing { collection, source })
        }
        (items, Some(error)) => {
            log::warn!("Listing of {collection} incomplete: {error}");
            agg.record_warning(Warning {
                entity_kind: kind,
                entity_path: format!("({collection})"),
                reason: WarningReason::ListingIncomplete,
                key: None,
                detail: error.to_string(),
            });
            Ok(items)
        }
    }
}
