//! GitLab listings used by the auditor

use crate::config::Pagination;
use crate::error::ClientResult;
use crate::models::{GroupRecord, ProjectRecord, VariableRecord};
use crate::rest::{Collected, RestClient};
use crate::ClientConfig;
use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Owner of a variable collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Group(u64),
    Project(u64),
}

impl Owner {
    /// API path of the owner's variable collection
    pub fn variables_path(self) -> String {
        match self {
            Owner::Group(id) => format!("/groups/{id}/variables"),
            Owner::Project(id) => format!("/projects/{id}/variables"),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Group(id) => write!(f, "group {id}"),
            Owner::Project(id) => write!(f, "project {id}"),
        }
    }
}

/// Read-only view of the organization tree
///
/// Every listing returns whatever it managed to collect plus the error that
/// stopped it, so callers can degrade a single node instead of failing the
/// whole walk.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Groups without a parent
    async fn top_level_groups(&self) -> Collected<GroupRecord>;

    /// Direct subgroups of a group
    async fn subgroups(&self, group_id: u64) -> Collected<GroupRecord>;

    /// Projects owned directly by a group (not through subgroups)
    async fn group_projects(&self, group_id: u64) -> Collected<ProjectRecord>;

    /// Projects without an owning group
    async fn top_level_projects(&self) -> Collected<ProjectRecord>;

    /// CI/CD variables of a group or project
    async fn variables(&self, owner: Owner) -> Collected<VariableRecord>;
}

/// [`Directory`] backed by the GitLab REST API
#[derive(Debug, Clone)]
pub struct GitLabClient {
    rest: RestClient,
    pagination: Pagination,
    include_archived: bool,
}

impl GitLabClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            rest: RestClient::new(config)?,
            pagination: Pagination::default(),
            include_archived: false,
        })
    }

    /// Continuation style used for every listing
    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Ask the API for archived projects too
    #[must_use]
    pub fn with_archived(mut self, include: bool) -> Self {
        self.include_archived = include;
        self
    }

    /// Stop every listing, including requests in flight, once `cancel` fires
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.rest = self.rest.with_cancel(cancel);
        self
    }

    fn project_query(&self, mut query: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        if !self.include_archived {
            query.push(("archived", "false".to_string()));
        }
        query
    }
}

#[async_trait]
impl Directory for GitLabClient {
    async fn top_level_groups(&self) -> Collected<GroupRecord> {
        let query = [("top_level_only", "true".to_string())];
        self.rest.fetch_all("/groups", &query, self.pagination).await
    }

    async fn subgroups(&self, group_id: u64) -> Collected<GroupRecord> {
        self.rest
            .fetch_all(&format!("/groups/{group_id}/subgroups"), &[], self.pagination)
            .await
    }

    async fn group_projects(&self, group_id: u64) -> Collected<ProjectRecord> {
        let query = self.project_query(vec![("include_subgroups", "false".to_string())]);
        self.rest
            .fetch_all(&format!("/groups/{group_id}/projects"), &query, self.pagination)
            .await
    }

    async fn top_level_projects(&self) -> Collected<ProjectRecord> {
        let query = self.project_query(vec![("top_level_only", "true".to_string())]);
        self.rest.fetch_all("/projects", &query, self.pagination).await
    }

    async fn variables(&self, owner: Owner) -> Collected<VariableRecord> {
        self.rest
            .fetch_all(&owner.variables_path(), &[], self.pagination)
            .await
    }
}
