//! varaudit client - raw REST access to a GitLab instance
//!
//! This crate issues read-only `GET` requests against `/api/v4`, hides the
//! two pagination styles GitLab deployments use, and exposes the listings
//! the auditor needs through the [`Directory`] trait.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub mod config;
pub mod error;
pub mod gitlab;
pub mod link;
pub mod models;
pub mod rest;

pub use config::{AuthScheme, ClientConfig, Pagination};
pub use error::{ClientError, ClientResult, FetchError};
pub use gitlab::{Directory, GitLabClient, Owner};
pub use models::{GroupRecord, ProjectRecord, VariableRecord};
pub use rest::{Collected, Page, PageHint, RestClient};
