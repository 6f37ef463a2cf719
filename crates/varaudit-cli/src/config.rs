//! Audit settings from flags and environment

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use varaudit_client::{AuthScheme, ClientConfig, Pagination};
use varaudit_scanner::types::DEFAULT_KEY;
use varaudit_scanner::{AuditPolicy, SearchCriteria};

/// GitLab caps `per_page` at 100
const MAX_PER_PAGE: u32 = 100;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Text the variable value must contain
    #[arg(short, long, env = "VARAUDIT_SEARCH")]
    pub search: String,

    /// Variable key to look for
    #[arg(short, long, env = "VARAUDIT_KEY", default_value = DEFAULT_KEY)]
    pub key: String,

    /// GitLab instance URL
    #[arg(long, env = "GITLAB_URL", default_value = "https://gitlab.com")]
    pub url: String,

    /// Access token (falls back to GITLAB_PAT)
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// How the token is sent: private-token or bearer
    #[arg(long, default_value = "private-token")]
    pub auth: AuthScheme,

    /// Pagination style: link (Link header) or page (page numbers)
    #[arg(long, default_value = "link")]
    pub pagination: Pagination,

    /// Records requested per page
    #[arg(long, default_value_t = 100)]
    pub per_page: u32,

    /// Pause before each request, in milliseconds
    #[arg(long, default_value_t = 100)]
    pub delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Maximum pages fetched for one collection
    #[arg(long, default_value_t = 1000)]
    pub max_pages: u32,

    /// Stop walking after this many seconds and report what was found
    #[arg(long)]
    pub max_duration_secs: Option<u64>,

    /// Do not inspect variables defined on groups
    #[arg(long)]
    pub skip_group_variables: bool,

    /// Inspect archived projects too
    #[arg(long)]
    pub include_archived: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace matched values with *** in the report
    #[arg(long)]
    pub redact_values: bool,
}

/// Validated settings for one audit run
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub client: ClientConfig,
    pub pagination: Pagination,
    pub criteria: SearchCriteria,
    pub policy: AuditPolicy,
    pub max_duration: Option<Duration>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub redact_values: bool,
}

impl AuditConfig {
    pub fn from_args(args: AuditArgs) -> Result<Self> {
        let token = args
            .token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var("GITLAB_PAT").ok().filter(|t| !t.trim().is_empty()))
            .context("No access token: pass --token or set GITLAB_TOKEN or GITLAB_PAT")?;

        if args.search.is_empty() {
            bail!("Search string cannot be empty");
        }
        if args.key.trim().is_empty() {
            bail!("Variable key cannot be empty");
        }
        if args.per_page == 0 || args.per_page > MAX_PER_PAGE {
            bail!("--per-page must be between 1 and {MAX_PER_PAGE}");
        }
        if args.max_pages == 0 {
            bail!("--max-pages must be at least 1");
        }
        if args.timeout_secs == 0 {
            bail!("--timeout-secs must be at least 1");
        }

        let client = ClientConfig::new(args.url.trim(), token.trim())
            .with_auth(args.auth)
            .with_timeout(Duration::from_secs(args.timeout_secs))
            .with_request_delay(Duration::from_millis(args.delay_ms))
            .with_per_page(args.per_page)
            .with_max_pages(args.max_pages);

        Ok(Self {
            client,
            pagination: args.pagination,
            criteria: SearchCriteria::new(args.key, args.search),
            policy: AuditPolicy {
                scan_group_variables: !args.skip_group_variables,
                include_archived: args.include_archived,
            },
            max_duration: args.max_duration_secs.map(Duration::from_secs),
            format: args.format,
            output: args.output,
            redact_values: args.redact_values,
        })
    }
}
