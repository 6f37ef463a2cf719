//! `varaudit audit`: walk the group tree and report matching variables

use crate::config::{AuditConfig, OutputFormat};
use anyhow::{Context, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use varaudit_client::GitLabClient;
use varaudit_scanner::output::{to_json, to_markdown, to_text};
use varaudit_scanner::{AuditReport, Auditor};

/// Exit status after a second Ctrl-C, as for a plain SIGINT
const INTERRUPT_EXIT: i32 = 130;

/// Run the audit; Ctrl-C or the time limit stops it and keeps what was collected
pub async fn execute(config: &AuditConfig) -> Result<AuditReport> {
    let cancel = CancellationToken::new();
    let client = GitLabClient::new(config.client.clone())?
        .with_pagination(config.pagination)
        .with_archived(config.policy.include_archived)
        .with_cancel(cancel.clone());

    tokio::spawn(watch_interrupts(cancel.clone()));
    if let Some(limit) = config.max_duration {
        tokio::spawn(cancel_after(limit, cancel.clone()));
    }

    log::info!("Starting variable audit of {}", config.client.base_url);
    let auditor = Auditor::new(&client, config.criteria.clone())
        .with_policy(config.policy)
        .with_cancel(cancel.clone());
    let report = auditor.run().await;
    // Stop the timer and signal tasks from touching a finished audit.
    cancel.cancel();

    Ok(report?)
}

/// First Ctrl-C cancels the audit; a second one exits immediately
async fn watch_interrupts(cancel: CancellationToken) {
    tokio::select! {
        () = cancel.cancelled() => return,
        result = tokio::signal::ctrl_c() => {
            if result.is_err() {
                return;
            }
        }
    }
    log::warn!("Interrupt received; finishing with the results collected so far");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("Interrupted again; exiting without a report");
        std::process::exit(INTERRUPT_EXIT);
    }
}

async fn cancel_after(limit: Duration, cancel: CancellationToken) {
    tokio::select! {
        () = cancel.cancelled() => {}
        () = tokio::time::sleep(limit) => {
            log::warn!(
                "Time limit of {}s reached; finishing with the results collected so far",
                limit.as_secs()
            );
            cancel.cancel();
        }
    }
}

/// Format the report as configured
pub fn render(report: &AuditReport, config: &AuditConfig) -> Result<String> {
    let redacted;
    let report = if config.redact_values {
        redacted = report.redacted();
        &redacted
    } else {
        report
    };

    let mut rendered = match config.format {
        OutputFormat::Text => to_text(report),
        OutputFormat::Json => to_json(report)?,
        OutputFormat::Markdown => to_markdown(report),
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

/// Print the report or write it to the configured file
pub fn emit(report: &AuditReport, config: &AuditConfig) -> Result<()> {
    let rendered = render(report, config)?;
    match &config.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
