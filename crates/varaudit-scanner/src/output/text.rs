//! Plain-text terminal summary

use crate::report::AuditReport;
use std::fmt::Write;

/// Human-readable summary for the terminal
#[must_use]
pub fn to_text(report: &AuditReport) -> String {
    let mut out = String::new();
    let key = &report.criteria.key;
    let needle = &report.criteria.needle;

    let _ = writeln!(out, "--- Audit Complete ---");
    if report.matches.is_empty() {
        let _ = writeln!(out, "No variable named '{key}' containing '{needle}' was found.");
    } else {
        let _ = writeln!(
            out,
            "Found {} instance(s) of '{key}' containing '{needle}':",
            report.match_count()
        );
        for found in &report.matches {
            let _ = writeln!(
                out,
                "- Group: {}, Project: {}, Level: {}, Variable: {}, Value: {}",
                found.group_path,
                found.project_display(),
                found.level,
                found.key,
                found.value_display()
            );
        }
    }

    if !report.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings ({}):", report.warning_count());
        for warning in &report.warnings {
            let _ = writeln!(out, "- {warning}");
        }
    }

    let stats = &report.stats;
    let _ = writeln!(
        out,
        "\nVisited {} group(s) and {} project(s); inspected {} variable(s) in {}s.",
        stats.groups_visited,
        stats.projects_visited,
        stats.variables_inspected,
        report.duration().num_seconds()
    );

    if report.interrupted {
        let _ = writeln!(out, "Audit was interrupted; results are partial.");
    }
    let incomplete = report.incomplete_paths();
    if !incomplete.is_empty() {
        let _ = writeln!(out, "Incomplete results for: {}", incomplete.join(", "));
    }

    out
}
