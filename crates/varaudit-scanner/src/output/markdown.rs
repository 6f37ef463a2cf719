//! Markdown output formatter

use crate::report::AuditReport;

/// Convert a report to a Markdown document
#[must_use]
pub fn to_markdown(report: &AuditReport) -> String {
    let mut output = String::new();

    output.push_str("# Variable Audit Report\n\n");
    output.push_str(&format!(
        "**Started:** {}  \n**Finished:** {}\n\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    // Search
    output.push_str("## Search\n\n");
    output.push_str(&format!("- **Variable:** `{}`\n", report.criteria.key));
    output.push_str(&format!("- **Contains:** `{}`\n\n", report.criteria.needle));

    // Coverage
    output.push_str("## Coverage\n\n");
    output.push_str(&format!("- **Groups:** {}\n", report.stats.groups_visited));
    output.push_str(&format!("- **Projects:** {}\n", report.stats.projects_visited));
    output.push_str(&format!(
        "- **Variables inspected:** {}\n",
        report.stats.variables_inspected
    ));
    if report.stats.archived_skipped > 0 {
        output.push_str(&format!(
            "- **Archived projects skipped:** {}\n",
            report.stats.archived_skipped
        ));
    }
    if report.interrupted {
        output.push_str("- **Interrupted:** yes, not every node was visited\n");
    }
    output.push('\n');

    // Matches
    output.push_str("## Matches\n\n");
    if report.matches.is_empty() {
        output.push_str("_No matching variables found_\n\n");
    } else {
        output.push_str("| Group | Project | Level | Variable | Value |\n");
        output.push_str("|-------|---------|-------|----------|-------|\n");
        for found in &report.matches {
            output.push_str(&format!(
                "| {} | {} | {} | `{}` | `{}` |\n",
                cell(&found.group_path),
                cell(found.project_display()),
                found.level,
                found.key,
                cell(found.value_display())
            ));
        }
        output.push('\n');
    }

    // Warnings
    output.push_str("## Warnings\n\n");
    if report.warnings.is_empty() {
        output.push_str("_No warnings_\n\n");
    } else {
        for warning in &report.warnings {
            output.push_str(&format!("- {}\n", warning));
        }
        output.push('\n');
    }

    output
}

fn cell(text: &str) -> String {
    if text.is_empty() {
        "-".to_string()
    } else {
        text.replace('|', "\\|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Aggregator;
    use crate::types::{Entity, EntityKind, Match, SearchCriteria, Warning, WarningReason};

    #[test]
    fn renders_matches_and_warnings() {
        let mut agg = Aggregator::new();
        agg.record_match(Match {
            group_path: String::new(),
            project_path: Some("solo/tool".to_string()),
            level: EntityKind::Project,
            key: "VAULT_URL".to_string(),
            value: Some("https://vault.prod|a".to_string()),
            environment_scope: None,
        });
        let entity = Entity {
            kind: EntityKind::Group,
            id: 2,
            path: "infra".to_string(),
            parent_path: String::new(),
        };
        agg.record_warning(Warning::for_entity(
            &entity,
            WarningReason::SubgroupsUnavailable,
            "HTTP 500",
        ));
        let md = to_markdown(&agg.finish(SearchCriteria::new("VAULT_URL", "prod")));

        assert!(
            md.contains("| - | solo/tool | Project | `VAULT_URL` | `https://vault.prod\\|a` |")
        );
        assert!(md.contains("- Group infra: failed to fetch subgroups - HTTP 500"));
    }

    #[test]
    fn empty_report_says_so() {
        let md = to_markdown(&Aggregator::new().finish(SearchCriteria::new("VAULT_URL", "x")));
        assert!(md.contains("_No matching variables found_"));
        assert!(md.contains("_No warnings_"));
    }
}
