//! JSON output formatter

use crate::error::ScanResult;
use crate::report::AuditReport;

/// Convert a report to a pretty-printed JSON string
///
/// # Errors
/// Returns an error if serialization fails
pub fn to_json(report: &AuditReport) -> ScanResult<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Aggregator;
    use crate::types::{EntityKind, Match, SearchCriteria};

    #[test]
    fn group_level_match_serializes_null_project() {
        let mut agg = Aggregator::new();
        agg.record_match(Match {
            group_path: "infra".to_string(),
            project_path: None,
            level: EntityKind::Group,
            key: "VAULT_URL".to_string(),
            value: Some("https://vault.prod.example.com".to_string()),
            environment_scope: Some("production".to_string()),
        });
        let report = agg.finish(SearchCriteria::new("VAULT_URL", "prod"));

        let json: serde_json::Value =
            serde_json::from_str(&to_json(&report).expect("serialize")).expect("parse");
        assert_eq!(json["matches"][0]["project_path"], serde_json::Value::Null);
        assert_eq!(json["matches"][0]["level"], "group");
        assert_eq!(json["criteria"]["needle"], "prod");
        assert_eq!(json["interrupted"], false);
    }
}
