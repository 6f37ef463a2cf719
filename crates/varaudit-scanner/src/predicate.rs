//! Match decision for a single variable record

use crate::types::SearchCriteria;
use varaudit_client::VariableRecord;

/// Outcome of evaluating one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Key equal and value contains the needle
    Match,
    /// Key equal but the value was withheld
    Masked,
    Miss,
}

/// True iff the key is equal, the value is present, and it contains the needle
pub fn matches(record: &VariableRecord, criteria: &SearchCriteria) -> bool {
    classify(record, criteria) == Verdict::Match
}

pub fn classify(record: &VariableRecord, criteria: &SearchCriteria) -> Verdict {
    if record.key != criteria.key {
        return Verdict::Miss;
    }
    match record.value.as_deref() {
        None => Verdict::Masked,
        Some(value) if value.contains(criteria.needle.as_str()) => Verdict::Match,
        Some(_) => Verdict::Miss,
    }
}
