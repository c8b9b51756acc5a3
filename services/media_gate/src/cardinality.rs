use crate::error::{GateError, PartialFailure};
use std::collections::HashSet;

/// Compare the identifiers a caller supplied with the ones the remote
/// reports as affected. Every supplied identifier missing from the affected
/// list is reported once, in input order.
pub fn check_cardinality(supplied: &[String], affected: &[String]) -> Result<(), GateError> {
    let affected: HashSet<&str> = affected.iter().map(String::as_str).collect();
    let mut reported = HashSet::new();
    let errors: Vec<PartialFailure> = supplied
        .iter()
        .map(String::as_str)
        .filter(|id| !affected.contains(id) && reported.insert(*id))
        .map(PartialFailure::not_found)
        .collect();

    if errors.is_empty() {
        return Ok(());
    }
    Err(GateError::Partial {
        message: format!(
            "{} of {} assets were not affected",
            errors.len(),
            supplied.len()
        ),
        errors,
    })
}
