//! Expected-vs-fired reconciliation.
//!
//! Pure set-difference: every title the run expected to fire that the
//! backend did not report is a failure. Order of `expected` is preserved in
//! the report for readability; membership is all that matters.

use std::collections::HashSet;

use serde::Serialize;

/// Titles expected to fire, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSet {
    titles: Vec<String>,
}

impl ValidationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: impl Into<String>) {
        self.titles.push(title.into());
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }
}

/// Titles that were expected but never observed. Non-empty is terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    missing: Vec<String>,
}

impl FailureReport {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Space-joined failure payload for the process exit message.
    pub fn summary(&self) -> String {
        self.missing.join(" ")
    }
}

/// Compare expected titles against the backend's fired-alert names.
pub fn reconcile(expected: &[String], fired: &[String]) -> FailureReport {
    let fired: HashSet<&str> = fired.iter().map(String::as_str).collect();
    let missing = expected
        .iter()
        .filter(|title| !fired.contains(title.as_str()))
        .cloned()
        .collect();
    FailureReport { missing }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_observed_is_empty_report() {
        let report = reconcile(&titles(&["a", "b"]), &titles(&["b", "a", "c"]));
        assert!(report.is_empty());
    }

    #[test]
    fn missing_titles_keep_expected_order() {
        let report = reconcile(&titles(&["a", "b", "c"]), &titles(&["b"]));
        assert_eq!(report.missing(), &titles(&["a", "c"])[..]);
        assert_eq!(report.summary(), "a c");
    }

    #[test]
    fn membership_only_reordering_inputs_is_equivalent() {
        let expected = titles(&["a", "b", "c"]);
        let fired_one = titles(&["c", "a"]);
        let fired_two = titles(&["a", "c", "c", "a"]);
        assert_eq!(
            reconcile(&expected, &fired_one).missing(),
            reconcile(&expected, &fired_two).missing()
        );
    }

    #[test]
    fn empty_expected_always_passes() {
        assert!(reconcile(&[], &titles(&["anything"])).is_empty());
    }
}
