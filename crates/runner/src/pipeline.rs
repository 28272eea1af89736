//! Update-and-validate orchestration.
//!
//! Linear state machine with no back-edges:
//!
//! ```text
//! RESOLVE ─▶ (per document: EXTRACT ─▶ REGISTER ─▶ STIMULATE) ─▶ POLL ─▶ RECONCILE
//! ```
//!
//! Per-document failures are contained at the document boundary: the
//! document is reported and excluded from validation, the batch continues.
//! Only reconciliation mismatches fail the run. When nothing was registered
//! the poll and reconcile steps are skipped entirely.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use detci_core::{reconcile, AlertProfile, DetectionDocument, FailureReport, ValidationSet};

use crate::backend::AlertBackend;
use crate::stimulus::StimulusRunner;

/// The top-level readme is never a detection document.
const EXCLUDED_README: &str = "README.md";

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory the change-set paths are relative to.
    pub docs_root: PathBuf,
    /// Profile applied uniformly to every registered alert.
    pub profile: AlertProfile,
    /// Delay before the first fired-alert poll.
    pub settle: Duration,
    /// Interval between fired-alert polls.
    pub poll_interval: Duration,
    /// Overall validation window. Must dominate the profile's evaluation
    /// cadence plus the backend's firing latency.
    pub validation_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            docs_root: PathBuf::from("."),
            profile: AlertProfile::default(),
            settle: Duration::ZERO,
            poll_interval: Duration::from_secs(5),
            validation_timeout: Duration::from_secs(120),
        }
    }
}

/// What happened to one changed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DocStatus {
    /// Registered and stimulated; awaiting validation.
    Registered,
    /// Not a detection document (extension or excluded readme).
    NotEligible,
    /// Path no longer exists on disk (deleted in this revision).
    Missing,
    /// The file exists but could not be read.
    Unreadable { detail: String },
    /// A required section was absent or malformed.
    SectionFailed { detail: String },
    /// The backend rejected the registration or was unreachable.
    RegistrationFailed { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocOutcome {
    pub path: String,
    pub title: Option<String>,
    pub status: DocStatus,
}

/// Full record of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<DocOutcome>,
    /// Titles that entered the validation set, in processing order.
    pub expected: Vec<String>,
    /// Titles that never fired. Non-empty fails the run.
    pub failed: Vec<String>,
    /// True when the validation set was empty and polling never ran.
    pub validation_skipped: bool,
    pub passed: bool,
}

impl RunReport {
    /// Space-joined failure payload for the exit message.
    pub fn failure_summary(&self) -> String {
        self.failed.join(" ")
    }
}

/// Process a resolved change set end to end.
pub fn run(
    entries: &[String],
    backend: &dyn AlertBackend,
    stimulus: &dyn StimulusRunner,
    options: &PipelineOptions,
) -> RunReport {
    let started_at = Utc::now();
    let mut outcomes = Vec::with_capacity(entries.len());
    let mut expected = ValidationSet::new();

    println!("─── Processing {} changed path(s) ───", entries.len());
    for entry in entries {
        let outcome = process_entry(entry, backend, stimulus, options, &mut expected);
        print_progress(&outcome);
        outcomes.push(outcome);
    }

    if expected.is_empty() {
        println!("No alerts to validate.");
        return RunReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
            expected: Vec::new(),
            failed: Vec::new(),
            validation_skipped: true,
            passed: true,
        };
    }

    println!(
        "─── Validating {} alert(s), window {:?} ───",
        expected.len(),
        options.validation_timeout
    );
    if !options.settle.is_zero() {
        std::thread::sleep(options.settle);
    }
    let failures = poll_for_fired(expected.titles(), backend, options);

    let passed = failures.is_empty();
    RunReport {
        started_at,
        finished_at: Utc::now(),
        outcomes,
        expected: expected.titles().to_vec(),
        failed: failures.missing().to_vec(),
        validation_skipped: false,
        passed,
    }
}

/// Eligibility filter applied by the orchestrator, not the resolver.
fn is_eligible(entry: &str) -> bool {
    entry.ends_with(".md") && entry != EXCLUDED_README
}

fn process_entry(
    entry: &str,
    backend: &dyn AlertBackend,
    stimulus: &dyn StimulusRunner,
    options: &PipelineOptions,
    expected: &mut ValidationSet,
) -> DocOutcome {
    let outcome = |title: Option<String>, status: DocStatus| DocOutcome {
        path: entry.to_string(),
        title,
        status,
    };

    if !is_eligible(entry) {
        return outcome(None, DocStatus::NotEligible);
    }

    let path = options.docs_root.join(entry);
    if !path.exists() {
        return outcome(None, DocStatus::Missing);
    }

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            return outcome(
                None,
                DocStatus::Unreadable {
                    detail: e.to_string(),
                },
            )
        }
    };

    let doc = DetectionDocument::from_source(entry, &text);
    let title = doc.title().to_string();

    let query = match doc.query() {
        Ok(query) => query,
        Err(e) => {
            return outcome(
                Some(title),
                DocStatus::SectionFailed {
                    detail: e.to_string(),
                },
            )
        }
    };
    let test_case = match doc.test_case() {
        Ok(test_case) => test_case,
        Err(e) => {
            return outcome(
                Some(title),
                DocStatus::SectionFailed {
                    detail: e.to_string(),
                },
            )
        }
    };

    if let Err(e) = backend.register_alert(&title, query, &options.profile) {
        return outcome(
            Some(title),
            DocStatus::RegistrationFailed {
                detail: e.to_string(),
            },
        );
    }

    // Stimulus status is logged, never gated on: if it did nothing, the
    // alert will not fire and reconciliation reports it.
    match stimulus.run_stimulus(&test_case) {
        Ok(0) => tracing::debug!(title = %title, "stimulus completed"),
        Ok(code) => tracing::warn!(title = %title, code, "stimulus exited non-zero"),
        Err(e) => tracing::warn!(title = %title, error = %e, "stimulus failed to run"),
    }

    expected.push(title.clone());
    outcome(Some(title), DocStatus::Registered)
}

/// Bounded polling: re-list fired alerts until everything expected has
/// fired or the window closes, then reconcile the final observation.
fn poll_for_fired(
    expected: &[String],
    backend: &dyn AlertBackend,
    options: &PipelineOptions,
) -> FailureReport {
    let deadline = Instant::now() + options.validation_timeout;
    let mut last = reconcile(expected, &[]);

    loop {
        match backend.fired_alert_names() {
            Ok(fired) => {
                let report = reconcile(expected, &fired);
                if report.is_empty() {
                    return report;
                }
                last = report;
            }
            Err(e) => {
                tracing::warn!(error = %e, "fired-alert listing failed, will retry");
            }
        }

        if Instant::now() >= deadline {
            return last;
        }
        std::thread::sleep(options.poll_interval.min(deadline - Instant::now()));
    }
}

fn print_progress(outcome: &DocOutcome) {
    match &outcome.status {
        DocStatus::Registered => {
            // title is always set for registered documents
            let title = outcome.title.as_deref().unwrap_or(&outcome.path);
            println!("  ✓ {} registered and stimulated", title);
        }
        DocStatus::NotEligible => println!("  - {} skipped", outcome.path),
        DocStatus::Missing => println!("  - {} no longer exists, skipped", outcome.path),
        DocStatus::Unreadable { detail } => {
            println!("  ✗ {} unreadable: {}", outcome.path, detail)
        }
        DocStatus::SectionFailed { detail } => {
            println!("  ✗ {} skipped: {}", outcome.path, detail)
        }
        DocStatus::RegistrationFailed { detail } => {
            println!("  ✗ {} registration failed: {}", outcome.path, detail)
        }
    }
}
