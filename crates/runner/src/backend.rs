//! Alerting-backend seam.
//!
//! The orchestrator owns one backend handle per run and passes it to the
//! registrar and the reconciliation poll as a parameter; tests substitute an
//! in-memory fake. Registration is idempotent by title: re-registering an
//! existing title updates the definition, delegated to backend semantics.

use detci_core::AlertProfile;
use thiserror::Error;

/// A backend-level rejection or connectivity failure.
///
/// During document processing this is a per-document hard error: the
/// document is excluded from validation and the batch continues.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend rejected {context}: HTTP {status}: {detail}")]
    Rejected {
        context: &'static str,
        status: u16,
        detail: String,
    },

    #[error("invalid backend URL: {0}")]
    Url(String),
}

/// The two operations the pipeline needs from the alerting backend.
pub trait AlertBackend {
    /// Create or update the scheduled alert named `title`.
    fn register_alert(
        &self,
        title: &str,
        query: &str,
        profile: &AlertProfile,
    ) -> Result<(), BackendError>;

    /// Names of all alerts the backend has recorded as fired.
    fn fired_alert_names(&self) -> Result<Vec<String>, BackendError>;
}
