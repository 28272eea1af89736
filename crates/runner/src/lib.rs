//! Detection validation pipeline runner.
//!
//! Drives the update-and-validate flow for changed detection documents:
//!
//! ```text
//!  resolve change set ──▶ per document: extract ▶ register ▶ stimulate
//!                                         │
//!                                         ▼
//!                        poll fired alerts ──▶ reconcile ──▶ pass / fail
//! ```
//!
//! The orchestrator in [`pipeline`] owns the backend handle and passes it to
//! the registrar and reconciler explicitly, so tests can substitute fakes.

pub mod backend;
pub mod changeset;
pub mod config;
pub mod pipeline;
pub mod splunk;
pub mod stimulus;
