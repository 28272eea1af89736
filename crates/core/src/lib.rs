//! Core types and pure logic for the detection validation pipeline.
//!
//! This crate holds everything that needs no I/O: the detection document
//! model and its section extractor, the saved-search profile, the
//! expected-vs-fired reconciliation step, and ATT&CK coverage aggregation.
//! All side effects (git, HTTP, process spawning) live in `detci-runner`.

pub mod coverage;
pub mod document;
pub mod error;
pub mod profile;
pub mod reconcile;
pub mod sections;

pub use document::DetectionDocument;
pub use error::SectionError;
pub use profile::AlertProfile;
pub use reconcile::{reconcile, FailureReport, ValidationSet};
pub use sections::{SectionMap, SectionValue};
