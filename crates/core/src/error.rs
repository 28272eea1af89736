//! Error taxonomy for section extraction.

use thiserror::Error;

/// Why a labeled section could not be extracted from a document.
///
/// `Absent` is recoverable: the field was simply not provided and the
/// caller decides whether that matters. `Malformed` means the label exists
/// but nothing follows it, which must never be silently turned into an
/// empty query or stimulus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("section \"{0}\" not found")]
    Absent(String),

    #[error("section \"{0}\" is present but has no content")]
    Malformed(String),
}

impl SectionError {
    /// The label the error refers to.
    pub fn label(&self) -> &str {
        match self {
            SectionError::Absent(l) | SectionError::Malformed(l) => l,
        }
    }
}
