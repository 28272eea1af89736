//! Detection document model.
//!
//! A detection document is a Markdown file describing one monitoring rule:
//! the search query the backend should schedule, a test case that should
//! make the rule fire, and optionally the ATT&CK techniques it covers. The
//! document is read-only to the pipeline; its title (the file-name stem)
//! doubles as the saved-search name used for reconciliation.

use std::path::{Path, PathBuf};

use crate::error::SectionError;
use crate::sections::{SectionMap, SectionValue};

/// Label of the search-query section.
pub const QUERY_LABEL: &str = "Query";
/// Label of the test-stimulus section.
pub const TEST_CASE_LABEL: &str = "Test Case";
/// Label of the ATT&CK technique list section.
pub const TECHNIQUES_LABEL: &str = "Techniques";

/// All labels the pipeline consults.
pub const SECTION_LABELS: [&str; 3] = [QUERY_LABEL, TEST_CASE_LABEL, TECHNIQUES_LABEL];

/// One parsed detection document.
#[derive(Debug, Clone)]
pub struct DetectionDocument {
    path: PathBuf,
    title: String,
    sections: SectionMap,
}

impl DetectionDocument {
    /// Build a document from its path and raw Markdown source.
    ///
    /// The section map is computed once here; later lookups are pure reads.
    pub fn from_source(path: impl Into<PathBuf>, text: &str) -> Self {
        let path = path.into();
        let title = title_from_path(&path);
        let sections = SectionMap::parse(text, &SECTION_LABELS);
        DetectionDocument {
            path,
            title,
            sections,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved-search title: the file-name stem.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The search query, required for registration. Returned verbatim.
    pub fn query(&self) -> Result<&str, SectionError> {
        self.sections.get(QUERY_LABEL).require(QUERY_LABEL)
    }

    /// The test stimulus, required for validation. Trailing whitespace is
    /// stripped before the text is handed to the stimulus interpreter.
    pub fn test_case(&self) -> Result<String, SectionError> {
        self.sections
            .get(TEST_CASE_LABEL)
            .require(TEST_CASE_LABEL)
            .map(|text| text.trim_end().to_string())
    }

    /// The technique list, if present. A missing or malformed Techniques
    /// section never fails a document.
    pub fn techniques(&self) -> Option<&str> {
        match self.sections.get(TECHNIQUES_LABEL) {
            SectionValue::Present(text) => Some(text),
            _ => None,
        }
    }
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
