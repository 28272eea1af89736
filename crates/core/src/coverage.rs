//! ATT&CK technique coverage aggregation.
//!
//! Reporting utility, deliberately separate from the validation pipeline:
//! it maps each known technique ID to the detection documents that list it
//! in their Techniques section, grouping sub-techniques under their parent
//! prefix, and rewrites the scores of a Navigator layer file.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Split a Techniques field into trimmed, non-empty technique IDs.
pub fn parse_technique_ids(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parent prefix of a sub-technique ID ("T1059.001" → "T1059").
pub fn parent_id(id: &str) -> Option<&str> {
    id.split_once('.').map(|(parent, _)| parent)
}

/// Technique ID → documents that cover it.
///
/// Only IDs known at construction time are tracked; anything else in a
/// Techniques section is ignored rather than treated as an error.
#[derive(Debug, Clone, Default)]
pub struct CoverageMap {
    covered: BTreeMap<String, Vec<String>>,
}

impl CoverageMap {
    pub fn with_known_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CoverageMap {
            covered: ids.into_iter().map(|id| (id.into(), Vec::new())).collect(),
        }
    }

    /// Record one document's Techniques field.
    ///
    /// Each listed ID counts once; each distinct parent of a listed
    /// sub-technique also counts once per document.
    pub fn record_document(&mut self, doc_name: &str, techniques_field: &str) {
        let mut parents: BTreeSet<String> = BTreeSet::new();

        for id in parse_technique_ids(techniques_field) {
            if let Some(parent) = parent_id(&id) {
                parents.insert(parent.to_string());
            }
            if let Some(files) = self.covered.get_mut(&id) {
                files.push(doc_name.to_string());
            }
        }

        for parent in parents {
            if let Some(files) = self.covered.get_mut(&parent) {
                files.push(doc_name.to_string());
            }
        }
    }

    /// Number of documents covering `id`.
    pub fn count(&self, id: &str) -> usize {
        self.covered.get(id).map(Vec::len).unwrap_or(0)
    }

    /// Known techniques covered by at least one document.
    pub fn covered_techniques(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.covered
            .iter()
            .filter(|(_, files)| !files.is_empty())
            .map(|(id, files)| (id.as_str(), files.as_slice()))
    }

    /// Set each known layer technique's score to its covering-document
    /// count. Uncovered known techniques are reset to zero; techniques the
    /// map was never told about keep their score.
    pub fn apply_to_layer(&self, layer: &mut Layer) {
        for technique in &mut layer.techniques {
            if self.covered.contains_key(&technique.technique_id) {
                technique.score = self.count(&technique.technique_id) as i64;
            }
        }
    }
}

/// Navigator layer file; unrecognized keys round-trip through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub techniques: Vec<LayerTechnique>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerTechnique {
    #[serde(rename = "techniqueID")]
    pub technique_id: String,
    #[serde(default)]
    pub score: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_ids() {
        assert_eq!(
            parse_technique_ids("T1059.001, T1105 ,, T1003"),
            vec!["T1059.001", "T1105", "T1003"]
        );
        assert!(parse_technique_ids("").is_empty());
    }

    #[test]
    fn sub_techniques_count_toward_their_parent() {
        let mut map = CoverageMap::with_known_ids(["T1059", "T1059.001", "T1059.003"]);
        map.record_document("alert_a.md", "T1059.001, T1059.003");

        assert_eq!(map.count("T1059.001"), 1);
        assert_eq!(map.count("T1059.003"), 1);
        // Parent counted once per document, not once per sub-technique.
        assert_eq!(map.count("T1059"), 1);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut map = CoverageMap::with_known_ids(["T1105"]);
        map.record_document("alert_b.md", "T9999, T1105");
        assert_eq!(map.count("T1105"), 1);
        assert_eq!(map.count("T9999"), 0);
    }

    #[test]
    fn layer_scores_become_document_counts() {
        let mut layer: Layer = serde_json::from_value(serde_json::json!({
            "name": "coverage",
            "techniques": [
                {"techniqueID": "T1105", "score": 0, "color": ""},
                {"techniqueID": "T1003", "score": 0}
            ]
        }))
        .unwrap();

        let mut map = CoverageMap::with_known_ids(["T1105", "T1003"]);
        map.record_document("a.md", "T1105");
        map.record_document("b.md", "T1105");
        map.apply_to_layer(&mut layer);

        assert_eq!(layer.techniques[0].score, 2);
        assert_eq!(layer.techniques[1].score, 0);
        // Unrecognized layer keys survive the round trip.
        assert_eq!(layer.extra.get("name").unwrap(), "coverage");
        assert!(layer.techniques[0].extra.contains_key("color"));
    }
}
