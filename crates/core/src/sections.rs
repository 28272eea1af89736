//! One-pass labeled-section extraction from rendered Markdown.
//!
//! A detection document marks its fields with short label blocks ("Query",
//! "Test Case", "Techniques") followed by the field content. The extractor
//! renders the Markdown once into a flat sequence of block-level text nodes
//! and resolves every requested label against it, so "label present but
//! empty" is an enumerable result instead of an out-of-range walk.

use std::collections::BTreeMap;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::error::SectionError;

/// Outcome of looking up one label in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionValue {
    /// Label found, followed by content. Text is verbatim inner text of the
    /// following block (code blocks keep their trailing newline).
    Present(String),
    /// Label does not occur in the document.
    Absent,
    /// Label occurs but no content block follows it.
    Malformed,
}

const ABSENT: SectionValue = SectionValue::Absent;

impl SectionValue {
    pub fn as_present(&self) -> Option<&str> {
        match self {
            SectionValue::Present(text) => Some(text),
            _ => None,
        }
    }

    /// Convert to a hard result for fields the caller considers required.
    pub fn require(&self, label: &str) -> Result<&str, SectionError> {
        match self {
            SectionValue::Present(text) => Ok(text),
            SectionValue::Absent => Err(SectionError::Absent(label.to_string())),
            SectionValue::Malformed => Err(SectionError::Malformed(label.to_string())),
        }
    }
}

/// Label → extraction result, computed in a single pass over the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMap {
    sections: BTreeMap<String, SectionValue>,
}

impl SectionMap {
    /// Render `text` and resolve every label in `labels`.
    ///
    /// A label matches the first block whose entire text equals it
    /// (first-match-wins, duplicates ignored). The section value is the full
    /// text of the next block in document order.
    pub fn parse(text: &str, labels: &[&str]) -> Self {
        let blocks = block_texts(text);

        let mut sections: BTreeMap<String, SectionValue> = labels
            .iter()
            .map(|l| (l.to_string(), SectionValue::Absent))
            .collect();

        for (i, block) in blocks.iter().enumerate() {
            let Some(value) = sections.get_mut(block.as_str()) else {
                continue;
            };
            if *value != SectionValue::Absent {
                continue; // first occurrence already resolved
            }
            *value = match blocks.get(i + 1) {
                Some(next) if !next.trim().is_empty() => {
                    SectionValue::Present(next.clone())
                }
                _ => SectionValue::Malformed,
            };
        }

        SectionMap { sections }
    }

    /// Lookup a label. Unknown labels read as `Absent`.
    pub fn get(&self, label: &str) -> &SectionValue {
        self.sections.get(label).unwrap_or(&ABSENT)
    }
}

/// Flatten the Markdown event stream into block-level text nodes.
///
/// Paragraphs, headings, code blocks and list items each contribute one
/// node; container-only wrappers (a list item holding paragraphs) are
/// dropped. Inline code and soft/hard breaks fold into the enclosing block.
fn block_texts(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut stack: Vec<(String, bool)> = Vec::new(); // (buffer, is_code_block)

    for event in Parser::new(text) {
        match event {
            Event::Start(Tag::Paragraph | Tag::Heading { .. } | Tag::Item) => {
                stack.push((String::new(), false));
            }
            Event::Start(Tag::CodeBlock(_)) => {
                stack.push((String::new(), true));
            }
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => {
                if let Some((buf, is_code)) = stack.pop() {
                    // An empty fenced block is a real (empty) node; an empty
                    // item wrapper whose text went to nested paragraphs is not.
                    if is_code || !buf.is_empty() {
                        blocks.push(buf);
                    }
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((buf, _)) = stack.last_mut() {
                    buf.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((buf, _)) = stack.last_mut() {
                    buf.push('\n');
                }
            }
            _ => {}
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# alert_a

Some prose about the detection.

Query

    search index=x sourcetype=foo

Test Case

    New-Item foo

Techniques

T1059.001, T1105
";

    #[test]
    fn extracts_each_label_verbatim() {
        let map = SectionMap::parse(DOC, &["Query", "Test Case", "Techniques"]);
        assert_eq!(
            map.get("Query"),
            &SectionValue::Present("search index=x sourcetype=foo\n".into())
        );
        assert_eq!(
            map.get("Test Case"),
            &SectionValue::Present("New-Item foo\n".into())
        );
        assert_eq!(
            map.get("Techniques"),
            &SectionValue::Present("T1059.001, T1105".into())
        );
    }

    #[test]
    fn missing_label_is_absent() {
        let map = SectionMap::parse("Query\n\n    search index=x\n", &["Query", "Techniques"]);
        assert_eq!(map.get("Techniques"), &SectionValue::Absent);
        assert_eq!(map.get("Never Asked For"), &SectionValue::Absent);
    }

    #[test]
    fn label_with_nothing_following_is_malformed() {
        let map = SectionMap::parse("Some intro.\n\nQuery\n", &["Query"]);
        assert_eq!(map.get("Query"), &SectionValue::Malformed);
    }

    #[test]
    fn label_followed_by_empty_code_block_is_malformed() {
        let map = SectionMap::parse("Query\n\n```\n```\n", &["Query"]);
        assert_eq!(map.get("Query"), &SectionValue::Malformed);
    }

    #[test]
    fn duplicate_labels_first_match_wins() {
        let doc = "Query\n\nfirst query\n\nQuery\n\nsecond query\n";
        let map = SectionMap::parse(doc, &["Query"]);
        assert_eq!(map.get("Query"), &SectionValue::Present("first query".into()));
    }

    #[test]
    fn label_inside_larger_paragraph_does_not_match() {
        let doc = "The Query below is important.\n\nsearch index=x\n";
        let map = SectionMap::parse(doc, &["Query"]);
        assert_eq!(map.get("Query"), &SectionValue::Absent);
    }

    #[test]
    fn heading_labels_match_like_paragraph_labels() {
        let doc = "## Query\n\nsearch index=y\n";
        let map = SectionMap::parse(doc, &["Query"]);
        assert_eq!(map.get("Query"), &SectionValue::Present("search index=y".into()));
    }

    #[test]
    fn list_item_content_can_follow_a_label() {
        let doc = "Techniques\n\n- T1003\n";
        let map = SectionMap::parse(doc, &["Techniques"]);
        assert_eq!(map.get("Techniques"), &SectionValue::Present("T1003".into()));
    }

    #[test]
    fn no_label_text_leaks_into_the_extracted_value() {
        let map = SectionMap::parse(DOC, &["Query"]);
        let query = map.get("Query").as_present().unwrap();
        assert!(!query.contains("Query"));
        assert!(!query.contains("Test Case"));
    }
}
