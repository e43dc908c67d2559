use std::fmt;

use serde::Serialize;

use super::blocks::{self, Block, RUBRIC_RANK};
use crate::document::{Document, NodeId};

/// The subsections extracted for every entry, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionLabel {
    Description,
    Syntax,
    Semantics,
    Examples,
}

impl SectionLabel {
    pub const ALL: [SectionLabel; 4] = [
        SectionLabel::Description,
        SectionLabel::Syntax,
        SectionLabel::Semantics,
        SectionLabel::Examples,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionLabel::Description => "Description",
            SectionLabel::Syntax => "Syntax",
            SectionLabel::Semantics => "Semantics",
            SectionLabel::Examples => "Examples",
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First marker paragraph reading `label` after `heading`. The search ends
/// at the next heading of equal or higher rank.
pub fn find_marker(doc: &Document, heading: NodeId, label: SectionLabel) -> Option<NodeId> {
    let rank = blocks::heading_rank(doc, heading).unwrap_or(RUBRIC_RANK);
    for sibling in doc.next_element_siblings(heading) {
        match blocks::classify(doc, sibling) {
            Block::Heading { rank: r } if r <= rank => return None,
            Block::Marker(text) if text == label.as_str() => return Some(sibling),
            _ => {}
        }
    }
    None
}

/// Text of one section of the entry introduced by `heading`, or `None` when
/// the marker is missing or the joined content is blank.
pub fn extract_section(doc: &Document, heading: NodeId, label: SectionLabel) -> Option<String> {
    let marker = find_marker(doc, heading, label)?;

    let mut fragments: Vec<String> = Vec::new();
    for sibling in doc.next_element_siblings(marker) {
        let block = blocks::classify(doc, sibling);
        match block {
            Block::Marker(_) | Block::Heading { .. } => break,
            _ => fragments.extend(blocks::render(doc, &block)),
        }
    }

    let text = fragments.join("\n");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

// ── Tests ──
