use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Document, Node, NodeId};

static HEADING_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^h([1-6])$").unwrap());

const RUBRIC_CLASS: &str = "rubric";
const LITERAL_CLASS_PREFIX: &str = "highlight-";
const INNER_CONTAINER_CLASS: &str = "highlight";
const LABEL_TAG: &str = "code";
const DECORATION_TAGS: &[&str] = &["button"];
const DECORATION_CLASSES: &[&str] = &["copybtn"];

/// Rank given to rubric paragraphs that name an entry; below every `h1`..`h6`.
pub const RUBRIC_RANK: u8 = 7;

/// One sibling element, classified by the role it plays in an entry.
/// Content blocks keep their node so text is only read when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { rank: u8 },
    Marker(String),
    Literal(NodeId),
    Prose(NodeId),
    Other,
}

pub fn classify(doc: &Document, id: NodeId) -> Block {
    let node = doc.node(id);
    let Some(tag) = node.tag() else {
        return Block::Other;
    };

    if let Some(caps) = HEADING_TAG_RE.captures(tag) {
        return Block::Heading {
            rank: caps[1].parse().unwrap_or(RUBRIC_RANK),
        };
    }

    match tag {
        "p" if node.has_class(RUBRIC_CLASS) => {
            if has_label_span(doc, id) {
                Block::Heading { rank: RUBRIC_RANK }
            } else {
                Block::Marker(doc.text(id).trim().to_string())
            }
        }
        "p" => Block::Prose(id),
        "pre" => Block::Literal(id),
        "div" if node.classes().iter().any(|c| c.starts_with(LITERAL_CLASS_PREFIX)) => {
            Block::Literal(id)
        }
        _ => Block::Other,
    }
}

pub fn heading_rank(doc: &Document, id: NodeId) -> Option<u8> {
    match classify(doc, id) {
        Block::Heading { rank } => Some(rank),
        _ => None,
    }
}

/// Trimmed text of every embedded `code` span, in document order.
pub fn labels(doc: &Document, id: NodeId) -> Vec<String> {
    doc.descendants(id)
        .filter(|&d| doc.node(d).is_element(LABEL_TAG))
        .map(|d| doc.text(d).trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

fn has_label_span(doc: &Document, id: NodeId) -> bool {
    doc.descendants(id).any(|d| doc.node(d).is_element(LABEL_TAG))
}

pub fn is_decoration(node: &Node) -> bool {
    node.tag().is_some_and(|t| DECORATION_TAGS.contains(&t))
        || DECORATION_CLASSES.iter().any(|c| node.has_class(c))
}

/// Text of a literal block with decoration removed. Reads the inner
/// `div.highlight` container when present, else the block itself.
pub fn literal_text(doc: &Document, id: NodeId) -> String {
    let container = doc
        .descendants(id)
        .find(|&d| doc.node(d).is_element("div") && doc.has_class(d, INNER_CONTAINER_CLASS))
        .unwrap_or(id);

    let mut working = doc.fragment(container);
    working.strip(is_decoration);
    working.text().trim().to_string()
}

pub fn prose_text(doc: &Document, id: NodeId) -> String {
    doc.text(id).trim().to_string()
}

/// Render a content block as an output fragment. Literal text is always
/// fenced, even when blank; non-content blocks yield `None`.
pub fn render(doc: &Document, block: &Block) -> Option<String> {
    match block {
        Block::Literal(id) => Some(format!("```\n{}\n```", literal_text(doc, *id))),
        Block::Prose(id) => Some(prose_text(doc, *id)),
        _ => None,
    }
}
