use serde::Serialize;

use super::blocks::{self, Block, RUBRIC_RANK};
use crate::document::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Prefix,
}

/// A heading that documents a target name, with the literal label that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub heading: NodeId,
    pub label: String,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Found(Match),
    NotFound,
}

impl Located {
    pub fn into_match(self) -> Option<Match> {
        match self {
            Located::Found(m) => Some(m),
            Located::NotFound => None,
        }
    }
}

#[derive(Debug)]
struct IndexedHeading {
    node: NodeId,
    labels: Vec<String>,
}

/// Every labelled rubric heading of a document, in document order. `h1`..`h6`
/// only bound entries and are never indexed. Built once per run; lookups
/// never touch the markup tree again.
#[derive(Debug)]
pub struct HeadingIndex {
    headings: Vec<IndexedHeading>,
}

impl HeadingIndex {
    pub fn build(doc: &Document) -> Self {
        let headings = doc
            .elements()
            .filter(|&id| matches!(blocks::classify(doc, id), Block::Heading { rank: RUBRIC_RANK }))
            .map(|id| IndexedHeading {
                node: id,
                labels: blocks::labels(doc, id),
            })
            .filter(|h| !h.labels.is_empty())
            .collect();
        HeadingIndex { headings }
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    /// Exact label match first; otherwise the first label extending
    /// `name` with a dotted suffix. Ties go to document order.
    pub fn locate(&self, name: &str) -> Located {
        match self.exact(name).or_else(|| self.prefix(name)) {
            Some(m) => Located::Found(m),
            None => Located::NotFound,
        }
    }

    fn exact(&self, name: &str) -> Option<Match> {
        self.scan(MatchKind::Exact, |label| label == name)
    }

    fn prefix(&self, name: &str) -> Option<Match> {
        let dotted = format!("{}.", name);
        self.scan(MatchKind::Prefix, |label| label.starts_with(&dotted))
    }

    fn scan(&self, kind: MatchKind, accept: impl Fn(&str) -> bool) -> Option<Match> {
        self.headings.iter().find_map(|h| {
            h.labels.iter().find(|l| accept(l)).map(|label| Match {
                heading: h.node,
                label: label.clone(),
                kind,
            })
        })
    }

    /// Every label that would satisfy either pass, exact matches first, each
    /// group in document order.
    pub fn candidates(&self, name: &str) -> Vec<Match> {
        let dotted = format!("{}.", name);
        let mut exact = Vec::new();
        let mut prefixed = Vec::new();
        for h in &self.headings {
            for label in &h.labels {
                let kind = if label == name {
                    MatchKind::Exact
                } else if label.starts_with(&dotted) {
                    MatchKind::Prefix
                } else {
                    continue;
                };
                let m = Match {
                    heading: h.node,
                    label: label.clone(),
                    kind,
                };
                match kind {
                    MatchKind::Exact => exact.push(m),
                    MatchKind::Prefix => prefixed.push(m),
                }
            }
        }
        exact.extend(prefixed);
        exact
    }
}
