use std::path::{Path, PathBuf};

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("reference document not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reference document {} has no markup content", .0.display())]
    Empty(PathBuf),
}

/// Index of a node inside a [`Document`] or [`Fragment`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Element { tag: String, classes: Vec<String> },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn is_element(&self, name: &str) -> bool {
        self.tag() == Some(name)
    }

    pub fn classes(&self) -> &[String] {
        match &self.kind {
            NodeKind::Element { classes, .. } => classes,
            _ => &[],
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }
}

/// Immutable, arena-backed markup tree. Nodes are stored in pre-order, so
/// ascending `NodeId` is document order.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Read and parse a reference document. Any failure here is fatal to a run.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        if !path.exists() {
            return Err(DocumentError::Missing(path.to_path_buf()));
        }
        let html = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Self::parse(&html);
        if doc.elements().all(|id| matches!(doc.tag(id), Some("html" | "head" | "body"))) {
            return Err(DocumentError::Empty(path.to_path_buf()));
        }
        debug!("Parsed {} into {} nodes", path.display(), doc.nodes.len());
        Ok(doc)
    }

    pub fn parse(html: &str) -> Self {
        let dom: RcDom = parse_document(RcDom::default(), Default::default()).one(html);
        let mut doc = Document { nodes: Vec::new() };
        doc.flatten(&dom.document, None);
        doc
    }

    fn flatten(&mut self, handle: &Handle, parent: Option<NodeId>) {
        let kind = match &handle.data {
            NodeData::Document => NodeKind::Root,
            NodeData::Element { name, attrs, .. } => {
                let classes = attrs
                    .borrow()
                    .iter()
                    .filter(|a| &*a.name.local == "class")
                    .flat_map(|a| a.value.split_whitespace().map(str::to_string).collect::<Vec<_>>())
                    .collect();
                NodeKind::Element {
                    tag: name.local.to_string(),
                    classes,
                }
            }
            NodeData::Text { contents } => NodeKind::Text(contents.borrow().to_string()),
            _ => return,
        };

        let id = push_node(&mut self.nodes, kind, parent);
        for child in handle.children.borrow().iter() {
            self.flatten(child, Some(id));
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).tag()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).has_class(class)
    }

    /// Concatenated text of every descendant text node.
    pub fn text(&self, id: NodeId) -> String {
        collect_text(&self.nodes, id)
    }

    /// Every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n.kind, NodeKind::Element { .. }))
            .map(|(i, _)| NodeId(i))
    }

    /// Element siblings after `id`, in document order. Text siblings are skipped.
    pub fn next_element_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let siblings: &[NodeId] = match self.node(id).parent {
            Some(parent) => {
                let children = &self.node(parent).children;
                let pos = children.iter().position(|&c| c == id).map_or(children.len(), |p| p + 1);
                &children[pos..]
            }
            None => &[],
        };
        siblings.iter().copied().filter(move |&c| self.tag(c).is_some())
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants::new(&self.nodes, id)
    }

    /// Copy the subtree rooted at `id` into a standalone working copy.
    pub fn fragment(&self, id: NodeId) -> Fragment {
        let mut nodes = Vec::new();
        copy_subtree(&self.nodes, id, &mut nodes, None);
        Fragment { nodes }
    }
}

fn push_node(nodes: &mut Vec<Node>, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(Node {
        kind,
        parent,
        children: Vec::new(),
    });
    if let Some(p) = parent {
        nodes[p.0].children.push(id);
    }
    id
}

fn copy_subtree(src: &[Node], id: NodeId, dst: &mut Vec<Node>, parent: Option<NodeId>) {
    let copied = push_node(dst, src[id.0].kind.clone(), parent);
    for &child in &src[id.0].children {
        copy_subtree(src, child, dst, Some(copied));
    }
}

fn collect_text(nodes: &[Node], id: NodeId) -> String {
    let mut out = String::new();
    if let NodeKind::Text(t) = &nodes[id.0].kind {
        out.push_str(t);
    }
    for d in Descendants::new(nodes, id) {
        if let NodeKind::Text(t) = &nodes[d.0].kind {
            out.push_str(t);
        }
    }
    out
}

pub struct Descendants<'a> {
    nodes: &'a [Node],
    stack: Vec<NodeId>,
}

impl<'a> Descendants<'a> {
    fn new(nodes: &'a [Node], id: NodeId) -> Self {
        let stack = nodes[id.0].children.iter().rev().copied().collect();
        Descendants { nodes, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.nodes[id.0].children.iter().rev().copied());
        Some(id)
    }
}

/// Owned copy of one subtree. Edits here never reach the source [`Document`].
#[derive(Debug, Clone)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Fragment {
    /// Detach every element for which `remove` returns true, along with its
    /// subtree. Returns how many elements were detached.
    pub fn strip<F>(&mut self, remove: F) -> usize
    where
        F: Fn(&Node) -> bool,
    {
        let doomed: Vec<bool> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| i != 0 && n.tag().is_some() && remove(n))
            .collect();

        let mut removed = 0;
        for i in 0..self.nodes.len() {
            let before = self.nodes[i].children.len();
            self.nodes[i].children.retain(|c| !doomed[c.0]);
            removed += before - self.nodes[i].children.len();
        }
        removed
    }

    pub fn text(&self) -> String {
        collect_text(&self.nodes, NodeId(0))
    }
}
