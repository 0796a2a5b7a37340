//! Content tree: the host side of scanning
//!
//! `ContentHost` is the contract the scan driver needs from whatever holds
//! the rendered page (a DOM binding, a test fixture). `ContentTree` is the
//! in-memory arena implementation used natively and in tests.

use serde::{Deserialize, Serialize};

use super::annotate::{render_html, strip_markers, AnnotatedUnit};
use crate::config::HintConfig;
use crate::error::HintError;
use crate::presentation::escape_html;

// =============================================================================
// Identifiers
// =============================================================================

/// Arena index of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Text units are text nodes
pub type UnitId = NodeId;

// =============================================================================
// Host contract
// =============================================================================

/// What the scan driver needs from the content holder
pub trait ContentHost {
    /// Root of the whole tree
    fn root(&self) -> NodeId;

    /// Text units under `node` (inclusive) in document order
    fn units_in(&self, node: NodeId) -> Vec<UnitId>;

    /// Plain text of an unannotated unit; `None` for annotated or unknown units
    fn unit_text(&self, unit: UnitId) -> Option<&str>;

    /// Whether the unit currently shows an annotated representation
    fn is_annotated(&self, unit: UnitId) -> bool;

    /// Whether the unit lies inside a verbatim region
    fn is_verbatim(&self, unit: UnitId, config: &HintConfig) -> bool;

    /// Swap the unit's plain text for an annotated representation
    fn replace_unit(&mut self, unit: UnitId, annotated: AnnotatedUnit) -> Result<(), HintError>;

    /// Put plain text back into a unit
    fn restore_unit(&mut self, unit: UnitId, original: &str) -> Result<(), HintError>;
}

// =============================================================================
// Arena tree
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TextContent {
    Plain(String),
    Annotated(AnnotatedUnit),
}

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    Element {
        tag: String,
        classes: Vec<String>,
        /// Explicit host designation, on top of the configured tags/classes
        verbatim: bool,
    },
    Text(TextContent),
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document tree
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTree {
    nodes: Vec<Node>,
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTree {
    /// A tree holding only a `body` element
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element {
                    tag: "body".to_string(),
                    classes: Vec::new(),
                    verbatim: false,
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str, classes: &[&str]) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_lowercase(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            verbatim: false,
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(TextContent::Plain(text.to_string())))
    }

    /// Attach `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HintError> {
        self.element_check(parent)?;
        self.node(child)?;
        if parent == child || self.is_ancestor(child, parent) {
            return Err(HintError::UnknownUnit(child));
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Convenience: create an element and append it
    pub fn append_element(&mut self, parent: NodeId, tag: &str, classes: &[&str]) -> Result<NodeId, HintError> {
        let id = self.create_element(tag, classes);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Convenience: create a text node and append it
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<UnitId, HintError> {
        let id = self.create_text(text);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Detach a node (and its subtree) from the document
    pub fn remove(&mut self, node: NodeId) -> Result<(), HintError> {
        self.node(node)?;
        if node == self.root() {
            return Err(HintError::UnknownUnit(node));
        }
        self.detach(node);
        Ok(())
    }

    /// Designate an element as verbatim (or lift the designation)
    pub fn set_verbatim(&mut self, node: NodeId, verbatim: bool) -> Result<(), HintError> {
        self.element_check(node)?;
        if let NodeKind::Element { verbatim: flag, .. } = &mut self.nodes[node.0].kind {
            *flag = verbatim;
        }
        Ok(())
    }

    /// Whether the node is currently reachable from the root
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root() {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    /// Annotated representation of a unit, if any
    pub fn annotation(&self, unit: UnitId) -> Option<&AnnotatedUnit> {
        match &self.nodes.get(unit.0)?.kind {
            NodeKind::Text(TextContent::Annotated(a)) => Some(a),
            _ => None,
        }
    }

    /// Visible text of the attached document, markers stripped
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for unit in self.units_in(self.root()) {
            match &self.nodes[unit.0].kind {
                NodeKind::Text(TextContent::Plain(t)) => out.push_str(t),
                NodeKind::Text(TextContent::Annotated(a)) => out.push_str(&strip_markers(a)),
                NodeKind::Element { .. } => {}
            }
        }
        out
    }

    /// HTML serialization of the attached document
    pub fn render_html(&self, config: &HintConfig) -> String {
        let mut out = String::new();
        self.write_html(self.root(), config, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, config: &HintConfig, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Text(TextContent::Plain(t)) => out.push_str(&escape_html(t)),
            NodeKind::Text(TextContent::Annotated(a)) => {
                out.push_str(&format!(
                    "<span class=\"{}\">{}</span>",
                    escape_html(&config.processed_class),
                    render_html(a, config)
                ));
            }
            NodeKind::Element { tag, classes, .. } => {
                if classes.is_empty() {
                    out.push_str(&format!("<{}>", tag));
                } else {
                    out.push_str(&format!("<{} class=\"{}\">", tag, escape_html(&classes.join(" "))));
                }
                for child in &node.children {
                    self.write_html(*child, config, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node, HintError> {
        self.nodes.get(id.0).ok_or(HintError::UnknownUnit(id))
    }

    fn element_check(&self, id: NodeId) -> Result<(), HintError> {
        match self.node(id)?.kind {
            NodeKind::Element { .. } => Ok(()),
            NodeKind::Text(_) => Err(HintError::UnknownUnit(id)),
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes[node.0].parent;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn text_node_mut(&mut self, unit: UnitId) -> Result<&mut TextContent, HintError> {
        match self.nodes.get_mut(unit.0).map(|n| &mut n.kind) {
            Some(NodeKind::Text(content)) => Ok(content),
            _ => Err(HintError::UnknownUnit(unit)),
        }
    }
}

impl ContentHost for ContentTree {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn units_in(&self, node: NodeId) -> Vec<UnitId> {
        let mut units = Vec::new();
        if self.nodes.get(node.0).is_none() {
            return units;
        }
        // Depth-first, children pushed in reverse to pop in document order
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let n = &self.nodes[id.0];
            match n.kind {
                NodeKind::Text(_) => units.push(id),
                NodeKind::Element { .. } => stack.extend(n.children.iter().rev().copied()),
            }
        }
        units
    }

    fn unit_text(&self, unit: UnitId) -> Option<&str> {
        match &self.nodes.get(unit.0)?.kind {
            NodeKind::Text(TextContent::Plain(t)) => Some(t),
            _ => None,
        }
    }

    fn is_annotated(&self, unit: UnitId) -> bool {
        self.annotation(unit).is_some()
    }

    fn is_verbatim(&self, unit: UnitId, config: &HintConfig) -> bool {
        let mut current = self.nodes.get(unit.0).and_then(|n| n.parent);
        while let Some(id) = current {
            let n = &self.nodes[id.0];
            if let NodeKind::Element { tag, classes, verbatim } = &n.kind {
                if *verbatim
                    || config.is_verbatim_tag(tag)
                    || config.has_verbatim_class(classes.iter().map(String::as_str))
                {
                    return true;
                }
            }
            current = n.parent;
        }
        false
    }

    fn replace_unit(&mut self, unit: UnitId, annotated: AnnotatedUnit) -> Result<(), HintError> {
        let content = self.text_node_mut(unit)?;
        *content = TextContent::Annotated(annotated);
        Ok(())
    }

    fn restore_unit(&mut self, unit: UnitId, original: &str) -> Result<(), HintError> {
        let content = self.text_node_mut(unit)?;
        *content = TextContent::Plain(original.to_string());
        Ok(())
    }
}
