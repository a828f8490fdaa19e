//! Owned, mutable copy of a document subtree.
//!
//! Extraction never mutates the parsed [`Document`](crate::parse::Document).
//! Once a candidate is chosen it is cloned into a [`DomTree`], an arena of
//! element and text nodes linked by ids, and every cleanup pass works on
//! that copy. Removing a node only unlinks it from its parent, so ids stay
//! valid for the lifetime of the tree.

use scraper::{ElementRef, Node};

use crate::parse::Element;

/// Index of a node inside a [`DomTree`].
pub type NodeId = usize;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are serialized without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes", "noscript"];

/// Payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// An element with its lowercase tag name and attributes in source order
    Element { tag_name: String, attrs: Vec<(String, String)> },
    /// A text leaf
    Text(String),
}

/// A node in the DOM tree
#[derive(Debug, Clone)]
pub struct DomNode {
    /// Element or text payload
    pub data: NodeData,
    /// Parent node ID (if any)
    pub parent_id: Option<NodeId>,
    /// Child node IDs
    pub child_ids: Vec<NodeId>,
}

impl DomNode {
    fn new(data: NodeData, parent_id: Option<NodeId>) -> Self {
        Self { data, parent_id, child_ids: Vec::new() }
    }

    /// Tag name if this node is an element
    pub fn tag_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element { tag_name, .. } => Some(tag_name),
            NodeData::Text(_) => None,
        }
    }

    /// Whether this node is a text leaf
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }
}

/// An owned element tree rooted at a cloned candidate
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    root: NodeId,
}

impl DomTree {
    /// Deep-copy an element of a parsed document into a new owned tree.
    ///
    /// Comments, doctypes and processing instructions are dropped; elements
    /// and text are copied in document order.
    pub fn from_element(element: &Element<'_>) -> Self {
        let source = element.element_ref();
        let mut tree = Self { nodes: vec![DomNode::new(element_data(source), None)], root: 0 };

        let mut pending = vec![(tree.root, source)];
        while let Some((parent, source)) = pending.pop() {
            for child in source.children() {
                match child.value() {
                    Node::Text(text) => {
                        let text: &str = text;
                        tree.push_child(parent, NodeData::Text(text.to_owned()));
                    }
                    Node::Element(_) => {
                        if let Some(child_el) = ElementRef::wrap(child) {
                            let id = tree.push_child(parent, element_data(child_el));
                            pending.push((id, child_el));
                        }
                    }
                    _ => {}
                }
            }
        }

        tree
    }

    fn push_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let node_id = self.nodes.len();
        self.nodes.push(DomNode::new(data, Some(parent)));
        self.nodes[parent].child_ids.push(node_id);
        node_id
    }

    /// ID of the cloned candidate root
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id)
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(DomNode::tag_name)
    }

    /// Value of an attribute on an element node
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id)?.data {
            NodeData::Element { attrs, .. } => attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// The `class` attribute, or an empty string when absent
    pub fn class_name(&self, id: NodeId) -> &str {
        self.attr(id, "class").unwrap_or_default()
    }

    /// Attribute names and values of an element node
    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match self.nodes.get(id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs,
            _ => &[],
        }
    }

    /// Set or replace an attribute on an element node
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: String) {
        if let Some(DomNode { data: NodeData::Element { attrs, .. }, .. }) = self.nodes.get_mut(id) {
            match attrs.iter().position(|(n, _)| n == name) {
                Some(index) => attrs[index].1 = value,
                None => attrs.push((name.to_string(), value)),
            }
        }
    }

    /// Drop every attribute for which `keep` returns false
    pub fn retain_attrs(&mut self, id: NodeId, mut keep: impl FnMut(&str) -> bool) -> usize {
        match self.nodes.get_mut(id) {
            Some(DomNode { data: NodeData::Element { attrs, .. }, .. }) => {
                let before = attrs.len();
                attrs.retain(|(name, _)| keep(name));
                before - attrs.len()
            }
            _ => 0,
        }
    }

    /// Mutable access to the string of a text node
    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match self.nodes.get_mut(id) {
            Some(DomNode { data: NodeData::Text(text), .. }) => Some(text),
            _ => None,
        }
    }

    /// All nodes below `id` in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(id) {
            Some(node) => node.child_ids.iter().rev().copied().collect(),
            None => return out,
        };

        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current].child_ids.iter().rev());
        }

        out
    }

    /// Element nodes below `id` in document order
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&d| !self.nodes[d].is_text())
            .collect()
    }

    /// Concatenated text of `id` and everything below it
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let Some(NodeData::Text(t)) = self.nodes.get(id).map(|n| &n.data) {
            text.push_str(t);
        }
        for d in self.descendants(id) {
            if let NodeData::Text(t) = &self.nodes[d].data {
                text.push_str(t);
            }
        }
        text
    }

    /// Measure every node reachable from the root in one bottom-up sweep.
    ///
    /// `marked_tags` names the elements reported by
    /// [`SubtreeStats::contains_marked`].
    pub fn subtree_stats(&self, marked_tags: &[String]) -> SubtreeStats {
        let slots = self.nodes.len();
        let mut stats = SubtreeStats {
            text_len: vec![0; slots],
            link_text_len: vec![0; slots],
            visible_text: vec![false; slots],
            marked: vec![false; slots],
        };

        let mut order = vec![self.root];
        order.extend(self.descendants(self.root));

        for &id in order.iter().rev() {
            let node = &self.nodes[id];
            if let NodeData::Text(text) = &node.data {
                stats.text_len[id] = text.chars().count();
                stats.visible_text[id] = text.chars().any(|c| !c.is_whitespace());
            }
            if id == self.root {
                continue;
            }
            let Some(parent) = node.parent_id else {
                continue;
            };

            let tag = node.tag_name();
            let own_link = if tag == Some("a") { stats.text_len[id] } else { 0 };
            let own_mark = tag.is_some_and(|tag| marked_tags.iter().any(|m| m == tag));

            stats.text_len[parent] += stats.text_len[id];
            stats.link_text_len[parent] += stats.link_text_len[id] + own_link;
            stats.visible_text[parent] |= stats.visible_text[id];
            stats.marked[parent] |= stats.marked[id] || own_mark;
        }

        stats
    }

    /// Number of slots in the arena, detached nodes included
    pub fn slots(&self) -> usize {
        self.nodes.len()
    }

    /// Unlink a node (and its subtree) from its parent.
    ///
    /// Returns false for the root, unknown ids, and nodes already detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(parent) = self.nodes.get(id).and_then(|n| n.parent_id) else {
            return false;
        };
        self.nodes[parent].child_ids.retain(|&c| c != id);
        self.nodes[id].parent_id = None;
        true
    }

    /// Replace an element by its children, keeping their position.
    pub fn unwrap_element(&mut self, id: NodeId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(parent) = self.nodes.get(id).and_then(|n| n.parent_id) else {
            return false;
        };
        let Some(position) = self.nodes[parent].child_ids.iter().position(|&c| c == id) else {
            return false;
        };

        let children = std::mem::take(&mut self.nodes[id].child_ids);
        for &child in &children {
            self.nodes[child].parent_id = Some(parent);
        }
        let siblings = &mut self.nodes[parent].child_ids;
        let tail = siblings.split_off(position + 1);
        siblings.pop();
        siblings.extend(children);
        siblings.extend(tail);
        self.nodes[id].parent_id = None;
        true
    }

    /// Number of nodes reachable from the root, root included
    pub fn len(&self) -> usize {
        1 + self.descendants(self.root).len()
    }

    /// A tree always holds its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Serialize the children of `id`
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.nodes.get(id) {
            for &child in &node.child_ids {
                self.write_node(child, &mut out);
            }
        }
        out
    }

    /// Serialize `id` including its own tags
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if id < self.nodes.len() {
            self.write_node(id, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        match &node.data {
            NodeData::Text(text) => {
                let raw = node
                    .parent_id
                    .and_then(|p| self.tag_name(p))
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if raw {
                    out.push_str(text);
                } else {
                    escape_into(text, false, out);
                }
            }
            NodeData::Element { tag_name, attrs } => {
                out.push('<');
                out.push_str(tag_name);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&tag_name.as_str()) {
                    return;
                }

                for &child in &node.child_ids {
                    self.write_node(child, out);
                }

                out.push_str("</");
                out.push_str(tag_name);
                out.push('>');
            }
        }
    }
}

/// Text and link measurements for every node of a [`DomTree`], indexed by
/// [`NodeId`]. Nodes that were detached when the sweep ran read as empty.
#[derive(Debug, Clone)]
pub struct SubtreeStats {
    text_len: Vec<usize>,
    link_text_len: Vec<usize>,
    visible_text: Vec<bool>,
    marked: Vec<bool>,
}

impl SubtreeStats {
    /// Characters of text below `id`
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text_len.get(id).copied().unwrap_or_default()
    }

    /// Ratio of `<a>` text to all text below `id` (0.0 when there is no text)
    pub fn link_density(&self, id: NodeId) -> f64 {
        match self.text_len(id) {
            0 => 0.0,
            len => self.link_text_len[id] as f64 / len as f64,
        }
    }

    /// Whether any text below `id` has a non-whitespace character
    pub fn has_visible_text(&self, id: NodeId) -> bool {
        self.visible_text.get(id).copied().unwrap_or_default()
    }

    /// Whether an element with one of the marked tags sits below `id`
    pub fn contains_marked(&self, id: NodeId) -> bool {
        self.marked.get(id).copied().unwrap_or_default()
    }
}

fn element_data(element: ElementRef<'_>) -> NodeData {
    let value = element.value();
    NodeData::Element {
        tag_name: value.name().to_lowercase(),
        attrs: value.attrs().map(|(n, v)| (n.to_string(), v.to_string())).collect(),
    }
}

fn escape_into(text: &str, attr_mode: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attr_mode => out.push_str("&quot;"),
            '<' if !attr_mode => out.push_str("&lt;"),
            '>' if !attr_mode => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
