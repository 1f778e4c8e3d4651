// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use quick_xml::escape::escape;

/// Indentation added per nesting level when a child has no sibling to copy from.
const INDENT_STEP: &str = "    ";

/// A stable handle to a node in a [`Document`]. Handles stay valid for the
/// lifetime of the document, including after the node has been detached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
enum NodeKind {
    Element(Element),
    /// Text, comments, declarations and anything else that is written back verbatim.
    Raw(String),
}

#[derive(Clone, Debug)]
pub(super) struct Element {
    pub(super) name: String,
    pub(super) attributes: Vec<(String, String)>,
    pub(super) children: Vec<NodeId>,
    pub(super) self_closing: bool,
    /// The start tag as it appeared in the source. Cleared when the tag must be re-rendered.
    pub(super) raw_start: Option<String>,
    /// The end tag as it appeared in the source.
    pub(super) raw_end: Option<String>,
}

impl Element {
    pub(super) fn new(name: &str, attributes: Vec<(String, String)>) -> Element {
        Element {
            name: name.to_string(),
            attributes,
            children: Vec::new(),
            self_closing: true,
            raw_start: None,
            raw_end: None,
        }
    }
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// An XML document held as an arena of nodes.
#[derive(Clone, Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
    top_level: Vec<NodeId>,
    pub(super) bom: bool,
}

impl Document {
    /// Serializes the document. Untouched nodes are written exactly as they were read.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        if self.bom {
            out.push('\u{feff}');
        }
        for &id in self.top_level.iter() {
            self.write_node(id, &mut out);
        }
        out
    }

    /// Gets the first top-level element.
    pub fn root(&self) -> Option<NodeId> {
        self.top_level
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    /// Returns true if the node is an element rather than text or markup.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element(_))
    }

    /// Gets the element name, or an empty string for non-element nodes.
    pub fn name(&self, id: NodeId) -> &str {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => &element.name,
            NodeKind::Raw(_) => "",
        }
    }

    /// Gets the parent element of the node, if it is attached to one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Gets all child nodes, including text.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => &element.children,
            NodeKind::Raw(_) => &[],
        }
    }

    /// Gets the child elements of the node.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
    }

    /// Gets the child elements with the given name.
    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.child_elements(id)
            .filter(move |&child| self.name(child) == name)
    }

    /// Gets the first child element with the given name.
    pub fn child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children_named(id, name).next()
    }

    /// Gets every element below the node in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_descendants(id, &mut found);
        found
    }

    /// Gets every element below the node with the given name, in document order.
    pub fn descendants_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&node| self.name(node) == name)
            .collect()
    }

    /// Returns true if `ancestor` contains `id` at any depth.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Gets the attributes of an element in source order.
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => &element.attributes,
            NodeKind::Raw(_) => &[],
        }
    }

    /// Gets the unescaped value of an attribute.
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, appending it if it does not exist. Returns true if the
    /// document changed; setting the current value leaves the source text alone.
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let Some(element) = self.element_mut(id) else {
            return false;
        };

        match element.attributes.iter_mut().find(|(name, _)| name == key) {
            Some((_, current)) if *current == value => return false,
            Some((_, current)) => *current = value,
            None => element.attributes.push((key.to_string(), value)),
        }
        element.raw_start = None;
        true
    }

    /// Removes an attribute. Returns true if it was present.
    pub fn remove_attribute(&mut self, id: NodeId, key: &str) -> bool {
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        let before = element.attributes.len();
        element.attributes.retain(|(name, _)| name != key);
        if element.attributes.len() == before {
            return false;
        }
        element.raw_start = None;
        true
    }

    /// Creates a detached, empty element.
    pub fn create_element(&mut self, name: &str, attributes: &[(&str, String)]) -> NodeId {
        let attributes = attributes
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        self.push_node(NodeKind::Element(Element::new(name, attributes)), None)
    }

    /// Appends an element as the last child of `parent`, copying the indentation
    /// of its siblings so the output stays readable.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.open_element(parent);
        self.nodes[child.0].parent = Some(parent);

        let children = self.children(parent).to_vec();
        let last_element = children.iter().rposition(|&node| self.is_element(node));
        let sibling_indent = last_element
            .filter(|&position| position > 0)
            .and_then(|position| self.whitespace(children[position - 1]))
            .map(str::to_string);

        let mut updated = children.clone();
        match sibling_indent {
            Some(indent) => {
                let at = match children.last() {
                    Some(&last) if self.whitespace(last).is_some() => children.len() - 1,
                    _ => children.len(),
                };
                let spacer = self.push_node(NodeKind::Raw(indent), Some(parent));
                updated.splice(at..at, [spacer, child]);
            }
            None if children
                .iter()
                .all(|&node| self.whitespace(node).is_some()) =>
            {
                let outer = self.indentation_of(parent);
                let inner = format!("{}{}", outer, INDENT_STEP);
                let before = self.push_node(NodeKind::Raw(inner), Some(parent));
                let after = self.push_node(NodeKind::Raw(outer), Some(parent));
                updated = vec![before, child, after];
            }
            None => updated.push(child),
        }
        self.set_children(parent, updated);
    }

    /// Detaches a node from its parent, along with the whitespace that indented it.
    pub fn remove(&mut self, id: NodeId) {
        let siblings = match self.parent(id) {
            Some(parent) => self.children(parent).to_vec(),
            None => self.top_level.clone(),
        };
        let Some(position) = siblings.iter().position(|&node| node == id) else {
            return;
        };

        let mut updated = siblings;
        updated.remove(position);
        if position > 0 && self.whitespace(updated[position - 1]).is_some() {
            updated.remove(position - 1);
        }

        match self.parent(id) {
            Some(parent) => self.set_children(parent, updated),
            None => self.top_level = updated,
        }
        self.nodes[id.0].parent = None;
    }

    /// Rearranges the given children of `parent` into the given order. The
    /// children keep the slots they occupied, so interleaved text stays put.
    pub fn reorder_children(&mut self, parent: NodeId, order: &[NodeId]) {
        let mut children = self.children(parent).to_vec();
        let slots: Vec<usize> = children
            .iter()
            .enumerate()
            .filter(|(_, node)| order.contains(node))
            .map(|(slot, _)| slot)
            .collect();
        if slots.len() != order.len() {
            return;
        }
        for (slot, &node) in slots.into_iter().zip(order.iter()) {
            children[slot] = node;
        }
        self.set_children(parent, children);
    }

    /// Deep-copies a node from another document into this one. The copy is detached.
    pub fn import(&mut self, source: &Document, id: NodeId) -> NodeId {
        match &source.nodes[id.0].kind {
            NodeKind::Raw(text) => self.push_node(NodeKind::Raw(text.clone()), None),
            NodeKind::Element(element) => {
                let copy = Element {
                    children: Vec::new(),
                    ..element.clone()
                };
                let new_id = self.push_node(NodeKind::Element(copy), None);
                let children: Vec<NodeId> = element
                    .children
                    .iter()
                    .map(|&child| {
                        let imported = self.import(source, child);
                        self.nodes[imported.0].parent = Some(new_id);
                        imported
                    })
                    .collect();
                self.set_children(new_id, children);
                new_id
            }
        }
    }

    pub(super) fn push_element(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = self.push_node(NodeKind::Element(element), parent);
        self.attach(parent, id);
        id
    }

    pub(super) fn push_raw(&mut self, parent: Option<NodeId>, text: &str) {
        let id = self.push_node(NodeKind::Raw(text.to_string()), parent);
        self.attach(parent, id);
    }

    pub(super) fn set_raw_end(&mut self, id: NodeId, raw: &str) {
        if let Some(element) = self.element_mut(id) {
            element.raw_end = Some(raw.to_string());
        }
    }

    fn push_node(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node { kind, parent });
        NodeId(self.nodes.len() - 1)
    }

    fn attach(&mut self, parent: Option<NodeId>, id: NodeId) {
        match parent {
            Some(parent) => {
                if let Some(element) = self.element_mut(parent) {
                    element.children.push(id);
                }
            }
            None => self.top_level.push(id),
        }
    }

    fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        if let Some(element) = self.element_mut(parent) {
            element.children = children;
        }
    }

    /// Turns a self-closing element into one that can hold children.
    fn open_element(&mut self, id: NodeId) {
        if let Some(element) = self.element_mut(id) {
            if element.self_closing {
                element.self_closing = false;
                element.raw_start = None;
                element.raw_end = None;
            }
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Raw(_) => None,
        }
    }

    /// Gets the text of a whitespace-only raw node.
    fn whitespace(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Raw(text) if !text.is_empty() && text.trim().is_empty() => Some(text),
            _ => None,
        }
    }

    /// Gets the whitespace that precedes the node among its siblings, or a bare newline.
    fn indentation_of(&self, id: NodeId) -> String {
        let siblings = match self.parent(id) {
            Some(parent) => self.children(parent),
            None => &self.top_level,
        };
        siblings
            .iter()
            .position(|&node| node == id)
            .filter(|&position| position > 0)
            .and_then(|position| self.whitespace(siblings[position - 1]))
            .map(|indent| match indent.rfind('\n') {
                Some(newline) => indent[newline..].to_string(),
                None => indent.to_string(),
            })
            .unwrap_or_else(|| "\n".to_string())
    }

    fn collect_descendants(&self, id: NodeId, found: &mut Vec<NodeId>) {
        for child in self.child_elements(id) {
            found.push(child);
            self.collect_descendants(child, found);
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Raw(text) => out.push_str(text),
            NodeKind::Element(element) => {
                match &element.raw_start {
                    Some(raw) => out.push_str(raw),
                    None => render_start(element, out),
                }
                if element.self_closing {
                    return;
                }
                for &child in element.children.iter() {
                    self.write_node(child, out);
                }
                match &element.raw_end {
                    Some(raw) => out.push_str(raw),
                    None => {
                        out.push_str("</");
                        out.push_str(&element.name);
                        out.push('>');
                    }
                }
            }
        }
    }
}

fn render_start(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in element.attributes.iter() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
    out.push_str(if element.self_closing { "/>" } else { ">" });
}
