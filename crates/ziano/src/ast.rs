// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Markup tree produced by the parser.
//!
//! The parser does not know about directives; it only records tags, text,
//! and the doctype in document order. Nodes live in a [`MarkupTree`] arena
//! and refer to each other by [`NodeId`], so the parent link is a plain
//! index rather than a reference.
//!
//! # Structure
//!
//! - Index 0 is always the root node.
//! - A node's `children` preserve document order.
//! - At most one [`MarkupKind::Doctype`] exists, as the first child of root.

use serde::{Deserialize, Serialize};

/// Source position of a construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset from the start of the source.
    pub offset: usize,
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column number, counted in characters.
    pub column: usize,
}

impl Span {
    /// Creates a new source span.
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line, column }
    }
}

/// Value of a tag property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropValue {
    /// A quoted value, entity-decoded: `name="value"`.
    Text(String),
    /// A property written without a value: `checked`.
    Flag,
    /// An explicitly absent value. Never produced by the parser.
    Null,
}

impl PropValue {
    /// Returns the text value, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Ordered property map.
///
/// Insertion order is kept for deterministic output. Inserting an existing
/// name overwrites its value in place (last write wins).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Properties(Vec<(String, PropValue)>);

impl Properties {
    /// Creates an empty property map.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts or overwrites a property.
    pub fn insert(&mut self, name: impl Into<String>, value: PropValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Looks up a property by name.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns true if the property is present (with any value).
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a property, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        let index = self.0.iter().position(|(n, _)| n == name)?;
        Some(self.0.remove(index).1)
    }

    /// Iterates properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, PropValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (N, PropValue)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (name, value) in iter {
            props.insert(name, value);
        }
        props
    }
}

/// Index of a node inside a [`MarkupTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// What a markup node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupKind {
    /// The synthetic document root.
    Root,
    /// A run of text (or a collapsed whitespace run).
    Text(String),
    /// An element or directive tag.
    Tag {
        /// Tag name as written.
        name: String,
        /// Properties in source order.
        properties: Properties,
    },
    /// The full doctype literal, e.g. `<!DOCTYPE html>`.
    Doctype(String),
}

/// A node in the markup arena.
#[derive(Debug, Clone)]
pub struct MarkupNode {
    /// Node kind and payload.
    pub kind: MarkupKind,
    /// Where the node starts.
    pub span: Span,
    /// Parent node, `None` only for the root.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
}

impl MarkupNode {
    /// The tag name, for tag nodes.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            MarkupKind::Tag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The opening tag as it would be written, for diagnostics.
    pub fn opening_tag(&self) -> String {
        match &self.kind {
            MarkupKind::Tag { name, properties } => render_opening_tag(name, properties),
            MarkupKind::Text(text) => text.clone(),
            MarkupKind::Doctype(literal) => literal.clone(),
            MarkupKind::Root => String::new(),
        }
    }
}

/// Writes `<name prop="value" flag>`. Values are not escaped.
pub fn render_opening_tag(name: &str, properties: &Properties) -> String {
    let mut tag = format!("<{}", name);
    for (prop, value) in properties.iter() {
        match value {
            PropValue::Text(text) => tag.push_str(&format!(" {}=\"{}\"", prop, text)),
            PropValue::Flag => tag.push_str(&format!(" {}", prop)),
            PropValue::Null => {}
        }
    }
    tag.push('>');
    tag
}

/// Arena holding every node of one parsed template.
#[derive(Debug, Clone)]
pub struct MarkupTree {
    nodes: Vec<MarkupNode>,
}

impl MarkupTree {
    /// The root node id.
    pub const ROOT: NodeId = NodeId(0);

    /// Creates a tree containing only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![MarkupNode {
                kind: MarkupKind::Root,
                span: Span::new(0, 1, 1),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Appends a node as the last child of `parent` and returns its id.
    pub fn append(&mut self, parent: NodeId, kind: MarkupKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(MarkupNode {
            kind,
            span,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Returns the node behind an id.
    pub fn node(&self, id: NodeId) -> &MarkupNode {
        &self.nodes[id.0]
    }

    /// Mutable access, used by the parser to fill in properties.
    pub fn node_mut(&mut self, id: NodeId) -> &mut MarkupNode {
        &mut self.nodes[id.0]
    }

    /// Children of the root, i.e. the top-level sequence.
    pub fn root_children(&self) -> &[NodeId] {
        &self.nodes[0].children
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self::new()
    }
}
