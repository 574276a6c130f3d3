// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Markup tree to directive AST transformation.
//!
//! This module turns the parser's [`MarkupTree`] into a [`Template`]: a
//! sequence of [`DirectiveNode`]s with every `<z ...>` tag resolved into
//! control flow, includes, render slots or raw output.
//!
//! # Transformation Rules
//!
//! 1. **Directive dispatch**: a `z` tag is inspected for `if`, `else-if`,
//!    `else`, `for-each`, `include`, `render`, `raw` and `use`, in that order.
//!    A `z` tag with none of them is transparent and its children are spliced
//!    into the parent sequence.
//! 2. **Chains**: `else-if` and `else` must directly follow an `if` or
//!    `else-if` in the sequence built so far.
//! 3. **Whitespace**: whitespace-only text collapses to one `" "`, is dropped
//!    right after a directive, and a directive swallows the whitespace entry
//!    right before it.
//! 4. **Side data**: `use` declarations and the doctype are collected next to
//!    the AST, not inside it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ziano::{parse_markup, transform_markup};
//!
//! let tree = parse_markup(source, "page.html")?;
//! let template = transform_markup(&tree, "page.html")?;
//! ```

use crate::ast::*;
use crate::error::{CompileError, Result};
use crate::escape::is_blank;
use crate::options::DIRECTIVE_TAG;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref ITERATION_IN: Regex =
        Regex::new(r"(?s)^\s*(\$[a-zA-Z0-9_]+)(?:\s*,\s*(\$[a-zA-Z0-9_]+))?\s+in\s+(.+?)\s*$").unwrap();
}

/// Output of the transform stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    /// The directive AST in document order.
    pub body: Vec<DirectiveNode>,
    /// `use` declarations, emitted once at the top of the generated code.
    pub use_instructions: Vec<String>,
    /// The doctype literal, written before any other output.
    pub doctype: Option<String>,
}

/// Output slots a template can render with `<z render="...">`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenderSlot {
    /// The inner content passed by the including template.
    #[serde(rename = "innerHTML")]
    InnerHtml,
    /// The renderer's script tags.
    #[serde(rename = "scripts")]
    Scripts,
    /// The renderer's stylesheet links.
    #[serde(rename = "stylesheets")]
    Stylesheets,
}

impl RenderSlot {
    /// Parses a `render` property value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "innerHTML" => Some(RenderSlot::InnerHtml),
            "scripts" => Some(RenderSlot::Scripts),
            "stylesheets" => Some(RenderSlot::Stylesheets),
            _ => None,
        }
    }
}

/// A node of the directive AST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DirectiveNode {
    /// Text content, possibly holding `{{ }}` interpolations.
    Text {
        /// The text as written, or `" "` for collapsed whitespace.
        content: String,
    },
    /// An ordinary element.
    Element {
        /// Tag name.
        tag: String,
        /// Element properties in source order.
        properties: Properties,
        /// Child nodes.
        children: Vec<DirectiveNode>,
        /// Position of the opening tag.
        span: Span,
    },
    /// `<z if="cond">`.
    If {
        /// Host-language condition.
        condition: String,
        /// Rendered when the condition holds.
        children: Vec<DirectiveNode>,
    },
    /// `<z else-if="cond">`.
    ElseIf {
        /// Host-language condition.
        condition: String,
        /// Rendered when the condition holds.
        children: Vec<DirectiveNode>,
    },
    /// `<z else>`.
    Else {
        /// Rendered when no earlier branch matched.
        children: Vec<DirectiveNode>,
    },
    /// `<z for-each="...">`.
    ForEach {
        /// Host-language iteration head, e.g. `$items as $item`.
        iter_expression: String,
        /// Rendered once per iteration.
        children: Vec<DirectiveNode>,
    },
    /// `<z include="file.html" ...>`.
    Include {
        /// Target template filename.
        filename: String,
        /// Remaining properties, passed as arguments.
        properties: Properties,
        /// Captured as the included template's inner content.
        children: Vec<DirectiveNode>,
    },
    /// `<z render="...">`.
    RenderSlot {
        /// Which slot to render.
        slot: RenderSlot,
    },
    /// `<z raw="...">`, emitted without HTML escaping.
    Raw {
        /// Literal or interpolated content.
        content: String,
    },
}

impl DirectiveNode {
    /// Returns true for text made only of whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, DirectiveNode::Text { content } if is_blank(content))
    }

    /// Returns true for nodes produced by a directive.
    pub fn has_expression_marker(&self) -> bool {
        match self {
            DirectiveNode::If { .. }
            | DirectiveNode::ElseIf { .. }
            | DirectiveNode::Else { .. }
            | DirectiveNode::ForEach { .. }
            | DirectiveNode::Include { .. }
            | DirectiveNode::RenderSlot { .. }
            | DirectiveNode::Raw { .. } => true,
            DirectiveNode::Text { .. } | DirectiveNode::Element { .. } => false,
        }
    }
}

/// Transforms a parsed [`MarkupTree`] into a [`Template`].
///
/// # Errors
///
/// Returns [`CompileError::StructuralError`] for an `else`/`else-if` without
/// a preceding `if`/`else-if`, an unknown render slot, or a directive
/// property that needs a value but was written as a flag.
pub fn transform_markup(tree: &MarkupTree, file: &str) -> Result<Template> {
    let mut transformer = Transformer {
        tree,
        file,
        use_instructions: Vec::new(),
        doctype: None,
    };
    let body = transformer.transform_children(tree.root_children())?;

    tracing::debug!(
        "Transformed {}: {} top-level nodes, {} use instructions",
        file,
        body.len(),
        transformer.use_instructions.len()
    );

    Ok(Template {
        body,
        use_instructions: transformer.use_instructions,
        doctype: transformer.doctype,
    })
}

/// Rewrites `$item in $items` and `$key, $value in $map` into foreach heads.
/// Anything else is returned as written.
pub fn iteration_expression(expression: &str) -> String {
    match ITERATION_IN.captures(expression) {
        Some(caps) => {
            let iterable = &caps[3];
            match caps.get(2) {
                Some(value) => format!("{} as {} => {}", iterable, &caps[1], value.as_str()),
                None => format!("{} as {}", iterable, &caps[1]),
            }
        }
        None => expression.trim().to_string(),
    }
}

struct Transformer<'a> {
    tree: &'a MarkupTree,
    file: &'a str,
    use_instructions: Vec<String>,
    doctype: Option<String>,
}

impl<'a> Transformer<'a> {
    fn transform_children(&mut self, ids: &[NodeId]) -> Result<Vec<DirectiveNode>> {
        let tree = self.tree;
        let mut nodes = Vec::new();

        for &id in ids {
            let node = tree.node(id);
            match &node.kind {
                MarkupKind::Tag { name, properties } if name == DIRECTIVE_TAG => {
                    self.transform_directive(node, properties, &mut nodes)?;
                }
                MarkupKind::Tag { name, properties } => {
                    nodes.push(DirectiveNode::Element {
                        tag: name.clone(),
                        properties: properties.clone(),
                        children: self.transform_children(&node.children)?,
                        span: node.span,
                    });
                }
                MarkupKind::Text(text) => push_text(&mut nodes, text),
                MarkupKind::Doctype(literal) => self.doctype = Some(literal.clone()),
                MarkupKind::Root => {}
            }
        }

        Ok(nodes)
    }

    fn transform_directive(
        &mut self,
        node: &MarkupNode,
        properties: &Properties,
        nodes: &mut Vec<DirectiveNode>,
    ) -> Result<()> {
        if nodes.last().is_some_and(DirectiveNode::is_whitespace) {
            nodes.pop();
        }

        let has_children = !node.children.is_empty();

        if properties.contains("if") {
            let condition = self.directive_value(node, properties, "if")?;
            if has_children {
                nodes.push(DirectiveNode::If {
                    condition,
                    children: self.transform_children(&node.children)?,
                });
            }
        } else if properties.contains("else-if") || properties.contains("else") {
            let kind = if properties.contains("else-if") { "else-if" } else { "else" };
            if !matches!(nodes.last(), Some(DirectiveNode::If { .. } | DirectiveNode::ElseIf { .. })) {
                return Err(CompileError::structural(
                    format!("{} must follow if or else-if", kind),
                    self.file,
                    node.span,
                    node.opening_tag(),
                ));
            }
            if has_children {
                let children = self.transform_children(&node.children)?;
                if kind == "else-if" {
                    let condition = self.directive_value(node, properties, "else-if")?;
                    nodes.push(DirectiveNode::ElseIf { condition, children });
                } else {
                    nodes.push(DirectiveNode::Else { children });
                }
            }
        } else if properties.contains("for-each") {
            let expression = self.directive_value(node, properties, "for-each")?;
            if has_children {
                nodes.push(DirectiveNode::ForEach {
                    iter_expression: iteration_expression(&expression),
                    children: self.transform_children(&node.children)?,
                });
            }
        } else if properties.contains("include") {
            let filename = self.directive_value(node, properties, "include")?;
            let mut arguments = properties.clone();
            arguments.remove("include");
            nodes.push(DirectiveNode::Include {
                filename,
                properties: arguments,
                children: self.transform_children(&node.children)?,
            });
        } else if properties.contains("render") {
            let name = self.directive_value(node, properties, "render")?;
            let Some(slot) = RenderSlot::from_name(&name) else {
                return Err(CompileError::structural(
                    format!("Unknown render type: {}", name),
                    self.file,
                    node.span,
                    node.opening_tag(),
                ));
            };
            nodes.push(DirectiveNode::RenderSlot { slot });
        } else if properties.contains("raw") {
            let content = self.directive_value(node, properties, "raw")?;
            nodes.push(DirectiveNode::Raw { content });
        } else if properties.contains("use") {
            let declaration = self.directive_value(node, properties, "use")?;
            self.use_instructions.push(declaration);
        } else {
            nodes.extend(self.transform_children(&node.children)?);
        }

        Ok(())
    }

    fn directive_value(&self, node: &MarkupNode, properties: &Properties, name: &str) -> Result<String> {
        match properties.get(name) {
            Some(PropValue::Text(value)) => Ok(value.clone()),
            _ => Err(CompileError::structural(
                format!("Directive '{}' requires a value", name),
                self.file,
                node.span,
                node.opening_tag(),
            )),
        }
    }
}

fn push_text(nodes: &mut Vec<DirectiveNode>, text: &str) {
    if text.is_empty() {
        return;
    }

    if is_blank(text) {
        match nodes.last() {
            Some(last) if last.has_expression_marker() => return,
            Some(last) if last.is_whitespace() => {
                nodes.pop();
            }
            _ => {}
        }
        nodes.push(DirectiveNode::Text { content: " ".to_string() });
    } else {
        nodes.push(DirectiveNode::Text { content: text.to_string() });
    }
}
