// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Hand-written markup parser.
//!
//! Scans template text into a [`MarkupTree`]. The parser keeps a cursor
//! node: opening tags descend into a new child, closing tags pop back to
//! the parent. Line and column are tracked on every consumed character so
//! every failure carries a position.
//!
//! # Recognized constructs
//!
//! - text runs up to the next `<`
//! - `<name prop prop="value">` / `<name ... />` / `</name>`
//! - `<!DOCTYPE ...>`, only as the very first construct
//! - `<!-- ... -->`, discarded
//!
//! Whitespace runs between constructs collapse into a single `" "` text node.
//! Tags from [`SELF_CLOSING_TAGS`](crate::escape::SELF_CLOSING_TAGS) never
//! open, even when written without `/>`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ziano::parse_markup;
//!
//! let tree = parse_markup("<p>Hello</p>", "hello.html")?;
//! assert_eq!(tree.root_children().len(), 1);
//! ```

use crate::ast::*;
use crate::error::{CompileError, Result};
use crate::escape::{decode_entities, is_markup_whitespace, is_self_closing_tag};
use crate::options::MAX_NESTING_DEPTH;

/// Parses template source into a markup tree.
///
/// # Errors
///
/// Returns [`CompileError::SyntaxError`] for malformed markup and
/// [`CompileError::StructuralError`] for a misplaced doctype or a closing
/// marker on a self-closing tag.
pub fn parse_markup(source: &str, file: &str) -> Result<MarkupTree> {
    let tree = MarkupParser::new(source, file).parse()?;
    tracing::debug!("Parsed {} markup nodes from {}", tree.len() - 1, file);
    Ok(tree)
}

struct MarkupParser<'a> {
    file: &'a str,
    source: &'a str,
    offset: usize,
    line: usize,
    col: usize,
    tree: MarkupTree,
    cursor: NodeId,
    depth: usize,
}

impl<'a> MarkupParser<'a> {
    fn new(source: &'a str, file: &'a str) -> Self {
        Self {
            file,
            source,
            offset: 0,
            line: 1,
            col: 1,
            tree: MarkupTree::new(),
            cursor: MarkupTree::ROOT,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<MarkupTree> {
        while !self.done() {
            self.parse_element()?;
        }

        if self.cursor != MarkupTree::ROOT {
            let node = self.tree.node(self.cursor);
            let name = node.tag_name().unwrap_or_default().to_string();
            return Err(self.syntax_error(format!("Expected closing tag </{}>", name), 0, node.span));
        }

        Ok(self.tree)
    }

    fn parse_element(&mut self) -> Result<()> {
        self.skip_whitespace_and_comments()?;
        if self.done() {
            return Ok(());
        }

        let span = self.pos();
        if !self.test("<") {
            let end = self.rest().find('<').unwrap_or(self.rest().len());
            let text = &self.rest()[..end];
            self.advance(text);
            self.tree.append(self.cursor, MarkupKind::Text(text.to_string()), span);
            return Ok(());
        }

        if self.test("/") {
            self.parse_closing_tag(span)
        } else if self.test("!") {
            self.parse_doctype(span)
        } else {
            self.parse_opening_tag(span)
        }
    }

    fn parse_closing_tag(&mut self, span: Span) -> Result<()> {
        if let Some(end) = self.rest().find('>') {
            let closer = self.rest()[..end].trim_matches(is_markup_whitespace);
            if is_self_closing_tag(closer) {
                return Err(self.structural_error(
                    format!("Self closing tag <{}> may not contain children", closer),
                    end + 1,
                    span,
                ));
            }
        }

        let Some(name) = self.tree.node(self.cursor).tag_name() else {
            return Err(self.syntax_error("Unexpected closing tag", 10, span));
        };

        let expected = format!("{}>", name);
        if !self.test(&expected) {
            return Err(self.syntax_error(
                format!("Expected '{}'", expected),
                expected.chars().count(),
                self.pos(),
            ));
        }

        self.cursor = self.tree.node(self.cursor).parent.unwrap_or(MarkupTree::ROOT);
        self.depth -= 1;
        Ok(())
    }

    fn parse_doctype(&mut self, span: Span) -> Result<()> {
        if self.cursor != MarkupTree::ROOT || !self.tree.root_children().is_empty() {
            return Err(self.structural_error(
                "Doctype may only be specified at the beginning of a template",
                10,
                span,
            ));
        }

        let Some(end) = self.rest().find('>') else {
            return Err(self.syntax_error("Expected matching > for doctype", 5, span));
        };
        let content = &self.rest()[..=end];
        self.advance(content);
        self.tree
            .append(MarkupTree::ROOT, MarkupKind::Doctype(format!("<!{}", content)), span);
        Ok(())
    }

    fn parse_opening_tag(&mut self, span: Span) -> Result<()> {
        let Some(end) = self.rest().find(|c: char| is_markup_whitespace(c) || c == '/' || c == '>') else {
            return Err(self.syntax_error("Expected matching > for tag", 5, span));
        };
        if end == 0 {
            return Err(self.syntax_error("Expected tag name", 5, span));
        }

        let name = &self.rest()[..end];
        self.advance(name);
        let node = self.tree.append(
            self.cursor,
            MarkupKind::Tag {
                name: name.to_string(),
                properties: Properties::new(),
            },
            span,
        );
        self.cursor = node;

        let open = self.parse_properties(node, span, name.chars().count() + 1)? && !is_self_closing_tag(name);
        if !open {
            self.cursor = self.tree.node(node).parent.unwrap_or(MarkupTree::ROOT);
            return Ok(());
        }

        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(CompileError::SyntaxError {
                message: format!("Maximum nesting depth of {} exceeded", MAX_NESTING_DEPTH),
                file: self.file.to_string(),
                line: span.line,
                column: span.column,
                near: format!("<{}", name),
            });
        }
        Ok(())
    }

    /// Reads properties up to the end of the tag. Returns true if the tag
    /// opens (`>`), false if it closed itself (`/>`).
    fn parse_properties(&mut self, node: NodeId, span: Span, look_ahead: usize) -> Result<bool> {
        while !self.done() {
            self.skip_whitespace(false);
            if self.done() {
                break;
            }
            if self.test("/>") {
                return Ok(false);
            }
            if self.test(">") {
                return Ok(true);
            }

            let end = self
                .rest()
                .find(|c: char| is_markup_whitespace(c) || c == '=' || c == '>' || c == '/')
                .unwrap_or(self.rest().len());
            if end == 0 {
                return Err(self.syntax_error("Unexpected character reading properties", 10, self.pos()));
            }

            let name = self.rest()[..end].to_string();
            self.advance(&name);
            let value = if self.test("=") {
                PropValue::Text(self.parse_property_value(&name)?)
            } else {
                PropValue::Flag
            };

            if let MarkupKind::Tag { properties, .. } = &mut self.tree.node_mut(node).kind {
                properties.insert(name, value);
            }
        }

        Err(self.syntax_error("Unexpected end of file reading properties", look_ahead, span))
    }

    fn parse_property_value(&mut self, name: &str) -> Result<String> {
        if !self.test("\"") {
            return Err(self.syntax_error(
                format!("Error looking for '\"' after property name '{}'", name),
                10,
                self.pos(),
            ));
        }

        let Some(end) = self.rest().find('"') else {
            return Err(self.syntax_error(
                format!("Error looking for closing '\"' after property '{}' value", name),
                10,
                self.pos(),
            ));
        };
        let raw = &self.rest()[..end];
        self.advance(raw);
        self.advance("\"");
        Ok(decode_entities(raw))
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            let had_whitespace = self.skip_whitespace(true);
            let had_comment = self.skip_comment()?;
            if !had_whitespace && !had_comment {
                return Ok(());
            }
        }
    }

    fn skip_whitespace(&mut self, create_node: bool) -> bool {
        let span = self.pos();
        let end = self
            .rest()
            .find(|c: char| !is_markup_whitespace(c))
            .unwrap_or(self.rest().len());
        if end == 0 {
            return false;
        }

        let run = &self.rest()[..end];
        self.advance(run);
        if create_node {
            self.tree.append(self.cursor, MarkupKind::Text(" ".to_string()), span);
        }
        true
    }

    fn skip_comment(&mut self) -> Result<bool> {
        if !self.test("<!--") {
            return Ok(false);
        }

        let Some(end) = self.rest().find("-->") else {
            return Err(self.syntax_error("Expected end of comment", 10, self.pos()));
        };
        let comment = &self.rest()[..end + 3];
        self.advance(comment);
        Ok(true)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    fn done(&self) -> bool {
        self.offset >= self.source.len()
    }

    fn pos(&self) -> Span {
        Span::new(self.offset, self.line, self.col)
    }

    fn advance(&mut self, consumed: &str) {
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.offset += consumed.len();
    }

    fn test(&mut self, part: &str) -> bool {
        if self.rest().starts_with(part) {
            self.advance(part);
            true
        } else {
            false
        }
    }

    fn structural_error(&self, message: impl Into<String>, look_ahead: usize, span: Span) -> CompileError {
        let near: String = self.rest().chars().take(look_ahead).collect();
        CompileError::structural(message, self.file, span, near)
    }

    fn syntax_error(&self, message: impl Into<String>, look_ahead: usize, span: Span) -> CompileError {
        CompileError::SyntaxError {
            message: message.into(),
            file: self.file.to_string(),
            line: span.line,
            column: span.column,
            near: self.rest().chars().take(look_ahead).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tree: &MarkupTree, ids: &[NodeId]) -> Vec<MarkupKind> {
        ids.iter().map(|id| tree.node(*id).kind.clone()).collect()
    }

    fn tag(tree: &MarkupTree, id: NodeId) -> (&str, &Properties) {
        match &tree.node(id).kind {
            MarkupKind::Tag { name, properties } => (name, properties),
            other => panic!("Expected tag, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_tags() {
        let tree = parse_markup("<div><p>Hello</p></div>", "t.html").unwrap();
        assert_eq!(tree.root_children().len(), 1);

        let div = tree.root_children()[0];
        assert_eq!(tag(&tree, div).0, "div");
        let p = tree.node(div).children[0];
        assert_eq!(tag(&tree, p).0, "p");
        assert_eq!(kinds(&tree, &tree.node(p).children), vec![MarkupKind::Text("Hello".to_string())]);
        assert_eq!(tree.node(p).parent, Some(div));
    }

    #[test]
    fn test_parse_properties() {
        let tree = parse_markup(r#"<input type="checkbox" checked value="a &amp; &quot;b&quot;"/>"#, "t.html").unwrap();
        let (name, props) = tag(&tree, tree.root_children()[0]);

        assert_eq!(name, "input");
        assert_eq!(props.get("type"), Some(&PropValue::Text("checkbox".to_string())));
        assert_eq!(props.get("checked"), Some(&PropValue::Flag));
        assert_eq!(props.get("value"), Some(&PropValue::Text("a & \"b\"".to_string())));
    }

    #[test]
    fn test_duplicate_property_last_write_wins() {
        let tree = parse_markup(r#"<a class="x" href="/" class="y"></a>"#, "t.html").unwrap();
        let (_, props) = tag(&tree, tree.root_children()[0]);

        assert_eq!(props.len(), 2);
        assert_eq!(props.get("class"), Some(&PropValue::Text("y".to_string())));
    }

    #[test]
    fn test_whitespace_collapses_to_single_space() {
        let tree = parse_markup("<ul>\n    <li>a</li>\n\t</ul>", "t.html").unwrap();
        let ul = tree.root_children()[0];
        let children = kinds(&tree, &tree.node(ul).children);

        assert_eq!(children.len(), 3);
        assert_eq!(children[0], MarkupKind::Text(" ".to_string()));
        assert_eq!(children[2], MarkupKind::Text(" ".to_string()));
    }

    #[test]
    fn test_comments_are_discarded() {
        let tree = parse_markup("<p><!-- note -->\n<!-- more -->x</p>", "t.html").unwrap();
        let p = tree.root_children()[0];
        let children = kinds(&tree, &tree.node(p).children);

        assert_eq!(children, vec![MarkupKind::Text(" ".to_string()), MarkupKind::Text("x".to_string())]);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = parse_markup("<p>\n<!-- never closed", "t.html").unwrap_err();
        assert_eq!(err.message(), "Expected end of comment");
        assert_eq!(err.line(), 2);
        assert_eq!(err.column(), 5);
    }

    #[test]
    fn test_doctype_first() {
        let tree = parse_markup("<!DOCTYPE html><html></html>", "t.html").unwrap();
        assert_eq!(
            tree.node(tree.root_children()[0]).kind,
            MarkupKind::Doctype("<!DOCTYPE html>".to_string())
        );
    }

    #[test]
    fn test_doctype_not_first() {
        let err = parse_markup("<p></p><!DOCTYPE html>", "t.html").unwrap_err();
        assert!(err.is_structural());
        assert_eq!(err.column(), 8);
        assert_eq!(err.near(), "DOCTYPE ht");

        let err = parse_markup("<html><!DOCTYPE html></html>", "t.html").unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = parse_markup("<div>\n  <span>x</div>", "t.html").unwrap_err();
        assert!(!err.is_structural());
        assert_eq!(err.message(), "Expected 'span>'");
        assert_eq!(err.line(), 2);
        match err {
            CompileError::SyntaxError { near, .. } => assert_eq!(near, "div>"),
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_tag() {
        let err = parse_markup("<div><p>x</p>", "t.html").unwrap_err();
        assert_eq!(err.message(), "Expected closing tag </div>");
        assert_eq!((err.line(), err.column()), (1, 1));
    }

    #[test]
    fn test_stray_closing_tag() {
        let err = parse_markup("text</p>", "t.html").unwrap_err();
        assert_eq!(err.message(), "Unexpected closing tag");
    }

    #[test]
    fn test_self_closing_without_slash() {
        let tree = parse_markup(r#"<p><br><img src="x.png">after</p>"#, "t.html").unwrap();
        let p = tree.root_children()[0];
        let children = &tree.node(p).children;

        assert_eq!(children.len(), 3);
        assert!(tree.node(children[0]).children.is_empty());
        assert_eq!(tree.node(children[2]).kind, MarkupKind::Text("after".to_string()));
    }

    #[test]
    fn test_self_closing_with_children_fails() {
        for name in crate::escape::SELF_CLOSING_TAGS {
            let source = format!("<{0}>child</{0}>", name);
            let err = parse_markup(&source, "t.html").unwrap_err();
            assert!(err.is_structural(), "{} should be structural: {:?}", name, err);
            assert_eq!(err.near(), format!("{}>", name));
        }
    }

    #[test]
    fn test_only_ascii_whitespace_separates() {
        let tree = parse_markup("<x\u{a0}y class=\"a\">\u{a0}</x\u{a0}y>", "t.html").unwrap();
        let x = tree.root_children()[0];
        let (name, props) = tag(&tree, x);

        assert_eq!(name, "x\u{a0}y");
        assert!(props.contains("class"));
        assert_eq!(
            kinds(&tree, &tree.node(x).children),
            vec![MarkupKind::Text("\u{a0}".to_string())]
        );
    }

    #[test]
    fn test_nesting_depth_limit() {
        let nested = |depth: usize| format!("{}{}", "<div>".repeat(depth), "</div>".repeat(depth));

        assert!(parse_markup(&nested(MAX_NESTING_DEPTH), "t.html").is_ok());

        let err = parse_markup(&nested(MAX_NESTING_DEPTH + 1), "t.html").unwrap_err();
        assert!(!err.is_structural());
        assert_eq!(err.message(), format!("Maximum nesting depth of {} exceeded", MAX_NESTING_DEPTH));
        assert_eq!((err.line(), err.column()), (1, MAX_NESTING_DEPTH * 5 + 1));
        assert_eq!(err.near(), "<div");

        // Void and self-closed tags do not count towards the depth.
        let flat = format!("{}{}", "<br><p/>".repeat(MAX_NESTING_DEPTH * 2), nested(MAX_NESTING_DEPTH));
        assert!(parse_markup(&flat, "t.html").is_ok());
    }

    #[test]
    fn test_unterminated_properties() {
        let err = parse_markup("<div class=\"a\"", "t.html").unwrap_err();
        assert_eq!(err.message(), "Unexpected end of file reading properties");
        assert_eq!((err.line(), err.column()), (1, 1));
    }

    #[test]
    fn test_unquoted_property_value() {
        let err = parse_markup("<div class=a>", "t.html").unwrap_err();
        assert_eq!(err.message(), "Error looking for '\"' after property name 'class'");
        assert_eq!(err.column(), 12);
    }

    #[test]
    fn test_unterminated_property_value() {
        let err = parse_markup("<div class=\"a>", "t.html").unwrap_err();
        assert_eq!(err.message(), "Error looking for closing '\"' after property 'class' value");
    }

    #[test]
    fn test_positions_count_characters() {
        let tree = parse_markup("<p>ünï</p>\n<b>x</b>", "t.html").unwrap();
        let b = tree.root_children()[2];
        assert_eq!(tree.node(b).span.line, 2);
        assert_eq!(tree.node(b).span.column, 1);

        let err = parse_markup("<p>ü</q>", "t.html").unwrap_err();
        assert_eq!(err.column(), 7);
    }

    #[test]
    fn test_multiline_property_value() {
        let tree = parse_markup("<z if=\"$a &&\n $b\"><i>y</i></z>", "t.html").unwrap();
        let z = tree.root_children()[0];
        let (_, props) = tag(&tree, z);
        assert_eq!(props.get("if"), Some(&PropValue::Text("$a &&\n $b".to_string())));
        let i = tree.node(z).children[0];
        assert_eq!(tree.node(i).span.line, 2);
    }
}
