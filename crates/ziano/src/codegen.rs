// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! PHP code generation from the directive AST.
//!
//! This module turns a [`Template`] into the source of a PHP render
//! function.
//!
//! # Generated Code Structure
//!
//! ```php
//! <?php
//! use App\Models\User;
//! return function($zRenderer, $zProps, $innerHTML = '') {
//!     extract($zProps);
//!     unset($zProps);
//!     echo "<!DOCTYPE html><ul>";
//!     foreach ($items as $item) {
//!         echo "<li>";
//!         echo $zRenderer->escapeText($item);
//!         echo "</li>";
//!     }
//!     echo "</ul>";
//! };
//! ```
//!
//! # Literal Coalescing
//!
//! Static markup is collected in a [`LiteralBuffer`] and written as a single
//! `echo` right before the next dynamic statement, at block boundaries and
//! at the end. Each block (branch, loop body, include capture) gets its own
//! buffer, so nothing pending outside a block can leak into it.

use crate::error::{CompileError, Result};
use crate::escape::*;
use crate::ast::{render_opening_tag, PropValue, Properties, Span};
use crate::options::{CompilerOptions, EXTRACT_PROPERTY};
use crate::transform::*;

/// Generates PHP code for a transformed template.
///
/// # Errors
///
/// Returns [`CompileError::StructuralError`] if a self-closing element has
/// children or an extraction property has no value.
pub fn generate_php_code(template: &Template, file: &str, options: &CompilerOptions) -> Result<String> {
    let mut generator = PhpCodeGenerator::new(file, options);
    let code = generator.generate(template)?;
    tracing::debug!("Generated {} bytes of PHP for {}", code.len(), file);
    Ok(code)
}

/// Pending static markup awaiting a single `echo`.
#[derive(Debug, Default)]
pub struct LiteralBuffer {
    pending: String,
}

impl LiteralBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw markup. PHP escaping happens on flush.
    pub fn push(&mut self, markup: &str) {
        self.pending.push_str(markup);
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes the pending markup as an `echo` statement, if any.
    pub fn take_statement(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let markup = std::mem::take(&mut self.pending);
        Some(format!("echo {};", php_string(&markup)))
    }
}

struct PhpCodeGenerator<'a> {
    file: &'a str,
    options: &'a CompilerOptions,
    output: String,
    indent_level: usize,
}

impl<'a> PhpCodeGenerator<'a> {
    fn new(file: &'a str, options: &'a CompilerOptions) -> Self {
        Self {
            file,
            options,
            output: String::new(),
            indent_level: 0,
        }
    }

    fn generate(&mut self, template: &Template) -> Result<String> {
        self.write_line("<?php");
        for instruction in &template.use_instructions {
            self.write_line(&format!("use {};", instruction.trim().trim_end_matches(';')));
        }

        self.write_line("return function($zRenderer, $zProps, $innerHTML = '') {");
        self.indent();
        self.write_line("extract($zProps);");
        self.write_line("unset($zProps);");

        let mut buffer = LiteralBuffer::new();
        if let Some(doctype) = &template.doctype {
            buffer.push(doctype);
        }
        self.generate_nodes(&template.body, &mut buffer)?;
        self.flush(&mut buffer);

        self.dedent();
        self.write_line("};");

        Ok(std::mem::take(&mut self.output))
    }

    fn generate_nodes(&mut self, nodes: &[DirectiveNode], buffer: &mut LiteralBuffer) -> Result<()> {
        for node in nodes {
            self.generate_node(node, buffer)?;
        }
        Ok(())
    }

    fn generate_node(&mut self, node: &DirectiveNode, buffer: &mut LiteralBuffer) -> Result<()> {
        match node {
            DirectiveNode::Text { content } => {
                if maybe_contains_code(content) {
                    self.flush(buffer);
                    self.write_line(&format!("echo $zRenderer->escapeText({});", prepare_code_parts(content)));
                } else {
                    buffer.push(&escape_text(content));
                }
                Ok(())
            }
            DirectiveNode::If { condition, children } => {
                self.generate_block(&format!("if ({}) {{", condition.trim()), children, buffer)
            }
            DirectiveNode::ElseIf { condition, children } => {
                self.generate_block(&format!("else if ({}) {{", condition.trim()), children, buffer)
            }
            DirectiveNode::Else { children } => self.generate_block("else {", children, buffer),
            DirectiveNode::ForEach { iter_expression, children } => {
                self.generate_block(&format!("foreach ({}) {{", iter_expression), children, buffer)
            }
            DirectiveNode::Include { filename, properties, children } => {
                self.generate_include(filename, properties, children, buffer)
            }
            DirectiveNode::RenderSlot { slot } => {
                self.flush(buffer);
                match slot {
                    RenderSlot::InnerHtml => self.write_line("echo $innerHTML;"),
                    RenderSlot::Scripts => self.write_line("$zRenderer->renderScripts();"),
                    RenderSlot::Stylesheets => self.write_line("$zRenderer->renderStylesheets();"),
                }
                Ok(())
            }
            DirectiveNode::Raw { content } => {
                self.flush(buffer);
                if maybe_contains_code(content) {
                    self.write_line(&format!("echo {};", prepare_code_parts(content)));
                } else {
                    self.write_line(&format!("echo {};", php_string(content)));
                }
                Ok(())
            }
            DirectiveNode::Element { tag, properties, children, span } => {
                self.generate_element(tag, properties, children, *span, buffer)
            }
        }
    }

    /// Writes `head`, the children in their own buffer, and the closing brace.
    fn generate_block(&mut self, head: &str, children: &[DirectiveNode], buffer: &mut LiteralBuffer) -> Result<()> {
        self.flush(buffer);
        self.write_line(head);
        self.indent();

        let mut inner = LiteralBuffer::new();
        self.generate_nodes(children, &mut inner)?;
        self.flush(&mut inner);

        self.dedent();
        self.write_line("}");
        Ok(())
    }

    fn generate_include(
        &mut self,
        filename: &str,
        properties: &Properties,
        children: &[DirectiveNode],
        buffer: &mut LiteralBuffer,
    ) -> Result<()> {
        self.flush(buffer);

        let inner_html = if children.is_empty() {
            "''"
        } else {
            self.write_line("ob_start();");
            let mut captured = LiteralBuffer::new();
            self.generate_nodes(children, &mut captured)?;
            self.flush(&mut captured);
            "ob_get_clean()"
        };

        let arguments: Vec<String> = properties
            .iter()
            .map(|(name, value)| format!("{} => {}", php_single_quoted(name), export_property_value(value)))
            .collect();

        self.write_line(&format!(
            "$zRenderer->render(\"{}\", [{}], {});",
            escape_interpolated_literal(filename),
            arguments.join(", "),
            inner_html
        ));
        Ok(())
    }

    fn generate_element(
        &mut self,
        tag: &str,
        properties: &Properties,
        children: &[DirectiveNode],
        span: Span,
        buffer: &mut LiteralBuffer,
    ) -> Result<()> {
        let self_closing = is_self_closing_tag(tag);
        if self_closing && !children.is_empty() {
            return Err(CompileError::structural(
                format!("Self closing tag <{}> may not contain children", tag),
                self.file,
                span,
                render_opening_tag(tag, properties),
            ));
        }

        buffer.push("<");
        buffer.push(tag);

        for (name, value) in properties.iter() {
            match value {
                PropValue::Null => {}
                _ if name == EXTRACT_PROPERTY => {
                    let Some(mapping) = value.as_text() else {
                        return Err(CompileError::structural(
                            format!("Property '{}' requires a value", EXTRACT_PROPERTY),
                            self.file,
                            span,
                            render_opening_tag(tag, properties),
                        ));
                    };
                    self.flush(buffer);
                    self.write_line(&format!("foreach ({} as $zKey => $zValue) {{", mapping.trim()));
                    self.indent();
                    self.write_line("echo \" \" . $zKey . \"=\\\"\" . $zRenderer->escapeProperty($zValue) . \"\\\"\";");
                    self.dedent();
                    self.write_line("}");
                }
                PropValue::Flag if self.options.is_boolean_attribute(name) => {
                    buffer.push(" ");
                    buffer.push(name);
                }
                PropValue::Flag => {
                    buffer.push(&format!(" {}=\"\"", name));
                }
                PropValue::Text(text) => {
                    buffer.push(&format!(" {}=\"", name));
                    if maybe_contains_code(text) {
                        self.flush(buffer);
                        self.write_line(&format!("echo $zRenderer->escapeProperty({});", prepare_code_parts(text)));
                    } else {
                        buffer.push(&escape_property(text));
                    }
                    buffer.push("\"");
                }
            }
        }

        buffer.push(">");
        if !self_closing {
            self.generate_nodes(children, buffer)?;
            buffer.push(&format!("</{}>", tag));
        }
        Ok(())
    }

    fn flush(&mut self, buffer: &mut LiteralBuffer) {
        if let Some(statement) = buffer.take_statement() {
            tracing::trace!("Flushing literal run: {}", statement);
            self.write_line(&statement);
        }
    }

    fn write_line(&mut self, line: &str) {
        if !line.is_empty() {
            self.output.push_str(&"    ".repeat(self.indent_level));
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_markup;
    use crate::transform::transform_markup;

    fn generate(source: &str) -> Result<String> {
        let tree = parse_markup(source, "t.html")?;
        let template = transform_markup(&tree, "t.html")?;
        generate_php_code(&template, "t.html", &CompilerOptions::default())
    }

    /// The statements inside the render function, without indentation.
    fn body(code: &str) -> Vec<String> {
        let lines: Vec<&str> = code.lines().collect();
        let start = lines.iter().position(|l| l.trim() == "unset($zProps);").unwrap() + 1;
        lines[start..lines.len() - 1].iter().map(|l| l.trim().to_string()).collect()
    }

    #[test]
    fn test_generate_static_template() {
        let code = generate("<p>Hello</p>").unwrap();
        assert_eq!(
            code,
            "<?php\n\
             return function($zRenderer, $zProps, $innerHTML = '') {\n    \
             extract($zProps);\n    \
             unset($zProps);\n    \
             echo \"<p>Hello</p>\";\n\
             };\n"
        );
    }

    #[test]
    fn test_literal_runs_coalesce() {
        let code = generate("<ul>\n  <li class=\"a\">One</li>\n  <li>Two & three</li>\n</ul>").unwrap();
        assert_eq!(
            body(&code),
            vec!["echo \"<ul> <li class=\\\"a\\\">One</li> <li>Two &amp; three</li> </ul>\";"]
        );
    }

    #[test]
    fn test_text_interpolation_is_escaped() {
        let code = generate("<p>Hello {{ $name }}!</p>").unwrap();
        assert_eq!(
            body(&code),
            vec![
                "echo \"<p>\";",
                "echo $zRenderer->escapeText(\"Hello \" . $name . \"!\");",
                "echo \"</p>\";",
            ]
        );
    }

    #[test]
    fn test_dynamic_attribute() {
        let code = generate("<a href=\"/user/{{ $id }}\" title=\"$title\">x</a>").unwrap();
        assert_eq!(
            body(&code),
            vec![
                "echo \"<a href=\\\"\";",
                "echo $zRenderer->escapeProperty(\"/user/\" . $id);",
                "echo \"\\\" title=\\\"\";",
                "echo $zRenderer->escapeProperty($title);",
                "echo \"\\\">x</a>\";",
            ]
        );
    }

    #[test]
    fn test_static_attribute_escaped() {
        let code = generate("<input value=\"a &lt; b &quot;c&quot;\" checked disabled=\"{{ $off }}\" hidden>").unwrap();
        let lines = body(&code);
        assert_eq!(lines[0], "echo \"<input value=\\\"a &lt; b &quot;c&quot;\\\" checked disabled=\\\"\";");
        assert_eq!(lines[1], "echo $zRenderer->escapeProperty($off);");
        assert_eq!(lines[2], "echo \"\\\" hidden=\\\"\\\">\";");
    }

    #[test]
    fn test_if_else_blocks() {
        let code = generate("<div><z if=\"$show\"><b>Yes</b></z><z else>No</z></div>").unwrap();
        assert_eq!(
            body(&code),
            vec![
                "echo \"<div>\";",
                "if ($show) {",
                "echo \"<b>Yes</b>\";",
                "}",
                "else {",
                "echo \"No\";",
                "}",
                "echo \"</div>\";",
            ]
        );
        assert!(code.contains("    if ($show) {\n        echo \"<b>Yes</b>\";\n    }\n"));
    }

    #[test]
    fn test_for_each_block() {
        let code = generate("<z for-each=\"$item in $items\"><li>{{$item}}</li></z>").unwrap();
        assert_eq!(
            body(&code),
            vec![
                "foreach ($items as $item) {",
                "echo \"<li>\";",
                "echo $zRenderer->escapeText($item);",
                "echo \"</li>\";",
                "}",
            ]
        );
    }

    #[test]
    fn test_include_with_inner_content() {
        let code = generate("<z include=\"card.html\" title=\"{{ $t }}\" user=\"$user\" label=\"Hi\" wide><p>Body</p></z>").unwrap();
        assert_eq!(
            body(&code),
            vec![
                "ob_start();",
                "echo \"<p>Body</p>\";",
                "$zRenderer->render(\"card.html\", ['title' => $t, 'user' => $user, 'label' => \"Hi\", 'wide' => true], ob_get_clean());",
            ]
        );
    }

    #[test]
    fn test_include_without_children() {
        let code = generate("<hr><z include=\"{$theme}/footer.html\"/>").unwrap();
        assert_eq!(
            body(&code),
            vec![
                "echo \"<hr>\";",
                "$zRenderer->render(\"{$theme}/footer.html\", [], '');",
            ]
        );
    }

    #[test]
    fn test_render_slots() {
        let code = generate("<head><z render=\"stylesheets\"/></head><body><z render=\"innerHTML\"/><z render=\"scripts\"/></body>").unwrap();
        assert_eq!(
            body(&code),
            vec![
                "echo \"<head>\";",
                "$zRenderer->renderStylesheets();",
                "echo \"</head><body>\";",
                "echo $innerHTML;",
                "$zRenderer->renderScripts();",
                "echo \"</body>\";",
            ]
        );
    }

    #[test]
    fn test_raw_output() {
        let code = generate("<z raw=\"{{ $html }}\"/><z raw=\"<b>&quot;x&quot;</b>\"/>").unwrap();
        assert_eq!(
            body(&code),
            vec!["echo $html;", "echo \"<b>\\\"x\\\"</b>\";"]
        );
    }

    #[test]
    fn test_extract_property() {
        let code = generate("<div z-extract=\"$attrs\" id=\"main\"></div>").unwrap();
        assert_eq!(
            body(&code),
            vec![
                "echo \"<div\";",
                "foreach ($attrs as $zKey => $zValue) {",
                "echo \" \" . $zKey . \"=\\\"\" . $zRenderer->escapeProperty($zValue) . \"\\\"\";",
                "}",
                "echo \" id=\\\"main\\\"></div>\";",
            ]
        );
    }

    #[test]
    fn test_use_and_doctype() {
        let code = generate("<!DOCTYPE html><z use=\"App\\Models\\User\"/><html></html>").unwrap();
        assert!(code.starts_with("<?php\nuse App\\Models\\User;\nreturn function("));
        assert_eq!(body(&code), vec!["echo \"<!DOCTYPE html><html></html>\";"]);
    }

    #[test]
    fn test_null_property_omitted() {
        let template = Template {
            body: vec![DirectiveNode::Element {
                tag: "p".to_string(),
                properties: vec![("id", PropValue::Null), ("class", PropValue::Text("x".to_string()))]
                    .into_iter()
                    .collect(),
                children: Vec::new(),
                span: Span::default(),
            }],
            use_instructions: Vec::new(),
            doctype: None,
        };
        let code = generate_php_code(&template, "t.html", &CompilerOptions::default()).unwrap();
        assert_eq!(body(&code), vec!["echo \"<p class=\\\"x\\\"></p>\";"]);
    }

    #[test]
    fn test_self_closing_element_with_children() {
        let template = Template {
            body: vec![DirectiveNode::Element {
                tag: "br".to_string(),
                properties: Properties::new(),
                children: vec![DirectiveNode::Text { content: "x".to_string() }],
                span: Span::new(10, 2, 3),
            }],
            use_instructions: Vec::new(),
            doctype: None,
        };
        let err = generate_php_code(&template, "t.html", &CompilerOptions::default()).unwrap_err();
        assert!(err.is_structural());
        assert_eq!((err.line(), err.column()), (2, 3));
        assert_eq!(err.near(), "<br>");
    }

    #[test]
    fn test_flag_outside_boolean_set_gets_empty_value() {
        let code = generate("<div hidden><option selected=\"selected\">a</option></div>").unwrap();
        assert_eq!(
            body(&code),
            vec!["echo \"<div hidden=\\\"\\\"><option selected=\\\"selected\\\">a</option></div>\";"]
        );
    }

    #[test]
    fn test_custom_boolean_attributes() {
        let tree = parse_markup("<div hidden checked></div>", "t.html").unwrap();
        let template = transform_markup(&tree, "t.html").unwrap();
        let options = CompilerOptions {
            boolean_attributes: vec!["hidden".to_string()],
        };
        let code = generate_php_code(&template, "t.html", &options).unwrap();
        assert_eq!(body(&code), vec!["echo \"<div hidden checked=\\\"\\\"></div>\";"]);
    }

    #[test]
    fn test_newlines_in_literals() {
        let code = generate("<pre>a\r\nb</pre>").unwrap();
        assert_eq!(body(&code), vec!["echo \"<pre>a\\nb</pre>\";"]);
    }

    #[test]
    fn test_literal_buffer() {
        let mut buffer = LiteralBuffer::new();
        assert!(buffer.take_statement().is_none());

        buffer.push("<a>");
        buffer.push("$5");
        assert!(!buffer.is_empty());
        assert_eq!(buffer.take_statement().as_deref(), Some("echo \"<a>\\$5\";"));
        assert!(buffer.is_empty());
    }
}
