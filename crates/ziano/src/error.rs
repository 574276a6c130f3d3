// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the ziano template compiler.
//!
//! Every stage of the pipeline reports failures through [`CompileError`].
//! A compile either succeeds or fails atomically with one of these; no
//! partial tree or partial code is ever handed back.
//!
//! # Error Categories
//!
//! - **Syntax errors**: malformed markup (unterminated tag, property,
//!   comment or doctype, mismatched closing tag)
//! - **Structural errors**: well-formed markup that violates a template rule
//!   (self-closing tag with children, `else` without `if`, unknown render slot)
//!
//! # Source Context
//!
//! [`CompileError::with_source`] pairs an error with the template text and
//! renders a [`SourceContext`] excerpt with a caret under the failing column.

use std::fmt;
use thiserror::Error;

/// Source context for enhanced error messages.
///
/// Captures a snippet of source code around an error location,
/// enabling rich error messages with line numbers and visual indicators.
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// All lines from the source file.
    pub lines: Vec<String>,
    /// The line number where the error occurred (1-indexed).
    pub error_line: usize,
    /// The column number where the error occurred (1-indexed).
    pub error_column: usize,
    /// First line number of the snippet (1-indexed).
    pub snippet_start: usize,
    /// Last line number of the snippet (1-indexed).
    pub snippet_end: usize,
}

impl SourceContext {
    /// Creates a source context from source code and error location.
    ///
    /// Captures 3 lines before and after the error line for context.
    pub fn from_source(source: &str, line: usize, column: usize) -> Self {
        let lines: Vec<String> = source.lines().map(|l| l.to_string()).collect();
        let snippet_start = line.saturating_sub(3).max(1);
        let snippet_end = (line + 3).min(lines.len());

        Self {
            lines,
            error_line: line,
            error_column: column,
            snippet_start,
            snippet_end,
        }
    }

    /// Formats the source snippet with line numbers and error indicator.
    ///
    /// ```text
    ///    4 | <ul>
    ///    5 |   <z else>No</z>
    ///      |   ^
    ///    6 | </ul>
    /// ```
    pub fn format_snippet(&self) -> String {
        let mut result = String::new();

        for line_num in self.snippet_start..=self.snippet_end {
            if line_num == 0 || line_num > self.lines.len() {
                break;
            }

            let line = &self.lines[line_num - 1];
            result.push_str(&format!("{:4} | {}\n", line_num, line));

            if line_num == self.error_line {
                result.push_str(&format!(
                    "     | {}^\n",
                    " ".repeat(self.error_column.saturating_sub(1))
                ));
            }
        }

        result
    }
}

impl fmt::Display for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_snippet())
    }
}

/// The error type for every compile failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The markup could not be scanned.
    #[error("Syntax error: {message}, at {file}:{line}:{column}, near {near:?}")]
    SyntaxError {
        /// Description of the problem.
        message: String,
        /// Template filename as passed to the compiler.
        file: String,
        /// 1-indexed line of the construct that failed.
        line: usize,
        /// 1-indexed column of the construct that failed.
        column: usize,
        /// Upcoming characters at the failure offset.
        near: String,
    },

    /// The markup is well-formed but breaks a template rule.
    #[error("Structural error: {message}, at {file}:{line}:{column}, near {near:?}")]
    StructuralError {
        /// Description of the problem.
        message: String,
        /// Template filename as passed to the compiler.
        file: String,
        /// 1-indexed line of the offending node.
        line: usize,
        /// 1-indexed column of the offending node.
        column: usize,
        /// The offending construct as written, e.g. `<z else>`.
        near: String,
    },
}

impl CompileError {
    /// Builds a structural error anchored at `span`.
    pub fn structural(
        message: impl Into<String>,
        file: &str,
        span: crate::ast::Span,
        near: impl Into<String>,
    ) -> Self {
        CompileError::StructuralError {
            message: message.into(),
            file: file.to_string(),
            line: span.line,
            column: span.column,
            near: near.into(),
        }
    }

    /// The bare message without location.
    pub fn message(&self) -> &str {
        match self {
            CompileError::SyntaxError { message, .. } | CompileError::StructuralError { message, .. } => message,
        }
    }

    /// The template filename.
    pub fn file(&self) -> &str {
        match self {
            CompileError::SyntaxError { file, .. } | CompileError::StructuralError { file, .. } => file,
        }
    }

    /// 1-indexed line of the failure.
    pub fn line(&self) -> usize {
        match self {
            CompileError::SyntaxError { line, .. } | CompileError::StructuralError { line, .. } => *line,
        }
    }

    /// 1-indexed column of the failure.
    pub fn column(&self) -> usize {
        match self {
            CompileError::SyntaxError { column, .. } | CompileError::StructuralError { column, .. } => *column,
        }
    }

    /// Context snippet at the failure: upcoming source text for syntax
    /// errors, the offending construct for structural ones.
    pub fn near(&self) -> &str {
        match self {
            CompileError::SyntaxError { near, .. } | CompileError::StructuralError { near, .. } => near,
        }
    }

    /// Returns true for [`CompileError::StructuralError`].
    pub fn is_structural(&self) -> bool {
        matches!(self, CompileError::StructuralError { .. })
    }

    /// Pairs the error with the template source for display.
    pub fn with_source<'a>(&'a self, source: &str) -> Diagnostic<'a> {
        Diagnostic {
            error: self,
            context: SourceContext::from_source(source, self.line(), self.column()),
        }
    }
}

/// A [`CompileError`] displayed together with its source excerpt.
pub struct Diagnostic<'a> {
    error: &'a CompileError,
    context: SourceContext,
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;
        write!(f, "{}", self.context)
    }
}

/// Convenience type alias for Results with [`CompileError`].
pub type Result<T> = std::result::Result<T, CompileError>;
