// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # ziano
//!
//! Compiler for HTML-flavored templates with `<z>` directives.
//!
//! A template is plain markup plus a reserved `z` element for control flow
//! (`if`, `else-if`, `else`, `for-each`), inclusion (`include`), render slots
//! (`render`), unescaped output (`raw`) and imports (`use`). Values may
//! interpolate host expressions with `{{ ... }}`.
//!
//! Compiling resolves all control flow once and produces the source of a PHP
//! function `function($zRenderer, $zProps, $innerHTML = '')` that writes the
//! final markup when invoked.
//!
//! ## Pipeline
//!
//! 1. [`parse_markup`]: template text → [`MarkupTree`]
//! 2. [`transform_markup`]: markup tree → [`Template`] (directive AST)
//! 3. [`generate_php_code`]: directive AST → PHP source
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ziano::compile;
//!
//! let php = compile("<p>Hello {{ $name }}</p>", "hello.html")?;
//! assert!(php.contains("$zRenderer->escapeText(\"Hello \" . $name)"));
//! ```
//!
//! Compilation is a pure function of its inputs: the same source and
//! filename always produce byte-identical code, and no state is shared
//! between calls.

/// Markup tree types produced by the parser.
pub mod ast;
/// Markup parser.
pub mod parser;
/// Markup tree to directive AST transformation.
pub mod transform;
/// PHP code generation.
pub mod codegen;
/// Expression detection and escaping helpers.
pub mod escape;
/// Compiler options.
pub mod options;
/// Error types and reporting.
pub mod error;

pub use ast::*;
pub use parser::parse_markup;
pub use transform::*;
pub use codegen::*;
pub use options::*;
pub use error::*;

/// Compiles template source into PHP with default options.
///
/// # Errors
///
/// Returns the first [`CompileError`] hit by any stage.
pub fn compile(source: &str, filename: &str) -> Result<String> {
    compile_with_options(source, filename, &CompilerOptions::default())
}

/// Compiles template source into PHP.
///
/// # Errors
///
/// Returns the first [`CompileError`] hit by any stage.
pub fn compile_with_options(source: &str, filename: &str, options: &CompilerOptions) -> Result<String> {
    let template = compile_template(source, filename)?;
    generate_php_code(&template, filename, options)
}

/// Runs the parse and transform stages only.
///
/// # Errors
///
/// Returns the first [`CompileError`] hit by either stage.
pub fn compile_template(source: &str, filename: &str) -> Result<Template> {
    let tree = parse_markup(source, filename)?;
    transform_markup(&tree, filename)
}
