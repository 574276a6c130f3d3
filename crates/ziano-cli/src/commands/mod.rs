// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `compile`: Compile one template to PHP
//! - `check`: Report template errors without writing output
//! - `build`: Compile every template under the source directory
//! - `ast`: Print the directive AST as JSON

use std::fs;
use std::path::Path;

use ziano::CompileError;

/// Directive AST dump command.
pub mod ast;
/// Project build command.
pub mod build;
/// Template validation command.
pub mod check;
/// Single template compile command.
pub mod compile;

/// Reads a template and returns its contents with the display name
/// used in error positions.
pub(crate) fn read_template(path: &Path) -> anyhow::Result<(String, String)> {
    let source = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    Ok((source, path.display().to_string()))
}

/// Turns a compile error into an `anyhow` error carrying the source excerpt.
pub(crate) fn diagnostic(err: &CompileError, source: &str) -> anyhow::Error {
    anyhow::anyhow!("{}", err.with_source(source))
}
