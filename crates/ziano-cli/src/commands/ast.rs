// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! AST command: prints the transformed directive tree as JSON.

use std::path::Path;

use ziano::compile_template;

use super::{diagnostic, read_template};

/// Parses and transforms `path`, returning the template as pretty JSON.
pub fn render(path: &Path) -> anyhow::Result<String> {
    let (source, filename) = read_template(path)?;
    let template = compile_template(&source, &filename).map_err(|e| diagnostic(&e, &source))?;
    Ok(serde_json::to_string_pretty(&template)?)
}

/// Runs the ast command.
pub fn run(path: &Path) -> anyhow::Result<()> {
    println!("{}", render(path)?);
    Ok(())
}
