// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Compile command for a single template.

use std::fs;
use std::path::Path;

use ziano::{compile_with_options, CompilerOptions};

use super::{diagnostic, read_template};

/// Compiles `path` and returns the generated PHP code.
pub fn compile_file(path: &Path, options: &CompilerOptions) -> anyhow::Result<String> {
    let (source, filename) = read_template(path)?;
    compile_with_options(&source, &filename, options).map_err(|e| diagnostic(&e, &source))
}

/// Runs the compile command, writing to `output` or stdout.
pub fn run(path: &Path, output: Option<&Path>, options: &CompilerOptions) -> anyhow::Result<()> {
    let code = compile_file(path, options)?;

    match output {
        Some(output) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(output, code)?;
            tracing::info!("Compiled {} -> {}", path.display(), output.display());
        }
        None => print!("{}", code),
    }

    Ok(())
}
