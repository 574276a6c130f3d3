// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Check command: compiles templates and reports errors without writing output.

use std::path::{Path, PathBuf};

use console::style;
use ziano::{compile_with_options, CompilerOptions};

use super::{diagnostic, read_template};

/// Compiles `path` and discards the output.
pub fn check_file(path: &Path, options: &CompilerOptions) -> anyhow::Result<()> {
    let (source, filename) = read_template(path)?;
    compile_with_options(&source, &filename, options)
        .map(|_| ())
        .map_err(|e| diagnostic(&e, &source))
}

/// Runs the check command over every file; fails if any template has errors.
pub fn run(files: &[PathBuf], options: &CompilerOptions) -> anyhow::Result<()> {
    let mut failed = 0;

    for path in files {
        match check_file(path, options) {
            Ok(()) => println!("{} {}", style("ok").green(), path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}\n{}", style("error").red().bold(), path.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} template(s) have errors", failed, files.len());
    }
    Ok(())
}
