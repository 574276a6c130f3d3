// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Build command for compiling every template of a project.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use console::style;

use crate::config::Config;

use super::compile::compile_file;

/// Outcome of a build run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Files written to the output directory.
    pub written: Vec<PathBuf>,
    /// Number of templates that failed to compile.
    pub failed: usize,
}

/// Runs the build command. `source` and `output` override the directories
/// from the configuration.
///
/// A template that fails to compile is reported and skipped; the remaining
/// templates are still built.
pub fn run(config: &Config, source: Option<&str>, output: Option<&str>) -> anyhow::Result<BuildReport> {
    let start = Instant::now();
    let source_dir = source.unwrap_or(&config.build.source_dir);
    let output_dir = Path::new(output.unwrap_or(&config.build.output_dir));
    let source_root = normalize_dir(source_dir);

    println!(
        "{} {}",
        style("Building templates from:").cyan(),
        source_dir
    );

    let base = if source_root.as_os_str().is_empty() {
        Path::new(".")
    } else {
        source_root.as_path()
    };
    let pattern = format!("{}/**/*.{}", base.display(), config.build.extension);
    let mut sources: Vec<PathBuf> = glob::glob(&pattern)?.flatten().collect();
    sources.sort();

    let mut report = BuildReport::default();
    if sources.is_empty() {
        println!("No templates found in {}", source_dir);
        return Ok(report);
    }

    fs::create_dir_all(output_dir)?;

    for path in &sources {
        let Ok(relative) = path.strip_prefix(&source_root) else {
            report.failed += 1;
            eprintln!(
                "{} {} is not inside {}",
                style("error").red().bold(),
                path.display(),
                source_dir
            );
            continue;
        };
        let target = output_dir.join(format!("{}.php", relative.display()));

        match compile_file(path, &config.compiler) {
            Ok(code) => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, code)?;
                tracing::debug!("Wrote {}", target.display());
                report.written.push(target);
            }
            Err(e) => {
                report.failed += 1;
                eprintln!("{} {}\n{}", style("error").red().bold(), path.display(), e);
            }
        }
    }

    println!(
        "{} {} template(s) to {} in {:.2?}",
        style("Compiled").green(),
        report.written.len(),
        output_dir.display(),
        start.elapsed()
    );

    Ok(report)
}

/// Drops `.` components so the directory compares equal to the paths glob
/// returns (`./templates/a.html` comes back as `templates/a.html`).
fn normalize_dir(dir: &str) -> PathBuf {
    Path::new(dir)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
