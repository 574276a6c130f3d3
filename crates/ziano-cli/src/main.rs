// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use ziano_cli::commands;
use ziano_cli::config::Config;

#[derive(Parser)]
#[command(name = "ziano")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Compile z-directive HTML templates to PHP", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a single template to PHP
    Compile {
        /// Template file
        file: PathBuf,
        /// Write the generated code here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse and transform templates without writing output
    Check {
        /// Template files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Compile every template of the project
    Build {
        /// Source directory (overrides ziano.toml)
        #[arg(short, long)]
        source: Option<String>,
        /// Output directory (overrides ziano.toml)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the directive AST of a template as JSON
    Ast {
        /// Template file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Compile { file, output } => {
            commands::compile::run(&file, output.as_deref(), &config.compiler)
        }
        Commands::Check { files } => {
            commands::check::run(&files, &config.compiler)
        }
        Commands::Build { source, output } => {
            let report = commands::build::run(&config, source.as_deref(), output.as_deref())?;
            if report.failed > 0 {
                anyhow::bail!("{} template(s) failed to compile", report.failed);
            }
            Ok(())
        }
        Commands::Ast { file } => {
            commands::ast::run(&file)
        }
    }
}
