// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! Ziano CLI library.
//!
//! Command implementations behind the `ziano` binary, which compiles
//! z-directive HTML templates into PHP render functions.
//!
//! # Usage
//!
//! ```bash
//! ziano compile page.html -o page.php   # Compile one template
//! ziano check templates/*.html          # Report errors only
//! ziano build                           # Compile the whole project
//! ziano ast page.html                   # Dump the directive AST
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `ziano.toml` at the project root.

/// CLI commands (compile, check, build, ast).
pub mod commands;
/// Project configuration from `ziano.toml`.
pub mod config;
