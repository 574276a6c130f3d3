// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Compiler options.

use crate::escape::DEFAULT_BOOLEAN_ATTRIBUTES;
use serde::{Deserialize, Serialize};

/// Reserved tag name for directives.
pub const DIRECTIVE_TAG: &str = "z";

/// Element property whose value is a mapping spread into attributes.
pub const EXTRACT_PROPERTY: &str = "z-extract";

/// Deepest element nesting a template may use. Deeper markup is rejected
/// by the parser so the recursive transform and codegen passes stay within
/// a thread's default stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Settings that influence code generation.
///
/// Deserializable so the CLI can read it from the `[compiler]` table of
/// `ziano.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Attributes rendered without a value when written as a flag.
    pub boolean_attributes: Vec<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            boolean_attributes: DEFAULT_BOOLEAN_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CompilerOptions {
    /// Returns true if `name` is in the boolean attribute set.
    pub fn is_boolean_attribute(&self, name: &str) -> bool {
        self.boolean_attributes.iter().any(|a| a == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_boolean_attributes() {
        let options = CompilerOptions::default();
        assert!(options.is_boolean_attribute("checked"));
        assert!(options.is_boolean_attribute("selected"));
        assert!(options.is_boolean_attribute("disabled"));
        assert!(!options.is_boolean_attribute("hidden"));
    }

    #[test]
    fn test_custom_boolean_attributes() {
        let options = CompilerOptions {
            boolean_attributes: vec!["hidden".to_string()],
        };
        assert!(options.is_boolean_attribute("hidden"));
        assert!(!options.is_boolean_attribute("checked"));
    }
}
