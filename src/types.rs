//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Module-system kind a package declares through its exported `type` marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Loadable with a synchronous `require`
    CommonJs,
    /// ES module; needs a dynamic `import()` in a fresh process
    Module,
}

/// How a single timed load is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadStrategy {
    /// Timed `require` inside the long-lived host runtime
    InProcess,
    /// Timed `import()` inside a one-shot worker process
    Isolated,
}

impl LoadStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStrategy::InProcess => "in-process",
            LoadStrategy::Isolated => "isolated",
        }
    }
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
