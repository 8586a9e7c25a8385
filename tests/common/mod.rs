//! Fixture projects shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Module that spins for at least 20ms when loaded, timed with the
/// monotonic nanosecond clock
pub const SLOW_CJS: &str = "const end = process.hrtime.bigint() + 20000000n\nwhile (process.hrtime.bigint() < end) {}\nmodule.exports = { slow: true }\n";

pub const FAST_CJS: &str = "module.exports = { answer: 42 }\n";

pub const THROWING: &str = "throw new Error('kaboom')\n";

pub const NOISY_CJS: &str = "console.log('hello from module')\nmodule.exports = 1\n";

pub const ESM: &str = "export const value = 1\n";

pub const HANGING: &str = "for (;;) {}\n";

/// Whether a `node` binary is on PATH
pub fn node_available() -> bool {
    Command::new("node")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Skip the calling test when node is not installed
#[macro_export]
macro_rules! require_node {
    () => {
        if !common::node_available() {
            eprintln!("skipping: node is not installed");
            return;
        }
    };
}

/// A project directory with a package.json and packages under node_modules
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new(manifest: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), manifest).unwrap();
        Self { dir }
    }

    /// Project whose dependencies are exactly `names`
    pub fn with_dependencies(names: &[&str]) -> Self {
        let deps: Vec<String> = names.iter().map(|n| format!("\"{}\": \"1.0.0\"", n)).collect();
        Self::new(&format!("{{\"name\": \"fixture\", \"dependencies\": {{{}}}}}", deps.join(", ")))
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a CommonJS package with the given index.js
    pub fn cjs_package(self, name: &str, source: &str) -> Self {
        self.package(name, &format!("{{\"name\": \"{}\", \"main\": \"index.js\"}}", name), source)
    }

    /// Add a package declaring `"type": "module"`
    pub fn esm_package(self, name: &str, source: &str) -> Self {
        self.package(
            name,
            &format!(
                "{{\"name\": \"{}\", \"type\": \"module\", \"exports\": \"./index.js\"}}",
                name
            ),
            source,
        )
    }

    fn package(self, name: &str, manifest: &str, source: &str) -> Self {
        let root = self.dir.path().join("node_modules").join(name);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("package.json"), manifest).unwrap();
        fs::write(root.join("index.js"), source).unwrap();
        self
    }
}
