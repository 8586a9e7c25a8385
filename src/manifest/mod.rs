//! Project manifest (`package.json`) reading

use crate::error::{AppError, Result};
use crate::models::ModuleSet;
use anyhow::Context;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::path::Path;

/// The parts of a `package.json` that declare dependencies.
///
/// Keys keep their file order, which becomes the discovery order of the
/// module set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dependencies: Map<String, Value>,
    #[serde(default, rename = "devDependencies", deserialize_with = "null_as_empty")]
    pub dev_dependencies: Map<String, Value>,
}

impl Manifest {
    /// Read `<project_dir>/package.json`
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(crate::defaults::MANIFEST_FILE);
        read_manifest(&path).map_err(|e| AppError::manifest(format!("{:#}", e)))
    }

    /// Parse manifest text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| AppError::manifest(e.to_string()))
    }

    /// Deduplicated module names: dependencies first, then devDependencies
    /// when requested. Type-declaration packages are skipped.
    pub fn module_names(&self, include_dev: bool) -> ModuleSet {
        let dev = if include_dev {
            Some(self.dev_dependencies.keys())
        } else {
            None
        };

        self.dependencies
            .keys()
            .chain(dev.into_iter().flatten())
            .filter(|name| !is_type_declaration(name))
            .cloned()
            .collect()
    }
}

fn read_manifest(path: &Path) -> anyhow::Result<Manifest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let manifest = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(manifest)
}

/// A section explicitly set to `null` declares nothing
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_type_declaration(name: &str) -> bool {
    name.starts_with(crate::defaults::TYPES_SCOPE_PREFIX)
}
