//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; this module holds the file
//! plumbing they share: payload loading and saving, and persistence of the
//! identifier registry between runs.

mod completions;
mod config;
mod detect;
mod mappings;
mod transform;
mod validate;

pub use completions::handle_completions;
pub use config::handle_config;
pub use detect::handle_detect;
pub use mappings::handle_mappings;
pub use transform::handle_transform;
pub use validate::handle_validate;

use crate::error::{Error, Result};
use cms_bridge_core::IdMapper;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Read a JSON or YAML document, choosing the parser by extension
pub(crate) fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;

    let (parsed, expected) = if is_yaml(path) {
        (serde_yaml::from_str(&content).map_err(|e| e.to_string()), "YAML")
    } else {
        (serde_json::from_str(&content).map_err(|e| e.to_string()), "JSON")
    };

    parsed.map_err(|reason| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: expected.to_string(),
        reason,
    })
}

/// Write a document as YAML or pretty JSON, choosing by extension
pub(crate) fn write_document(path: &Path, value: &Value) -> Result<()> {
    let content = if is_yaml(path) {
        serde_yaml::to_string(value)?
    } else {
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');
        json
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Registry seeded from `path`; a missing file yields an empty registry
pub(crate) fn load_mapper(path: Option<&Path>) -> Result<IdMapper> {
    let mut mapper = IdMapper::new();

    if let Some(path) = path.filter(|p| p.exists()) {
        let content = fs::read_to_string(path)?;
        let loaded = mapper.import_json(&content)?;
        debug!(path = %path.display(), mappings = loaded, "Loaded id mappings");
    }

    Ok(mapper)
}

/// Persist the registry as an export document
pub(crate) fn save_mapper(mapper: &IdMapper, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, mapper.export_json()?)?;
    debug!(path = %path.display(), mappings = mapper.len(), "Saved id mappings");
    Ok(())
}
