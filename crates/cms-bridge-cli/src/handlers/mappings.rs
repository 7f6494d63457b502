//! Identifier mapping command handlers

use super::{load_mapper, save_mapper};
use crate::cli::{MappingsAction, MappingsArgs, OutputFormat};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use cms_bridge_core::IdMapping;

/// Handle the mappings command
pub fn handle_mappings(args: MappingsArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let path = args
        .mappings
        .or_else(|| config.mappings.file.clone())
        .ok_or_else(|| {
            Error::invalid_args("no mapping file: pass --mappings or set mappings.file in the config")
        })?;

    if !path.exists() {
        output.warning(&format!("{} does not exist yet; the registry is empty", path.display()))?;
    }
    let mut mapper = load_mapper(Some(path.as_path()))?;

    match args.action {
        MappingsAction::Stats => output.mapping_stats(&mapper.stats()),
        MappingsAction::List(filter) => {
            let mappings: Vec<IdMapping> = match &filter.resource_type {
                Some(resource_type) => mapper.mappings_for(resource_type).into_iter().cloned().collect(),
                None => mapper.export().into_iter().map(|entry| entry.mapping).collect(),
            };
            list_mappings(&mappings, output)
        }
        MappingsAction::Clear(filter) => {
            let removed = match &filter.resource_type {
                Some(resource_type) => mapper.clear_resource_type(resource_type),
                None => {
                    let count = mapper.len();
                    mapper.clear();
                    count
                }
            };
            save_mapper(&mapper, &path)?;
            output.success(&format!("✓ Removed {} mapping(s) from {}", removed, path.display()))
        }
    }
}

fn list_mappings(mappings: &[IdMapping], output: &mut OutputWriter) -> Result<()> {
    if output.format() != OutputFormat::Human {
        return output.data(&mappings);
    }

    if mappings.is_empty() {
        return output.info("No mappings");
    }

    let rows = mappings
        .iter()
        .map(|mapping| {
            vec![
                mapping.resource_type.clone(),
                mapping.legacy_id.to_string(),
                mapping.modern_id.clone(),
                mapping.created_at.to_rfc3339(),
            ]
        })
        .collect();
    output.table(&["Type", "Legacy id", "Document id", "Created"], rows)
}
