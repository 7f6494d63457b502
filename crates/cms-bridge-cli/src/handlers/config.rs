//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs};
use crate::config::{Config, PROJECT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::PathBuf;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => {
            let rendered = match show_args.format {
                ConfigFormat::Toml => toml::to_string_pretty(config)?,
                ConfigFormat::Json => serde_json::to_string_pretty(config)?,
                ConfigFormat::Yaml => serde_yaml::to_string(config)?,
            };
            output.writeln(rendered.trim_end())
        }
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
    }
}

fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = if args.user {
        Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?
    } else {
        args.path.unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE))
    };

    Config::init(&path, args.force)?;
    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Edit it to change transform, validation and mapping defaults.")
}
