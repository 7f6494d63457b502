//! Configuration management for the CLI
//!
//! Configuration is read from the first of:
//! - the file given by `--config` / `CMS_BRIDGE_CONFIG`
//! - `.cms-bridge.toml`, `.cms-bridge.yaml` or `.cms-bridge.json` in the working directory
//! - `<config_dir>/cms-bridge/config.toml`
//!
//! Missing files yield defaults; every section and field is optional.

use crate::error::{Error, Result};
use cms_bridge_core::{TransformOptions, ValidationOptions, DEFAULT_CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the project configuration written by `config init`
pub const PROJECT_CONFIG_FILE: &str = ".cms-bridge.toml";

const PROJECT_CONFIG_CANDIDATES: [&str; 4] = [
    ".cms-bridge.toml",
    ".cms-bridge.yaml",
    ".cms-bridge.yml",
    ".cms-bridge.json",
];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for `transform`
    pub transform: TransformConfig,

    /// Defaults for `validate`
    pub validation: ValidationOptions,

    /// Identity mapping persistence
    pub mappings: MappingsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Transformation defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Resource type used when `--content-type` is not given
    pub content_type: String,

    /// Keep the legacy `id` on modern output
    pub preserve_original_id: bool,

    /// Validate every result against its target format
    pub validate_result: bool,
}

/// Where identity mappings are persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingsConfig {
    /// Path of the mapping export; `None` keeps mappings in memory only
    pub file: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format used when `--output` is not given
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (compact, full, json)
    pub format: String,

    /// Log file path
    pub file: Option<PathBuf>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            preserve_original_id: true,
            validate_result: false,
        }
    }
}

impl TransformConfig {
    /// Core options seeded from these defaults
    pub fn to_options(&self) -> TransformOptions {
        TransformOptions {
            content_type: self.content_type.clone(),
            preserve_original_id: self.preserve_original_id,
            validate_result: self.validate_result,
            ..TransformOptions::default()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            file: None,
        }
    }
}

/// Serialization flavor of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Toml,
    Yaml,
    Json,
}

impl FileKind {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::config(format!(
                "Unsupported config file extension: {} (expected .toml, .yaml or .json)",
                path.display()
            ))),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }
}

impl Config {
    /// Load configuration from a file, choosing the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let kind = FileKind::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let parsed = match kind {
            FileKind::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
            FileKind::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            FileKind::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|reason| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: kind.name().to_string(),
            reason,
        })
    }

    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        match Self::discover(&cwd, dirs::config_dir().as_deref()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file or the default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// First existing configuration file, project files before the user file
    pub fn discover(project_dir: &Path, config_dir: Option<&Path>) -> Option<PathBuf> {
        PROJECT_CONFIG_CANDIDATES
            .iter()
            .map(|name| project_dir.join(name))
            .chain(config_dir.map(Self::user_config_in))
            .find(|path| path.is_file())
    }

    /// Path of the user configuration file, if a config directory exists
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| Self::user_config_in(&dir))
    }

    fn user_config_in(config_dir: &Path) -> PathBuf {
        config_dir.join("cms-bridge").join("config.toml")
    }

    /// Render the configuration in the format implied by `path`
    pub fn render_for(&self, path: &Path) -> Result<String> {
        Ok(match FileKind::of(path)? {
            FileKind::Toml => toml::to_string_pretty(self)?,
            FileKind::Yaml => serde_yaml::to_string(self)?,
            FileKind::Json => serde_json::to_string_pretty(self)?,
        })
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render_for(path)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write a default configuration to `path` unless one exists
    pub fn init(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(Error::config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        Self::default().save(path)
    }
}
