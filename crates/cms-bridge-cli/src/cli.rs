//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use cms_bridge_core::Format;
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// cms-bridge - convert CMS payloads between the legacy (v4) and modern (v5) shapes
///
/// Detects which item convention a JSON or YAML payload uses, validates it
/// against that convention, and converts items, relations, media and response
/// envelopes in either direction while keeping identifier mappings stable
/// across runs.
#[derive(Parser, Debug)]
#[command(
    name = "cms-bridge",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CMS_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: from config, else human]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the item convention of a payload
    Detect(DetectArgs),

    /// Validate a payload against a format or an attribute schema
    Validate(ValidateArgs),

    /// Convert a payload between formats
    Transform(TransformArgs),

    /// Inspect or prune persisted identifier mappings
    Mappings(MappingsArgs),

    /// Manage configuration files
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the detect command
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Payload file (JSON or YAML)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Payload file (JSON or YAML)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Format the payload must conform to
    #[arg(short, long, value_enum)]
    pub format: FormatArg,

    /// Reject flat legacy items and unmarked modern items
    #[arg(long)]
    pub strict: bool,

    /// Accept items of the other format
    #[arg(long)]
    pub allow_mixed: bool,

    /// Skip relation checks
    #[arg(long)]
    pub no_relations: bool,

    /// Maximum relation nesting to validate
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Treat the payload as a `{ data, meta }` response envelope
    #[arg(long, conflicts_with = "schema")]
    pub response: bool,

    /// Validate attributes against a schema file instead
    #[arg(long, value_name = "SCHEMA_FILE")]
    pub schema: Option<PathBuf>,

    /// Skip required-field checks (update payloads)
    #[arg(long, requires = "schema")]
    pub partial: bool,
}

/// Arguments for the transform command
#[derive(Parser, Debug)]
pub struct TransformArgs {
    /// Payload file (JSON or YAML)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Target format
    #[arg(short, long, value_enum)]
    pub to: TargetFormat,

    /// Source format [default: detected]
    #[arg(short, long, value_enum)]
    pub from: Option<FormatArg>,

    /// Resource type used for identifier mappings
    #[arg(long, value_name = "TYPE")]
    pub content_type: Option<String>,

    /// Treat the payload as a `{ data, meta }` response envelope
    #[arg(long, conflicts_with = "batch")]
    pub response: bool,

    /// Require the payload to be an array and convert it item by item
    #[arg(long)]
    pub batch: bool,

    /// Drop the legacy `id` from modern output
    #[arg(long)]
    pub no_preserve_id: bool,

    /// Validate the result against the target format
    #[arg(long)]
    pub validate_result: bool,

    /// Report timing and conversion counters
    #[arg(long, conflicts_with_all = ["response", "batch"])]
    pub metrics: bool,

    /// Identifier mapping file to load before and save after the run
    #[arg(long, value_name = "FILE")]
    pub mappings: Option<PathBuf>,

    /// Write the converted payload to a file instead of stdout
    #[arg(long = "save-to", value_name = "FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the mappings command
#[derive(Parser, Debug)]
pub struct MappingsArgs {
    /// Identifier mapping file [default: from config]
    #[arg(long, global = true, value_name = "FILE")]
    pub mappings: Option<PathBuf>,

    #[command(subcommand)]
    pub action: MappingsAction,
}

/// Mapping registry actions
#[derive(Subcommand, Debug)]
pub enum MappingsAction {
    /// Show registry statistics
    Stats,

    /// List mappings
    List(ResourceFilter),

    /// Remove mappings, optionally for one resource type only
    Clear(ResourceFilter),
}

/// Optional resource type filter
#[derive(Parser, Debug)]
pub struct ResourceFilter {
    /// Only this resource type
    #[arg(long, value_name = "TYPE")]
    pub resource_type: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show(ConfigShowArgs),

    /// Write a default configuration file
    Init(ConfigInitArgs),
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Serialization format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Destination [default: .cms-bridge.toml]
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Write to the user config directory instead
    #[arg(long, conflicts_with = "path")]
    pub user: bool,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// A payload format on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    #[value(alias = "v4")]
    Legacy,
    #[value(alias = "v5")]
    Modern,
    Mixed,
    Unknown,
}

/// A format payloads can be converted to
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    #[value(alias = "v4")]
    Legacy,
    #[value(alias = "v5")]
    Modern,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<FormatArg> for Format {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Legacy => Format::Legacy,
            FormatArg::Modern => Format::Modern,
            FormatArg::Mixed => Format::Mixed,
            FormatArg::Unknown => Format::Unknown,
        }
    }
}

impl From<TargetFormat> for Format {
    fn from(format: TargetFormat) -> Self {
        match format {
            TargetFormat::Legacy => Format::Legacy,
            TargetFormat::Modern => Format::Modern,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["cms-bridge", "-vv", "detect", "payload.json"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["cms-bridge", "--quiet", "detect", "payload.json"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_validate_args() {
        let cli = Cli::parse_from([
            "cms-bridge",
            "validate",
            "payload.json",
            "--format",
            "v4",
            "--strict",
            "--no-relations",
            "--max-depth",
            "2",
        ]);

        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(Format::from(args.format), Format::Legacy);
        assert!(args.strict);
        assert!(args.no_relations);
        assert_eq!(args.max_depth, Some(2));
        assert!(args.schema.is_none());
    }

    #[test]
    fn test_transform_args() {
        let cli = Cli::parse_from([
            "cms-bridge",
            "-o",
            "json",
            "transform",
            "page.json",
            "--to",
            "modern",
            "--content-type",
            "article",
            "--response",
            "--mappings",
            "ids.json",
        ]);

        assert_eq!(cli.output, Some(OutputFormat::Json));
        let Commands::Transform(args) = cli.command else {
            panic!("expected transform");
        };
        assert_eq!(Format::from(args.to), Format::Modern);
        assert!(args.from.is_none());
        assert_eq!(args.content_type.as_deref(), Some("article"));
        assert!(args.response);
        assert_eq!(args.mappings, Some(PathBuf::from("ids.json")));
    }

    #[test]
    fn test_conflicting_transform_modes_are_rejected() {
        let result = Cli::try_parse_from([
            "cms-bridge", "transform", "p.json", "--to", "legacy", "--response", "--batch",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "cms-bridge", "transform", "p.json", "--to", "mixed",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mappings_args() {
        let cli = Cli::parse_from([
            "cms-bridge",
            "mappings",
            "clear",
            "--resource-type",
            "article",
            "--mappings",
            "ids.json",
        ]);

        let Commands::Mappings(args) = cli.command else {
            panic!("expected mappings");
        };
        assert_eq!(args.mappings, Some(PathBuf::from("ids.json")));
        match args.action {
            MappingsAction::Clear(filter) => {
                assert_eq!(filter.resource_type.as_deref(), Some("article"))
            }
            other => panic!("unexpected action {:?}", other),
        }
    }
}
