//! cms-bridge CLI - command-line host for the legacy/modern payload bridge
//!
//! Reads payload files, runs detection, validation and transformation from
//! `cms-bridge-core`, and persists identifier mappings between runs.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use clap::ValueEnum;
use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::{Error, Result};
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e, !cli.no_color),
    };

    let use_color = cli.use_color() && config.output.color;
    control::set_override(use_color);

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli, config) {
        Ok(()) => process::exit(0),
        Err(e) => exit_with(&e, use_color),
    }
}

fn exit_with(e: &Error, use_color: bool) -> ! {
    eprintln!("{}", error::format_error(e, use_color));

    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }

    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = resolve_output_format(cli.output, &config)?;
    let mut output = OutputWriter::new(
        format,
        control::SHOULD_COLORIZE.should_colorize(),
        cli.quiet,
    );

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Detect(args) => handlers::handle_detect(args, &mut output),
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output),
        Commands::Transform(args) => handlers::handle_transform(args, &config, &mut output),
        Commands::Mappings(args) => handlers::handle_mappings(args, &config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// `--output` when given, otherwise the configured default
fn resolve_output_format(flag: Option<OutputFormat>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(format) => Ok(format),
        None => OutputFormat::from_str(&config.output.format, true).map_err(|_| {
            Error::config(format!(
                "Invalid output format '{}' (expected human, json, json-pretty or yaml)",
                config.output.format
            ))
        }),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::resolve(cli.verbosity_level(), &config.logging)?;
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
