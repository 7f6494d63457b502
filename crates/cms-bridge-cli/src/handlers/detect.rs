//! Detect command handler

use super::read_document;
use crate::cli::DetectArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use cms_bridge_core::format_statistics;
use tracing::info;

/// Handle the detect command
pub fn handle_detect(args: DetectArgs, output: &mut OutputWriter) -> Result<()> {
    let payload = read_document(&args.file)?;
    let stats = format_statistics(&payload);

    info!(
        file = %args.file.display(),
        format = %stats.format,
        items = stats.total,
        "Detected payload format"
    );

    output.statistics(&stats)
}
