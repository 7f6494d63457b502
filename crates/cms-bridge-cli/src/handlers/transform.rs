//! Transform command handler

use super::{load_mapper, read_document, save_mapper, write_document};
use crate::cli::{OutputFormat, TransformArgs};
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use cms_bridge_core::{detect_format, DataTransformer, Format, TransformOptions};
use serde_json::{json, Value};
use tracing::info;

/// Handle the transform command
///
/// Identifier mappings are loaded from the mapping file before the run and
/// written back after it, so repeated runs assign the same document ids.
pub fn handle_transform(args: TransformArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("transform", &args.file.display().to_string());
    let payload = read_document(&args.file)?;

    let to = Format::from(args.to);
    let from = match args.from {
        Some(from) => Format::from(from),
        None => {
            let detected = detect_format(&payload);
            output.info(&format!("Detected source format: {}", detected))?;
            detected
        }
    };

    if from == to {
        output.warning(&format!("Payload is already {}; nothing to convert", to))?;
    }

    let options = transform_options(&args, config);
    let mappings_path = args.mappings.clone().or_else(|| config.mappings.file.clone());
    let mut mapper = load_mapper(mappings_path.as_deref())?;

    let mut metrics = None;
    let result = {
        let mut transformer = DataTransformer::new(&mut mapper);
        if args.response {
            transformer.transform_response(&payload, from, to, &options)?
        } else if args.batch {
            Value::Array(transformer.batch_transform(&payload, from, to, &options)?)
        } else if args.metrics {
            let (value, collected) = transformer.transform_with_metrics(&payload, from, to, &options)?;
            metrics = Some(collected);
            value
        } else {
            transformer.transform(&payload, from, to, &options)?.into_owned()
        }
    };

    if let Some(path) = &mappings_path {
        save_mapper(&mapper, path)?;
    }

    info!(
        file = %args.file.display(),
        %from,
        %to,
        mappings = mapper.len(),
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Transformed payload"
    );

    match (&args.save_to, &metrics) {
        (Some(path), _) => {
            write_document(path, &result)?;
            output.success(&format!("✓ Output saved to {}", path.display()))?;
        }
        // one document on stdout for machine formats
        (None, Some(metrics)) if output.format() != OutputFormat::Human => {
            return output.data(&json!({ "data": result, "metrics": metrics }));
        }
        (None, _) => output.data(&result)?,
    }

    if let Some(metrics) = &metrics {
        output.section("Metrics")?;
        output.metrics(metrics)?;
    }

    Ok(())
}

/// Config defaults with command-line flags applied on top
fn transform_options(args: &TransformArgs, config: &Config) -> TransformOptions {
    let mut options = config.transform.to_options();

    if let Some(content_type) = &args.content_type {
        options.content_type = content_type.clone();
    }
    if args.no_preserve_id {
        options.preserve_original_id = false;
    }
    options.validate_result |= args.validate_result;

    options
}
