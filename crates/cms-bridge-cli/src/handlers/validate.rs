//! Validate command handler

use super::read_document;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use cms_bridge_core::{
    detect_format, validate_against_schema, validate_response, validation_report, AttributeSchema, Format,
    SchemaOptions, ValidationOptions, ValidationReport,
};
use serde_json::Value;
use std::path::Path;

/// Handle the validate command
///
/// Fails with [`Error::ValidationFailed`] after printing the report when
/// the payload does not pass.
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate", &args.file.display().to_string());
    let payload = read_document(&args.file)?;
    let format = Format::from(args.format);

    let report = match &args.schema {
        Some(schema_path) => {
            let schema = load_schema(schema_path)?;
            let options = SchemaOptions {
                partial: args.partial,
            };
            output.info(&format!("Validating attributes against {}", schema_path.display()))?;
            schema_report(&payload, &schema, &options)
        }
        None => {
            let options = validation_options(&args, &config.validation);
            output.info(&format!("Validating {} as {}", args.file.display(), format))?;
            if args.response {
                validate_response(&payload, format, &options)
            } else {
                validation_report(&payload, format, &options)
            }
        }
    };

    output.validation_report(&report)?;

    if report.is_valid {
        Ok(())
    } else {
        Err(Error::ValidationFailed {
            errors: report.errors.len(),
        })
    }
}

/// Config defaults with command-line flags applied on top
fn validation_options(args: &ValidateArgs, defaults: &ValidationOptions) -> ValidationOptions {
    ValidationOptions {
        strict: defaults.strict || args.strict,
        allow_mixed: defaults.allow_mixed || args.allow_mixed,
        check_relations: defaults.check_relations && !args.no_relations,
        max_depth: args.max_depth.unwrap_or(defaults.max_depth),
    }
}

fn load_schema(path: &Path) -> Result<AttributeSchema> {
    let document = read_document(path)?;
    serde_json::from_value(document).map_err(|e| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: "attribute schema".to_string(),
        reason: e.to_string(),
    })
}

/// Schema check of a single item or of every element of an array
///
/// Per-item reports are folded into one, with errors and warnings prefixed
/// by the item index.
fn schema_report(payload: &Value, schema: &AttributeSchema, options: &SchemaOptions) -> ValidationReport {
    let Value::Array(items) = payload else {
        return validate_against_schema(payload, schema, options);
    };

    let mut merged = ValidationReport {
        is_valid: true,
        expected_format: Format::Unknown,
        detected_format: detect_format(payload),
        total_items: 0,
        valid_items: 0,
        invalid_items: 0,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    for (index, item) in items.iter().enumerate() {
        let report = validate_against_schema(item, schema, options);
        merged.total_items += 1;
        if report.is_valid {
            merged.valid_items += 1;
        } else {
            merged.invalid_items += 1;
        }
        merged
            .errors
            .extend(report.errors.iter().map(|e| format!("Item {}: {}", index, e)));
        merged
            .warnings
            .extend(report.warnings.iter().map(|w| format!("Item {}: {}", index, w)));
    }

    merged.expected_format = merged.detected_format;
    merged.is_valid = merged.errors.is_empty();
    merged
}
