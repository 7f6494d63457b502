//! Structural and attribute validation for legacy and modern payloads
//!
//! The validator never fails: every problem found becomes an error or a
//! warning string in a [`ValidationReport`], labelled with the item index and,
//! for relations, the field name and nested index.
//!
//! - `types`: options, report and attribute schema declarations
//! - `structural`: item, relation and envelope rules per format
//! - `schema`: attribute type and constraint checks
//! - `tests`: validation suite
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

pub mod schema;
pub mod structural;
pub mod types;


pub use schema::validate_against_schema;
pub use structural::StructuralValidator;
pub use types::{
    AttributeSchema, FieldSchema, FieldType, SchemaOptions, ValidationOptions, ValidationReport,
};

use crate::types::Format;
use serde_json::Value;

/// Whether every item of `data` satisfies the rules of `format`
pub fn validate_format(data: &Value, format: Format, options: &ValidationOptions) -> bool {
    StructuralValidator::new(*options).validate(data, format)
}

/// Full diagnostic report for `data` against `format`
pub fn validation_report(data: &Value, format: Format, options: &ValidationOptions) -> ValidationReport {
    StructuralValidator::new(*options).report(data, format)
}

/// Report for a response envelope, including its pagination block
pub fn validate_response(envelope: &Value, format: Format, options: &ValidationOptions) -> ValidationReport {
    StructuralValidator::new(*options).validate_response(envelope, format)
}
