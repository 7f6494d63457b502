//! Validation options, reports and attribute schema types
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use crate::types::Format;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Options for structural validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Reject flat legacy items and unmarked modern items
    pub strict: bool,
    /// Accept items of the other format
    pub allow_mixed: bool,
    /// Recurse into relation fields
    pub check_relations: bool,
    /// Maximum relation nesting that is validated
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            strict: false,
            allow_mixed: false,
            check_relations: true,
            max_depth: 5,
        }
    }
}

/// Accumulated outcome of a validation pass
///
/// Errors invalidate the item they name; warnings never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub expected_format: Format,
    pub detected_format: Format,
    pub total_items: usize,
    pub valid_items: usize,
    pub invalid_items: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub(crate) fn new(expected_format: Format, detected_format: Format) -> Self {
        Self {
            is_valid: true,
            expected_format,
            detected_format,
            total_items: 0,
            valid_items: 0,
            invalid_items: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Recompute `is_valid` from the collected errors
    pub(crate) fn finish(mut self) -> Self {
        self.is_valid = self.errors.is_empty();
        self
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Options for attribute validation against a schema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Skip `required` checks, for partial update payloads
    pub partial: bool,
}

/// Declared type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Text,
    Richtext,
    Email,
    Uid,
    Enumeration,
    Integer,
    Biginteger,
    Number,
    Float,
    Decimal,
    Boolean,
    Date,
    Datetime,
    Time,
    Timestamp,
    Array,
    Object,
    Component,
    /// Any other declared type; values are not type-checked
    #[serde(other)]
    Other,
}

impl FieldType {
    /// Name used in error messages
    pub fn expected(self) -> &'static str {
        match self {
            FieldType::String
            | FieldType::Text
            | FieldType::Richtext
            | FieldType::Email
            | FieldType::Uid
            | FieldType::Enumeration => "string",
            FieldType::Integer | FieldType::Biginteger => "integer",
            FieldType::Number | FieldType::Float | FieldType::Decimal => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date | FieldType::Datetime | FieldType::Time | FieldType::Timestamp => {
                "date"
            }
            FieldType::Array => "array",
            FieldType::Object | FieldType::Component => "object",
            FieldType::Other => "any",
        }
    }
}

/// Declaration of one attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl FieldSchema {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// Attribute name to declaration, ordered for stable reports
pub type AttributeSchema = BTreeMap<String, FieldSchema>;
