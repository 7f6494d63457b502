//! Attribute-level validation against a caller-supplied schema
//!
//! Only declared attributes are checked; fields the schema does not mention
//! are ignored.
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use super::structural::type_name;
use super::types::{AttributeSchema, FieldSchema, FieldType, SchemaOptions, ValidationReport};
use crate::detector::detect_format;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};

/// Validate one item's attributes against `schema`
///
/// Values are read from `attributes` when the item has one, otherwise from
/// the item itself, so both formats are accepted.
pub fn validate_against_schema(
    item: &Value,
    schema: &AttributeSchema,
    options: &SchemaOptions,
) -> ValidationReport {
    let detected = detect_format(item);
    let mut report = ValidationReport::new(detected, detected);
    report.total_items = 1;

    let Some(map) = item.as_object() else {
        report
            .errors
            .push(format!("Item must be an object, found {}", type_name(item)));
        report.invalid_items = 1;
        return report.finish();
    };

    let fields = map
        .get("attributes")
        .and_then(Value::as_object)
        .unwrap_or(map);

    for (name, field) in schema {
        report.errors.extend(validate_field(name, field, fields, options));
    }

    if report.errors.is_empty() {
        report.valid_items = 1;
    } else {
        report.invalid_items = 1;
    }
    report.finish()
}

/// Errors for a single declared attribute
fn validate_field(
    name: &str,
    field: &FieldSchema,
    fields: &Map<String, Value>,
    options: &SchemaOptions,
) -> Vec<String> {
    let mut errors = Vec::new();

    let value = match fields.get(name) {
        None | Some(Value::Null) => {
            if field.required && !options.partial {
                errors.push(format!("Field '{}' is required", name));
            }
            return errors;
        }
        Some(value) => value,
    };

    if !matches_type(field.field_type, value) {
        errors.push(format!(
            "Field '{}' must be of type {}, found {}",
            name,
            field.field_type.expected(),
            type_name(value)
        ));
        return errors;
    }

    let length = match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    };
    if let Some(length) = length {
        if let Some(min) = field.min_length {
            if length < min {
                errors.push(format!("Field '{}' must have a length of at least {}", name, min));
            }
        }
        if let Some(max) = field.max_length {
            if length > max {
                errors.push(format!("Field '{}' must have a length of at most {}", name, max));
            }
        }
    }

    if let Some(number) = value.as_f64() {
        if let Some(min) = field.min {
            if number < min {
                errors.push(format!("Field '{}' must be >= {}", name, min));
            }
        }
        if let Some(max) = field.max {
            if number > max {
                errors.push(format!("Field '{}' must be <= {}", name, max));
            }
        }
    }

    errors
}

fn matches_type(field_type: FieldType, value: &Value) -> bool {
    match field_type {
        FieldType::String
        | FieldType::Text
        | FieldType::Richtext
        | FieldType::Email
        | FieldType::Uid
        | FieldType::Enumeration => value.is_string(),
        FieldType::Integer | FieldType::Biginteger => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        FieldType::Number | FieldType::Float | FieldType::Decimal => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Date | FieldType::Datetime | FieldType::Time | FieldType::Timestamp => {
            match value {
                Value::String(s) => is_parseable_date(s),
                Value::Number(_) => true,
                _ => false,
            }
        }
        FieldType::Array => value.is_array(),
        FieldType::Object | FieldType::Component => value.is_object(),
        FieldType::Other => true,
    }
}

/// Accepts RFC 3339 timestamps, ISO dates, naive date-times and times
fn is_parseable_date(input: &str) -> bool {
    let input = input.trim();
    DateTime::parse_from_rfc3339(input).is_ok()
        || NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveTime::parse_from_str(input, "%H:%M:%S%.f").is_ok()
        || NaiveTime::parse_from_str(input, "%H:%M").is_ok()
}
