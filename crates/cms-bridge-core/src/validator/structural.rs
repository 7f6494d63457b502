//! Structural validation of items, relations and response envelopes
//!
//! Rules are checked per item and every violation is recorded, so one pass
//! yields the full diagnostic set. Nothing here returns an error: malformed
//! data becomes report entries.
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use super::types::{ValidationOptions, ValidationReport};
use crate::detector::detect_format;
use crate::shape::is_legacy_like;
use crate::types::Format;
use serde_json::{Map, Value};

const PAGINATION_FIELDS: [&str; 4] = ["page", "pageSize", "pageCount", "total"];

/// Errors and warnings collected while walking one payload
#[derive(Debug, Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Findings {
    fn error(&mut self, label: &str, message: impl AsRef<str>) {
        self.errors.push(format!("{}: {}", label, message.as_ref()));
    }

    fn warning(&mut self, label: &str, message: impl AsRef<str>) {
        self.warnings.push(format!("{}: {}", label, message.as_ref()));
    }
}

/// Validator checking payloads against the rules of an expected format
#[derive(Debug, Clone, Default)]
pub struct StructuralValidator {
    options: ValidationOptions,
}

impl StructuralValidator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Fast path: stops at the first invalid item
    pub fn validate(&self, data: &Value, expected: Format) -> bool {
        let Some(items) = items_of(data) else {
            return false;
        };

        let mut scratch = Findings::default();
        items
            .iter()
            .enumerate()
            .all(|(index, item)| self.check_item(item, expected, 0, &item_label(index), &mut scratch))
    }

    /// Detailed path: validates every item and reports every violation
    pub fn report(&self, data: &Value, expected: Format) -> ValidationReport {
        let mut report = ValidationReport::new(expected, detect_format(data));
        let mut findings = Findings::default();
        self.collect_items(data, expected, &mut report, &mut findings);
        report.errors = findings.errors;
        report.warnings = findings.warnings;
        report.finish()
    }

    /// Validate a response envelope: `data` items plus `meta.pagination`
    pub fn validate_response(&self, envelope: &Value, expected: Format) -> ValidationReport {
        let mut report = ValidationReport::new(expected, detect_format(envelope));
        let mut findings = Findings::default();

        match envelope.as_object() {
            None => findings.error("Response", "expected an object"),
            Some(map) => {
                match map.get("data") {
                    Some(data) => self.collect_items(data, expected, &mut report, &mut findings),
                    None => findings.error("Response", "missing required field 'data'"),
                }

                if map.get("error").is_some_and(|error| !error.is_null()) {
                    findings.warning("Response", "carries an error object");
                }

                match map.get("meta") {
                    None | Some(Value::Null) => {}
                    Some(Value::Object(meta)) => check_pagination(meta, &mut findings),
                    Some(_) => findings.error("Response", "'meta' must be an object"),
                }
            }
        }

        report.errors = findings.errors;
        report.warnings = findings.warnings;
        report.finish()
    }

    fn collect_items(
        &self,
        data: &Value,
        expected: Format,
        report: &mut ValidationReport,
        findings: &mut Findings,
    ) {
        let Some(items) = items_of(data) else {
            findings.error("Data", "no data to validate");
            return;
        };

        if expected == Format::Unknown {
            findings.warning("Data", "no expected format given, structural checks skipped");
        }

        report.total_items += items.len();
        for (index, item) in items.iter().enumerate() {
            if self.check_item(item, expected, 0, &item_label(index), findings) {
                report.valid_items += 1;
            } else {
                report.invalid_items += 1;
            }
        }
    }

    fn check_item(
        &self,
        item: &Value,
        expected: Format,
        depth: usize,
        label: &str,
        findings: &mut Findings,
    ) -> bool {
        let Some(map) = item.as_object() else {
            findings.error(label, format!("expected an object, found {}", type_name(item)));
            return false;
        };

        match expected {
            Format::Legacy => self.check_legacy(map, depth, label, findings),
            Format::Modern => self.check_modern(map, depth, label, findings),
            Format::Mixed if is_legacy_like(map) => self.check_legacy(map, depth, label, findings),
            Format::Mixed => self.check_modern(map, depth, label, findings),
            Format::Unknown => true,
        }
    }

    fn check_legacy(
        &self,
        map: &Map<String, Value>,
        depth: usize,
        label: &str,
        findings: &mut Findings,
    ) -> bool {
        if map.contains_key("documentId") {
            findings.warning(label, "contains a field belonging to the other format ('documentId')");
            if self.options.allow_mixed {
                return true;
            }
        }

        let mut valid = true;

        if !map.contains_key("id") {
            findings.error(label, "missing required field 'id'");
            valid = false;
        }

        match map.get("attributes") {
            Some(Value::Object(_)) => {}
            Some(other) => {
                findings.error(
                    label,
                    format!("'attributes' must be an object, found {}", type_name(other)),
                );
                valid = false;
            }
            None if self.options.strict => {
                findings.error(label, "missing required field 'attributes'");
                valid = false;
            }
            None => {}
        }

        if self.options.check_relations {
            let fields = map
                .get("attributes")
                .and_then(Value::as_object)
                .unwrap_or(map);
            valid &= self.check_legacy_relations(fields, depth, label, findings);
        }

        valid
    }

    fn check_legacy_relations(
        &self,
        fields: &Map<String, Value>,
        depth: usize,
        label: &str,
        findings: &mut Findings,
    ) -> bool {
        let mut valid = true;

        for (name, value) in fields {
            let Some(relation) = value.as_object() else {
                continue;
            };
            let Some(data) = relation.get("data") else {
                continue;
            };

            let relation_label = format!("{}: relation '{}'", label, name);
            if !self.within_depth(depth, &relation_label, findings) {
                continue;
            }

            valid &= match data {
                Value::Null => true,
                Value::Array(items) => {
                    let mut all = true;
                    for (index, nested) in items.iter().enumerate() {
                        let nested_label = format!("{}[{}]", relation_label, index);
                        all &= self.check_item(nested, Format::Legacy, depth + 1, &nested_label, findings);
                    }
                    all
                }
                Value::Object(_) => {
                    self.check_item(data, Format::Legacy, depth + 1, &relation_label, findings)
                }
                other => {
                    findings.error(
                        &relation_label,
                        format!("'data' must be an item, an array or null, found {}", type_name(other)),
                    );
                    false
                }
            };
        }

        valid
    }

    fn check_modern(
        &self,
        map: &Map<String, Value>,
        depth: usize,
        label: &str,
        findings: &mut Findings,
    ) -> bool {
        if map.contains_key("attributes") {
            findings.warning(label, "contains a field belonging to the other format ('attributes')");
        }

        let legacy_shaped = is_legacy_like(map);
        if legacy_shaped && self.options.allow_mixed {
            return true;
        }
        let has_legacy_marker = map.contains_key("id") || map.contains_key("attributes");

        let mut valid = true;

        match map.get("documentId") {
            Some(Value::String(_)) => {}
            Some(other) => {
                findings.warning(
                    label,
                    format!("'documentId' should be a string, found {}", type_name(other)),
                );
            }
            None if has_legacy_marker || self.options.strict => {
                findings.error(label, "missing required field 'documentId'");
                valid = false;
            }
            // unmarked objects are accepted as partially populated items
            None => {}
        }

        if self.options.check_relations {
            valid &= self.check_modern_relations(map, depth, label, findings);
        }

        valid
    }

    fn check_modern_relations(
        &self,
        map: &Map<String, Value>,
        depth: usize,
        label: &str,
        findings: &mut Findings,
    ) -> bool {
        let mut valid = true;

        for (name, value) in map {
            if name == "documentId" || name == "id" {
                continue;
            }

            match value {
                Value::Array(items) => {
                    let relation_label = format!("{}: relation '{}'", label, name);
                    if items.iter().any(Value::is_object)
                        && !self.within_depth(depth, &relation_label, findings)
                    {
                        continue;
                    }
                    for (index, nested) in items.iter().enumerate() {
                        if nested.is_object() {
                            let nested_label = format!("{}[{}]", relation_label, index);
                            valid &= self.check_item(nested, Format::Modern, depth + 1, &nested_label, findings);
                        }
                    }
                }
                Value::Object(nested) if nested.contains_key("documentId") => {
                    let relation_label = format!("{}: relation '{}'", label, name);
                    if self.within_depth(depth, &relation_label, findings) {
                        valid &= self.check_item(value, Format::Modern, depth + 1, &relation_label, findings);
                    }
                }
                _ => {}
            }
        }

        valid
    }

    /// Whether relations below `depth` may still be validated
    fn within_depth(&self, depth: usize, label: &str, findings: &mut Findings) -> bool {
        if depth + 1 > self.options.max_depth {
            findings.warning(
                label,
                format!(
                    "nested deeper than {} levels, not validated",
                    self.options.max_depth
                ),
            );
            return false;
        }
        true
    }
}

/// Check `meta.pagination`, when present, field by field
fn check_pagination(meta: &Map<String, Value>, findings: &mut Findings) {
    let pagination = match meta.get("pagination") {
        None => return,
        Some(Value::Object(pagination)) => pagination,
        Some(other) => {
            findings.error(
                "Pagination",
                format!("expected an object, found {}", type_name(other)),
            );
            return;
        }
    };

    for field in PAGINATION_FIELDS {
        let label = format!("Pagination '{}'", field);
        match pagination.get(field) {
            None | Some(Value::Null) => findings.error(&label, "missing required field"),
            Some(Value::Number(n)) => {
                if n.as_f64().is_some_and(|v| v < 0.0) {
                    findings.error(&label, format!("must be non-negative, found {}", n));
                }
            }
            Some(other) => {
                findings.error(&label, format!("must be a number, found {}", type_name(other)))
            }
        }
    }
}

/// Top-level items of a payload; `None` when there is no data at all
fn items_of(data: &Value) -> Option<Vec<&Value>> {
    match data {
        Value::Null => None,
        Value::Array(items) => Some(items.iter().collect()),
        other => Some(vec![other]),
    }
}

fn item_label(index: usize) -> String {
    format!("Item {}", index)
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
