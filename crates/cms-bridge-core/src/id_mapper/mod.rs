//! Bidirectional registry between legacy ids and document ids
//!
//! The registry is an explicit value owned by the host and passed into the
//! transformer by `&mut`. It has no internal locking: hosts sharing one
//! mapper across threads wrap it in a `Mutex` so that at most one
//! insert-on-miss is in flight.
//!
//! Both indices are keyed per resource type. The forward index owns the
//! [`IdMapping`] records; the reverse index maps `(resourceType, documentId)`
//! to the forward key, so a record can never be reachable from one side only.
//!
//! - `types`: records, statistics and the injectable clock/suffix sources
//! - `tests`: registry behaviour, including export/import consistency
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

pub mod types;

#[cfg(test)]
mod tests;

pub use types::{
    Clock, FixedClock, IdMapping, MappingEntry, MappingStats, RandomSuffix, SeededSuffix,
    SuffixSource, SystemClock,
};

use crate::error::{Error, Result};
use crate::types::LegacyId;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();

/// Upper bound for the slug fragments embedded in synthesized ids
const MAX_SLUG_LEN: usize = 32;

/// Registry translating legacy ids to document ids and back
pub struct IdMapper {
    /// `(resourceType, legacyId)` to record
    forward: HashMap<RegistryKey, IdMapping>,
    /// `(resourceType, documentId)` to forward key
    reverse: HashMap<RegistryKey, RegistryKey>,
    clock: Box<dyn Clock>,
    suffixes: Box<dyn SuffixSource>,
}

impl IdMapper {
    /// Create an empty registry using wall-clock time and random suffixes
    pub fn new() -> Self {
        Self::with_sources(Box::new(SystemClock), Box::new(RandomSuffix))
    }

    /// Create an empty registry with explicit time and randomness sources
    pub fn with_sources(clock: Box<dyn Clock>, suffixes: Box<dyn SuffixSource>) -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
            clock,
            suffixes,
        }
    }

    /// Return the document id for a legacy id, synthesizing one on first use
    pub fn to_modern_id(&mut self, legacy_id: &LegacyId, resource_type: &str) -> String {
        let key = forward_key(resource_type, legacy_id);
        if let Some(mapping) = self.forward.get(&key) {
            return mapping.modern_id.clone();
        }

        let created_at = self.clock.now();
        let modern_id = loop {
            let candidate = format!(
                "{}-{}-{}-{}",
                slug(resource_type, "item"),
                slug(&legacy_id.to_string(), "id"),
                to_base36(created_at.timestamp_millis().max(0) as u64),
                self.suffixes.next_suffix()
            );
            if !self.reverse.contains_key(&reverse_key(resource_type, &candidate)) {
                break candidate;
            }
        };

        debug!(
            resource_type,
            legacy_id = %legacy_id,
            modern_id = %modern_id,
            "Synthesized document id"
        );

        self.insert_record(IdMapping {
            legacy_id: legacy_id.clone(),
            modern_id: modern_id.clone(),
            resource_type: resource_type.to_string(),
            created_at,
        });

        modern_id
    }

    /// Resolve a document id back to its legacy id
    ///
    /// Unknown ids fall back to the first run of digits in `modern_id`, and
    /// failing that to `modern_id` itself. This never fails.
    pub fn to_legacy_id(&self, modern_id: &str, resource_type: &str) -> LegacyId {
        let record = self
            .reverse
            .get(&reverse_key(resource_type, modern_id))
            .and_then(|key| self.forward.get(key));
        if let Some(mapping) = record {
            return mapping.legacy_id.clone();
        }

        let digits = DIGIT_RUN.get_or_init(|| Regex::new(r"\d+").expect("digit pattern is valid"));
        digits
            .find(modern_id)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .map(LegacyId::Number)
            .unwrap_or_else(|| LegacyId::Text(modern_id.to_string()))
    }

    /// Whether a mapping exists for the legacy id
    pub fn has_mapping(&self, legacy_id: &LegacyId, resource_type: &str) -> bool {
        self.forward.contains_key(&forward_key(resource_type, legacy_id))
    }

    /// Whether a document id is registered for the resource type
    pub fn has_modern_id(&self, modern_id: &str, resource_type: &str) -> bool {
        self.reverse.contains_key(&reverse_key(resource_type, modern_id))
    }

    /// All mappings of one resource type, oldest first
    pub fn mappings_for(&self, resource_type: &str) -> Vec<&IdMapping> {
        let mut mappings: Vec<&IdMapping> = self
            .forward
            .values()
            .filter(|mapping| mapping.resource_type == resource_type)
            .collect();
        mappings.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.modern_id.cmp(&b.modern_id))
        });
        mappings
    }

    pub fn stats(&self) -> MappingStats {
        let resource_types: BTreeSet<&str> = self
            .forward
            .values()
            .map(|mapping| mapping.resource_type.as_str())
            .collect();

        MappingStats {
            total_mappings: self.forward.len(),
            resource_types: resource_types.into_iter().map(str::to_string).collect(),
            oldest: self.forward.values().map(|m| m.created_at).min(),
            newest: self.forward.values().map(|m| m.created_at).max(),
        }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Drop every mapping
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }

    /// Drop the mappings of one resource type, returning how many were removed
    pub fn clear_resource_type(&mut self, resource_type: &str) -> usize {
        let before = self.forward.len();
        self.forward
            .retain(|_, mapping| mapping.resource_type != resource_type);
        let forward = &self.forward;
        self.reverse.retain(|_, key| forward.contains_key(key));
        before - self.forward.len()
    }

    /// Every record with its composite key, sorted by key
    pub fn export(&self) -> Vec<MappingEntry> {
        let mut entries: Vec<MappingEntry> = self
            .forward
            .iter()
            .map(|((resource_type, legacy_id), mapping)| MappingEntry {
                key: format!("{}:{}", resource_type, legacy_id),
                mapping: mapping.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }

    /// Replace the whole registry with `entries`
    ///
    /// Both indices are rebuilt from the records. When two entries claim the
    /// same legacy id or the same document id within a resource type, the
    /// later one wins and the earlier record disappears from both indices.
    pub fn import<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        self.clear();
        for entry in entries {
            let expected = format!("{}:{}", entry.mapping.resource_type, entry.mapping.legacy_id);
            if !entry.key.is_empty() && entry.key != expected {
                debug!(key = %entry.key, expected = %expected, "Ignoring stale mapping key");
            }
            self.insert_record(entry.mapping);
        }
        debug!(mappings = self.forward.len(), "Imported id mappings");
    }

    /// Parse an [`export_json`](Self::export_json) document and import it
    ///
    /// Returns the number of mappings in the registry afterwards. On a parse
    /// failure the registry is left untouched.
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let entries: Vec<MappingEntry> =
            serde_json::from_str(json).map_err(|source| Error::MappingImport {
                message: source.to_string(),
                source,
            })?;
        self.import(entries);
        Ok(self.forward.len())
    }

    fn insert_record(&mut self, mapping: IdMapping) {
        let fkey = forward_key(&mapping.resource_type, &mapping.legacy_id);
        let rkey = reverse_key(&mapping.resource_type, &mapping.modern_id);

        if let Some(previous) = self.forward.remove(&fkey) {
            self.reverse
                .remove(&reverse_key(&previous.resource_type, &previous.modern_id));
        }
        if let Some(previous_key) = self.reverse.remove(&rkey) {
            self.forward.remove(&previous_key);
        }

        self.forward.insert(fkey.clone(), mapping);
        self.reverse.insert(rkey, fkey);
    }
}

impl Default for IdMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdMapper")
            .field("mappings", &self.forward.len())
            .finish_non_exhaustive()
    }
}

/// Registry keys are scoped per resource type. Legacy ids are keyed by their
/// textual form, so `5` and `"5"` share one mapping.
type RegistryKey = (String, String);

fn forward_key(resource_type: &str, legacy_id: &LegacyId) -> RegistryKey {
    (resource_type.to_string(), legacy_id.to_string())
}

fn reverse_key(resource_type: &str, modern_id: &str) -> RegistryKey {
    (resource_type.to_string(), modern_id.to_string())
}

/// Lowercase ASCII alphanumerics with `-` separators
fn slug(input: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_SLUG_LEN));
    for c in input.chars() {
        if out.len() >= MAX_SLUG_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}
