//! Records, statistics and injectable sources for the identity mapper
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use crate::types::LegacyId;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Length of the random suffix appended to synthesized document ids
pub const SUFFIX_LENGTH: usize = 6;

/// One legacy id to document id association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdMapping {
    pub legacy_id: LegacyId,
    pub modern_id: String,
    pub resource_type: String,
    pub created_at: DateTime<Utc>,
}

/// Export form of a mapping, carrying its composite registry key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    /// `"{resourceType}:{legacyId}"`; recomputed on import
    #[serde(default)]
    pub key: String,
    #[serde(flatten)]
    pub mapping: IdMapping,
}

/// Registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingStats {
    pub total_mappings: usize,
    /// Distinct resource types, sorted
    pub resource_types: Vec<String>,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

/// Time source for mapping creation timestamps and id synthesis
pub trait Clock: Send {
    fn now(&mut self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock that advances by a fixed step on every reading
#[derive(Debug, Clone)]
pub struct FixedClock {
    next: DateTime<Utc>,
    step: chrono::Duration,
}

impl FixedClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            next: start,
            step: chrono::Duration::zero(),
        }
    }

    /// Advance by `step` after each reading
    pub fn with_step(mut self, step: chrono::Duration) -> Self {
        self.step = step;
        self
    }
}

impl Clock for FixedClock {
    fn now(&mut self) -> DateTime<Utc> {
        let current = self.next;
        self.next = current + self.step;
        current
    }
}

/// Source of the random tail of synthesized document ids
pub trait SuffixSource: Send {
    fn next_suffix(&mut self) -> String;
}

/// Thread-local RNG suffixes
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&mut self) -> String {
        alphanumeric(&mut rand::thread_rng())
    }
}

/// Reproducible suffixes from a seeded RNG
#[derive(Debug, Clone)]
pub struct SeededSuffix {
    rng: StdRng,
}

impl SeededSuffix {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SuffixSource for SeededSuffix {
    fn next_suffix(&mut self) -> String {
        alphanumeric(&mut self.rng)
    }
}

fn alphanumeric<R: Rng>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(SUFFIX_LENGTH)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}
