//! Test Timing Records Module
//! Holds the ordered table of recorded unit-test durations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("Timing table has no records")]
    Empty,
    #[error("Invalid duration for '{label}': {value}")]
    InvalidDuration { label: String, value: f64 },
}

/// Recorded durations in milliseconds, in chart order.
const EMBEDDED_TIMINGS: [(&str, f64); 7] = [
    ("GeoUtils:\ndistance_short", 1.0),
    ("GeoUtils:\nbearing_cardinal", 0.0),
    ("GeoUtils:\ndistance_zero", 1.0),
    ("Search:\nvalidation", 2.0),
    ("Search:\nlong_query", 0.0),
    ("Search:\nrepo_results", 7.0),
    ("Search:\nvery_long", 0.0),
];

/// One measured test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestTimingRecord {
    pub label: String,
    pub duration_ms: f64,
}

impl TestTimingRecord {
    pub fn new(label: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            label: label.into(),
            duration_ms,
        }
    }

    /// Label lines for the category axis, one per `\n`-separated part.
    pub fn axis_lines(&self) -> Vec<String> {
        self.label
            .split('\n')
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// True when the duration registered above the measurement floor.
    pub fn is_measured(&self) -> bool {
        self.duration_ms > 0.0
    }
}

/// Ordered, validated sequence of timing records.
///
/// Order is significant: a record's index is its bar position.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingTable {
    records: Vec<TestTimingRecord>,
}

impl TimingTable {
    /// Build a table, rejecting empty input and negative or non-finite durations.
    pub fn new(records: Vec<TestTimingRecord>) -> Result<Self, RecordError> {
        if records.is_empty() {
            return Err(RecordError::Empty);
        }

        if let Some(bad) = records
            .iter()
            .find(|r| !r.duration_ms.is_finite() || r.duration_ms < 0.0)
        {
            return Err(RecordError::InvalidDuration {
                label: bad.label.clone(),
                value: bad.duration_ms,
            });
        }

        Ok(Self { records })
    }

    /// The hand-recorded dataset shipped with the binary.
    pub fn embedded() -> Self {
        Self {
            records: EMBEDDED_TIMINGS
                .iter()
                .map(|&(label, ms)| TestTimingRecord::new(label, ms))
                .collect(),
        }
    }

    pub fn records(&self) -> &[TestTimingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Largest duration in the table.
    pub fn max_duration_ms(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.duration_ms)
            .fold(0.0, f64::max)
    }
}
