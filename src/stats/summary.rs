//! Timing Summary Module
//! Aggregates a timing table into the counts shown in the chart annotations.

use crate::data::TimingTable;
use serde::Serialize;

const CHECK_MARK: char = '✓';

/// Aggregate figures for one timing table.
///
/// Every recorded timing comes from a passing run, so `passed == total`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingSummary {
    pub total: usize,
    pub passed: usize,
    pub max_ms: f64,
    pub target_ms: f64,
    pub over_target: usize,
}

impl TimingSummary {
    pub fn from_table(table: &TimingTable, target_ms: f64) -> Self {
        let over_target = table
            .records()
            .iter()
            .filter(|r| r.duration_ms >= target_ms)
            .count();

        Self {
            total: table.len(),
            passed: table.len(),
            max_ms: table.max_duration_ms(),
            target_ms,
            over_target,
        }
    }

    /// Share of passing tests, in percent.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.passed as f64 * 100.0 / self.total as f64
    }

    pub fn all_within_target(&self) -> bool {
        self.over_target == 0
    }

    /// Second title line, e.g. "All Tests Passed (7/7)".
    pub fn status_line(&self) -> String {
        if self.passed == self.total {
            format!("All Tests Passed ({}/{})", self.passed, self.total)
        } else {
            format!("Tests Passed ({}/{})", self.passed, self.total)
        }
    }

    /// Lines of the reference-target box.
    pub fn target_lines(&self) -> Vec<String> {
        let note = if self.all_within_target() {
            "(All tests well below)"
        } else {
            "(Some tests exceed it)"
        };
        vec![
            format!("{:.0}ms UI Target {}", self.target_ms, CHECK_MARK),
            note.to_string(),
        ]
    }

    /// Lines of the summary box.
    pub fn summary_lines(&self) -> Vec<String> {
        let verdict = if self.all_within_target() {
            format!("All < {:.0}ms target {}", self.target_ms, CHECK_MARK)
        } else {
            format!("Over {:.0}ms target: {}", self.target_ms, self.over_target)
        };
        vec![
            format!("Total Tests: {}", self.total),
            format!("Passed: {} ({:.0}%)", self.passed, self.pass_rate()),
            format!("Max Time: {:.1}ms", self.max_ms),
            verdict,
        ]
    }
}
