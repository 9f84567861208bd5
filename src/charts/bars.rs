//! Bar layout: one bar per record, coloured and labelled by the measurement rule.

use crate::charts::style::{ChartStyle, Rgb};
use crate::data::TestTimingRecord;

/// Label shown for durations below the timer resolution.
pub const BELOW_RESOLUTION_LABEL: &str = "<0.5ms";

/// Colour class of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarTone {
    /// Measurable duration.
    Emphasis,
    /// Recorded as zero, i.e. under the timer resolution.
    Muted,
}

/// Geometry and annotation of a single bar, in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub index: usize,
    pub axis_lines: Vec<String>,
    pub height: f64,
    pub tone: BarTone,
    pub value_label: String,
}

impl BarSpec {
    pub fn from_record(index: usize, record: &TestTimingRecord) -> Self {
        let tone = if record.is_measured() {
            BarTone::Emphasis
        } else {
            BarTone::Muted
        };

        Self {
            index,
            axis_lines: record.axis_lines(),
            height: record.duration_ms,
            tone,
            value_label: value_label(record.duration_ms),
        }
    }

    pub fn center(&self) -> f64 {
        self.index as f64
    }

    /// Left and right edges for a bar occupying `width` of its slot.
    pub fn span(&self, width: f64) -> (f64, f64) {
        let half = width / 2.0;
        (self.center() - half, self.center() + half)
    }

    pub fn color(&self, style: &ChartStyle) -> Rgb {
        match self.tone {
            BarTone::Emphasis => style.emphasis,
            BarTone::Muted => style.muted,
        }
    }
}

/// Text placed above a bar.
pub fn value_label(duration_ms: f64) -> String {
    if duration_ms > 0.0 {
        format!("{:.1}ms", duration_ms)
    } else {
        BELOW_RESOLUTION_LABEL.to_string()
    }
}

pub fn layout_bars(records: &[TestTimingRecord]) -> Vec<BarSpec> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| BarSpec::from_record(i, r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TimingTable;

    #[test]
    fn one_bar_per_record_in_order() {
        let table = TimingTable::embedded();
        let bars = layout_bars(table.records());

        assert_eq!(bars.len(), 7);
        for (i, (bar, record)) in bars.iter().zip(table.records()).enumerate() {
            assert_eq!(bar.index, i);
            assert_eq!(bar.height, record.duration_ms);
            assert_eq!(bar.axis_lines, record.axis_lines());
        }
    }

    #[test]
    fn measured_bars_use_emphasis_and_one_decimal() {
        let style = ChartStyle::default();
        let bars = layout_bars(TimingTable::embedded().records());

        let labels: Vec<&str> = bars.iter().map(|b| b.value_label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["1.0ms", "<0.5ms", "1.0ms", "2.0ms", "<0.5ms", "7.0ms", "<0.5ms"]
        );

        for bar in &bars {
            if bar.height > 0.0 {
                assert_eq!(bar.tone, BarTone::Emphasis);
                assert_eq!(bar.color(&style), style.emphasis);
            } else {
                assert_eq!(bar.tone, BarTone::Muted);
                assert_eq!(bar.color(&style), style.muted);
            }
        }
    }

    #[test]
    fn value_label_rounds_to_one_decimal() {
        assert_eq!(value_label(0.04), "0.0ms");
        assert_eq!(value_label(12.345), "12.3ms");
        assert_eq!(value_label(0.0), BELOW_RESOLUTION_LABEL);
    }

    #[test]
    fn span_is_centered_on_index() {
        let bar = BarSpec::from_record(3, &TestTimingRecord::new("x", 2.0));
        let (left, right) = bar.span(0.8);
        assert!((left - 2.6).abs() < 1e-9);
        assert!((right - 3.4).abs() < 1e-9);
    }
}
