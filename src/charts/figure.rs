//! Device-independent description of the timing chart.

use crate::charts::bars::{layout_bars, BarSpec};
use crate::charts::style::ChartStyle;
use crate::data::TimingTable;
use crate::stats::TimingSummary;

/// Everything the renderer draws, derived once from the timing table.
#[derive(Debug, Clone)]
pub struct ChartFigure {
    pub style: ChartStyle,
    pub bars: Vec<BarSpec>,
    pub summary: TimingSummary,
}

impl ChartFigure {
    pub fn new(table: &TimingTable, style: ChartStyle) -> Self {
        let summary = TimingSummary::from_table(table, style.target_ms);
        Self {
            bars: layout_bars(table.records()),
            summary,
            style,
        }
    }

    pub fn title_lines(&self) -> [String; 2] {
        [self.style.title.clone(), self.summary.status_line()]
    }

    pub fn target_lines(&self) -> Vec<String> {
        self.summary.target_lines()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.summary.summary_lines()
    }

    /// X range covering every category slot.
    pub fn x_range(&self) -> (f64, f64) {
        (-0.5, self.bars.len() as f64 - 0.5)
    }

    /// Bar height as drawn, clipped to the visible y range.
    pub fn drawn_height(&self, bar: &BarSpec) -> f64 {
        bar.height.min(self.style.y_max_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TestTimingRecord;

    #[test]
    fn embedded_figure_titles_and_boxes() {
        let figure = ChartFigure::new(&TimingTable::embedded(), ChartStyle::default());

        assert_eq!(
            figure.title_lines(),
            [
                "Unit Test Execution Times - TopperNav".to_string(),
                "All Tests Passed (7/7)".to_string(),
            ]
        );
        assert_eq!(figure.summary.passed, figure.bars.len());
        assert_eq!(figure.summary_lines()[2], "Max Time: 7.0ms");
        assert_eq!(figure.x_range(), (-0.5, 6.5));
    }

    #[test]
    fn tall_bars_are_clipped_to_the_axis() {
        let table = TimingTable::new(vec![TestTimingRecord::new("slow", 42.0)]).unwrap();
        let figure = ChartFigure::new(&table, ChartStyle::default());

        assert_eq!(figure.drawn_height(&figure.bars[0]), 15.0);
        assert_eq!(figure.bars[0].value_label, "42.0ms");
    }
}
