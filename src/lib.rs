//! Test Timing Chart - Static bar chart of unit test execution times
//!
//! Renders the recorded timings of the navigation app's unit tests as a bar
//! chart and saves it as PNG and PDF for the technical report.

pub mod charts;
pub mod data;
pub mod export;
pub mod stats;

pub use charts::{ChartFigure, ChartRenderer, ChartStyle, PlotFrame};
pub use data::{TestTimingRecord, TimingTable};
pub use export::{ChartExporter, OutputPaths, RenderError};
pub use stats::TimingSummary;
