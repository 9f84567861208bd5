//! Test Timing Chart - renders the unit test timing chart for the report.

use anyhow::{Context, Result};
use test_timing_chart::{ChartExporter, ChartFigure, ChartStyle, OutputPaths, TimingTable};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let style = ChartStyle::default();
    debug!(style = %serde_json::to_string(&style)?, "chart style");

    let figure = ChartFigure::new(&TimingTable::embedded(), style);
    let paths = OutputPaths::default();

    ChartExporter::write_png(&figure, &paths.png)
        .with_context(|| format!("saving chart to {}", paths.png.display()))?;
    println!("Chart saved to: {}", paths.png.display());

    ChartExporter::write_pdf(&figure, &paths.pdf)
        .with_context(|| format!("saving PDF to {}", paths.pdf.display()))?;
    println!("PDF saved to: {}", paths.pdf.display());

    ChartExporter::open_preview(&paths.png);
    Ok(())
}
