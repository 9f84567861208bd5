use sha2::{Digest, Sha256};
use std::fs;
use test_timing_chart::charts::BarTone;
use test_timing_chart::{
    ChartExporter, ChartFigure, ChartStyle, OutputPaths, RenderError, TimingTable,
};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

fn embedded_figure() -> ChartFigure {
    ChartFigure::new(&TimingTable::embedded(), ChartStyle::default())
}

fn digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Width and height from the IHDR chunk.
fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    (width, height)
}

#[test]
fn png_rendering_is_deterministic() {
    let figure = embedded_figure();
    let first = ChartExporter::render_png(&figure).expect("render png");
    let second = ChartExporter::render_png(&figure).expect("render png again");

    assert!(first.starts_with(PNG_SIGNATURE));
    assert_eq!(digest(&first), digest(&second));
}

#[test]
fn pdf_rendering_is_deterministic() {
    let figure = embedded_figure();
    let first = ChartExporter::render_pdf(&figure).expect("render pdf");
    let second = ChartExporter::render_pdf(&figure).expect("render pdf again");

    assert!(first.starts_with(b"%PDF-"));
    assert_eq!(digest(&first), digest(&second));
}

#[test]
fn png_is_cropped_within_the_300_dpi_canvas() {
    let figure = embedded_figure();
    let bytes = ChartExporter::render_png(&figure).expect("render png");
    let (width, height) = png_dimensions(&bytes);

    assert!(width > 0 && width <= 3000, "width {width}");
    assert!(height > 0 && height <= 1800, "height {height}");
}

#[test]
fn plot_above_muted_bars_stays_clear() {
    let figure = embedded_figure();
    let (image, frame) = ChartExporter::render_raster(&figure).expect("render raster");

    let muted: Vec<_> = figure.bars.iter().filter(|b| b.tone == BarTone::Muted).collect();
    assert_eq!(muted.len(), 3);
    for bar in muted {
        // Clear of the "<0.5ms" label below and the 2 ms gridline above.
        let (x, low) = frame.to_pixel((bar.center(), 1.0));
        let (_, high) = frame.to_pixel((bar.center(), 1.8));
        for y in high..=low {
            let pixel = image.get_pixel(x as u32, y as u32).0;
            assert!(
                pixel.iter().all(|&c| c > 200),
                "ink above bar {} at ({x}, {y}): {pixel:?}",
                bar.index
            );
        }
    }
}

#[test]
fn target_box_is_filled_inside_the_plot() {
    let figure = embedded_figure();
    let (image, frame) = ChartExporter::render_raster(&figure).expect("render raster");

    // Box padding just right of the text's right edge.
    let (x, y) = frame.at_fraction(0.98, 0.65);
    assert!(frame.x.contains(&x) && frame.y.contains(&y));
    let [r, g, b] = image.get_pixel((x + 5) as u32, (y - 10) as u32).0.map(i32::from);
    assert!(r > g + 10 && r > b + 10, "expected coral fill, got {:?}", (r, g, b));
}

#[test]
fn writes_both_artifacts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let paths = OutputPaths::in_dir(dir.path());
    let figure = embedded_figure();

    ChartExporter::write_png(&figure, &paths.png).expect("write png");
    ChartExporter::write_pdf(&figure, &paths.pdf).expect("write pdf");

    let png = fs::read(&paths.png).expect("read png");
    let pdf = fs::read(&paths.pdf).expect("read pdf");
    assert!(!png.is_empty());
    assert!(!pdf.is_empty());
    assert!(png.starts_with(PNG_SIGNATURE));
    assert!(pdf.starts_with(b"%PDF-"));
}

#[test]
fn overwrites_existing_artifacts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let paths = OutputPaths::in_dir(dir.path());
    fs::write(&paths.pdf, b"stale").expect("seed stale file");

    ChartExporter::write_pdf(&embedded_figure(), &paths.pdf).expect("write pdf");

    let pdf = fs::read(&paths.pdf).expect("read pdf");
    assert!(pdf.starts_with(b"%PDF-"));
}

#[test]
fn missing_output_directory_aborts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let paths = OutputPaths::in_dir(&dir.path().join("images"));

    let err = ChartExporter::write_png(&embedded_figure(), &paths.png).unwrap_err();
    assert!(matches!(err, RenderError::MissingOutputDir(_)));
    assert!(!paths.png.exists());
}

#[test]
fn figure_matches_recorded_dataset() {
    let figure = embedded_figure();

    assert_eq!(figure.bars.len(), 7);
    assert_eq!(figure.summary.passed, 7);
    assert_eq!(figure.summary.max_ms, 7.0);
    for bar in &figure.bars {
        if bar.height > 0.0 {
            assert_eq!(bar.value_label, format!("{:.1}ms", bar.height));
        } else {
            assert_eq!(bar.value_label, "<0.5ms");
        }
    }
}
