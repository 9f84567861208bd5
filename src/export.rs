//! Chart Export Module
//! Renders a `ChartFigure` to PNG and PDF bytes and writes the report artifacts.
//!
//! Both artifacts come from the same drawing code; only the backend and its
//! units per point differ. Each is cropped to its ink extent plus a small pad.

use crate::charts::pdf_backend::UNITS_PER_PT;
use crate::charts::{ChartFigure, ChartRenderer, PdfCanvas, PlotFrame, ResilientText};
use image::{imageops, ImageFormat, RgbImage};
use plotters::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
    #[error("Failed to encode PNG: {0}")]
    Png(#[from] image::ImageError),
    #[error("Failed to encode PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Output directory does not exist: {}", .0.display())]
    MissingOutputDir(PathBuf),
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn drawing_error<E>(e: DrawingAreaErrorKind<E>) -> RenderError
where
    E: std::error::Error + Send + Sync,
{
    RenderError::Drawing(e.to_string())
}

/// Where the report artifacts are written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub png: PathBuf,
    pub pdf: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            png: PathBuf::from("images/test_execution_times.png"),
            pdf: PathBuf::from("images/test_execution_times.pdf"),
        }
    }
}

impl OutputPaths {
    /// Same file names under another directory.
    pub fn in_dir(dir: &Path) -> Self {
        let defaults = Self::default();
        Self {
            png: dir.join(defaults.png.file_name().unwrap_or_default()),
            pdf: dir.join(defaults.pdf.file_name().unwrap_or_default()),
        }
    }
}

/// Renders and saves chart artifacts.
pub struct ChartExporter;

impl ChartExporter {
    /// Render the full raster canvas, before cropping.
    pub fn render_raster(figure: &ChartFigure) -> Result<(RgbImage, PlotFrame), RenderError> {
        let style = &figure.style;
        let (width, height) = style.pixel_size();
        let mut buffer = vec![0u8; width as usize * height as usize * 3];

        let frame = {
            let root = ResilientText::new(BitMapBackend::with_buffer(&mut buffer, (width, height)))
                .into_drawing_area();
            let frame = ChartRenderer::draw(&root, figure, style.px_per_pt()).map_err(drawing_error)?;
            root.present().map_err(drawing_error)?;
            frame
        };

        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            RenderError::Drawing("pixel buffer does not match canvas size".to_string())
        })?;
        Ok((image, frame))
    }

    /// Render the raster chart and encode it as PNG, cropped to its content.
    pub fn render_png(figure: &ChartFigure) -> Result<Vec<u8>, RenderError> {
        let (image, _) = Self::render_raster(figure)?;
        let cropped = tight_crop(&image, figure.style.tight_pad_px());
        debug!(
            canvas = ?image.dimensions(),
            cropped = ?cropped.dimensions(),
            "cropped raster to content"
        );

        let mut bytes = Vec::new();
        cropped.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Render the vector chart as a single-page PDF, cropped to its content.
    pub fn render_pdf(figure: &ChartFigure) -> Result<Vec<u8>, RenderError> {
        let (width_pt, height_pt) = figure.style.size_pt();
        let mut canvas = PdfCanvas::new(width_pt, height_pt);

        {
            let root = canvas.backend().into_drawing_area();
            let frame = ChartRenderer::draw(&root, figure, UNITS_PER_PT).map_err(drawing_error)?;
            root.present().map_err(drawing_error)?;
            debug!(plot = ?frame, "laid out vector page");
        }

        debug!(
            operations = canvas.operations().len(),
            ink = ?canvas.ink_bounds(),
            "recorded vector page"
        );
        Ok(canvas.to_pdf_bytes(figure.style.tight_pad_pt())?)
    }

    pub fn write_png(figure: &ChartFigure, path: &Path) -> Result<(), RenderError> {
        let bytes = Self::render_png(figure)?;
        write_artifact(path, &bytes)
    }

    pub fn write_pdf(figure: &ChartFigure, path: &Path) -> Result<(), RenderError> {
        let bytes = Self::render_pdf(figure)?;
        write_artifact(path, &bytes)
    }

    /// Show a written artifact in the system viewer. Failures are only logged.
    pub fn open_preview(path: &Path) {
        if let Err(e) = open::that_detached(path) {
            warn!(path = %path.display(), error = %e, "could not open preview");
        }
    }
}

/// Overwrite `path` with `bytes`; the parent directory must already exist.
fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            return Err(RenderError::MissingOutputDir(dir.to_path_buf()));
        }
    }

    fs::write(path, bytes).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
    Ok(())
}

/// Crop to the extent of non-white pixels, keeping `pad` pixels of margin.
///
/// An image with no content is returned unchanged.
pub fn tight_crop(image: &RgbImage, pad: u32) -> RgbImage {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0 == [255, 255, 255] {
            continue;
        }
        bounds = Some(match bounds {
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            None => (x, y, x, y),
        });
    }

    let Some((x0, y0, x1, y1)) = bounds else {
        return image.clone();
    };

    let (width, height) = image.dimensions();
    let left = x0.saturating_sub(pad);
    let top = y0.saturating_sub(pad);
    let right = (x1 + 1 + pad).min(width);
    let bottom = (y1 + 1 + pad).min(height);

    imageops::crop_imm(image, left, top, right - left, bottom - top).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn crop_keeps_padding_around_content() {
        let mut image = RgbImage::from_pixel(100, 80, Rgb([255, 255, 255]));
        image.put_pixel(40, 30, Rgb([0, 0, 0]));
        image.put_pixel(59, 49, Rgb([10, 10, 10]));

        let cropped = tight_crop(&image, 5);
        assert_eq!(cropped.dimensions(), (30, 30));
        assert_eq!(cropped.get_pixel(5, 5).0, [0, 0, 0]);
    }

    #[test]
    fn crop_clamps_to_canvas() {
        let mut image = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        image.put_pixel(0, 19, Rgb([0, 0, 0]));

        let cropped = tight_crop(&image, 5);
        assert_eq!(cropped.dimensions(), (6, 6));
    }

    #[test]
    fn blank_image_is_not_cropped() {
        let image = RgbImage::from_pixel(12, 7, Rgb([255, 255, 255]));
        assert_eq!(tight_crop(&image, 3).dimensions(), (12, 7));
    }

    #[test]
    fn default_paths_point_into_images() {
        let paths = OutputPaths::default();
        assert_eq!(paths.png, PathBuf::from("images/test_execution_times.png"));
        assert_eq!(paths.pdf, PathBuf::from("images/test_execution_times.pdf"));

        let moved = OutputPaths::in_dir(Path::new("/tmp/report"));
        assert_eq!(moved.pdf, PathBuf::from("/tmp/report/test_execution_times.pdf"));
    }

    #[test]
    fn missing_directory_is_reported() {
        let err = write_artifact(Path::new("no_such_dir_for_chart/out.png"), b"x").unwrap_err();
        assert!(matches!(err, RenderError::MissingOutputDir(_)));
    }
}
