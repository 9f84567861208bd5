//! Backend wrapper that keeps rendering when the system font stack fails.
//!
//! plotters resolves fonts through the host's font database. On machines
//! without the requested family, text measurement and drawing return a font
//! error (or panic inside the font loader). The wrapper turns those into
//! metric-based size estimates and skipped glyphs, so the chart geometry is
//! still produced.

use crate::charts::metrics::{self, Face};
use crate::charts::rotated_text::{Coverage, RotatedText};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontFamily, FontStyle,
};
use std::convert::Infallible;
use std::panic;
use tracing::warn;

pub struct ResilientText<DB> {
    inner: DB,
    warned: bool,
}

impl<DB> ResilientText<DB> {
    pub fn new(inner: DB) -> Self {
        Self {
            inner,
            warned: false,
        }
    }
}

impl<DB: DrawingBackend> DrawingBackend for ResilientText<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.fill_polygon(vert, style)
    }

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        (iw, ih): (u32, u32),
        src: &[u8],
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.draw_text(text, style, pos)
        }));
        match result {
            Ok(Err(DrawingErrorKind::FontError(e))) => {
                self.warn_once(&e.to_string());
                Ok(())
            }
            Ok(other) => other,
            Err(_) => {
                self.warn_once("font loader panicked");
                Ok(())
            }
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.estimate_text_size(text, style)
        }));
        match result {
            Ok(Err(DrawingErrorKind::FontError(_))) | Err(_) => Ok(estimate(text, style)),
            Ok(other) => other,
        }
    }
}

impl<DB: DrawingBackend> RotatedText for ResilientText<DB> {
    fn draw_rotated_text<S: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &S,
        pivot: BackendCoord,
        degrees: f64,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let color = style.color();
        if color.alpha <= 0.0 || text.trim().is_empty() {
            return Ok(());
        }

        let traced = panic::catch_unwind(panic::AssertUnwindSafe(|| trace_glyphs(text, style)));
        let coverage = match traced {
            Ok(Ok(coverage)) => coverage,
            Ok(Err(reason)) => {
                self.warn_once(&reason);
                return Ok(());
            }
            Err(_) => {
                self.warn_once("font loader panicked");
                return Ok(());
            }
        };

        for (dx, dy, alpha) in coverage.rotated(degrees) {
            let pixel = BackendColor {
                alpha,
                rgb: color.rgb,
            };
            self.inner.draw_pixel((pivot.0 + dx, pivot.1 + dy), pixel)?;
        }
        Ok(())
    }
}

/// Upright glyph coverage of `text`, from the font rasteriser.
fn trace_glyphs<S: BackendTextStyle>(text: &str, style: &S) -> Result<Coverage, String> {
    let ((x0, y0), (x1, y1)) = style.layout_box(text).map_err(|e| e.to_string())?;
    let mut coverage = Coverage::new((x1 - x0 + 1).max(0) as usize, (y1 - y0 + 1).max(0) as usize);
    let drawn = style.draw(text, (0, 0), |x, y, pixel| {
        coverage.add(x - x0, y - y0, pixel.alpha);
        Ok::<(), Infallible>(())
    });
    if let Err(e) = drawn {
        return Err(e.to_string());
    }
    Ok(coverage)
}

impl<DB> ResilientText<DB> {
    fn warn_once(&mut self, reason: &str) {
        if !self.warned {
            warn!(reason = %reason, "font unavailable; chart text is omitted from the raster output");
            self.warned = true;
        }
    }
}

/// Size of `text` from the standard-14 metrics.
fn estimate<TStyle: BackendTextStyle>(text: &str, style: &TStyle) -> (u32, u32) {
    let face = Face::select(
        matches!(style.family(), FontFamily::Monospace),
        matches!(style.style(), FontStyle::Bold),
    );
    let size = style.size();
    (
        metrics::text_width(text, face, size).ceil() as u32,
        size.ceil() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::*;

    #[test]
    fn fallback_estimate_uses_font_metrics() {
        let style = TextStyle::from(("monospace", 20.0).into_font());
        let (w, h) = estimate("<0.5ms", &style);
        assert!((72..=73).contains(&w));
        assert_eq!(h, 20);
    }

    #[test]
    fn rotated_text_is_skipped_when_blank() {
        let mut buffer = vec![255u8; 20 * 10 * 3];
        {
            let mut backend = ResilientText::new(BitMapBackend::with_buffer(&mut buffer, (20, 10)));
            let style = TextStyle::from(("sans-serif", 8.0).into_font());
            backend.draw_rotated_text("  ", &style, (10, 5), 45.0).unwrap();
            backend.present().unwrap();
        }
        assert!(buffer.iter().all(|&b| b == 255));
    }

    #[test]
    fn wrapped_backend_draws_shapes_unchanged() {
        let mut buffer = vec![0u8; 20 * 10 * 3];
        {
            let root = ResilientText::new(BitMapBackend::with_buffer(&mut buffer, (20, 10)))
                .into_drawing_area();
            root.fill(&RGBColor(10, 20, 30)).unwrap();
            root.present().unwrap();
        }
        assert_eq!(&buffer[0..3], &[10, 20, 30]);
    }
}
