//! Text at arbitrary angles.
//!
//! plotters only turns text in quarter steps, so category labels go through
//! [`RotatedText`] instead: the vector backend sets a rotated text matrix and
//! the raster wrapper resamples the glyph coverage.

use plotters::element::{Drawable, PointCollection};
use plotters::style::TextStyle;
use plotters_backend::{BackendCoord, BackendTextStyle, DrawingBackend, DrawingErrorKind};

/// Backends that can draw a line of text turned by any angle.
pub trait RotatedText: DrawingBackend {
    /// Draw `text` whose upright layout box has its top-left corner at
    /// `pivot`, turned counterclockwise by `degrees` about that corner.
    fn draw_rotated_text<S: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &S,
        pivot: BackendCoord,
        degrees: f64,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>>;
}

/// One line of rotated text, placed in backend coordinates.
pub struct RotatedLabel<'a> {
    text: String,
    pivot: BackendCoord,
    degrees: f64,
    style: TextStyle<'a>,
}

impl<'a> RotatedLabel<'a> {
    pub fn new(text: impl Into<String>, pivot: BackendCoord, degrees: f64, style: TextStyle<'a>) -> Self {
        Self {
            text: text.into(),
            pivot,
            degrees,
            style,
        }
    }
}

impl<'b, 'a> PointCollection<'b, BackendCoord> for &'b RotatedLabel<'a> {
    type Point = &'b BackendCoord;
    type IntoIter = std::iter::Once<&'b BackendCoord>;

    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&self.pivot)
    }
}

impl<DB: RotatedText> Drawable<DB> for RotatedLabel<'_> {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        mut points: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        match points.next() {
            Some(pivot) => backend.draw_rotated_text(&self.text, &self.style, pivot, self.degrees),
            None => Ok(()),
        }
    }
}

/// Upright size of a block of lines `line_step` apart.
pub fn block_size(sizes: &[(u32, u32)], line_step: f64) -> (f64, f64) {
    let width = sizes.iter().map(|&(w, _)| w).max().unwrap_or(0) as f64;
    let line_h = sizes.iter().map(|&(_, h)| h).max().unwrap_or(0) as f64;
    let height = match sizes.len() {
        0 => 0.0,
        n => (n - 1) as f64 * line_step + line_h,
    };
    (width, height)
}

/// Width and height of the bounding box of a `width` x `height` box turned
/// by `degrees` (0 to 90).
pub fn rotated_extent(width: f64, height: f64, degrees: f64) -> (f64, f64) {
    let (s, c) = degrees.to_radians().sin_cos();
    (width * c + height * s, width * s + height * c)
}

/// Pivots for the lines of a right-aligned label block turned by `degrees`
/// (0 to 90) so that its bounding box has its top-right corner at `corner`.
pub fn block_pivots(
    sizes: &[(u32, u32)],
    line_step: f64,
    degrees: f64,
    corner: BackendCoord,
) -> Vec<BackendCoord> {
    let (width, height) = block_size(sizes, line_step);
    let (s, c) = degrees.to_radians().sin_cos();
    let origin = (
        corner.0 as f64 - (width * c + height * s),
        corner.1 as f64 + width * s,
    );

    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, _))| {
            let (x, y) = (width - w as f64, i as f64 * line_step);
            (
                (origin.0 + x * c + y * s).round() as i32,
                (origin.1 - x * s + y * c).round() as i32,
            )
        })
        .collect()
}

/// Glyph coverage of one upright line; `(0, 0)` is its layout box corner.
#[derive(Debug, Clone)]
pub struct Coverage {
    width: usize,
    height: usize,
    alpha: Vec<f64>,
}

impl Coverage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![0.0; width * height],
        }
    }

    /// Record a glyph pixel; pixels outside the box are dropped.
    pub fn add(&mut self, x: i32, y: i32, alpha: f64) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let cell = &mut self.alpha[y as usize * self.width + x as usize];
        *cell = cell.max(alpha.clamp(0.0, 1.0));
    }

    fn get(&self, x: i64, y: i64) -> f64 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0.0;
        }
        self.alpha[y as usize * self.width + x as usize]
    }

    fn sample(&self, x: f64, y: f64) -> f64 {
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let (ix, iy) = (x0 as i64, y0 as i64);
        self.get(ix, iy) * (1.0 - fx) * (1.0 - fy)
            + self.get(ix + 1, iy) * fx * (1.0 - fy)
            + self.get(ix, iy + 1) * (1.0 - fx) * fy
            + self.get(ix + 1, iy + 1) * fx * fy
    }

    /// Pixels covered once the line is turned counterclockwise by `degrees`
    /// about its top-left corner, as offsets from that corner with coverage.
    pub fn rotated(&self, degrees: f64) -> Vec<(i32, i32, f64)> {
        let (s, c) = degrees.to_radians().sin_cos();
        let (w, h) = (self.width as f64, self.height as f64);
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|(x, y)| (x * c + y * s, -x * s + y * c));
        let min_x = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min).floor() as i32;
        let max_x = corners.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max).ceil() as i32;
        let min_y = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor() as i32;
        let max_y = corners.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil() as i32;

        let mut pixels = Vec::new();
        for py in min_y..max_y {
            for px in min_x..max_x {
                let (cx, cy) = (px as f64 + 0.5, py as f64 + 0.5);
                let u = cx * c - cy * s;
                let v = cx * s + cy * c;
                let alpha = self.sample(u - 0.5, v - 0.5);
                if alpha > 1.0 / 255.0 {
                    pixels.push((px, py, alpha.min(1.0)));
                }
            }
        }
        pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upright_block_sits_left_of_its_corner() {
        let pivots = block_pivots(&[(100, 20)], 24.0, 0.0, (500, 300));
        assert_eq!(pivots, vec![(400, 300)]);
    }

    #[test]
    fn quarter_turn_block_hangs_below_its_corner() {
        // Reads upward from (480, 400); its box spans x 480..500, y 300..400.
        let pivots = block_pivots(&[(100, 20)], 24.0, 90.0, (500, 300));
        assert_eq!(pivots, vec![(480, 400)]);
    }

    #[test]
    fn shorter_lines_are_right_aligned() {
        let pivots = block_pivots(&[(100, 20), (60, 20)], 24.0, 0.0, (500, 300));
        assert_eq!(pivots, vec![(400, 300), (440, 324)]);
        assert_eq!(block_size(&[(100, 20), (60, 20)], 24.0), (100.0, 44.0));
    }

    #[test]
    fn diagonal_extent_grows_both_ways() {
        let (w, h) = rotated_extent(100.0, 20.0, 45.0);
        let half = std::f64::consts::FRAC_1_SQRT_2;
        assert!((w - 120.0 * half).abs() < 1e-9);
        assert!((h - 120.0 * half).abs() < 1e-9);
    }

    #[test]
    fn unrotated_coverage_is_unchanged() {
        let mut coverage = Coverage::new(4, 2);
        coverage.add(2, 1, 1.0);
        coverage.add(9, 9, 1.0);

        let pixels = coverage.rotated(0.0);
        assert_eq!(pixels.len(), 1);
        assert_eq!((pixels[0].0, pixels[0].1), (2, 1));
    }

    #[test]
    fn quarter_turn_moves_text_direction_upward() {
        let mut coverage = Coverage::new(4, 1);
        coverage.add(2, 0, 1.0);

        let pixels = coverage.rotated(90.0);
        let hit = pixels
            .iter()
            .find(|&&(x, y, _)| (x, y) == (0, -3))
            .map(|&(_, _, a)| a);
        assert!(matches!(hit, Some(a) if (a - 1.0).abs() < 1e-6), "{pixels:?}");
    }

    #[test]
    fn diagonal_line_climbs_to_the_right() {
        let mut coverage = Coverage::new(10, 1);
        for x in 0..10 {
            coverage.add(x, 0, 1.0);
        }

        let pixels = coverage.rotated(45.0);
        assert!(pixels.iter().all(|&(x, y, _)| x >= -1 && y <= 0));
        let total: f64 = pixels.iter().map(|p| p.2).sum();
        assert!((7.0..13.0).contains(&total), "total coverage {total}");
    }
}
