//! Chart Style Module
//! Fixed presentation parameters shared by the raster and vector outputs.
//!
//! All lengths are in typographic points (1/72 in); backends scale them by
//! their device units per point.

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

pub const POINTS_PER_INCH: f64 = 72.0;

/// Serializable RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn to_color(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }
}

/// Presentation parameters for the timing chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    /// Whitespace kept around the content when cropping to the tight box.
    pub tight_pad_in: f64,

    pub y_max_ms: f64,
    pub y_tick_step_ms: f64,
    pub target_ms: f64,

    pub emphasis: Rgb,
    pub muted: Rgb,
    pub bar_alpha: f64,
    /// Bar width as a fraction of one category slot.
    pub bar_width: f64,

    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,

    pub title_size_pt: f64,
    pub axis_title_size_pt: f64,
    pub tick_label_size_pt: f64,
    pub bar_label_size_pt: f64,
    pub annotation_size_pt: f64,

    pub target_box_fill: Rgb,
    pub summary_box_fill: Rgb,
    pub box_alpha: f64,
    pub grid_alpha: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width_in: 10.0,
            height_in: 6.0,
            dpi: 300,
            tight_pad_in: 0.1,
            y_max_ms: 15.0,
            y_tick_step_ms: 2.0,
            target_ms: 200.0,
            emphasis: Rgb(0x06, 0xA7, 0x7D),
            muted: Rgb(0xD9, 0xD9, 0xD9),
            bar_alpha: 0.8,
            bar_width: 0.8,
            title: "Unit Test Execution Times - TopperNav".to_string(),
            x_axis_title: "Test Cases".to_string(),
            y_axis_title: "Execution Time (milliseconds)".to_string(),
            title_size_pt: 14.0,
            axis_title_size_pt: 12.0,
            tick_label_size_pt: 9.0,
            bar_label_size_pt: 9.0,
            annotation_size_pt: 10.0,
            target_box_fill: Rgb(240, 128, 128), // lightcoral
            summary_box_fill: Rgb(144, 238, 144), // lightgreen
            box_alpha: 0.3,
            grid_alpha: 0.3,
        }
    }
}

impl ChartStyle {
    /// Figure size in points.
    pub fn size_pt(&self) -> (f64, f64) {
        (
            self.width_in * POINTS_PER_INCH,
            self.height_in * POINTS_PER_INCH,
        )
    }

    /// Raster canvas size before cropping.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Raster pixels per point.
    pub fn px_per_pt(&self) -> f64 {
        self.dpi as f64 / POINTS_PER_INCH
    }

    pub fn tight_pad_px(&self) -> u32 {
        (self.tight_pad_in * self.dpi as f64).round() as u32
    }

    pub fn tight_pad_pt(&self) -> f64 {
        self.tight_pad_in * POINTS_PER_INCH
    }

    /// Y values that get a tick label and a gridline.
    pub fn y_ticks(&self) -> Vec<f64> {
        if self.y_tick_step_ms <= 0.0 {
            return vec![0.0];
        }
        let count = (self.y_max_ms / self.y_tick_step_ms).floor() as usize;
        (0..=count)
            .map(|i| i as f64 * self.y_tick_step_ms)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_is_ten_by_six_inches_at_300_dpi() {
        let style = ChartStyle::default();
        assert_eq!(style.pixel_size(), (3000, 1800));
        assert_eq!(style.size_pt(), (720.0, 432.0));
        assert_eq!(style.tight_pad_px(), 30);
    }

    #[test]
    fn y_ticks_cover_zoomed_range() {
        let ticks = ChartStyle::default().y_ticks();
        assert_eq!(ticks, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0]);
    }

    #[test]
    fn style_serializes_colors_as_triples() {
        let json = serde_json::to_value(ChartStyle::default()).unwrap();
        assert_eq!(json["emphasis"], serde_json::json!([6, 167, 125]));
        assert_eq!(json["muted"], serde_json::json!([217, 217, 217]));
        assert_eq!(json["y_max_ms"], serde_json::json!(15.0));
    }
}
