//! Static Chart Renderer
//! Draws a `ChartFigure` on any plotters backend.
//!
//! Layout (sizes in points, scaled by the backend's device units per point):
//! 1. Two-line bold title centred over the plot
//! 2. Bar plot with fixed y range, dashed y gridlines beneath the bars and a
//!    full frame
//! 3. Category labels turned 45° below the axis and bold axis titles
//! 4. Target box (right) and summary box (top-left) inside the plot

use crate::charts::figure::ChartFigure;
use crate::charts::metrics::ASCENT;
use crate::charts::rotated_text::{block_pivots, block_size, rotated_extent, RotatedLabel, RotatedText};
use crate::charts::style::{ChartStyle, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::ops::Range;
use tracing::debug;

const OUTER_MARGIN_PT: f64 = 8.0;
const TITLE_LINE_SPACING: f64 = 1.25;
const TITLE_GAP_PT: f64 = 14.0;
const X_LABEL_ANGLE: f64 = 45.0;
/// Gap between a tick mark's end and its label.
const X_LABEL_PAD_PT: f64 = 3.5;
const X_LABEL_LINE_SPACING: f64 = 1.2;
const X_TITLE_GAP_PT: f64 = 6.0;
const Y_LABEL_AREA_PT: f64 = 52.0;
const AXIS_LINE_PT: f64 = 0.8;
const BAR_EDGE_PT: f64 = 1.0;
const TICK_PT: f64 = 3.5;
const DASH_PT: f64 = 3.7;
const DASH_GAP_PT: f64 = 1.6;
/// Padding inside annotation boxes, as a fraction of the font size.
const BOX_PAD_EM: f64 = 0.3;
const BOX_LINE_SPACING: f64 = 1.2;

/// How an annotation's text sits on its anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
enum BoxAlign {
    /// Top-left corner of the text at the anchor.
    LeftTop,
    /// Right edge of the text at the anchor, first baseline through it.
    RightBaseline,
}

/// Annotation box geometry in backend units.
#[derive(Debug, Clone, PartialEq)]
struct BoxLayout {
    corners: [(i32, i32); 2],
    /// Text x on the aligned side.
    text_x: i32,
    /// Top of the first text line.
    text_top: i32,
}

impl BoxLayout {
    fn new(align: BoxAlign, anchor: (i32, i32), (text_w, text_h): (i32, i32), size: f64, pad: i32) -> Self {
        let (left, text_x) = match align {
            BoxAlign::LeftTop => (anchor.0, anchor.0),
            BoxAlign::RightBaseline => (anchor.0 - text_w, anchor.0),
        };
        let text_top = match align {
            BoxAlign::LeftTop => anchor.1,
            BoxAlign::RightBaseline => anchor.1 - (size * ASCENT).round() as i32,
        };
        Self {
            corners: [
                (left - pad, text_top - pad),
                (left + text_w + pad, text_top + text_h + pad),
            ],
            text_x,
            text_top,
        }
    }
}

/// Pixel extent of the plotting area and the data window it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotFrame {
    pub x: Range<i32>,
    pub y: Range<i32>,
    pub data_x: (f64, f64),
    pub data_y: (f64, f64),
}

impl PlotFrame {
    /// Point at a fraction of the plot, measured from its bottom-left corner.
    pub fn at_fraction(&self, fx: f64, fy: f64) -> (i32, i32) {
        let w = (self.x.end - self.x.start) as f64;
        let h = (self.y.end - self.y.start) as f64;
        (
            self.x.start + (fx * w).round() as i32,
            self.y.end - (fy * h).round() as i32,
        )
    }

    /// Backend position of a data point.
    pub fn to_pixel(&self, (x, y): (f64, f64)) -> (i32, i32) {
        let fx = (x - self.data_x.0) / (self.data_x.1 - self.data_x.0);
        let fy = (y - self.data_y.0) / (self.data_y.1 - self.data_y.0);
        self.at_fraction(fx, fy)
    }
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Draw the complete figure onto `root` and return where the plot landed.
    ///
    /// `scale` is the number of backend units per point.
    pub fn draw<DB>(
        root: &DrawingArea<DB, Shift>,
        figure: &ChartFigure,
        scale: f64,
    ) -> Result<PlotFrame, DrawingAreaErrorKind<DB::ErrorType>>
    where
        DB: RotatedText,
    {
        let style = &figure.style;
        let units = |pt: f64| (pt * scale).round() as i32;
        let line = |pt: f64| ((pt * scale).round() as u32).max(1);

        root.fill(&WHITE)?;

        let title_h = OUTER_MARGIN_PT
            + style.title_size_pt * (1.0 + TITLE_LINE_SPACING)
            + TITLE_GAP_PT;
        let (_, body) = root.split_vertically(units(title_h));

        let y_keys = style.y_ticks();
        let (x0, x1) = figure.x_range();

        // Category labels are placed by hand, so the label area is sized from them.
        let label_font = font(style.tick_label_size_pt * scale, FontFamily::SansSerif, false);
        let label_step = style.tick_label_size_pt * scale * X_LABEL_LINE_SPACING;
        let mut label_sizes = Vec::with_capacity(figure.bars.len());
        let mut label_drop = 0.0f64;
        for bar in &figure.bars {
            let sizes = bar
                .axis_lines
                .iter()
                .map(|line| root.estimate_text_size(line, &label_font))
                .collect::<Result<Vec<_>, _>>()?;
            let (w, h) = block_size(&sizes, label_step);
            label_drop = label_drop.max(rotated_extent(w, h, X_LABEL_ANGLE).1);
            label_sizes.push(sizes);
        }
        let label_gap = units(TICK_PT + X_LABEL_PAD_PT);
        let x_label_area = label_gap as f64
            + label_drop
            + (X_TITLE_GAP_PT + style.axis_title_size_pt * TITLE_LINE_SPACING) * scale;

        let mut chart = ChartBuilder::on(&body)
            .margin_left(units(OUTER_MARGIN_PT))
            .margin_right(units(OUTER_MARGIN_PT * 2.0))
            .margin_bottom(units(OUTER_MARGIN_PT))
            .x_label_area_size(x_label_area.round() as i32)
            .y_label_area_size(units(Y_LABEL_AREA_PT))
            .build_cartesian_2d(x0..x1, 0.0..style.y_max_ms)?;

        let axis_font = font(style.axis_title_size_pt * scale, FontFamily::SansSerif, true);
        let whole_ms = |y: &f64| format!("{:.0}", y);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(0)
            .y_labels(y_keys.len())
            .y_label_formatter(&whole_ms)
            .y_label_style(label_font.clone())
            .x_desc(style.x_axis_title.as_str())
            .y_desc(style.y_axis_title.as_str())
            .axis_desc_style(axis_font)
            .axis_style(BLACK.stroke_width(line(AXIS_LINE_PT)))
            .set_all_tick_mark_size(units(TICK_PT))
            .draw()?;

        let (xr, yr) = chart.plotting_area().get_pixel_range();
        let frame = PlotFrame {
            x: xr.clone(),
            y: yr.clone(),
            data_x: (x0, x1),
            data_y: (0.0, style.y_max_ms),
        };
        debug!(
            plot_x = ?xr,
            plot_y = ?yr,
            scale,
            "laid out plotting area"
        );

        let axis_stroke = BLACK.stroke_width(line(AXIS_LINE_PT));
        for (bar, sizes) in figure.bars.iter().zip(&label_sizes) {
            let (px, py) = chart.backend_coord(&(bar.center(), 0.0));
            root.draw(&PathElement::new(
                vec![(px, py), (px, py + units(TICK_PT))],
                axis_stroke,
            ))?;

            let pivots = block_pivots(sizes, label_step, X_LABEL_ANGLE, (px, py + label_gap));
            for (text, pivot) in bar.axis_lines.iter().zip(pivots) {
                root.draw(&RotatedLabel::new(
                    text.as_str(),
                    pivot,
                    X_LABEL_ANGLE,
                    label_font.clone(),
                ))?;
            }
        }

        // Gridlines go under the bars.
        let grid_style = BLACK.mix(style.grid_alpha).stroke_width(line(AXIS_LINE_PT));
        for y in &y_keys {
            let (_, py) = chart.backend_coord(&(x0, *y));
            Self::draw_dashed_hline(
                root,
                (xr.start, xr.end),
                py,
                (units(DASH_PT), units(DASH_GAP_PT)),
                &grid_style,
            )?;
        }

        for bar in &figure.bars {
            let (left, right) = bar.span(style.bar_width);
            let height = figure.drawn_height(bar);
            let color = bar.color(style).to_color().mix(style.bar_alpha);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(left, 0.0), (right, height)],
                color.filled(),
            )))?;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(left, 0.0), (right, height)],
                color.stroke_width(line(BAR_EDGE_PT)),
            )))?;
        }

        let value_font = font(style.bar_label_size_pt * scale, FontFamily::SansSerif, true)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(figure.bars.iter().map(|bar| {
            Text::new(
                bar.value_label.clone(),
                (bar.center(), figure.drawn_height(bar)),
                value_font.clone(),
            )
        }))?;

        // Frame on all four sides.
        root.draw(&Rectangle::new(
            [(xr.start, yr.start), (xr.end, yr.end)],
            axis_stroke,
        ))?;

        Self::draw_title(root, figure, (xr.start + xr.end) / 2, scale)?;

        Self::draw_text_box(
            root,
            &figure.target_lines(),
            frame.at_fraction(0.98, 0.65),
            BoxAlign::RightBaseline,
            font(style.annotation_size_pt * scale, FontFamily::SansSerif, false),
            style.target_box_fill,
            style,
            scale,
        )?;
        Self::draw_text_box(
            root,
            &figure.summary_lines(),
            frame.at_fraction(0.02, 0.98),
            BoxAlign::LeftTop,
            font(style.annotation_size_pt * scale, FontFamily::Monospace, false),
            style.summary_box_fill,
            style,
            scale,
        )?;

        Ok(frame)
    }

    fn draw_title<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        figure: &ChartFigure,
        center_x: i32,
        scale: f64,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let size = figure.style.title_size_pt * scale;
        let title_font =
            font(size, FontFamily::SansSerif, true).pos(Pos::new(HPos::Center, VPos::Top));

        let mut y = OUTER_MARGIN_PT * scale;
        for text in figure.title_lines() {
            root.draw_text(&text, &title_font, (center_x, y.round() as i32))?;
            y += size * TITLE_LINE_SPACING;
        }
        Ok(())
    }

    fn draw_dashed_hline<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        (from_x, to_x): (i32, i32),
        y: i32,
        (dash, gap): (i32, i32),
        style: &ShapeStyle,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let period = (dash + gap).max(1);
        let mut x = from_x;
        while x < to_x {
            let end = (x + dash).min(to_x);
            root.draw(&PathElement::new(vec![(x, y), (end, y)], style.clone()))?;
            x += period;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text_box<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        lines: &[String],
        anchor: (i32, i32),
        align: BoxAlign,
        text_font: TextStyle,
        fill: Rgb,
        style: &ChartStyle,
        scale: f64,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let size = style.annotation_size_pt * scale;
        let pad = (size * BOX_PAD_EM).round() as i32;
        let line_h = size * BOX_LINE_SPACING;

        let mut text_w = 0u32;
        for text in lines {
            let (w, _) = root.estimate_text_size(text, &text_font)?;
            text_w = text_w.max(w);
        }
        let text_h = (line_h * lines.len().saturating_sub(1) as f64 + size).round() as i32;
        let layout = BoxLayout::new(align, anchor, (text_w as i32, text_h), size, pad);
        let corners = layout.corners;

        root.draw(&Rectangle::new(
            corners,
            fill.to_color().mix(style.box_alpha).filled(),
        ))?;
        root.draw(&Rectangle::new(
            corners,
            BLACK
                .mix(style.box_alpha)
                .stroke_width(((scale * AXIS_LINE_PT).round() as u32).max(1)),
        ))?;

        let h_pos = match align {
            BoxAlign::LeftTop => HPos::Left,
            BoxAlign::RightBaseline => HPos::Right,
        };
        let line_font = text_font.pos(Pos::new(h_pos, VPos::Top));
        for (i, text) in lines.iter().enumerate() {
            let y = layout.text_top + (i as f64 * line_h).round() as i32;
            root.draw_text(text, &line_font, (layout.text_x, y))?;
        }
        Ok(())
    }
}

fn font(size: f64, family: FontFamily<'static>, bold: bool) -> TextStyle<'static> {
    let weight = if bold {
        FontStyle::Bold
    } else {
        FontStyle::Normal
    };
    TextStyle::from(FontDesc::new(family, size, weight))
}
