//! PDF Drawing Backend
//! A plotters `DrawingBackend` that records vector operators for a one-page PDF.
//!
//! The canvas works in device units of 0.1 pt with the origin at the top-left,
//! like the bitmap backend. The page content is wrapped in a transform that
//! maps those units onto PDF user space, so the recorded coordinates never
//! need flipping. Text is set in the standard-14 fonts; no font files are
//! embedded and no timestamps are written, so output is reproducible.

use crate::charts::metrics::{self, Face, ASCENT};
use crate::charts::rotated_text::RotatedText;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontFamily, FontStyle, FontTransform,
};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

/// Device units per point.
pub const UNITS_PER_PT: f64 = 10.0;

/// Bezier control distance for a quarter circle.
const KAPPA: f64 = 0.552_284_75;

/// Inclusive ink extent in device units: (x0, y0, x1, y1).
pub type InkBounds = (i32, i32, i32, i32);

/// Recorded page: content operators plus the resources they reference.
pub struct PdfCanvas {
    width: u32,
    height: u32,
    ops: Vec<Operation>,
    faces: BTreeSet<Face>,
    /// Alpha in thousandths, keyed to its ExtGState name.
    alphas: BTreeMap<u16, String>,
    ink: Option<InkBounds>,
}

impl PdfCanvas {
    pub fn new(width_pt: f64, height_pt: f64) -> Self {
        Self {
            width: (width_pt * UNITS_PER_PT).round() as u32,
            height: (height_pt * UNITS_PER_PT).round() as u32,
            ops: Vec::new(),
            faces: BTreeSet::new(),
            alphas: BTreeMap::new(),
            ink: None,
        }
    }

    /// Backend drawing onto this canvas; the canvas is usable again once it is dropped.
    pub fn backend(&mut self) -> PdfBackend<'_> {
        PdfBackend { canvas: self }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    /// Extent of everything painted in a colour other than white.
    pub fn ink_bounds(&self) -> Option<InkBounds> {
        self.ink
    }

    /// Serialize the page, cropping the MediaBox to the ink extent plus `pad_pt`.
    pub fn to_pdf_bytes(&self, pad_pt: f64) -> Result<Vec<u8>, lopdf::Error> {
        let page_h = self.height as f64 / UNITS_PER_PT;
        let (x0, y0, x1, y1) = self
            .ink
            .unwrap_or((0, 0, self.width as i32, self.height as i32));
        let media_box = vec![
            real(x0 as f64 / UNITS_PER_PT - pad_pt),
            real(page_h - y1 as f64 / UNITS_PER_PT - pad_pt),
            real(x1 as f64 / UNITS_PER_PT + pad_pt),
            real(page_h - y0 as f64 / UNITS_PER_PT + pad_pt),
        ];

        let mut operations = Vec::with_capacity(self.ops.len() + 3);
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![
                real(1.0 / UNITS_PER_PT),
                real(0.0),
                real(0.0),
                real(-1.0 / UNITS_PER_PT),
                real(0.0),
                real(page_h),
            ],
        ));
        operations.extend(self.ops.iter().cloned());
        operations.push(Operation::new("Q", vec![]));
        let content = Content { operations }.encode()?;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for face in &self.faces {
            let mut font = dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
            };
            if *face != Face::ZapfDingbats {
                font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            }
            fonts.set(face.resource_name(), doc.add_object(font));
        }

        let mut states = Dictionary::new();
        for (milli, name) in &self.alphas {
            let alpha = *milli as f64 / 1000.0;
            states.set(
                name.as_str(),
                dictionary! {
                    "Type" => "ExtGState",
                    "ca" => real(alpha),
                    "CA" => real(alpha),
                },
            );
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
            "ExtGState" => states,
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn note_ink(&mut self, color: BackendColor, (x0, y0): (f64, f64), (x1, y1): (f64, f64)) {
        if color.alpha <= 0.0 || color.rgb == (255, 255, 255) {
            return;
        }
        let bounds = (
            x0.min(x1).floor() as i32,
            y0.min(y1).floor() as i32,
            x0.max(x1).ceil() as i32,
            y0.max(y1).ceil() as i32,
        );
        self.ink = Some(match self.ink {
            Some((a, b, c, d)) => (
                a.min(bounds.0),
                b.min(bounds.1),
                c.max(bounds.2),
                d.max(bounds.3),
            ),
            None => bounds,
        });
    }

    fn alpha_state(&mut self, alpha: f64) -> Option<String> {
        let milli = (alpha.clamp(0.0, 1.0) * 1000.0).round() as u16;
        if milli >= 1000 {
            return None;
        }
        let next = self.alphas.len();
        Some(
            self.alphas
                .entry(milli)
                .or_insert_with(|| format!("GS{}", next))
                .clone(),
        )
    }

    /// Open a graphics state painting in `color`.
    fn begin(&mut self, color: BackendColor, stroke: bool) {
        self.ops.push(Operation::new("q", vec![]));
        if let Some(state) = self.alpha_state(color.alpha) {
            self.ops.push(Operation::new("gs", vec![name(&state)]));
        }
        let (r, g, b) = color.rgb;
        self.ops.push(Operation::new(
            if stroke { "RG" } else { "rg" },
            vec![
                real(r as f64 / 255.0),
                real(g as f64 / 255.0),
                real(b as f64 / 255.0),
            ],
        ));
    }

    fn end(&mut self) {
        self.ops.push(Operation::new("Q", vec![]));
    }

    fn path(&mut self, points: &[(f64, f64)]) {
        for (i, &(x, y)) in points.iter().enumerate() {
            let op = if i == 0 { "m" } else { "l" };
            self.ops.push(Operation::new(op, vec![real(x), real(y)]));
        }
    }

    fn stroke_path(&mut self, points: &[(f64, f64)], color: BackendColor, width: u32) {
        if points.len() < 2 || color.alpha <= 0.0 || width == 0 {
            return;
        }
        self.begin(color, true);
        self.ops
            .push(Operation::new("w", vec![real(width as f64)]));
        self.path(points);
        self.ops.push(Operation::new("S", vec![]));
        self.end();

        let half = width as f64 / 2.0;
        for &(x, y) in points {
            self.note_ink(color, (x - half, y - half), (x + half, y + half));
        }
    }

    fn fill_path(&mut self, points: &[(f64, f64)], color: BackendColor) {
        if points.len() < 3 || color.alpha <= 0.0 {
            return;
        }
        self.begin(color, false);
        self.path(points);
        self.ops.push(Operation::new("h", vec![]));
        self.ops.push(Operation::new("f", vec![]));
        self.end();

        for &(x, y) in points {
            self.note_ink(color, (x, y), (x, y));
        }
    }

    fn rect(&mut self, (x0, y0): (f64, f64), (x1, y1): (f64, f64), color: BackendColor, fill: bool, width: u32) {
        if color.alpha <= 0.0 {
            return;
        }
        if !fill {
            self.stroke_path(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)], color, width);
            return;
        }
        self.begin(color, false);
        self.ops.push(Operation::new(
            "re",
            vec![real(x0), real(y0), real(x1 - x0), real(y1 - y0)],
        ));
        self.ops.push(Operation::new("f", vec![]));
        self.end();
        self.note_ink(color, (x0, y0), (x1, y1));
    }

    fn circle(&mut self, (cx, cy): (f64, f64), r: f64, color: BackendColor, fill: bool, width: u32) {
        if color.alpha <= 0.0 || r <= 0.0 {
            return;
        }
        let k = r * KAPPA;
        self.begin(color, !fill);
        if !fill {
            self.ops.push(Operation::new("w", vec![real(width as f64)]));
        }
        self.ops.push(Operation::new("m", vec![real(cx + r), real(cy)]));
        let quarters = [
            [(cx + r, cy + k), (cx + k, cy + r), (cx, cy + r)],
            [(cx - k, cy + r), (cx - r, cy + k), (cx - r, cy)],
            [(cx - r, cy - k), (cx - k, cy - r), (cx, cy - r)],
            [(cx + k, cy - r), (cx + r, cy - k), (cx + r, cy)],
        ];
        for [(ax, ay), (bx, by), (ex, ey)] in quarters {
            self.ops.push(Operation::new(
                "c",
                vec![real(ax), real(ay), real(bx), real(by), real(ex), real(ey)],
            ));
        }
        self.ops
            .push(Operation::new(if fill { "f" } else { "S" }, vec![]));
        self.end();
        self.note_ink(color, (cx - r, cy - r), (cx + r, cy + r));
    }

    fn text(&mut self, text: &str, layout: TextLayout, color: BackendColor) {
        if color.alpha <= 0.0 || text.trim().is_empty() {
            return;
        }
        let runs = metrics::shape(text, layout.face);
        let (a, b, c, d) = layout.matrix;
        let (ox, oy) = layout.origin;

        self.begin(color, false);
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tm",
            vec![real(a), real(b), real(c), real(d), real(ox), real(oy)],
        ));
        for run in runs {
            self.faces.insert(run.face);
            self.ops.push(Operation::new(
                "Tf",
                vec![name(run.face.resource_name()), real(layout.size)],
            ));
            self.ops
                .push(Operation::new("Tj", vec![Object::string_literal(run.bytes)]));
        }
        self.ops.push(Operation::new("ET", vec![]));
        self.end();

        let (bx, by, bw, bh) = layout.bounds;
        self.note_ink(color, (bx, by), (bx + bw, by + bh));
    }
}

/// Placement of one line of text in device units.
#[derive(Debug, Clone, PartialEq)]
struct TextLayout {
    face: Face,
    size: f64,
    /// Text matrix without translation; y-down device space.
    matrix: (f64, f64, f64, f64),
    /// Baseline start.
    origin: (f64, f64),
    /// Bounding box: x, y, width, height.
    bounds: (f64, f64, f64, f64),
}

impl TextLayout {
    fn new<S: BackendTextStyle>(text: &str, style: &S, pos: BackendCoord) -> Self {
        let face = face_for(style);
        let size = style.size();
        let width = metrics::text_width(text, face, size);
        let ascent = size * ASCENT;

        let transform = style.transform();
        let (box_w, box_h) = match transform {
            FontTransform::Rotate90 | FontTransform::Rotate270 => (size, width),
            _ => (width, size),
        };

        let anchor = style.anchor();
        let bx = pos.0 as f64
            - match anchor.h_pos {
                HPos::Left => 0.0,
                HPos::Center => box_w / 2.0,
                HPos::Right => box_w,
            };
        let by = pos.1 as f64
            - match anchor.v_pos {
                VPos::Top => 0.0,
                VPos::Center => box_h / 2.0,
                VPos::Bottom => box_h,
            };

        // Text space is y-up; the page transform flips y, so the upright
        // matrix carries a negative d.
        let (matrix, origin) = match transform {
            FontTransform::Rotate90 => ((0.0, 1.0, 1.0, 0.0), (bx + size - ascent, by)),
            FontTransform::Rotate180 => ((-1.0, 0.0, 0.0, 1.0), (bx + width, by + size - ascent)),
            FontTransform::Rotate270 => ((0.0, -1.0, -1.0, 0.0), (bx + ascent, by + width)),
            _ => ((1.0, 0.0, 0.0, -1.0), (bx, by + ascent)),
        };

        Self {
            face,
            size,
            matrix,
            origin,
            bounds: (bx, by, box_w, box_h),
        }
    }

    /// Line whose upright box has its top-left corner at `pivot`, turned
    /// counterclockwise by `degrees` about it.
    fn turned<S: BackendTextStyle>(text: &str, style: &S, pivot: BackendCoord, degrees: f64) -> Self {
        let face = face_for(style);
        let size = style.size();
        let width = metrics::text_width(text, face, size);
        let (s, c) = degrees.to_radians().sin_cos();
        let (px, py) = to_f64(pivot);
        let turn = |x: f64, y: f64| (px + x * c + y * s, py - x * s + y * c);

        let corners = [turn(0.0, 0.0), turn(width, 0.0), turn(0.0, size), turn(width, size)];
        let x0 = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let x1 = corners.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let y0 = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let y1 = corners.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        Self {
            face,
            size,
            matrix: (c, -s, -s, -c),
            origin: turn(0.0, size * ASCENT),
            bounds: (x0, y0, x1 - x0, y1 - y0),
        }
    }
}

fn face_for<S: BackendTextStyle>(style: &S) -> Face {
    let monospace = match style.family() {
        FontFamily::Monospace => true,
        FontFamily::Name(family) => {
            let family = family.to_ascii_lowercase();
            family.contains("mono") || family.contains("courier")
        }
        _ => false,
    };
    Face::select(monospace, matches!(style.style(), FontStyle::Bold))
}

/// Drawing backend writing into a borrowed [`PdfCanvas`].
pub struct PdfBackend<'a> {
    canvas: &'a mut PdfCanvas,
}

impl DrawingBackend for PdfBackend<'_> {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let (x, y) = (point.0 as f64, point.1 as f64);
        self.canvas.rect((x, y), (x + 1.0, y + 1.0), color, true, 0);
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        self.canvas.stroke_path(
            &[to_f64(from), to_f64(to)],
            style.color(),
            style.stroke_width(),
        );
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        self.canvas.rect(
            to_f64(upper_left),
            to_f64(bottom_right),
            style.color(),
            fill,
            style.stroke_width(),
        );
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let points: Vec<(f64, f64)> = path.into_iter().map(to_f64).collect();
        self.canvas
            .stroke_path(&points, style.color(), style.stroke_width());
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        self.canvas.circle(
            to_f64(center),
            radius as f64,
            style.color(),
            fill,
            style.stroke_width(),
        );
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let points: Vec<(f64, f64)> = vert.into_iter().map(to_f64).collect();
        self.canvas.fill_path(&points, style.color());
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let layout = TextLayout::new(text, style, pos);
        self.canvas.text(text, layout, style.color());
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Infallible>> {
        let layout = TextLayout::new(text, style, (0, 0));
        let (_, _, w, h) = layout.bounds;
        Ok((w.ceil() as u32, h.ceil() as u32))
    }

    fn blit_bitmap(
        &mut self,
        _pos: BackendCoord,
        _size: (u32, u32),
        _src: &[u8],
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        // Raster images are never placed on the chart.
        Ok(())
    }
}

impl RotatedText for PdfBackend<'_> {
    fn draw_rotated_text<S: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &S,
        pivot: BackendCoord,
        degrees: f64,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let layout = TextLayout::turned(text, style, pivot, degrees);
        self.canvas.text(text, layout, style.color());
        Ok(())
    }
}

fn to_f64(point: BackendCoord) -> (f64, f64) {
    (point.0 as f64, point.1 as f64)
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::*;

    fn op_names(canvas: &PdfCanvas) -> Vec<String> {
        canvas
            .operations()
            .iter()
            .map(|op| op.operator.clone())
            .collect()
    }

    #[test]
    fn canvas_size_is_in_tenths_of_a_point() {
        let canvas = PdfCanvas::new(720.0, 432.0);
        assert_eq!(canvas.size(), (7200, 4320));
    }

    #[test]
    fn filled_rect_records_ink_and_alpha_state() {
        let mut canvas = PdfCanvas::new(100.0, 100.0);
        {
            let root = canvas.backend().into_drawing_area();
            root.fill(&WHITE).unwrap();
            root.draw(&Rectangle::new(
                [(100, 200), (300, 400)],
                RED.mix(0.5).filled(),
            ))
            .unwrap();
        }

        assert_eq!(canvas.ink_bounds(), Some((100, 200, 300, 400)));
        let ops = op_names(&canvas);
        assert!(ops.contains(&"gs".to_string()));
        assert!(ops.contains(&"re".to_string()));
    }

    #[test]
    fn white_background_is_not_ink() {
        let mut canvas = PdfCanvas::new(50.0, 50.0);
        {
            let root = canvas.backend().into_drawing_area();
            root.fill(&WHITE).unwrap();
        }
        assert_eq!(canvas.ink_bounds(), None);
    }

    #[test]
    fn centered_text_is_anchored_on_its_box() {
        let style = TextStyle::from(("sans-serif", 100.0).into_font())
            .pos(plotters::style::text_anchor::Pos::new(HPos::Center, VPos::Bottom));
        let layout = TextLayout::new("00", &style, (500, 1000));

        // Two Helvetica digits are 1.112 em wide.
        let (bx, by, bw, bh) = layout.bounds;
        assert!((bw - 111.2).abs() < 1e-6);
        assert_eq!(bh, 100.0);
        assert!((bx - (500.0 - 55.6)).abs() < 1e-6);
        assert_eq!(by, 900.0);
        assert!((layout.origin.1 - 980.0).abs() < 1e-6);
        assert_eq!(layout.face, Face::Helvetica);
    }

    #[test]
    fn rotated_text_swaps_its_box() {
        let style = TextStyle::from(("sans-serif", 100.0).into_font())
            .transform(FontTransform::Rotate90);
        let layout = TextLayout::new("00", &style, (0, 0));
        let (_, _, bw, bh) = layout.bounds;
        assert_eq!(bw, 100.0);
        assert!((bh - 111.2).abs() < 1e-6);
        assert_eq!(layout.matrix, (0.0, 1.0, 1.0, 0.0));
    }

    #[test]
    fn turned_text_reads_along_its_angle() {
        let style = TextStyle::from(("sans-serif", 100.0).into_font());
        let layout = TextLayout::turned("00", &style, (1000, 1000), 90.0);

        let (a, b, c, d) = layout.matrix;
        assert!(a.abs() < 1e-9 && d.abs() < 1e-9);
        assert!((b + 1.0).abs() < 1e-9 && (c + 1.0).abs() < 1e-9);
        assert!((layout.origin.0 - 1080.0).abs() < 1e-6);
        assert!((layout.origin.1 - 1000.0).abs() < 1e-6);

        let (bx, by, bw, bh) = layout.bounds;
        assert!((bx - 1000.0).abs() < 1e-6 && (by - 888.8).abs() < 1e-6);
        assert!((bw - 100.0).abs() < 1e-6 && (bh - 111.2).abs() < 1e-6);
    }

    #[test]
    fn writes_a_parseable_single_page_document() {
        let mut canvas = PdfCanvas::new(200.0, 100.0);
        {
            let root = canvas.backend().into_drawing_area();
            root.fill(&WHITE).unwrap();
            root.draw(&Text::new(
                "Max Time: 7.0ms ✓",
                (100, 100),
                ("monospace", 100.0).into_font(),
            ))
            .unwrap();
            root.draw(&PathElement::new(vec![(0, 500), (1000, 500)], Color::stroke_width(&BLACK, 5)))
                .unwrap();
        }

        let bytes = canvas.to_pdf_bytes(7.2).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
