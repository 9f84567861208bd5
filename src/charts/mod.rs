//! Charts module - Chart layout and rendering

mod bars;
mod figure;
pub mod metrics;
pub mod pdf_backend;
mod renderer;
pub mod rotated_text;
mod style;
mod text_fallback;

pub use bars::{layout_bars, value_label, BarSpec, BarTone, BELOW_RESOLUTION_LABEL};
pub use figure::ChartFigure;
pub use pdf_backend::{PdfBackend, PdfCanvas};
pub use renderer::{ChartRenderer, PlotFrame};
pub use style::{ChartStyle, Rgb};
pub use rotated_text::{RotatedLabel, RotatedText};
pub use text_fallback::ResilientText;
