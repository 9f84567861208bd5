//! Text metrics for the PDF standard-14 fonts.
//!
//! Widths are AFM advance widths in 1/1000 em for the printable ASCII range.

/// Helvetica widths for ' ' (0x20) through '~' (0x7E).
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Helvetica-Bold widths for ' ' (0x20) through '~' (0x7E).
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Ascent of the standard faces as a fraction of the font size.
pub const ASCENT: f64 = 0.8;

const COURIER: u16 = 600;
/// ZapfDingbats a19 (check mark).
const DINGBAT_CHECK: u16 = 755;
const FALLBACK: u16 = 556;

/// Standard-14 face a run of text is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
    ZapfDingbats,
}

impl Face {
    pub fn select(monospace: bool, bold: bool) -> Self {
        match (monospace, bold) {
            (true, true) => Face::CourierBold,
            (true, false) => Face::Courier,
            (false, true) => Face::HelveticaBold,
            (false, false) => Face::Helvetica,
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Face::Helvetica => "Helvetica",
            Face::HelveticaBold => "Helvetica-Bold",
            Face::Courier => "Courier",
            Face::CourierBold => "Courier-Bold",
            Face::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Resource name used inside content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            Face::Helvetica => "F1",
            Face::HelveticaBold => "F2",
            Face::Courier => "F3",
            Face::CourierBold => "F4",
            Face::ZapfDingbats => "F5",
        }
    }

    fn char_width(self, ch: char) -> u16 {
        match self {
            Face::Courier | Face::CourierBold => COURIER,
            Face::ZapfDingbats => DINGBAT_CHECK,
            Face::Helvetica | Face::HelveticaBold => {
                let table = if self == Face::Helvetica {
                    &HELVETICA
                } else {
                    &HELVETICA_BOLD
                };
                match ch as u32 {
                    0x20..=0x7E => table[(ch as usize) - 0x20],
                    _ => FALLBACK,
                }
            }
        }
    }
}

/// Characters with no WinAnsi code that are set in ZapfDingbats instead.
pub fn dingbat_code(ch: char) -> Option<u8> {
    match ch {
        '✓' => Some(b'3'),
        '✔' => Some(b'4'),
        _ => None,
    }
}

/// A piece of a text line set in a single face.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub face: Face,
    pub bytes: Vec<u8>,
    pub width_em: f64,
}

/// Split a line into face runs, encoding each character for its face.
///
/// Characters outside printable ASCII that have no dingbat are replaced by '?'.
pub fn shape(text: &str, face: Face) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();

    for ch in text.chars() {
        let (run_face, byte, width) = match dingbat_code(ch) {
            Some(code) => (Face::ZapfDingbats, code, Face::ZapfDingbats.char_width(ch)),
            None if (' '..='~').contains(&ch) => (face, ch as u8, face.char_width(ch)),
            None => (face, b'?', face.char_width('?')),
        };

        match runs.last_mut() {
            Some(run) if run.face == run_face => {
                run.bytes.push(byte);
                run.width_em += width as f64 / 1000.0;
            }
            _ => runs.push(Run {
                face: run_face,
                bytes: vec![byte],
                width_em: width as f64 / 1000.0,
            }),
        }
    }

    runs
}

/// Advance width of `text` at `size`, in the same unit as `size`.
pub fn text_width(text: &str, face: Face, size: f64) -> f64 {
    shape(text, face).iter().map(|r| r.width_em).sum::<f64>() * size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_half_an_em_wide() {
        let w = text_width("0", Face::Helvetica, 10.0);
        assert!((w - 5.56).abs() < 1e-9);
    }

    #[test]
    fn courier_is_fixed_pitch() {
        assert_eq!(
            text_width("iiii", Face::Courier, 10.0),
            text_width("WWWW", Face::Courier, 10.0)
        );
    }

    #[test]
    fn check_mark_switches_to_dingbats() {
        let runs = shape("200ms UI Target ✓", Face::Helvetica);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].face, Face::Helvetica);
        assert_eq!(runs[0].bytes, b"200ms UI Target ".to_vec());
        assert_eq!(runs[1].face, Face::ZapfDingbats);
        assert_eq!(runs[1].bytes, vec![b'3']);
    }

    #[test]
    fn unknown_characters_become_question_marks() {
        let runs = shape("σ", Face::Courier);
        assert_eq!(runs[0].bytes, vec![b'?']);
    }
}
