//! Advance widths for the two standard Type1 fonts the voucher uses.
//!
//! Widths are in 1/1000 em, indexed from ASCII 32 (space) to 126 (`~`).
//! Anything outside that range is measured with [`FALLBACK_WIDTH`].

use serde::Serialize;

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Font face used by a text instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    /// PostScript name of the standard font backing this weight.
    pub fn base_font(self) -> &'static str {
        match self {
            FontWeight::Regular => "Helvetica",
            FontWeight::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name used inside page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontWeight::Regular => "F1",
            FontWeight::Bold => "F2",
        }
    }

    fn char_width(self, ch: char) -> u16 {
        let table = match self {
            FontWeight::Regular => &HELVETICA,
            FontWeight::Bold => &HELVETICA_BOLD,
        };
        let code = ch as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            FALLBACK_WIDTH
        }
    }
}

/// Width of `text` in points when set at `size`.
pub fn text_width(text: &str, weight: FontWeight, size: f32) -> f32 {
    let units: u32 = text.chars().map(|ch| u32::from(weight.char_width(ch))).sum();
    units as f32 * size / 1000.0
}

/// Cut `text` so it fits in `max_width`, marking the cut with `...`.
pub fn fit_to_width(text: &str, weight: FontWeight, size: f32, max_width: f32) -> String {
    if text_width(text, weight, size) <= max_width {
        return text.to_string();
    }

    let ellipsis = "...";
    let budget = max_width - text_width(ellipsis, weight, size);
    let mut fitted = String::new();
    let mut used = 0.0;
    for ch in text.chars() {
        let w = f32::from(weight.char_width(ch)) * size / 1000.0;
        if used + w > budget {
            break;
        }
        used += w;
        fitted.push(ch);
    }
    fitted.truncate(fitted.trim_end().len());
    fitted.push_str(ellipsis);
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_share_one_width() {
        let a = text_width("1111", FontWeight::Regular, 10.0);
        let b = text_width("8888", FontWeight::Regular, 10.0);
        assert!((a - b).abs() < f32::EPSILON);
        assert!((a - 22.24).abs() < 0.001);
    }

    #[test]
    fn test_bold_is_wider_for_letters() {
        let regular = text_width("Treasurer", FontWeight::Regular, 9.0);
        let bold = text_width("Treasurer", FontWeight::Bold, 9.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_fit_to_width_keeps_short_text() {
        assert_eq!(fit_to_width("Payee", FontWeight::Regular, 9.0, 200.0), "Payee");
    }

    #[test]
    fn test_fit_to_width_truncates_long_text() {
        let long = "Department of Public Works and Highways Regional Office";
        let fitted = fit_to_width(long, FontWeight::Regular, 9.0, 80.0);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, FontWeight::Regular, 9.0) <= 80.0);
    }
}
