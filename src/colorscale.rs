use plotters::style::RGBColor;

use crate::error::{MapError, Result};

// Stop lists as plotly ships them (ColorBrewer, CARTO, matplotlib).
const OR_RD: &[(u8, u8, u8)] = &[
    (0xff, 0xf7, 0xec),
    (0xfe, 0xe8, 0xc8),
    (0xfd, 0xd4, 0x9e),
    (0xfd, 0xbb, 0x84),
    (0xfc, 0x8d, 0x59),
    (0xef, 0x65, 0x48),
    (0xd7, 0x30, 0x1f),
    (0xb3, 0x00, 0x00),
    (0x7f, 0x00, 0x00),
];

const YL_OR_RD: &[(u8, u8, u8)] = &[
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xbd, 0x00, 0x26),
    (0x80, 0x00, 0x26),
];

const TEAL: &[(u8, u8, u8)] = &[
    (209, 238, 234),
    (168, 219, 217),
    (133, 196, 201),
    (104, 171, 184),
    (79, 144, 166),
    (59, 115, 143),
    (42, 86, 116),
];

const VIRIDIS: &[(u8, u8, u8)] = &[
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x49, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6e, 0xce, 0x58),
    (0xb5, 0xde, 0x2b),
    (0xfd, 0xe7, 0x25),
];

/// A continuous color scale built from evenly spaced stops.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    pub name: &'static str,
    stops: &'static [(u8, u8, u8)],
}

impl ColorScale {
    /// Look a scale up by name, ignoring case.
    pub fn named(name: &str) -> Result<ColorScale> {
        let (name, stops) = match name.to_ascii_lowercase().as_str() {
            "orrd" => ("OrRd", OR_RD),
            "ylorrd" => ("YlOrRd", YL_OR_RD),
            "teal" => ("teal", TEAL),
            "viridis" => ("viridis", VIRIDIS),
            _ => return Err(MapError::UnknownColorScale(name.to_string())),
        };
        Ok(ColorScale { name, stops })
    }

    /// Color at position `t` in `[0, 1]`; out-of-range positions clamp.
    pub fn color_at(&self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.stops.len() - 1;
        let scaled = t * last as f64;
        let lower = (scaled.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        let frac = scaled - lower as f64;

        let (r0, g0, b0) = self.stops[lower];
        let (r1, g1, b1) = self.stops[upper];
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(ColorScale::named("orrd").unwrap().name, "OrRd");
        assert_eq!(ColorScale::named("Viridis").unwrap().name, "viridis");
        assert!(matches!(
            ColorScale::named("rainbow-ish"),
            Err(MapError::UnknownColorScale(_))
        ));
    }

    #[test]
    fn ends_match_first_and_last_stop() {
        let scale = ColorScale::named("viridis").unwrap();
        assert_eq!(scale.color_at(0.0), RGBColor(0x44, 0x01, 0x54));
        assert_eq!(scale.color_at(1.0), RGBColor(0xfd, 0xe7, 0x25));
        assert_eq!(scale.color_at(-3.0), scale.color_at(0.0));
        assert_eq!(scale.color_at(12.0), scale.color_at(1.0));
    }

    #[test]
    fn midpoint_interpolates_between_stops() {
        // teal has 7 stops, so 0.5 lands exactly on the fourth one
        let scale = ColorScale::named("teal").unwrap();
        assert_eq!(scale.color_at(0.5), RGBColor(104, 171, 184));

        // 1/16 is halfway between the first two OrRd stops
        let scale = ColorScale::named("OrRd").unwrap();
        assert_eq!(scale.color_at(1.0 / 16.0), RGBColor(0xff, 0xf0, 0xda));
    }
}
