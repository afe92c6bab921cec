//! Text measurement for label placement.
//!
//! Gauges only need the extents of a label to anchor it, so measurement is
//! behind a small trait. [`FixedMetrics`] needs no font and is the default;
//! [`FontMetrics`] measures with a real TTF/OTF face through rusttype.

use rusttype::{point, Font, Scale};

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Pixel size used for tick labels and readouts unless a gauge scales it.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

pub trait TextMetrics: Send + Sync {
    /// Extent of `text` laid out on one line, top-left corner at the origin.
    fn bounding_rect(&self, text: &str, size: f64) -> Rect;

    /// Distance from the top of the line box to the baseline.
    fn ascent(&self, size: f64) -> f64;

    /// Height of a lowercase `x`.
    fn x_height(&self, size: f64) -> f64;
}

/// Monospace approximation: every glyph advances by the same fraction of the size.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    pub advance: f64,
    pub ascent: f64,
    pub descent: f64,
    pub x_height: f64,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            advance: 0.6,
            ascent: 0.9,
            descent: 0.3,
            x_height: 0.5,
        }
    }
}

impl TextMetrics for FixedMetrics {
    fn bounding_rect(&self, text: &str, size: f64) -> Rect {
        let glyphs = text.chars().count() as f64;
        Rect::from_size(glyphs * self.advance * size, (self.ascent + self.descent) * size)
    }

    fn ascent(&self, size: f64) -> f64 {
        self.ascent * size
    }

    fn x_height(&self, size: f64) -> f64 {
        self.x_height * size
    }
}

/// Metrics backed by a parsed font face.
pub struct FontMetrics {
    font: Font<'static>,
}

impl FontMetrics {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = Font::try_from_vec(data).ok_or(Error::InvalidFont)?;
        Ok(Self { font })
    }

    pub fn font(&self) -> &Font<'static> {
        &self.font
    }
}

impl std::fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMetrics")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl TextMetrics for FontMetrics {
    fn bounding_rect(&self, text: &str, size: f64) -> Rect {
        let scale = Scale::uniform(size as f32);
        let v_metrics = self.font.v_metrics(scale);
        let width = self
            .font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        Rect::from_size(
            f64::from(width),
            f64::from(v_metrics.ascent - v_metrics.descent),
        )
    }

    fn ascent(&self, size: f64) -> f64 {
        f64::from(self.font.v_metrics(Scale::uniform(size as f32)).ascent)
    }

    fn x_height(&self, size: f64) -> f64 {
        self.font
            .glyph('x')
            .scaled(Scale::uniform(size as f32))
            .exact_bounding_box()
            .map(|bb| f64::from(bb.max.y - bb.min.y))
            .unwrap_or(size * 0.5)
    }
}

/// Fixed-point rendering of `value` with `precision` decimals, never "-0".
pub fn format_fixed(value: f64, precision: usize) -> String {
    let text = format!("{value:.precision$}");
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_metrics_scale_with_length_and_size() {
        let m = FixedMetrics::default();
        let r = m.bounding_rect("100", 10.0);
        assert!((r.width - 18.0).abs() < 1e-9);
        assert!((r.height - 12.0).abs() < 1e-9);
        assert_eq!(m.bounding_rect("", 10.0).width, 0.0);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        assert!(matches!(
            FontMetrics::from_bytes(vec![0, 1, 2, 3]),
            Err(Error::InvalidFont)
        ));
    }

    #[test]
    fn format_fixed_drops_negative_zero() {
        assert_eq!(format_fixed(-0.2, 0), "0");
        assert_eq!(format_fixed(-0.0, 1), "0.0");
        assert_eq!(format_fixed(-1.5, 1), "-1.5");
        assert_eq!(format_fixed(12.346, 2), "12.35");
    }
}
