//! Vertical font metrics and the line box height derived from them.

use css_style_model::ComputedStyle;

/// Font metrics in pixels for the primary font of a style.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FontMetrics {
    /// Ascent from the baseline (positive, upward).
    pub ascent: f32,
    /// Descent from the baseline (positive, downward).
    pub descent: f32,
    /// Extra leading recommended by the font (line gap).
    pub line_gap: f32,
}

impl FontMetrics {
    /// Metrics used when the font cannot report any.
    pub fn fallback(font_size: f32) -> Self {
        Self {
            ascent: font_size * 0.8,
            descent: font_size * 0.2,
            line_gap: 0.0,
        }
    }
}

/// Resolved per-line vertical metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Height of the line box (CSS line-height), rounded for layout.
    pub height: f32,
    /// Distance from the top of the line box to the baseline.
    pub baseline: f32,
}

impl LineMetrics {
    /// Half-leading model: the glyph box is centered in the line box.
    pub fn resolve(font: FontMetrics, style: &ComputedStyle) -> Self {
        let glyph_height = (font.ascent + font.descent).floor();
        let normal_height = glyph_height + font.line_gap.round();
        let height = style.line_height.unwrap_or(normal_height);
        let half_leading = ((height - glyph_height) / 2.0).floor();
        Self {
            height,
            baseline: half_leading + font.ascent.round(),
        }
    }
}
