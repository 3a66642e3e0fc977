//! Width measurement capability.
//!
//! Layout never shapes glyphs itself. Everything that needs an advance goes
//! through a [`TextMeasurer`], which the embedder backs with its font stack.

mod fixed_pitch;
mod metrics;

pub use fixed_pitch::FixedPitchMeasurer;
pub use metrics::{FontMetrics, LineMetrics};

use css_style_model::ComputedStyle;

/// A contiguous piece of text to measure, positioned on the line.
#[derive(Clone, Copy, Debug)]
pub struct TextRun<'text> {
    pub text: &'text str,
    /// Horizontal pen position where the run starts; only tabs depend on it.
    pub x_position: f32,
    /// Whether tabs advance to the next tab stop instead of measuring as a space.
    pub expand_tabs: bool,
    /// Tab stop interval in multiples of the space advance.
    pub tab_size: u32,
}

impl<'text> TextRun<'text> {
    pub const fn new(text: &'text str) -> Self {
        Self {
            text,
            x_position: 0.0,
            expand_tabs: false,
            tab_size: 8,
        }
    }

    /// A run whose tab handling follows `style` at pen position `x_position`.
    pub const fn styled(text: &'text str, style: &ComputedStyle, x_position: f32) -> Self {
        Self {
            text,
            x_position,
            expand_tabs: !style.collapse_white_space(),
            tab_size: style.tab_size,
        }
    }
}

/// Ink overflow outside the advance box, reported when `compute_bounds` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphOverflow {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub compute_bounds: bool,
}

impl GlyphOverflow {
    pub const fn requesting_bounds() -> Self {
        Self {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
            compute_bounds: true,
        }
    }

    /// Grow this overflow to also cover `other`.
    pub fn merge(&mut self, other: &Self) {
        self.left = self.left.max(other.left);
        self.right = self.right.max(other.right);
        self.top = self.top.max(other.top);
        self.bottom = self.bottom.max(other.bottom);
    }
}

/// Font-backed measurement consumed by the width analyzer and the line builders.
pub trait TextMeasurer {
    /// Advance width of `run` in pixels, including letter- and word-spacing.
    fn measure(&self, run: &TextRun<'_>, style: &ComputedStyle) -> f32;

    /// Like [`TextMeasurer::measure`] but also reports ink overflow.
    fn measure_with_overflow(
        &self,
        run: &TextRun<'_>,
        style: &ComputedStyle,
        overflow: &mut GlyphOverflow,
    ) -> f32 {
        let _unused = overflow;
        self.measure(run, style)
    }

    fn word_spacing(&self, style: &ComputedStyle) -> f32 {
        style.word_spacing
    }

    fn is_fixed_pitch(&self, style: &ComputedStyle) -> bool;

    fn space_width(&self, style: &ComputedStyle) -> f32 {
        self.measure(&TextRun::new(" "), style)
    }

    fn font_metrics(&self, style: &ComputedStyle) -> FontMetrics;

    /// Whether `text` needs shaping beyond per-character advances
    /// (combining marks, ligature-dependent scripts, and similar).
    fn requires_complex_path(&self, text: &str, style: &ComputedStyle) -> bool {
        let _unused = (text, style);
        false
    }
}

/// Advance of a tab starting at `x_position`, snapping to the next stop.
///
/// A stop closer than half a space is skipped so tabs never collapse to nothing.
pub fn tab_width(tab_size: u32, space_width: f32, x_position: f32) -> f32 {
    let interval = space_width * tab_size as f32;
    if interval <= 0.0 {
        return 0.0;
    }
    let delta = interval - x_position.rem_euclid(interval);
    if delta < space_width / 2.0 {
        delta + interval
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Panics
    /// Panics if tab stops are not computed relative to the pen position.
    #[test]
    fn tab_advances_to_next_stop() {
        assert!((tab_width(8, 10.0, 0.0) - 80.0).abs() < f32::EPSILON);
        assert!((tab_width(8, 10.0, 30.0) - 50.0).abs() < f32::EPSILON);
        // 78px leaves only 2px to the stop, less than half a space.
        assert!((tab_width(8, 10.0, 78.0) - 82.0).abs() < f32::EPSILON);
        assert!(tab_width(0, 10.0, 12.0).abs() < f32::EPSILON);
    }
}
