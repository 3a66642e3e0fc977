use super::{FontMetrics, TextMeasurer, TextRun, tab_width};
use css_style_model::ComputedStyle;

/// Measurer for fonts where every glyph, including the space, shares one advance.
///
/// Used headless and by terminal-style embedders; the advance scales with the
/// style's font size relative to `reference_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPitchMeasurer {
    advance: f32,
    reference_size: f32,
}

impl FixedPitchMeasurer {
    /// A measurer with `advance` pixels per character at every font size.
    pub const fn new(advance: f32) -> Self {
        Self {
            advance,
            reference_size: 0.0,
        }
    }

    /// A measurer with `advance` pixels per character at `reference_size`.
    pub const fn scaled(advance: f32, reference_size: f32) -> Self {
        Self {
            advance,
            reference_size,
        }
    }

    fn advance_for(&self, style: &ComputedStyle) -> f32 {
        if self.reference_size > 0.0 {
            self.advance * style.font_size / self.reference_size
        } else {
            self.advance
        }
    }
}

impl TextMeasurer for FixedPitchMeasurer {
    fn measure(&self, run: &TextRun<'_>, style: &ComputedStyle) -> f32 {
        let advance = self.advance_for(style);
        let mut width = 0.0;
        for (index, character) in run.text.chars().enumerate() {
            match character {
                '\u{ad}' | '\u{200b}' => continue,
                '\t' if run.expand_tabs => {
                    width += tab_width(run.tab_size, advance, run.x_position + width);
                }
                ' ' | '\u{a0}' | '\t' | '\n' => {
                    width += advance;
                    if index > 0 {
                        width += style.word_spacing;
                    }
                }
                _ => width += advance,
            }
            width += style.letter_spacing;
        }
        width
    }

    fn is_fixed_pitch(&self, _style: &ComputedStyle) -> bool {
        true
    }

    fn space_width(&self, style: &ComputedStyle) -> f32 {
        self.advance_for(style)
    }

    fn font_metrics(&self, style: &ComputedStyle) -> FontMetrics {
        FontMetrics::fallback(style.font_size)
    }
}
