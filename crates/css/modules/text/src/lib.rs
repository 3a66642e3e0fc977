//! CSS Text Module Level 3 — Line breaking, white space, intrinsic text widths.
//! Spec: <https://www.w3.org/TR/css-text-3/>

pub mod break_iterator;
pub mod fragment;
pub mod hyphenation;
pub mod measurement;
pub mod preferred_widths;

pub use break_iterator::{BreakRules, LineBreakIterator, LineBreakMode};
pub use fragment::{FragmentFlags, PreferredWidths, TextFragment, TrimmedWidths};
pub use hyphenation::{HyphenLocations, Hyphenator, NoHyphenation, WordListHyphenator};
pub use measurement::{
    FixedPitchMeasurer, FontMetrics, GlyphOverflow, LineMetrics, TextMeasurer, TextRun,
};
pub use preferred_widths::{compute_preferred_widths, width_from_cache};

/// The font-backed capabilities text layout consults.
#[derive(Clone, Copy)]
pub struct TextContext<'ctx> {
    pub measurer: &'ctx dyn TextMeasurer,
    pub hyphenator: &'ctx dyn Hyphenator,
}

impl<'ctx> TextContext<'ctx> {
    pub const fn new(measurer: &'ctx dyn TextMeasurer, hyphenator: &'ctx dyn Hyphenator) -> Self {
        Self {
            measurer,
            hyphenator,
        }
    }
}
