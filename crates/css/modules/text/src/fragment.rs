//! Text fragments: a text node's characters plus derived width caches.

use crate::TextContext;
use crate::preferred_widths::{compute_preferred_widths, width_from_cache};
use css_style_model::ComputedStyle;
use std::rc::Rc;
use tracing::trace;

/// Per-fragment character classification, recomputed with the widths.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FragmentFlags(u8);

impl FragmentFlags {
    pub const NONE: Self = Self(0);
    /// A tab that is preserved (not collapsed); widths depend on the lead width.
    pub const HAS_TAB: Self = Self(1);
    /// A preserved newline (forced break).
    pub const HAS_BREAK: Self = Self(1 << 1);
    /// Some position allows a soft wrap.
    pub const HAS_BREAKABLE_CHAR: Self = Self(1 << 2);
    pub const HAS_BEGIN_WHITE_SPACE: Self = Self(1 << 3);
    pub const HAS_END_WHITE_SPACE: Self = Self(1 << 4);
    pub const ALL_ASCII: Self = Self(1 << 5);

    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Min/max content contributions of one fragment.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PreferredWidths {
    pub min_width: f32,
    pub max_width: f32,
    /// Minimum width of the first unbreakable run; zero if the fragment can break at its start.
    pub begin_min_width: f32,
    /// Minimum width of the last unbreakable run.
    pub end_min_width: f32,
    pub flags: FragmentFlags,
}

/// Widths adjusted for concatenation with neighbouring fragments on a line.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TrimmedWidths {
    pub begin_min_width: f32,
    pub end_min_width: f32,
    pub begin_max_width: f32,
    pub end_max_width: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub begins_with_white_space: bool,
    pub ends_with_white_space: bool,
    pub has_breakable_char: bool,
    pub has_break: bool,
}

/// A text node's renderable content.
///
/// The character buffer is shared with the DOM mirror and never mutated in
/// place; [`TextFragment::set_text`] swaps it and drops the caches.
#[derive(Clone, Debug)]
pub struct TextFragment {
    text: Rc<str>,
    all_ascii: bool,
    widths: Option<PreferredWidths>,
    widths_lead: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<Rc<str>>) -> Self {
        let text = text.into();
        Self {
            all_ascii: text.is_ascii(),
            text,
            widths: None,
            widths_lead: 0.0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shared_text(&self) -> Rc<str> {
        Rc::clone(&self.text)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub const fn is_all_ascii(&self) -> bool {
        self.all_ascii
    }

    /// Replace the characters; every cache is discarded.
    pub fn set_text(&mut self, text: impl Into<Rc<str>>) {
        self.text = text.into();
        self.all_ascii = self.text.is_ascii();
        self.invalidate();
    }

    /// Drop cached widths; call on any style change affecting text.
    pub fn invalidate(&mut self) {
        self.widths = None;
    }

    pub const fn preferred_widths_dirty(&self) -> bool {
        self.widths.is_none()
    }

    /// Cached [`compute_preferred_widths`].
    ///
    /// Fragments with preserved tabs are recomputed whenever the lead width changes.
    pub fn preferred_widths(
        &mut self,
        style: &ComputedStyle,
        context: TextContext<'_>,
        lead_width: f32,
    ) -> PreferredWidths {
        if let Some(cached) = self.widths {
            let lead_matters = cached.flags.contains(FragmentFlags::HAS_TAB);
            if !lead_matters || cached_lead_matches(self.widths_lead, lead_width) {
                return cached;
            }
        }
        trace!(len = self.text.len(), lead_width, "recomputing preferred widths");
        let computed = compute_preferred_widths(&self.text, style, context, lead_width);
        self.widths = Some(computed);
        self.widths_lead = lead_width;
        computed
    }

    pub fn min_width(&mut self, style: &ComputedStyle, context: TextContext<'_>) -> f32 {
        self.preferred_widths(style, context, 0.0).min_width
    }

    pub fn max_width(&mut self, style: &ComputedStyle, context: TextContext<'_>) -> f32 {
        self.preferred_widths(style, context, 0.0).max_width
    }

    /// Widths for merging into a running line, given whether leading spaces
    /// will be stripped because the previous fragment ended in collapsible space.
    ///
    /// Updates `strip_front_spaces` for the next fragment.
    pub fn trimmed_preferred_widths(
        &mut self,
        style: &ComputedStyle,
        context: TextContext<'_>,
        lead_width: f32,
        strip_front_spaces: &mut bool,
    ) -> TrimmedWidths {
        let collapse_white_space = style.collapse_white_space();
        if !collapse_white_space {
            *strip_front_spaces = false;
        }

        let widths = self.preferred_widths(style, context, lead_width);
        let flags = widths.flags;
        let mut trimmed = TrimmedWidths {
            begins_with_white_space: !*strip_front_spaces
                && flags.contains(FragmentFlags::HAS_BEGIN_WHITE_SPACE),
            ends_with_white_space: flags.contains(FragmentFlags::HAS_END_WHITE_SPACE),
            ..TrimmedWidths::default()
        };

        if self.text.is_empty() || (*strip_front_spaces && self.contains_only_white_space()) {
            return trimmed;
        }

        trimmed.min_width = widths.min_width;
        trimmed.max_width = widths.max_width;
        trimmed.begin_min_width = widths.begin_min_width;
        trimmed.end_min_width = widths.end_min_width;
        trimmed.has_breakable_char = flags.contains(FragmentFlags::HAS_BREAKABLE_CHAR);
        trimmed.has_break = flags.contains(FragmentFlags::HAS_BREAK);

        let starts_with_space = match self.text.chars().next() {
            Some(' ' | '\t') => true,
            Some('\n') => !style.preserve_newline(),
            _ => false,
        };
        if starts_with_space {
            if *strip_front_spaces {
                trimmed.max_width -= context.measurer.space_width(style);
            } else {
                trimmed.max_width += context.measurer.word_spacing(style);
            }
        }

        *strip_front_spaces = collapse_white_space && trimmed.ends_with_white_space;

        if !style.auto_wrap() || trimmed.min_width > trimmed.max_width {
            trimmed.min_width = trimmed.max_width;
        }

        if trimmed.has_break {
            self.line_max_widths(style, context, lead_width, &mut trimmed);
        }
        trimmed
    }

    /// Begin/end max widths of a fragment split by preserved newlines.
    fn line_max_widths(
        &self,
        style: &ComputedStyle,
        context: TextContext<'_>,
        lead_width: f32,
        trimmed: &mut TrimmedWidths,
    ) {
        trimmed.begin_max_width = trimmed.max_width;
        trimmed.end_max_width = trimmed.max_width;
        let mut lead = lead_width;
        let mut first_line = true;
        let line_count = self.text.split('\n').count();
        for (line_index, line) in self.text.split('\n').enumerate() {
            if line.is_empty() {
                if first_line {
                    trimmed.begin_max_width = 0.0;
                    first_line = false;
                    lead = 0.0;
                }
            } else {
                trimmed.end_max_width = width_from_cache(
                    line,
                    self.all_ascii,
                    style,
                    context.measurer,
                    lead + trimmed.end_max_width,
                );
                if first_line {
                    first_line = false;
                    lead = 0.0;
                    trimmed.begin_max_width = trimmed.end_max_width;
                }
            }
            // A buffer ending in a newline leaves nothing to carry onto the next line.
            if line_index + 2 == line_count && self.text.ends_with('\n') {
                trimmed.end_max_width = 0.0;
            }
        }
    }

    pub fn contains_only_white_space(&self) -> bool {
        self.text.chars().all(|character| matches!(character, ' ' | '\t' | '\n'))
    }

    pub fn is_all_collapsible_white_space(&self, style: &ComputedStyle) -> bool {
        self.text
            .chars()
            .all(|character| style.is_collapsible_white_space(character))
    }
}

fn cached_lead_matches(cached: f32, requested: f32) -> bool {
    cached.to_bits() == requested.to_bits()
}
