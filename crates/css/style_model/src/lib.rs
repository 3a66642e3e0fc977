//! Computed style snapshot consumed by inline layout.
//!
//! The cascade lives outside this workspace; layout only ever reads a
//! `ComputedStyle` that was resolved for a node before the pass started.

mod text;

pub use text::{Direction, Hyphens, LineBreak, NbspMode, WhiteSpace, WordBreak};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    /// Whether painting this color would produce any visible output.
    #[inline]
    pub const fn is_visible(self) -> bool {
        self.alpha > 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BorderWidths {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    Flex,
    InlineFlex,
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Top,
    Bottom,
    Middle,
    TextTop,
    TextBottom,
    Sub,
    Super,
    Length(f32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEmphasis {
    #[default]
    None,
    Mark,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    pub color: Rgba,
    pub background_color: Rgba,
    pub border_width: BorderWidths,
    pub border_style: BorderStyle,
    pub border_color: Rgba,
    pub font_size: f32,
    /// Computed line-height in pixels when specified; None represents 'normal'.
    pub line_height: Option<f32>,
    pub position: Position,
    pub float: Float,
    pub display: Display,
    pub margin: Edges,
    pub padding: Edges,
    pub vertical_align: VerticalAlign,
    pub text_emphasis: TextEmphasis,
    // Typography
    pub font_family: Option<String>,
    /// Font weight (100-900, with 400=normal, 700=bold). Defaults to 400.
    pub font_weight: u16,
    // Text
    pub white_space: WhiteSpace,
    pub word_break: WordBreak,
    pub line_break: LineBreak,
    pub direction: Direction,
    pub hyphens: Hyphens,
    /// Content language used for hyphenation and line breaking; None means unknown.
    pub locale: Option<String>,
    /// `hyphenate-limit-chars` prefix minimum; None represents 'auto'.
    pub hyphenate_limit_before: Option<u8>,
    /// `hyphenate-limit-chars` suffix minimum; None represents 'auto'.
    pub hyphenate_limit_after: Option<u8>,
    /// `hyphenate-character`; None represents 'auto' (a hyphen-minus).
    pub hyphenate_character: Option<String>,
    pub nbsp_mode: NbspMode,
    pub word_spacing: f32,
    pub letter_spacing: f32,
    /// Tab size in multiples of the space advance.
    pub tab_size: u32,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            color: Rgba {
                red: 0,
                green: 0,
                blue: 0,
                alpha: 255,
            },
            background_color: Rgba::default(),
            border_width: BorderWidths::default(),
            border_style: BorderStyle::None,
            border_color: Rgba::default(),
            font_size: 16.0,
            line_height: None,
            position: Position::Static,
            float: Float::None,
            display: Display::Inline,
            margin: Edges::default(),
            padding: Edges::default(),
            vertical_align: VerticalAlign::Baseline,
            text_emphasis: TextEmphasis::None,
            font_family: None,
            font_weight: 400,
            white_space: WhiteSpace::Normal,
            word_break: WordBreak::Normal,
            line_break: LineBreak::Auto,
            direction: Direction::Ltr,
            hyphens: Hyphens::Manual,
            locale: None,
            hyphenate_limit_before: None,
            hyphenate_limit_after: None,
            hyphenate_character: None,
            nbsp_mode: NbspMode::Normal,
            word_spacing: 0.0,
            letter_spacing: 0.0,
            tab_size: 8,
        }
    }
}

impl ComputedStyle {
    /// A block-level style inheriting this style's inherited (text) properties.
    ///
    /// Used for anonymous boxes, which never carry box decorations of their own.
    pub fn anonymous_block(&self) -> Self {
        Self {
            display: Display::Block,
            color: self.color,
            font_size: self.font_size,
            line_height: self.line_height,
            font_family: self.font_family.clone(),
            font_weight: self.font_weight,
            white_space: self.white_space,
            word_break: self.word_break,
            line_break: self.line_break,
            direction: self.direction,
            hyphens: self.hyphens,
            locale: self.locale.clone(),
            hyphenate_limit_before: self.hyphenate_limit_before,
            hyphenate_limit_after: self.hyphenate_limit_after,
            hyphenate_character: self.hyphenate_character.clone(),
            nbsp_mode: self.nbsp_mode,
            word_spacing: self.word_spacing,
            letter_spacing: self.letter_spacing,
            tab_size: self.tab_size,
            ..Self::default()
        }
    }

    /// Outer display type: whether the box participates in an inline formatting context.
    #[inline]
    pub const fn is_inline_level(&self) -> bool {
        matches!(
            self.display,
            Display::Inline | Display::InlineBlock | Display::InlineFlex
        )
    }

    #[inline]
    pub const fn is_floating(&self) -> bool {
        !matches!(self.float, Float::None)
    }

    #[inline]
    pub const fn is_out_of_flow_positioned(&self) -> bool {
        matches!(self.position, Position::Absolute | Position::Fixed)
    }

    #[inline]
    pub const fn is_floating_or_out_of_flow(&self) -> bool {
        self.is_floating() || self.is_out_of_flow_positioned()
    }

    /// Whether an inline box with this style must generate its own line box
    /// fragment (something has to be painted or positioned for it).
    pub fn needs_own_line_box(&self) -> bool {
        let has_border = self.border_style != BorderStyle::None
            && (self.border_width.left > 0.0
                || self.border_width.right > 0.0
                || self.border_width.top > 0.0
                || self.border_width.bottom > 0.0);
        self.background_color.is_visible()
            || has_border
            || !self.padding.is_zero()
            || !self.margin.is_zero()
            || self.vertical_align != VerticalAlign::Baseline
            || self.text_emphasis != TextEmphasis::None
    }

    /// Horizontal space an inline box adds at its start edge.
    pub fn inline_start_extent(&self) -> f32 {
        let border = if self.border_style == BorderStyle::None {
            0.0
        } else {
            self.border_width.left
        };
        self.margin.left + border + self.padding.left
    }

    /// Horizontal space an inline box adds at its end edge.
    pub fn inline_end_extent(&self) -> f32 {
        let border = if self.border_style == BorderStyle::None {
            0.0
        } else {
            self.border_width.right
        };
        self.margin.right + border + self.padding.right
    }

    // white-space longhands, CSS Text 3 §3

    #[inline]
    pub const fn collapse_white_space(&self) -> bool {
        self.white_space.collapses_spaces()
    }

    #[inline]
    pub const fn preserve_newline(&self) -> bool {
        self.white_space.preserves_newlines()
    }

    #[inline]
    pub const fn auto_wrap(&self) -> bool {
        self.white_space.wraps()
    }

    /// Whether `character` is white space that this style would collapse.
    #[inline]
    pub const fn is_collapsible_white_space(&self, character: char) -> bool {
        match character {
            ' ' | '\t' => self.collapse_white_space(),
            '\n' => !self.preserve_newline(),
            _ => false,
        }
    }

    /// Spaces count as break opportunities only after the space run.
    #[inline]
    pub const fn break_only_after_white_space(&self) -> bool {
        matches!(
            self.white_space,
            WhiteSpace::PreWrap | WhiteSpace::BreakSpaces
        ) || matches!(self.line_break, LineBreak::AfterWhiteSpace)
    }

    /// `word-break: break-all` (and the legacy `break-word`) while wrapping.
    #[inline]
    pub const fn breaks_anywhere(&self) -> bool {
        matches!(self.word_break, WordBreak::BreakAll | WordBreak::BreakWord) && self.auto_wrap()
    }

    /// The string inserted at an automatic or soft hyphenation point.
    pub fn hyphen_string(&self) -> &str {
        self.hyphenate_character.as_deref().unwrap_or("-")
    }

    /// Line height in pixels; `normal` resolves to 1.2× the font size.
    pub fn computed_line_height(&self) -> f32 {
        self.line_height.unwrap_or_else(|| (self.font_size * 1.2).round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Panics
    /// Panics if anonymous styles drop inherited text properties or keep decorations.
    #[test]
    fn anonymous_block_inherits_text_but_not_decorations() {
        let style = ComputedStyle {
            white_space: WhiteSpace::Pre,
            background_color: Rgba {
                red: 255,
                green: 0,
                blue: 0,
                alpha: 255,
            },
            tab_size: 4,
            ..ComputedStyle::default()
        };
        let anonymous = style.anonymous_block();
        assert_eq!(anonymous.display, Display::Block);
        assert_eq!(anonymous.white_space, WhiteSpace::Pre);
        assert_eq!(anonymous.tab_size, 4);
        assert!(!anonymous.background_color.is_visible());
        assert!(!anonymous.needs_own_line_box());
    }

    /// # Panics
    /// Panics if white-space longhands are derived incorrectly.
    #[test]
    fn white_space_longhands() {
        let pre = ComputedStyle {
            white_space: WhiteSpace::Pre,
            ..ComputedStyle::default()
        };
        assert!(!pre.collapse_white_space());
        assert!(pre.preserve_newline());
        assert!(!pre.auto_wrap());
        assert!(!pre.is_collapsible_white_space('\n'));

        let normal = ComputedStyle::default();
        assert!(normal.collapse_white_space());
        assert!(normal.auto_wrap());
        assert!(normal.is_collapsible_white_space('\n'));
        assert!(!normal.is_collapsible_white_space('\u{a0}'));
    }
}
