//! Text-level computed values (CSS Text 3, CSS Writing Modes 3).

/// `white-space` shorthand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WhiteSpace {
    #[default]
    Normal,
    Pre,
    PreWrap,
    PreLine,
    NoWrap,
    BreakSpaces,
}

impl WhiteSpace {
    #[inline]
    pub const fn collapses_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::NoWrap | Self::PreLine)
    }

    #[inline]
    pub const fn preserves_newlines(self) -> bool {
        matches!(
            self,
            Self::Pre | Self::PreWrap | Self::PreLine | Self::BreakSpaces
        )
    }

    #[inline]
    pub const fn wraps(self) -> bool {
        !matches!(self, Self::Pre | Self::NoWrap)
    }

    /// Whether white space at the end of a line hangs past the line's width.
    #[inline]
    pub const fn hangs_trailing_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::NoWrap | Self::PreLine | Self::PreWrap)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WordBreak {
    #[default]
    Normal,
    BreakAll,
    KeepAll,
    /// Legacy alias that behaves like `break-all` for break opportunities.
    BreakWord,
}

/// `line-break` strictness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineBreak {
    #[default]
    Auto,
    Loose,
    Normal,
    Strict,
    AfterWhiteSpace,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Hyphens {
    None,
    #[default]
    Manual,
    Auto,
}

/// Non-standard `-webkit-nbsp-mode`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NbspMode {
    #[default]
    Normal,
    /// U+00A0 behaves like an ordinary breaking space.
    Space,
}
