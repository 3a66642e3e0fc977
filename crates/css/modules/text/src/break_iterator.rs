//! Line break opportunities (UAX #14) tailored by `line-break`, `word-break`
//! and the non-breaking-space mode.
//! Spec: <https://www.w3.org/TR/css-text-3/#line-breaking>

use css_style_model::{ComputedStyle, LineBreak, NbspMode, WordBreak};
use smallvec::SmallVec;
use unicode_linebreak::{BreakClass, break_property, linebreaks};

/// Strictness of the break iterator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineBreakMode {
    /// Plain UAX #14 (treats conditional Japanese starters as non-starters).
    #[default]
    Default,
    Loose,
    Normal,
    Strict,
}

impl LineBreakMode {
    pub const fn from_line_break(line_break: LineBreak) -> Self {
        match line_break {
            LineBreak::Auto | LineBreak::AfterWhiteSpace => Self::Default,
            LineBreak::Loose => Self::Loose,
            LineBreak::Normal => Self::Normal,
            LineBreak::Strict => Self::Strict,
        }
    }

    const fn breaks_before_conditional_japanese_starter(self) -> bool {
        matches!(self, Self::Loose | Self::Normal)
    }
}

/// Style-derived knobs that shape break opportunities for one text node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BreakRules {
    pub mode: LineBreakMode,
    /// Every character boundary is an opportunity (`word-break: break-all`).
    pub break_all: bool,
    /// Letters stick together (`word-break: keep-all`).
    pub keep_all: bool,
    /// U+00A0 breaks like a space.
    pub break_nbsp: bool,
    /// Only positions right after white space may break.
    pub after_white_space_only: bool,
}

impl BreakRules {
    pub const fn for_style(style: &ComputedStyle) -> Self {
        Self {
            mode: LineBreakMode::from_line_break(style.line_break),
            break_all: style.breaks_anywhere(),
            keep_all: matches!(style.word_break, WordBreak::KeepAll),
            break_nbsp: style.auto_wrap() && matches!(style.nbsp_mode, NbspMode::Space),
            after_white_space_only: matches!(style.line_break, LineBreak::AfterWhiteSpace),
        }
    }
}

/// Whether `character` acts as a word separator under `rules`.
#[inline]
pub const fn is_breaking_space(character: char, rules: BreakRules) -> bool {
    character == ' ' || (character == '\u{a0}' && rules.break_nbsp)
}

/// Precomputed break opportunities over one text buffer.
///
/// Positions are UTF-8 byte offsets; an opportunity at `pos` allows a line to
/// end right before the character starting at `pos`.
#[derive(Clone, Debug)]
pub struct LineBreakIterator<'text> {
    text: &'text str,
    rules: BreakRules,
    positions: SmallVec<usize, 16>,
}

impl<'text> LineBreakIterator<'text> {
    pub fn new(text: &'text str, rules: BreakRules) -> Self {
        let mut positions: SmallVec<usize, 16> = linebreaks(text)
            .map(|(position, _opportunity)| position)
            .filter(|&position| position > 0)
            .collect();

        let mut previous: Option<char> = None;
        for (offset, character) in text.char_indices() {
            if offset > 0 && !previous.is_some_and(char::is_whitespace) {
                let class = break_property(u32::from(character));
                let tailored = match class {
                    BreakClass::ConditionalJapaneseStarter => {
                        rules.mode.breaks_before_conditional_japanese_starter()
                    }
                    BreakClass::NonStarter => rules.mode == LineBreakMode::Loose,
                    _ => false,
                };
                if tailored {
                    positions.push(offset);
                }
            }
            if character == '\u{a0}' && rules.break_nbsp {
                positions.push(offset + character.len_utf8());
            }
            previous = Some(character);
        }

        positions.sort_unstable();
        positions.dedup();

        if rules.keep_all {
            positions.retain(|position| !joins_letters(text, *position));
        }
        if rules.after_white_space_only {
            positions.retain(|position| {
                *position == text.len()
                    || text[..*position].chars().next_back().is_some_and(char::is_whitespace)
            });
        }

        Self {
            text,
            rules,
            positions,
        }
    }

    pub fn for_style(text: &'text str, style: &ComputedStyle) -> Self {
        Self::new(text, BreakRules::for_style(style))
    }

    pub const fn text(&self) -> &'text str {
        self.text
    }

    pub const fn rules(&self) -> BreakRules {
        self.rules
    }

    /// Ordered break opportunities, always ending with the buffer length when non-empty.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Whether UAX #14 (as tailored) allows a break right before `position`.
    pub fn is_breakable(&self, position: usize) -> bool {
        self.positions.binary_search(&position).is_ok()
    }

    /// Like [`Self::is_breakable`], additionally honoring `word-break: break-all`.
    pub fn allows_break_at(&self, position: usize) -> bool {
        if self.rules.break_all && self.text.is_char_boundary(position) && position > 0 {
            return true;
        }
        self.is_breakable(position)
    }

    /// First opportunity at or after `from`, or the buffer length if none remain.
    pub fn next_breakable(&self, from: usize) -> usize {
        let index = self.positions.partition_point(|&position| position < from);
        self.positions
            .get(index)
            .copied()
            .unwrap_or(self.text.len())
    }
}

fn joins_letters(text: &str, position: usize) -> bool {
    let before = text[..position].chars().next_back();
    let after = text[position..].chars().next();
    matches!((before, after), (Some(left), Some(right)) if left.is_alphanumeric() && right.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Panics
    /// Panics if default breaking does not produce UAX #14 opportunities.
    #[test]
    fn breaks_after_spaces_and_hyphens() {
        let iterator = LineBreakIterator::new("Hello well-known", BreakRules::default());
        assert!(iterator.is_breakable(6));
        assert!(iterator.is_breakable(11));
        assert!(!iterator.is_breakable(3));
        assert_eq!(iterator.next_breakable(7), 11);
        assert_eq!(iterator.positions().last(), Some(&16));
    }

    /// # Panics
    /// Panics if break-all does not open every character boundary.
    #[test]
    fn break_all_allows_every_boundary() {
        let rules = BreakRules {
            break_all: true,
            ..BreakRules::default()
        };
        let iterator = LineBreakIterator::new("abc", rules);
        assert!(iterator.allows_break_at(1));
        assert!(iterator.allows_break_at(2));
        assert!(!iterator.allows_break_at(0));
    }

    /// # Panics
    /// Panics if keep-all still breaks between ideographs.
    #[test]
    fn keep_all_joins_ideographs() {
        let text = "\u{6f22}\u{5b57}";
        let normal = LineBreakIterator::new(text, BreakRules::default());
        assert!(normal.is_breakable(3));
        let keep = LineBreakIterator::new(
            text,
            BreakRules {
                keep_all: true,
                ..BreakRules::default()
            },
        );
        assert!(!keep.is_breakable(3));
    }

    /// # Panics
    /// Panics if the nbsp mode does not make U+00A0 breakable.
    #[test]
    fn nbsp_breaks_in_space_mode() {
        let text = "a\u{a0}b";
        assert!(!LineBreakIterator::new(text, BreakRules::default()).is_breakable(3));
        let rules = BreakRules {
            break_nbsp: true,
            ..BreakRules::default()
        };
        assert!(LineBreakIterator::new(text, rules).is_breakable(3));
    }

    /// # Panics
    /// Panics if loose mode does not break before a small kana.
    #[test]
    fn loose_breaks_before_conditional_starter() {
        // HIRAGANA LETTER A followed by SMALL TSU.
        let text = "\u{3042}\u{3063}";
        assert!(!LineBreakIterator::new(text, BreakRules::default()).is_breakable(3));
        let rules = BreakRules {
            mode: LineBreakMode::Loose,
            ..BreakRules::default()
        };
        assert!(LineBreakIterator::new(text, rules).is_breakable(3));
    }
}
