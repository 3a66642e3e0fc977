//! Min/max content widths of a text fragment.
//! Spec: <https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes>

use crate::TextContext;
use crate::break_iterator::{BreakRules, LineBreakIterator, is_breaking_space};
use crate::fragment::{FragmentFlags, PreferredWidths};
use crate::measurement::{GlyphOverflow, TextMeasurer, TextRun, tab_width};
use css_style_model::{ComputedStyle, Hyphens, WhiteSpace};

pub const SOFT_HYPHEN: char = '\u{ad}';

/// Hyphenation limit used when `hyphenate-limit-chars` is `auto`.
const DEFAULT_HYPHENATION_LIMIT: usize = 2;

/// Width of `text` at pen position `x_position`.
///
/// Fixed-pitch all-ASCII text is summed per character without calling the
/// measurer's shaping path.
pub fn width_from_cache(
    text: &str,
    all_ascii: bool,
    style: &ComputedStyle,
    measurer: &dyn TextMeasurer,
    x_position: f32,
) -> f32 {
    width_from_cache_with_overflow(text, all_ascii, style, measurer, x_position, None)
}

pub fn width_from_cache_with_overflow(
    text: &str,
    all_ascii: bool,
    style: &ComputedStyle,
    measurer: &dyn TextMeasurer,
    x_position: f32,
    overflow: Option<&mut GlyphOverflow>,
) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let wants_bounds = overflow.as_ref().is_some_and(|bounds| bounds.compute_bounds);
    if all_ascii && !wants_bounds && measurer.is_fixed_pitch(style) {
        return monospace_width(text, style, measurer, x_position);
    }
    let run = TextRun::styled(text, style, x_position);
    match overflow {
        Some(bounds) => {
            let mut measured = GlyphOverflow {
                compute_bounds: bounds.compute_bounds,
                ..GlyphOverflow::default()
            };
            let width = measurer.measure_with_overflow(&run, style, &mut measured);
            bounds.merge(&measured);
            width
        }
        None => measurer.measure(&run, style),
    }
}

fn monospace_width(
    text: &str,
    style: &ComputedStyle,
    measurer: &dyn TextMeasurer,
    x_position: f32,
) -> f32 {
    let advance = measurer.space_width(style);
    let word_spacing = measurer.word_spacing(style);
    let mut width = 0.0;
    for (index, byte) in text.bytes().enumerate() {
        let is_space = match byte {
            b' ' | b'\n' => {
                width += advance;
                true
            }
            b'\t' if style.collapse_white_space() => {
                width += advance;
                true
            }
            b'\t' => {
                width += tab_width(style.tab_size, advance, x_position + width);
                false
            }
            control if control < b' ' => false,
            _ => {
                width += advance;
                false
            }
        };
        if is_space && index > 0 {
            width += word_spacing;
        }
    }
    width
}

/// Single-pass scanner state over one fragment's characters.
struct WidthScan<'scan> {
    text: &'scan str,
    chars: Vec<(usize, char)>,
    all_ascii: bool,
    style: &'scan ComputedStyle,
    context: TextContext<'scan>,
    breaks: LineBreakIterator<'scan>,
    rules: BreakRules,
    overflow: Option<&'scan mut GlyphOverflow>,
}

impl WidthScan<'_> {
    fn byte_offset(&self, index: usize) -> usize {
        self.chars
            .get(index)
            .map_or(self.text.len(), |&(offset, _)| offset)
    }

    fn char_at(&self, index: usize) -> char {
        self.chars.get(index).map_or('\0', |&(_, character)| character)
    }

    fn slice(&self, start: usize, len: usize) -> &str {
        &self.text[self.byte_offset(start)..self.byte_offset(start + len)]
    }

    fn is_breakable(&self, index: usize) -> bool {
        self.breaks.is_breakable(self.byte_offset(index))
    }

    fn is_space(&self, character: char) -> bool {
        is_breaking_space(character, self.rules)
    }

    fn width(&mut self, start: usize, len: usize, x_position: f32) -> f32 {
        let start_byte = self.byte_offset(start);
        let end_byte = self.byte_offset(start + len);
        width_from_cache_with_overflow(
            &self.text[start_byte..end_byte],
            self.all_ascii,
            self.style,
            self.context.measurer,
            x_position,
            self.overflow.as_deref_mut(),
        )
    }

    fn hyphen_width(&self) -> f32 {
        self.context
            .measurer
            .measure(&TextRun::new(self.style.hyphen_string()), self.style)
    }

    fn contains_only_white_space(&self, from: usize) -> bool {
        self.chars
            .iter()
            .skip(from)
            .all(|&(_, character)| matches!(character, ' ' | '\t' | '\n'))
    }

    /// Widest hyphen-delimited piece of the word at `[start, start + len)`.
    ///
    /// Returns the width and the char offset (within the word) where the
    /// unhyphenated suffix starts; zero means no usable hyphenation point.
    fn max_word_fragment_width(
        &self,
        start: usize,
        len: usize,
        minimum_prefix: usize,
        minimum_suffix: usize,
    ) -> (f32, usize) {
        if len <= minimum_suffix {
            return (0.0, 0);
        }
        let word = self.slice(start, len);
        let word_base = self.byte_offset(start);
        let suffix_bound = self.byte_offset(start + len - minimum_suffix) - word_base;
        let locale = self.style.locale.as_deref();
        let points = self
            .context
            .hyphenator
            .hyphenation_points_before(word, suffix_bound, locale);
        // Back to char offsets within the word, honoring the prefix minimum.
        let char_points: Vec<usize> = points
            .iter()
            .filter(|&&point| word.is_char_boundary(point))
            .map(|&point| word[..point].chars().count())
            .filter(|&count| count >= minimum_prefix)
            .collect();
        if char_points.is_empty() {
            return (0.0, 0);
        }

        let hyphen = self.style.hyphen_string();
        // Prefixes this narrow are never chosen by the line breaker either.
        let narrowest = self.style.font_size * 5.0 / 4.0 + self.hyphen_width();
        let mut suffix_start = 0;
        let mut widest = 0.0_f32;
        for point in char_points {
            let Some(fragment_len) = point.checked_sub(suffix_start) else {
                continue;
            };
            let mut with_hyphen = String::from(self.slice(start + suffix_start, fragment_len));
            with_hyphen.push_str(hyphen);
            let fragment_width = self
                .context
                .measurer
                .measure(&TextRun::new(&with_hyphen), self.style);
            if fragment_width <= narrowest {
                continue;
            }
            suffix_start += fragment_len;
            widest = widest.max(fragment_width);
        }
        (widest, suffix_start)
    }
}

/// Compute min/max content widths of `text` under `style`.
///
/// `lead_width` is the horizontal offset already consumed on the line; it only
/// affects preserved tabs.
pub fn compute_preferred_widths(
    text: &str,
    style: &ComputedStyle,
    context: TextContext<'_>,
    lead_width: f32,
) -> PreferredWidths {
    compute_preferred_widths_with_overflow(text, style, context, lead_width, None)
}

#[allow(
    clippy::too_many_lines,
    reason = "single scan over the buffer; splitting it scatters the shared cursor state"
)]
pub fn compute_preferred_widths_with_overflow<'scan>(
    text: &'scan str,
    style: &'scan ComputedStyle,
    context: TextContext<'scan>,
    lead_width: f32,
    overflow: Option<&'scan mut GlyphOverflow>,
) -> PreferredWidths {
    let mut result = PreferredWidths::default();
    let all_ascii = text.is_ascii();
    if all_ascii {
        result.flags.insert(FragmentFlags::ALL_ASCII);
    }
    if text.is_empty() {
        return result;
    }

    let rules = BreakRules::for_style(style);
    let mut scan = WidthScan {
        text,
        chars: text.char_indices().collect(),
        all_ascii,
        style,
        context,
        breaks: LineBreakIterator::new(text, rules),
        rules,
        overflow,
    };
    let len = scan.chars.len();
    let word_spacing = context.measurer.word_spacing(style);
    let collapse_white_space = style.collapse_white_space();
    let preserve_newline = style.preserve_newline();
    let auto_wrap = style.auto_wrap();
    let soft_hyphens = style.hyphens != Hyphens::None;

    // With automatic hyphenation only words wider than the widest seen so far
    // are searched for hyphenation points.
    let mut max_word_width = f32::MAX;
    let mut minimum_prefix = 0;
    let mut minimum_suffix = 0;
    if style.hyphens == Hyphens::Auto && context.hyphenator.can_hyphenate(style.locale.as_deref()) {
        max_word_width = 0.0;
        minimum_prefix = style
            .hyphenate_limit_before
            .map_or(DEFAULT_HYPHENATION_LIMIT, usize::from);
        minimum_suffix = style
            .hyphenate_limit_after
            .map_or(DEFAULT_HYPHENATION_LIMIT, usize::from);
    }

    let mut lead = lead_width;
    let mut current_max = 0.0_f32;
    let mut ignoring_spaces = false;
    let mut is_space = false;
    let mut first_word = true;
    let mut first_line = true;
    let mut last_word_boundary = 0;

    let mut index = 0;
    while index < len {
        let mut character = scan.char_at(index);
        let previous_is_space = is_space;

        let mut is_newline = false;
        match character {
            '\n' if preserve_newline => {
                result.flags.insert(FragmentFlags::HAS_BREAK);
                is_newline = true;
                is_space = false;
            }
            '\t' if !collapse_white_space => {
                result.flags.insert(FragmentFlags::HAS_TAB);
                is_space = false;
            }
            '\n' | '\t' => is_space = true,
            _ => is_space = character == ' ',
        }

        if is_space || is_newline {
            if index == 0 {
                result.flags.insert(FragmentFlags::HAS_BEGIN_WHITE_SPACE);
            }
            if index == len - 1 {
                result.flags.insert(FragmentFlags::HAS_END_WHITE_SPACE);
            }
        }

        ignoring_spaces |= collapse_white_space && previous_is_space && is_space;
        ignoring_spaces &= is_space;

        if ignoring_spaces {
            last_word_boundary += 1;
            index += 1;
            continue;
        }
        if character == SOFT_HYPHEN && soft_hyphens {
            current_max += scan.width(
                last_word_boundary,
                index - last_word_boundary,
                lead + current_max,
            );
            last_word_boundary = index + 1;
            index += 1;
            continue;
        }

        let has_break = rules.break_all || scan.is_breakable(index);
        let mut between_words = true;
        let mut end = index;
        while character != '\n'
            && !scan.is_space(character)
            && character != '\t'
            && (character != SOFT_HYPHEN || !soft_hyphens)
        {
            end += 1;
            if end == len {
                break;
            }
            character = scan.char_at(end);
            if scan.is_breakable(end) && scan.char_at(end - 1) != SOFT_HYPHEN {
                break;
            }
            if rules.break_all {
                between_words = false;
                break;
            }
        }

        let word_len = end - index;
        if word_len > 0 {
            let mut current_min = 0.0;
            let followed_by_space = end < len && scan.is_space(character);
            let width = scan.width(index, word_len, lead + current_max);
            if end < len && character == SOFT_HYPHEN && soft_hyphens {
                current_min = scan.hyphen_width();
            }

            if width > max_word_width {
                let (fragment_width, suffix_start) =
                    scan.max_word_fragment_width(index, word_len, minimum_prefix, minimum_suffix);
                if suffix_start > 0 {
                    let suffix_width = scan.width(
                        index + suffix_start,
                        word_len - suffix_start,
                        lead + current_max,
                    );
                    let widest_piece = fragment_width.max(suffix_width);
                    current_min += widest_piece - width;
                    max_word_width = max_word_width.max(widest_piece);
                } else {
                    max_word_width = width;
                }
            }

            current_min += width;
            if between_words {
                if last_word_boundary == index {
                    current_max += width;
                } else {
                    current_max += scan.width(
                        last_word_boundary,
                        end - last_word_boundary,
                        lead + current_max,
                    );
                }
                last_word_boundary = end;
            }

            let collapsible = end < len && style.is_collapsible_white_space(character);
            if end < len && auto_wrap {
                result.flags.insert(FragmentFlags::HAS_BREAKABLE_CHAR);
            }

            // No word spacing after the last word of a line or of the buffer.
            if (followed_by_space || collapsible) && !scan.contains_only_white_space(end) {
                current_max += word_spacing;
            }

            if first_word {
                first_word = false;
                // A break right at the start lets a previous fragment end its line here.
                if has_break {
                    result.flags.insert(FragmentFlags::HAS_BREAKABLE_CHAR);
                }
                result.begin_min_width = if has_break { 0.0 } else { current_min };
            }
            result.end_min_width = current_min;
            result.min_width = result.min_width.max(current_min);

            index = end;
        } else {
            // nowrap never breaks; pre only at newlines
            if auto_wrap || is_newline {
                result.flags.insert(FragmentFlags::HAS_BREAKABLE_CHAR);
            }

            if is_newline {
                if first_line {
                    first_line = false;
                    lead = 0.0;
                    if !auto_wrap {
                        result.begin_min_width = current_max;
                    }
                }
                result.max_width = result.max_width.max(current_max);
                current_max = 0.0;
            } else {
                current_max += scan.width(index, 1, lead + current_max);
            }
            last_word_boundary = index + 1;
            index += 1;
        }
    }

    result.max_width = result.max_width.max(current_max);

    if !auto_wrap {
        result.min_width = result.max_width;
    }

    if style.white_space == WhiteSpace::Pre {
        if first_line {
            result.begin_min_width = result.max_width;
        }
        result.end_min_width = current_max;
    }

    // A trailing soft hyphen counts toward min only; max content never breaks there.
    result.min_width = result.min_width.min(result.max_width);

    result
}
