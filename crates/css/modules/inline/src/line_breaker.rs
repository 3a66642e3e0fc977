//! Greedy line breaking shared by the simple and the line-box layouts.
//! Spec: CSS Text 3 §5 — Line breaking and word boundaries
//!   <https://www.w3.org/TR/css-text-3/#line-breaking>

use core::mem;
use css_style_model::ComputedStyle;
use css_text::{BreakRules, LineBreakIterator, TextContext, width_from_cache};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PieceKind {
    /// Characters between break opportunities.
    Word,
    /// A run of white space.
    Space,
    /// A preserved newline or a forced break; always ends its line.
    Newline,
    InlineStart,
    InlineEnd,
    /// An atomic inline (inline-block and similar).
    Atomic,
}

/// A placed slice of the flow. Offsets are flow offsets, positions are
/// relative to the line's start edge.
#[derive(Clone, Debug)]
pub struct Piece {
    /// Index of the item (segment or flow item) the piece came from.
    pub item: usize,
    pub start: usize,
    pub end: usize,
    pub left: f32,
    pub right: f32,
    pub kind: PieceKind,
    /// White space that collapses with its neighbours.
    pub collapsible: bool,
    /// White space a line end removes from the visible width.
    pub hangs: bool,
}

impl Piece {
    const fn is_collapsible_space(&self) -> bool {
        matches!(self.kind, PieceKind::Space) && self.collapsible
    }

    const fn is_hanging_space(&self) -> bool {
        matches!(self.kind, PieceKind::Space) && self.hangs
    }

    const fn is_marker(&self) -> bool {
        matches!(
            self.kind,
            PieceKind::InlineStart | PieceKind::InlineEnd | PieceKind::Newline
        )
    }

    const fn is_content(&self) -> bool {
        matches!(self.kind, PieceKind::Word | PieceKind::Atomic)
            || (matches!(self.kind, PieceKind::Space) && !self.collapsible)
    }
}

fn is_space(character: char, style: &ComputedStyle) -> bool {
    match character {
        ' ' | '\t' => true,
        '\n' => !style.preserve_newline(),
        _ => false,
    }
}

/// Fills lines against a fixed available width.
///
/// A line breaks at the last opportunity before the content that overflows
/// it. Content that cannot break stays on its line and overflows, so every
/// line makes progress.
pub struct LineBreaker<'flow> {
    breaks: LineBreakIterator<'flow>,
    context: TextContext<'flow>,
    available_width: f32,
    lines: Vec<Vec<Piece>>,
    current: Vec<Piece>,
    width: f32,
    has_content: bool,
    after_collapsible_space: bool,
    /// Number of pieces kept on the line if it breaks at the last opportunity.
    break_index: Option<usize>,
}

impl<'flow> LineBreaker<'flow> {
    /// `flow_text` is the whole flow so opportunities are found across items.
    pub fn new(
        flow_text: &'flow str,
        rules: BreakRules,
        context: TextContext<'flow>,
        available_width: f32,
    ) -> Self {
        Self {
            breaks: LineBreakIterator::new(flow_text, rules),
            context,
            available_width,
            lines: Vec::new(),
            current: Vec::new(),
            width: 0.0,
            has_content: false,
            after_collapsible_space: false,
            break_index: None,
        }
    }

    /// Lay out the text of one item starting at flow offset `start`.
    pub fn push_text(
        &mut self,
        item: usize,
        start: usize,
        text: &str,
        style: &ComputedStyle,
        all_ascii: bool,
    ) {
        let measurer = self.context.measurer;
        let mut offset = 0;
        while let Some(character) = text.get(offset..).and_then(|rest| rest.chars().next()) {
            let position = start + offset;
            if character == '\n' && style.preserve_newline() {
                self.push_forced_break(item, position, position + 1);
                offset += 1;
                continue;
            }

            if is_space(character, style) {
                let rest = text.get(offset..).unwrap_or_default();
                let run_len = rest
                    .char_indices()
                    .find(|&(_, next)| !is_space(next, style))
                    .map_or(rest.len(), |(index, _)| index);
                let collapse = style.collapse_white_space();
                let width = if collapse {
                    if self.after_collapsible_space || !self.has_content {
                        0.0
                    } else {
                        measurer.space_width(style) + measurer.word_spacing(style)
                    }
                } else {
                    let slice = rest.get(..run_len).unwrap_or_default();
                    width_from_cache(slice, all_ascii, style, measurer, self.width)
                };
                self.place(Piece {
                    item,
                    start: position,
                    end: position + run_len,
                    left: 0.0,
                    right: width,
                    kind: PieceKind::Space,
                    collapsible: collapse,
                    hangs: style.white_space.hangs_trailing_spaces(),
                });
                self.after_collapsible_space = collapse;
                offset += run_len;
                continue;
            }

            let word_end = self.word_end(start, offset, text, style);
            let slice = text.get(offset..word_end).unwrap_or_default();
            let width = width_from_cache(slice, all_ascii, style, measurer, self.width);
            let breakable = self.breaks.allows_break_at(position);
            self.place_content(
                Piece {
                    item,
                    start: position,
                    end: start + word_end,
                    left: 0.0,
                    right: width,
                    kind: PieceKind::Word,
                    collapsible: false,
                    hangs: false,
                },
                breakable,
                style.auto_wrap(),
            );
            offset = word_end;
        }
    }

    /// Local end of the word starting at local `offset`: the next break
    /// opportunity, white space, or end of `text`, but at least one character.
    fn word_end(&self, start: usize, offset: usize, text: &str, style: &ComputedStyle) -> usize {
        let rest = text.get(offset..).unwrap_or_default();
        let mut end = offset;
        for (index, character) in rest.char_indices() {
            let local = offset + index;
            if index > 0
                && (is_space(character, style)
                    || character == '\n'
                    || self.breaks.allows_break_at(start + local))
            {
                break;
            }
            end = local + character.len_utf8();
        }
        end
    }

    /// A forced break occupying `[start, end)`.
    pub fn push_forced_break(&mut self, item: usize, start: usize, end: usize) {
        self.place(Piece {
            item,
            start,
            end,
            left: 0.0,
            right: 0.0,
            kind: PieceKind::Newline,
            collapsible: false,
            hangs: false,
        });
        self.close_line();
    }

    pub fn push_inline_start(&mut self, item: usize, position: usize, extent: f32) {
        self.place(Piece {
            item,
            start: position,
            end: position,
            left: 0.0,
            right: extent,
            kind: PieceKind::InlineStart,
            collapsible: false,
            hangs: false,
        });
    }

    pub fn push_inline_end(&mut self, item: usize, position: usize, extent: f32) {
        self.place(Piece {
            item,
            start: position,
            end: position,
            left: 0.0,
            right: extent,
            kind: PieceKind::InlineEnd,
            collapsible: false,
            hangs: false,
        });
    }

    /// An unbreakable box; lines may break on either side of it.
    pub fn push_atomic(&mut self, item: usize, start: usize, end: usize, width: f32, wraps: bool) {
        self.place_content(
            Piece {
                item,
                start,
                end,
                left: 0.0,
                right: width,
                kind: PieceKind::Atomic,
                collapsible: false,
                hangs: false,
            },
            true,
            wraps,
        );
    }

    /// Append a piece whose `right` holds its width.
    fn place(&mut self, mut piece: Piece) {
        let width = piece.right;
        piece.left = self.width;
        piece.right = self.width + width;
        self.width = piece.right;
        if piece.is_content() {
            self.has_content = true;
            self.after_collapsible_space = false;
        }
        self.current.push(piece);
    }

    fn place_content(&mut self, piece: Piece, breakable: bool, wraps: bool) {
        if wraps && breakable && self.has_content {
            // Opening inline boxes move along with the content they open.
            let opening = self
                .current
                .iter()
                .rev()
                .take_while(|placed| placed.kind == PieceKind::InlineStart)
                .count();
            self.break_index = Some(self.current.len() - opening);
        }
        if wraps
            && self.width + piece.right > self.available_width
            && let Some(index) = self.break_index.take()
        {
            self.wrap_at(index);
        }
        self.place(piece);
    }

    /// End the line after its first `index` pieces; the rest start the next line.
    fn wrap_at(&mut self, index: usize) {
        let moved = self.current.split_off(index.min(self.current.len()));
        self.close_line();
        let shift = moved.first().map_or(0.0, |piece| piece.left);
        for mut piece in moved {
            piece.left -= shift;
            piece.right -= shift;
            self.width = piece.right;
            if piece.is_content() {
                self.has_content = true;
            }
            self.after_collapsible_space = piece.is_collapsible_space();
            self.current.push(piece);
        }
    }

    fn close_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut pieces = mem::take(&mut self.current);
        trim_trailing_space(&mut pieces);
        self.lines.push(pieces);
        self.width = 0.0;
        self.has_content = false;
        self.after_collapsible_space = false;
        self.break_index = None;
    }

    /// Close the last line and return every line's pieces, top to bottom.
    pub fn finish(mut self) -> Vec<Vec<Piece>> {
        self.close_line();
        self.lines
    }
}

/// Hanging spaces at the end of a line keep their characters but lose
/// their width; markers after them slide back. Preserved spaces hang under
/// `pre-wrap` as collapsible ones do elsewhere.
fn trim_trailing_space(pieces: &mut [Piece]) {
    let trailing_start = pieces
        .iter()
        .rposition(|piece| !(piece.is_hanging_space() || piece.is_marker()))
        .map_or(0, |index| index + 1);
    let mut pen = match trailing_start.checked_sub(1).and_then(|index| pieces.get(index)) {
        Some(piece) => piece.right,
        None => pieces.first().map_or(0.0, |piece| piece.left),
    };
    for piece in pieces.iter_mut().skip(trailing_start) {
        let width = if piece.is_hanging_space() {
            0.0
        } else {
            piece.right - piece.left
        };
        piece.left = pen;
        piece.right = pen + width;
        pen = piece.right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_style_model::WhiteSpace;
    use css_text::{FixedPitchMeasurer, NoHyphenation};

    const MONO: FixedPitchMeasurer = FixedPitchMeasurer::new(10.0);

    fn break_text(parts: &[&str], width: f32) -> Vec<Vec<Piece>> {
        let style = ComputedStyle::default();
        let flow: String = parts.concat();
        let context = TextContext::new(&MONO, &NoHyphenation);
        let mut breaker = LineBreaker::new(&flow, BreakRules::for_style(&style), context, width);
        let mut start = 0;
        for (item, part) in parts.iter().enumerate() {
            breaker.push_text(item, start, part, &style, true);
            start += part.len();
        }
        breaker.finish()
    }

    fn line_text(parts: &[&str], line: &[Piece]) -> String {
        let flow: String = parts.concat();
        let (Some(first), Some(last)) = (line.first(), line.last()) else {
            return String::new();
        };
        flow[first.start..last.end].to_owned()
    }

    /// # Panics
    /// Panics if a word that overflows does not move to the next line.
    #[test]
    fn wraps_before_overflowing_word() {
        let parts = ["aaa bbb ccc"];
        let lines = break_text(&parts, 75.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&parts, &lines[0]), "aaa bbb ");
        assert_eq!(line_text(&parts, &lines[1]), "ccc");
        // The trailing space keeps its offsets but not its width.
        let trailing = lines[0].last().map(|piece| (piece.left, piece.right));
        assert_eq!(trailing, Some((70.0, 70.0)));
    }

    /// # Panics
    /// Panics if a too-wide word without earlier opportunities is broken or dropped.
    #[test]
    fn unbreakable_word_overflows_its_own_line() {
        let parts = ["abcdefgh ij"];
        let lines = break_text(&parts, 30.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&parts, &lines[0]), "abcdefgh ");
        assert_eq!(lines[0][0].right, 80.0);
    }

    /// # Panics
    /// Panics if a word split across items is broken at the item boundary.
    #[test]
    fn words_spanning_items_move_together() {
        let parts = ["xx ab", "cd"];
        let lines = break_text(&parts, 40.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&parts, &lines[1]), "abcd");
        assert_eq!(lines[1][0].left, 0.0);
        assert_eq!(lines[1][1].left, 20.0);
    }

    /// # Panics
    /// Panics if collapsible spaces across items are counted twice.
    #[test]
    fn adjacent_spaces_collapse_across_items() {
        let parts = ["a ", " b"];
        let lines = break_text(&parts, 500.0);
        assert_eq!(lines.len(), 1);
        let right = lines[0].last().map(|piece| piece.right);
        assert_eq!(right, Some(30.0));
    }

    fn break_styled(text: &str, white_space: WhiteSpace, width: f32) -> Vec<Vec<Piece>> {
        let style = ComputedStyle {
            white_space,
            ..ComputedStyle::default()
        };
        let context = TextContext::new(&MONO, &NoHyphenation);
        let mut breaker = LineBreaker::new(text, BreakRules::for_style(&style), context, width);
        breaker.push_text(0, 0, text, &style, true);
        breaker.finish()
    }

    /// # Panics
    /// Panics if preserved spaces before a `pre-wrap` line break keep their width.
    #[test]
    fn preserved_spaces_hang_at_wrap() {
        let lines = break_styled("aa   bb", WhiteSpace::PreWrap, 45.0);
        assert_eq!(lines.len(), 2);
        let trailing = lines[0].last().map(|piece| (piece.start, piece.end, piece.left, piece.right));
        assert_eq!(trailing, Some((2, 5, 20.0, 20.0)));
        assert_eq!(lines[1].first().map(|piece| piece.start), Some(5));

        // `pre` never wraps, and its spaces do not hang.
        let pre = break_styled("aa   ", WhiteSpace::Pre, 45.0);
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].last().map(|piece| piece.right), Some(50.0));
    }
}
