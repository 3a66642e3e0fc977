//! Min-content and max-content inline sizes of block containers.
//! Spec: CSS Sizing 3 §5 — Intrinsic size contributions
//!   <https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes>

use css_display::{NodeId, RenderKind, RenderTree};
use css_text::{TextContext, TrimmedWidths};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntrinsicWidths {
    /// Narrowest width without overflow from unbreakable content.
    pub min: f32,
    /// Width with no soft wraps.
    pub max: f32,
}

impl IntrinsicWidths {
    fn widen(&mut self, other: Self) {
        self.min = self.min.max(other.min);
        self.max = self.max.max(other.max);
    }
}

/// Running state while merging inline children into line-wide widths.
#[derive(Debug)]
struct InlineAccumulator {
    widths: IntrinsicWidths,
    /// Unbreakable width carried from the previous item.
    inline_min: f32,
    /// Width of the current unwrapped line so far.
    inline_max: f32,
    strip_front_spaces: bool,
}

impl InlineAccumulator {
    const fn new() -> Self {
        Self {
            widths: IntrinsicWidths { min: 0.0, max: 0.0 },
            inline_min: 0.0,
            inline_max: 0.0,
            strip_front_spaces: true,
        }
    }

    fn commit_min(&mut self) {
        self.widths.min = self.widths.min.max(self.inline_min);
        self.inline_min = 0.0;
    }

    fn add_extent(&mut self, extent: f32) {
        self.inline_min += extent;
        self.inline_max += extent;
    }

    fn add_text(&mut self, text: TrimmedWidths) {
        if text.has_breakable_char {
            if text.begins_with_white_space {
                self.commit_min();
            } else {
                self.inline_min += text.begin_min_width;
                self.commit_min();
            }
            self.widths.min = self.widths.min.max(text.min_width);
            self.inline_min = if text.ends_with_white_space {
                0.0
            } else {
                text.end_min_width
            };
        } else {
            self.inline_min += text.min_width;
        }

        if text.has_break {
            self.inline_max += text.begin_max_width;
            self.widths.max = self.widths.max.max(self.inline_max).max(text.max_width);
            self.inline_max = text.end_max_width;
        } else {
            self.inline_max += text.max_width;
        }
    }

    /// An atomic inline; lines may wrap on either side of it.
    fn add_atomic(&mut self, atomic: IntrinsicWidths, wraps: bool) {
        if wraps {
            self.commit_min();
            self.widths.min = self.widths.min.max(atomic.min);
        } else {
            self.inline_min += atomic.min;
        }
        self.inline_max += atomic.max;
        self.strip_front_spaces = false;
    }

    fn force_break(&mut self) {
        self.commit_min();
        self.widths.max = self.widths.max.max(self.inline_max);
        self.inline_max = 0.0;
        self.strip_front_spaces = true;
    }

    fn finish(mut self) -> IntrinsicWidths {
        self.force_break();
        self.widths
    }
}

/// Preferred widths of `block`'s content box.
///
/// Text widths come from each fragment's cache, so a second query after an
/// unrelated mutation does not re-measure unchanged text.
pub fn block_preferred_widths(
    tree: &mut RenderTree,
    block: NodeId,
    context: TextContext<'_>,
) -> IntrinsicWidths {
    let Some(object) = tree.get(block) else {
        return IntrinsicWidths::default();
    };
    if object.children_inline() {
        let mut accumulator = InlineAccumulator::new();
        accumulate_inline(tree, block, context, &mut accumulator);
        return accumulator.finish();
    }

    let mut widths = IntrinsicWidths::default();
    for child in tree.children(block) {
        let out_of_flow = tree
            .get(child)
            .is_some_and(|object| object.style.is_out_of_flow_positioned());
        if !out_of_flow {
            widths.widen(block_preferred_widths(tree, child, context));
        }
    }
    widths
}

fn accumulate_inline(
    tree: &mut RenderTree,
    parent: NodeId,
    context: TextContext<'_>,
    accumulator: &mut InlineAccumulator,
) {
    for child in tree.children(parent) {
        let Some(object) = tree.get_mut(child) else {
            continue;
        };
        let style = Rc::clone(&object.style);
        let opens = object.continuation_prev().is_none();
        let closes = object.continuation().is_none();
        match &mut object.kind {
            RenderKind::Text(fragment) => {
                let mut strip = accumulator.strip_front_spaces;
                let trimmed = fragment.trimmed_preferred_widths(
                    &style,
                    context,
                    accumulator.inline_max,
                    &mut strip,
                );
                accumulator.strip_front_spaces = strip;
                accumulator.add_text(trimmed);
            }
            RenderKind::LineBreak => accumulator.force_break(),
            RenderKind::Inline => {
                if opens {
                    accumulator.add_extent(style.inline_start_extent());
                }
                accumulate_inline(tree, child, context, accumulator);
                if closes {
                    accumulator.add_extent(style.inline_end_extent());
                }
            }
            RenderKind::Block { .. } => {
                if style.is_out_of_flow_positioned() {
                    continue;
                }
                let mut atomic = block_preferred_widths(tree, child, context);
                let extents = style.inline_start_extent() + style.inline_end_extent();
                atomic.min += extents;
                atomic.max += extents;
                accumulator.add_atomic(atomic, style.auto_wrap());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_display::NodeKey;
    use css_style_model::{ComputedStyle, Display, Edges, WhiteSpace};
    use css_text::{FixedPitchMeasurer, NoHyphenation, TextFragment};

    const MONO: FixedPitchMeasurer = FixedPitchMeasurer::new(10.0);

    fn context() -> TextContext<'static> {
        TextContext::new(&MONO, &NoHyphenation)
    }

    fn block(tree: &mut RenderTree, white_space: WhiteSpace) -> NodeId {
        let id = tree.create_block(
            Rc::new(ComputedStyle {
                display: Display::Block,
                white_space,
                ..ComputedStyle::default()
            }),
            Some(NodeKey(1)),
        );
        tree.add_child(tree.root(), id, None);
        id
    }

    fn text(tree: &mut RenderTree, parent: NodeId, content: &str, key: u64) {
        let id = tree.create_text(
            TextFragment::new(content),
            Rc::new(ComputedStyle::default()),
            Some(NodeKey(key)),
        );
        tree.add_child(parent, id, None);
    }

    /// # Panics
    /// Panics if words split across fragments are not joined for min width.
    #[test]
    fn unbreakable_join_across_fragments() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let paragraph = block(&mut tree, WhiteSpace::Normal);
        text(&mut tree, paragraph, "aa bb", 2);
        text(&mut tree, paragraph, "cc dd", 3);
        let widths = block_preferred_widths(&mut tree, paragraph, context());
        // "bbcc" cannot break.
        assert!((widths.min - 40.0).abs() < 0.001, "min {}", widths.min);
        assert!((widths.max - 100.0).abs() < 0.001, "max {}", widths.max);
    }

    /// # Panics
    /// Panics if a forced break does not split the max-content line.
    #[test]
    fn line_break_resets_max() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let paragraph = block(&mut tree, WhiteSpace::Normal);
        text(&mut tree, paragraph, "abc", 2);
        let br = tree.create_line_break(Rc::new(ComputedStyle::default()), Some(NodeKey(3)));
        tree.add_child(paragraph, br, None);
        text(&mut tree, paragraph, "abcdef", 4);
        let widths = block_preferred_widths(&mut tree, paragraph, context());
        assert!((widths.max - 60.0).abs() < 0.001, "max {}", widths.max);
        assert!((widths.min - 60.0).abs() < 0.001, "min {}", widths.min);
    }

    /// # Panics
    /// Panics if inline box padding is not counted on both edges.
    #[test]
    fn inline_extents_contribute() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let paragraph = block(&mut tree, WhiteSpace::Normal);
        let span = tree.create_inline(
            Rc::new(ComputedStyle {
                padding: Edges {
                    left: 5.0,
                    right: 5.0,
                    ..Edges::default()
                },
                ..ComputedStyle::default()
            }),
            Some(NodeKey(2)),
        );
        tree.add_child(paragraph, span, None);
        text(&mut tree, span, "abc", 3);
        let widths = block_preferred_widths(&mut tree, paragraph, context());
        assert!((widths.max - 40.0).abs() < 0.001, "max {}", widths.max);
        assert!((widths.min - 40.0).abs() < 0.001, "min {}", widths.min);
    }
}
