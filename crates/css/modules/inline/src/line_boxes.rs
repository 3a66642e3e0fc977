//! Full inline layout: line boxes holding leaf boxes and inline box fragments.
//! Spec: CSS Inline 3 §2 — Inline layout model
//!   <https://www.w3.org/TR/css-inline-3/#model>

use crate::intrinsic::block_preferred_widths;
use crate::line_breaker::{LineBreaker, Piece, PieceKind};
use core::cell::Cell;
use core::ops::Range;
use css_display::{NodeId, RenderKind, RenderTree};
use css_style_model::ComputedStyle;
use css_text::{BreakRules, LineMetrics, TextContext};
use log::{debug, warn};
use smallvec::SmallVec;
use std::rc::Rc;

/// Flow text standing in for an atomic inline.
const OBJECT_REPLACEMENT: char = '\u{fffc}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafKind {
    Text,
    LineBreak,
    Atomic,
}

/// A text slice, forced break, or atomic inline placed on a line.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafBox {
    pub renderer: NodeId,
    pub kind: LeafKind,
    pub start: usize,
    pub end: usize,
    pub left: f32,
    pub right: f32,
    pub line_index: usize,
    pub is_end_of_line: bool,
}

/// The part of an inline box that lies on one line.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineFlowBox {
    pub renderer: NodeId,
    pub left: f32,
    pub right: f32,
    /// Nesting depth below the line's root box.
    pub depth: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineBox {
    pub top: f32,
    pub height: f32,
    pub baseline: f32,
    pub(crate) leaves: Range<usize>,
    pub inline_boxes: Vec<InlineFlowBox>,
}

impl LineBox {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Indices into [`LineBoxTree::leaves`].
    pub fn leaf_range(&self) -> Range<usize> {
        self.leaves.clone()
    }
}

#[derive(Debug, Default)]
pub struct LineBoxTree {
    text: String,
    leaves: Vec<LeafBox>,
    lines: Vec<LineBox>,
    out_of_flow: Vec<NodeId>,
    /// Leaf found by the previous offset lookup.
    last_leaf: Cell<usize>,
}

impl LineBoxTree {
    /// Flow text; forced breaks appear as `'\n'` and atomics as U+FFFC.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn leaves(&self) -> &[LeafBox] {
        &self.leaves
    }

    pub fn lines(&self) -> &[LineBox] {
        &self.lines
    }

    /// Floats and positioned boxes skipped by line layout.
    pub fn out_of_flow(&self) -> &[NodeId] {
        &self.out_of_flow
    }

    pub(crate) const fn last_leaf(&self) -> &Cell<usize> {
        &self.last_leaf
    }

    pub fn height(&self) -> f32 {
        self.lines.last().map_or(0.0, LineBox::bottom)
    }

    /// Characters of a text leaf; empty for breaks and atomics.
    pub fn leaf_text(&self, leaf: &LeafBox) -> &str {
        match leaf.kind {
            LeafKind::Text => self.text.get(leaf.start..leaf.end).unwrap_or_default(),
            LeafKind::LineBreak | LeafKind::Atomic => "",
        }
    }
}

#[derive(Debug)]
enum FlowItem {
    Text {
        renderer: NodeId,
        start: usize,
        text: Rc<str>,
        style: Rc<ComputedStyle>,
        all_ascii: bool,
    },
    LineBreak {
        renderer: NodeId,
        start: usize,
        style: Rc<ComputedStyle>,
    },
    InlineStart {
        renderer: NodeId,
        position: usize,
        extent: f32,
        style: Rc<ComputedStyle>,
    },
    InlineEnd {
        renderer: NodeId,
        position: usize,
        extent: f32,
    },
    Atomic {
        renderer: NodeId,
        start: usize,
        width: f32,
        style: Rc<ComputedStyle>,
    },
}

#[derive(Debug, Default)]
struct FlowItems {
    items: Vec<FlowItem>,
    text: String,
    out_of_flow: Vec<NodeId>,
}

fn collect_items(
    tree: &mut RenderTree,
    parent: NodeId,
    context: TextContext<'_>,
    flow: &mut FlowItems,
) {
    for child in tree.children(parent) {
        let Some(object) = tree.get(child) else {
            continue;
        };
        let style = Rc::clone(&object.style);
        let start = flow.text.len();
        if object.is_floating_or_out_of_flow() {
            flow.out_of_flow.push(child);
            continue;
        }
        match &object.kind {
            RenderKind::Text(fragment) => {
                if fragment.is_empty() {
                    continue;
                }
                flow.text.push_str(fragment.text());
                flow.items.push(FlowItem::Text {
                    renderer: child,
                    start,
                    text: fragment.shared_text(),
                    style,
                    all_ascii: fragment.is_all_ascii(),
                });
            }
            RenderKind::LineBreak => {
                flow.text.push('\n');
                flow.items.push(FlowItem::LineBreak {
                    renderer: child,
                    start,
                    style,
                });
            }
            RenderKind::Inline => {
                let start_extent = if object.continuation_prev().is_none() {
                    style.inline_start_extent()
                } else {
                    0.0
                };
                let end_extent = if object.continuation().is_none() {
                    style.inline_end_extent()
                } else {
                    0.0
                };
                flow.items.push(FlowItem::InlineStart {
                    renderer: child,
                    position: start,
                    extent: start_extent,
                    style,
                });
                collect_items(tree, child, context, flow);
                flow.items.push(FlowItem::InlineEnd {
                    renderer: child,
                    position: flow.text.len(),
                    extent: end_extent,
                });
            }
            RenderKind::Block { .. } => {
                if !object.is_inline_level() {
                    warn!("block-level {child:?} inside inline flow of {parent:?}; laid out as atomic");
                }
                let extents = style.inline_start_extent() + style.inline_end_extent();
                let width = block_preferred_widths(tree, child, context).max + extents;
                flow.text.push(OBJECT_REPLACEMENT);
                flow.items.push(FlowItem::Atomic {
                    renderer: child,
                    start,
                    width,
                    style,
                });
            }
        }
    }
}

/// Tallest ascent and descent seen on a line.
#[derive(Clone, Copy, Debug)]
struct VerticalExtent {
    ascent: f32,
    descent: f32,
}

impl VerticalExtent {
    fn new(strut: LineMetrics) -> Self {
        Self {
            ascent: strut.baseline,
            descent: strut.height - strut.baseline,
        }
    }

    fn include(&mut self, metrics: LineMetrics) {
        self.ascent = self.ascent.max(metrics.baseline);
        self.descent = self.descent.max(metrics.height - metrics.baseline);
    }
}

fn metrics_for(style: &ComputedStyle, context: TextContext<'_>) -> LineMetrics {
    LineMetrics::resolve(context.measurer.font_metrics(style), style)
}

struct OpenInline {
    renderer: NodeId,
    left: f32,
    style: Rc<ComputedStyle>,
}

/// Break and assemble the inline content of `block` into line boxes.
pub fn build_line_boxes(
    tree: &mut RenderTree,
    block: NodeId,
    context: TextContext<'_>,
    available_width: f32,
) -> LineBoxTree {
    let Some(block_style) = tree.get(block).map(|object| Rc::clone(&object.style)) else {
        return LineBoxTree::default();
    };
    let mut flow = FlowItems::default();
    collect_items(tree, block, context, &mut flow);

    let mut breaker = LineBreaker::new(
        &flow.text,
        BreakRules::for_style(&block_style),
        context,
        available_width,
    );
    for (index, item) in flow.items.iter().enumerate() {
        match item {
            FlowItem::Text {
                start,
                text,
                style,
                all_ascii,
                ..
            } => breaker.push_text(index, *start, text, style, *all_ascii),
            FlowItem::LineBreak { start, .. } => breaker.push_forced_break(index, *start, *start + 1),
            FlowItem::InlineStart {
                position, extent, ..
            } => breaker.push_inline_start(index, *position, *extent),
            FlowItem::InlineEnd {
                position, extent, ..
            } => breaker.push_inline_end(index, *position, *extent),
            FlowItem::Atomic {
                start,
                width,
                style,
                ..
            } => breaker.push_atomic(
                index,
                *start,
                *start + OBJECT_REPLACEMENT.len_utf8(),
                *width,
                style.auto_wrap(),
            ),
        }
    }
    let broken = breaker.finish();
    let result = assemble(flow, &broken, &block_style, context);
    debug!(
        "line boxes for {block:?}: {} lines, {} leaves",
        result.lines.len(),
        result.leaves.len()
    );
    result
}

fn assemble(
    flow: FlowItems,
    broken: &[Vec<Piece>],
    block_style: &ComputedStyle,
    context: TextContext<'_>,
) -> LineBoxTree {
    let strut = metrics_for(block_style, context);
    let mut leaves: Vec<LeafBox> = Vec::new();
    let mut lines = Vec::with_capacity(broken.len());
    let mut open: SmallVec<OpenInline, 4> = SmallVec::new();
    let mut top = 0.0;

    for (line_index, pieces) in broken.iter().enumerate() {
        let first_leaf = leaves.len();
        let mut inline_boxes = Vec::new();
        let mut vertical = VerticalExtent::new(strut);
        for carried in &mut open {
            carried.left = 0.0;
            vertical.include(metrics_for(&carried.style, context));
        }
        let mut text_item: Option<usize> = None;

        for piece in pieces {
            let Some(item) = flow.items.get(piece.item) else {
                continue;
            };
            match item {
                FlowItem::Text {
                    renderer, style, ..
                } => {
                    let extends = text_item == Some(piece.item) && leaves.len() > first_leaf;
                    match leaves.last_mut() {
                        Some(leaf) if extends => {
                            leaf.end = piece.end;
                            leaf.right = piece.right;
                        }
                        _ => {
                            leaves.push(leaf_for(*renderer, LeafKind::Text, piece, line_index));
                            vertical.include(metrics_for(style, context));
                        }
                    }
                    text_item = Some(piece.item);
                }
                FlowItem::LineBreak {
                    renderer, style, ..
                } => {
                    leaves.push(leaf_for(*renderer, LeafKind::LineBreak, piece, line_index));
                    vertical.include(metrics_for(style, context));
                    text_item = None;
                }
                FlowItem::Atomic {
                    renderer, style, ..
                } => {
                    leaves.push(leaf_for(*renderer, LeafKind::Atomic, piece, line_index));
                    vertical.include(metrics_for(style, context));
                    text_item = None;
                }
                FlowItem::InlineStart {
                    renderer, style, ..
                } => {
                    vertical.include(metrics_for(style, context));
                    open.push(OpenInline {
                        renderer: *renderer,
                        left: piece.left,
                        style: Rc::clone(style),
                    });
                }
                FlowItem::InlineEnd { renderer, .. } => {
                    if let Some(depth) = open.iter().rposition(|candidate| candidate.renderer == *renderer) {
                        let closed = open.remove(depth);
                        inline_boxes.push(InlineFlowBox {
                            renderer: *renderer,
                            left: closed.left,
                            right: piece.right,
                            depth,
                        });
                    }
                }
            }
        }

        let line_right = pieces
            .iter()
            .rev()
            .find(|piece| piece.kind != PieceKind::InlineStart)
            .map_or(0.0, |piece| piece.right);
        for (depth, carried) in open.iter().enumerate() {
            inline_boxes.push(InlineFlowBox {
                renderer: carried.renderer,
                left: carried.left,
                right: line_right.max(carried.left),
                depth,
            });
        }
        if leaves.len() > first_leaf
            && let Some(last) = leaves.last_mut()
        {
            last.is_end_of_line = true;
        }
        let height = vertical.ascent + vertical.descent;
        lines.push(LineBox {
            top,
            height,
            baseline: vertical.ascent,
            leaves: first_leaf..leaves.len(),
            inline_boxes,
        });
        top += height;
    }

    LineBoxTree {
        text: flow.text,
        leaves,
        lines,
        out_of_flow: flow.out_of_flow,
        last_leaf: Cell::new(0),
    }
}

const fn leaf_for(renderer: NodeId, kind: LeafKind, piece: &Piece, line_index: usize) -> LeafBox {
    LeafBox {
        renderer,
        kind,
        start: piece.start,
        end: piece.end,
        left: piece.left,
        right: piece.right,
        line_index,
        is_end_of_line: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_display::NodeKey;
    use css_style_model::{Display, Edges};
    use css_text::{FixedPitchMeasurer, NoHyphenation, TextFragment};

    const MONO: FixedPitchMeasurer = FixedPitchMeasurer::new(10.0);

    fn context() -> TextContext<'static> {
        TextContext::new(&MONO, &NoHyphenation)
    }

    fn paragraph(tree: &mut RenderTree) -> NodeId {
        let block = tree.create_block(
            Rc::new(ComputedStyle {
                display: Display::Block,
                ..ComputedStyle::default()
            }),
            Some(NodeKey(1)),
        );
        tree.add_child(tree.root(), block, None);
        block
    }

    fn text(tree: &mut RenderTree, parent: NodeId, content: &str, key: u64) -> NodeId {
        let id = tree.create_text(
            TextFragment::new(content),
            Rc::new(ComputedStyle::default()),
            Some(NodeKey(key)),
        );
        tree.add_child(parent, id, None);
        id
    }

    fn padded(left: f32, right: f32) -> Edges {
        Edges {
            left,
            right,
            ..Edges::default()
        }
    }

    /// # Panics
    /// Panics if a padded span wrapping onto two lines loses a fragment.
    #[test]
    fn inline_box_fragments_per_line() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let block = paragraph(&mut tree);
        text(&mut tree, block, "aa ", 2);
        let span = tree.create_inline(
            Rc::new(ComputedStyle {
                padding: padded(5.0, 5.0),
                ..ComputedStyle::default()
            }),
            Some(NodeKey(3)),
        );
        tree.add_child(block, span, None);
        text(&mut tree, span, "bb cc", 4);
        let tail = text(&mut tree, block, " dd", 5);

        let boxes = build_line_boxes(&mut tree, block, context(), 60.0);
        let lines = boxes.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].inline_boxes,
            vec![InlineFlowBox {
                renderer: span,
                left: 30.0,
                right: 55.0,
                depth: 0
            }]
        );
        assert_eq!(
            lines[1].inline_boxes,
            vec![InlineFlowBox {
                renderer: span,
                left: 0.0,
                right: 25.0,
                depth: 0
            }]
        );
        let second: Vec<&LeafBox> = boxes.leaves()[lines[1].leaf_range()].iter().collect();
        assert_eq!(second.len(), 2);
        assert_eq!(boxes.leaf_text(second[0]), "cc");
        assert_eq!(second[1].renderer, tail);
        assert_eq!((second[1].left, second[1].right), (25.0, 55.0));
        assert!(second[1].is_end_of_line);
    }

    /// # Panics
    /// Panics if a larger font does not grow its line.
    #[test]
    fn tallest_item_sets_line_height() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let block = paragraph(&mut tree);
        text(&mut tree, block, "small ", 2);
        let big = tree.create_text(
            TextFragment::new("BIG"),
            Rc::new(ComputedStyle {
                font_size: 32.0,
                ..ComputedStyle::default()
            }),
            Some(NodeKey(3)),
        );
        tree.add_child(block, big, None);
        let boxes = build_line_boxes(&mut tree, block, context(), 500.0);
        let line = &boxes.lines()[0];
        assert_eq!(line.height, 32.0);
        assert_eq!(line.baseline, 26.0);
    }

    /// # Panics
    /// Panics if an inline-block is not placed as one atomic leaf.
    #[test]
    fn atomic_inline_uses_max_content_width() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let block = paragraph(&mut tree);
        text(&mut tree, block, "xx ", 2);
        let atomic = tree.create_block(
            Rc::new(ComputedStyle {
                display: Display::InlineBlock,
                padding: padded(5.0, 5.0),
                ..ComputedStyle::default()
            }),
            Some(NodeKey(3)),
        );
        tree.add_child(block, atomic, None);
        text(&mut tree, atomic, "abcd", 4);
        let boxes = build_line_boxes(&mut tree, block, context(), 100.0);
        let leaves = boxes.leaves();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[1].kind, LeafKind::Atomic);
        assert_eq!((leaves[1].left, leaves[1].right), (30.0, 80.0));
        assert_eq!(boxes.leaf_text(&leaves[1]), "");
    }
}
