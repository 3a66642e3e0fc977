//! Fast path for blocks holding nothing but uniformly styled text and breaks.
//!
//! Such a block needs no line-box tree: its lines are a flat table of runs,
//! each a slice of one flow segment with a horizontal extent.

mod avoidance;

pub use avoidance::{AvoidanceReasons, IncludeReasons};

use crate::flow_contents::{FlowContents, Segment};
use crate::line_breaker::{LineBreaker, Piece};
use core::cell::Cell;
use core::ops::Range;
use css_display::{NodeId, RenderKind, RenderTree};
use css_style_model::{ComputedStyle, Direction, Hyphens, WhiteSpace};
use css_text::preferred_widths::SOFT_HYPHEN;
use css_text::{BreakRules, LineMetrics, TextContext};
use log::trace;
use std::rc::Rc;
use unicode_bidi::{BidiInfo, Level};

/// A contiguous slice of one segment placed on one line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Run {
    pub start: usize,
    pub end: usize,
    pub left: f32,
    pub right: f32,
    /// The last run of its line.
    pub is_end_of_line: bool,
    pub line_index: usize,
}

impl Run {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub top: f32,
    pub height: f32,
    /// Offset of the baseline from `top`.
    pub baseline: f32,
    pub(crate) runs: Range<usize>,
}

impl Line {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Indices into [`RunLineTable::runs`].
    pub fn run_range(&self) -> Range<usize> {
        self.runs.clone()
    }
}

/// Result of the fast path: runs in flow order and the lines holding them.
#[derive(Debug)]
pub struct RunLineTable {
    contents: FlowContents,
    runs: Vec<Run>,
    lines: Vec<Line>,
    /// Run found by the previous offset lookup.
    last_run: Cell<usize>,
}

impl RunLineTable {
    pub fn contents(&self) -> &FlowContents {
        &self.contents
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn height(&self) -> f32 {
        self.lines.last().map_or(0.0, Line::bottom)
    }

    pub(crate) const fn last_run(&self) -> &Cell<usize> {
        &self.last_run
    }

    /// Text of `run`; empty for a forced break.
    pub fn run_text(&self, run: &Run) -> &str {
        self.contents
            .segment_for_run(run.start, run.end)
            .map_or("", |segment| segment.text_for_range(run.start, run.end))
    }
}

fn same_line_style(block: &ComputedStyle, child: &ComputedStyle) -> bool {
    block.font_size.to_bits() == child.font_size.to_bits()
        && block.line_height.map(f32::to_bits) == child.line_height.map(f32::to_bits)
        && block.font_family == child.font_family
        && block.font_weight == child.font_weight
        && block.white_space == child.white_space
        && block.word_break == child.word_break
        && block.line_break == child.line_break
        && block.direction == child.direction
        && block.hyphens == child.hyphens
        && block.nbsp_mode == child.nbsp_mode
        && block.word_spacing.to_bits() == child.word_spacing.to_bits()
        && block.letter_spacing.to_bits() == child.letter_spacing.to_bits()
        && block.tab_size == child.tab_size
}

/// Style and structure checks; these need no text scan.
pub(crate) fn structural_reasons(tree: &RenderTree, block: NodeId, include: IncludeReasons) -> AvoidanceReasons {
    let mut reasons = AvoidanceReasons::NONE;
    let Some(object) = tree.get(block) else {
        return AvoidanceReasons::FLOW_IS_MISSING;
    };
    let stop = |reasons: AvoidanceReasons| include == IncludeReasons::First && !reasons.is_empty();

    if !object.is_block_container() || !object.children_inline() {
        reasons.insert(AvoidanceReasons::FLOW_CHILDREN_NOT_INLINE);
        if stop(reasons) {
            return reasons;
        }
    }
    if tree.first_child(block).is_none() {
        reasons.insert(AvoidanceReasons::FLOW_HAS_NO_CHILD);
        if stop(reasons) {
            return reasons;
        }
    }
    let style = &object.style;
    if style.hyphens == Hyphens::Auto {
        reasons.insert(AvoidanceReasons::FLOW_HAS_AUTO_HYPHENATION);
    }
    if style.white_space == WhiteSpace::BreakSpaces {
        reasons.insert(AvoidanceReasons::FLOW_HAS_UNSUPPORTED_WHITE_SPACE);
    }
    if stop(reasons) {
        return reasons;
    }

    let mut stack: Vec<NodeId> = tree.children(block).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        let Some(child) = tree.get(node) else {
            continue;
        };
        match child.kind {
            RenderKind::Text(_) | RenderKind::LineBreak => {
                if !same_line_style(style, &child.style) {
                    reasons.insert(AvoidanceReasons::FLOW_CHILD_STYLE_DIFFERS);
                }
            }
            RenderKind::Inline => {
                if child.style.is_floating() {
                    reasons.insert(AvoidanceReasons::FLOW_HAS_FLOAT);
                } else if child.style.is_out_of_flow_positioned() {
                    reasons.insert(AvoidanceReasons::FLOW_HAS_OUT_OF_FLOW_CHILD);
                }
                if child.style.needs_own_line_box() {
                    reasons.insert(AvoidanceReasons::FLOW_HAS_DECORATED_INLINE_BOX);
                }
                stack.extend(tree.children(node).into_iter().rev());
            }
            RenderKind::Block { .. } => {
                if child.style.is_floating() {
                    reasons.insert(AvoidanceReasons::FLOW_HAS_FLOAT);
                } else if child.style.is_out_of_flow_positioned() {
                    reasons.insert(AvoidanceReasons::FLOW_HAS_OUT_OF_FLOW_CHILD);
                } else if child.is_inline_level() {
                    reasons.insert(AvoidanceReasons::FLOW_HAS_ATOMIC_INLINE);
                } else {
                    reasons.insert(AvoidanceReasons::FLOW_CHILDREN_NOT_INLINE);
                }
            }
        }
        if stop(reasons) {
            return reasons;
        }
    }
    reasons
}

/// Text checks for one segment. `flow_level` carries the bidi level the flow
/// has settled on so far.
fn segment_reasons(
    segment: &Segment,
    context: TextContext<'_>,
    flow_level: &mut Option<Level>,
) -> AvoidanceReasons {
    let mut reasons = AvoidanceReasons::NONE;
    if segment.is_line_break() {
        return reasons;
    }
    let text = segment.text();
    let style = segment.style();
    if style.hyphens != Hyphens::None && text.contains(SOFT_HYPHEN) {
        reasons.insert(AvoidanceReasons::FLOW_TEXT_HAS_SOFT_HYPHEN);
    }
    if context.measurer.requires_complex_path(text, style) {
        reasons.insert(AvoidanceReasons::FLOW_TEXT_REQUIRES_COMPLEX_PATH);
    }

    let rtl = style.direction == Direction::Rtl;
    let level = if segment.is_all_ascii() && !rtl {
        Some(Level::ltr())
    } else {
        let base = if rtl { Level::rtl() } else { Level::ltr() };
        let info = BidiInfo::new(text, Some(base));
        let first = info.levels.first().copied();
        if info.levels.iter().all(|level| Some(*level) == first) {
            first
        } else {
            reasons.insert(AvoidanceReasons::FLOW_HAS_MIXED_BIDI_LEVELS);
            None
        }
    };
    if let Some(level) = level {
        match *flow_level {
            Some(settled) if settled != level => {
                reasons.insert(AvoidanceReasons::FLOW_HAS_MIXED_BIDI_LEVELS);
            }
            Some(_) => {}
            None => *flow_level = Some(level),
        }
    }
    reasons
}

/// Every reason `block` cannot use the fast path, or the first one found.
pub fn can_use_for(
    tree: &RenderTree,
    block: NodeId,
    context: TextContext<'_>,
    include: IncludeReasons,
) -> AvoidanceReasons {
    let mut reasons = structural_reasons(tree, block, include);
    if reasons.intersects(AvoidanceReasons::NON_TEXT_CONTENT)
        || (include == IncludeReasons::First && !reasons.is_empty())
    {
        return reasons;
    }
    let contents = FlowContents::new(tree, block);
    let mut flow_level = None;
    for segment in contents.segments() {
        reasons.insert(segment_reasons(segment, context, &mut flow_level));
        if include == IncludeReasons::First && !reasons.is_empty() {
            break;
        }
    }
    reasons
}

/// Break `contents` into lines. Text is checked as it is laid out; on the
/// first disqualifying segment everything built so far is dropped.
pub fn create(
    contents: FlowContents,
    block_style: &ComputedStyle,
    context: TextContext<'_>,
    available_width: f32,
) -> Result<RunLineTable, AvoidanceReasons> {
    let mut breaker = LineBreaker::new(
        contents.text(),
        BreakRules::for_style(block_style),
        context,
        available_width,
    );
    let mut flow_level = None;
    for (index, segment) in contents.segments().iter().enumerate() {
        let reasons = segment_reasons(segment, context, &mut flow_level);
        if !reasons.is_empty() {
            trace!("simple line layout abandoned at segment {index}: {reasons:?}");
            return Err(reasons);
        }
        if segment.is_line_break() {
            breaker.push_forced_break(index, segment.start, segment.end);
        } else {
            breaker.push_text(
                index,
                segment.start,
                segment.text(),
                segment.style(),
                segment.is_all_ascii(),
            );
        }
    }
    let broken = breaker.finish();

    let metrics = LineMetrics::resolve(context.measurer.font_metrics(block_style), block_style);
    let mut runs = Vec::new();
    let mut lines = Vec::with_capacity(broken.len());
    for (line_index, pieces) in broken.iter().enumerate() {
        let first_run = runs.len();
        append_runs(&mut runs, pieces, line_index);
        lines.push(Line {
            top: metrics.height * line_index as f32,
            height: metrics.height,
            baseline: metrics.baseline,
            runs: first_run..runs.len(),
        });
    }
    Ok(RunLineTable {
        contents,
        runs,
        lines,
        last_run: Cell::new(0),
    })
}

/// One run per stretch of pieces from the same segment.
fn append_runs(runs: &mut Vec<Run>, pieces: &[Piece], line_index: usize) {
    let mut current: Option<(usize, Run)> = None;
    for piece in pieces {
        match &mut current {
            Some((item, run)) if *item == piece.item => {
                run.end = piece.end;
                run.right = piece.right;
            }
            _ => {
                if let Some((_, run)) = current.take() {
                    runs.push(run);
                }
                current = Some((
                    piece.item,
                    Run {
                        start: piece.start,
                        end: piece.end,
                        left: piece.left,
                        right: piece.right,
                        is_end_of_line: false,
                        line_index,
                    },
                ));
            }
        }
    }
    if let Some((_, mut run)) = current {
        run.is_end_of_line = true;
        runs.push(run);
    }
}

/// Lay out `block` on the fast path if it qualifies.
pub fn layout_simple(
    tree: &RenderTree,
    block: NodeId,
    context: TextContext<'_>,
    available_width: f32,
) -> Option<RunLineTable> {
    if !structural_reasons(tree, block, IncludeReasons::First).is_empty() {
        return None;
    }
    let style = tree.get(block).map(|object| Rc::clone(&object.style))?;
    create(FlowContents::new(tree, block), &style, context, available_width).ok()
}
