//! Uniform run and line queries over either layout of a block.
//!
//! Callers walk runs in flow order without knowing whether the block took the
//! simple path or built line boxes.

use crate::geometry::{BaselinePoint, LayoutRect};
use crate::line_boxes::{LeafKind, LineBoxTree};
use crate::simple_line_layout::RunLineTable;
use core::iter::FusedIterator;
use core::ops::Range;
use css_display::{NodeId, RenderTree};

#[derive(Clone, Copy, Debug)]
enum Backing<'layout> {
    Simple(&'layout RunLineTable),
    LineBoxes(&'layout LineBoxTree),
}

/// A read-only view of one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunView<'layout> {
    /// Flow offset of the first character.
    pub start: usize,
    /// Flow offset one past the last character.
    pub end: usize,
    pub rect: LayoutRect,
    pub baseline: BaselinePoint,
    /// The run's characters; empty for forced breaks and atomic inlines.
    pub text: &'layout str,
    pub is_end_of_line: bool,
    pub line_index: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct RunResolver<'layout> {
    backing: Backing<'layout>,
}

impl<'layout> RunResolver<'layout> {
    pub const fn for_simple(table: &'layout RunLineTable) -> Self {
        Self {
            backing: Backing::Simple(table),
        }
    }

    pub const fn for_line_boxes(tree: &'layout LineBoxTree) -> Self {
        Self {
            backing: Backing::LineBoxes(tree),
        }
    }

    pub fn run_count(&self) -> usize {
        match self.backing {
            Backing::Simple(table) => table.runs().len(),
            Backing::LineBoxes(tree) => tree.leaves().len(),
        }
    }

    pub fn line_count(&self) -> usize {
        match self.backing {
            Backing::Simple(table) => table.lines().len(),
            Backing::LineBoxes(tree) => tree.lines().len(),
        }
    }

    /// Top, height, and baseline offset of line `index`.
    fn line_geometry(&self, index: usize) -> Option<(f32, f32, f32)> {
        match self.backing {
            Backing::Simple(table) => table
                .lines()
                .get(index)
                .map(|line| (line.top, line.height, line.baseline)),
            Backing::LineBoxes(tree) => tree
                .lines()
                .get(index)
                .map(|line| (line.top, line.height, line.baseline)),
        }
    }

    fn line_runs(&self, index: usize) -> Option<Range<usize>> {
        match self.backing {
            Backing::Simple(table) => table.lines().get(index).map(|line| line.runs.clone()),
            Backing::LineBoxes(tree) => tree.lines().get(index).map(|line| line.leaves.clone()),
        }
    }

    pub fn run(&self, index: usize) -> Option<RunView<'layout>> {
        match self.backing {
            Backing::Simple(table) => {
                let run = table.runs().get(index)?;
                let (top, height, baseline) = self.line_geometry(run.line_index)?;
                Some(RunView {
                    start: run.start,
                    end: run.end,
                    rect: LayoutRect::new(run.left, top, run.width(), height),
                    baseline: BaselinePoint {
                        x: run.left,
                        y: top + baseline,
                    },
                    text: table.run_text(run),
                    is_end_of_line: run.is_end_of_line,
                    line_index: run.line_index,
                })
            }
            Backing::LineBoxes(tree) => {
                let leaf = tree.leaves().get(index)?;
                let (top, height, baseline) = self.line_geometry(leaf.line_index)?;
                Some(RunView {
                    start: leaf.start,
                    end: leaf.end,
                    rect: LayoutRect::new(leaf.left, top, leaf.right - leaf.left, height),
                    baseline: BaselinePoint {
                        x: leaf.left,
                        y: top + baseline,
                    },
                    text: tree.leaf_text(leaf),
                    is_end_of_line: leaf.is_end_of_line,
                    line_index: leaf.line_index,
                })
            }
        }
    }

    /// Every run in flow order.
    pub fn runs(&self) -> Runs<'layout> {
        Runs {
            resolver: *self,
            front: 0,
            back: self.run_count(),
        }
    }

    fn runs_in(&self, range: Range<usize>) -> Runs<'layout> {
        let back = range.end.min(self.run_count());
        Runs {
            resolver: *self,
            front: range.start.min(back),
            back,
        }
    }

    /// Lines whose vertical extent intersects `rect`. Lines are sorted by `top`.
    fn lines_for_rect(&self, rect: &LayoutRect) -> Range<usize> {
        let (first, last) = match self.backing {
            Backing::Simple(table) => {
                let lines = table.lines();
                (
                    lines.partition_point(|line| line.bottom() <= rect.y),
                    lines.partition_point(|line| line.top < rect.bottom()),
                )
            }
            Backing::LineBoxes(tree) => {
                let lines = tree.lines();
                (
                    lines.partition_point(|line| line.bottom() <= rect.y),
                    lines.partition_point(|line| line.top < rect.bottom()),
                )
            }
        };
        first..last.max(first)
    }

    fn run_span(&self, index: usize) -> Option<(usize, usize)> {
        match self.backing {
            Backing::Simple(table) => table.runs().get(index).map(|run| (run.start, run.end)),
            Backing::LineBoxes(tree) => tree.leaves().get(index).map(|leaf| (leaf.start, leaf.end)),
        }
    }

    /// Index of the run containing flow offset `position`.
    ///
    /// Queries walking forward are answered from the previous result or its
    /// successor; others fall back to binary search.
    pub fn run_index_for_position(&self, position: usize) -> Option<usize> {
        let contains = |index: usize| {
            self.run_span(index)
                .is_some_and(|(start, end)| start <= position && position < end)
        };
        let cache = match self.backing {
            Backing::Simple(table) => table.last_run(),
            Backing::LineBoxes(tree) => tree.last_leaf(),
        };
        let cached = cache.get();
        for candidate in [cached, cached + 1] {
            if contains(candidate) {
                cache.set(candidate);
                return Some(candidate);
            }
        }
        let index = match self.backing {
            Backing::Simple(table) => table.runs().partition_point(|run| run.end <= position),
            Backing::LineBoxes(tree) => tree.leaves().partition_point(|leaf| leaf.end <= position),
        };
        if !contains(index) {
            return None;
        }
        cache.set(index);
        Some(index)
    }

    /// The run containing flow offset `position`.
    pub fn run_for_position(&self, position: usize) -> Option<RunView<'layout>> {
        self.run(self.run_index_for_position(position)?)
    }

    /// Runs on every line the rectangle touches vertically, whole lines at a time.
    pub fn range_for_rect(&self, rect: &LayoutRect) -> Runs<'layout> {
        let lines = self.lines_for_rect(rect);
        if lines.is_empty() {
            return self.runs_in(0..0);
        }
        let start = self.line_runs(lines.start).map_or(0, |runs| runs.start);
        let end = lines
            .end
            .checked_sub(1)
            .and_then(|last| self.line_runs(last))
            .map_or(start, |runs| runs.end);
        self.runs_in(start..end)
    }

    /// The smallest contiguous stretch of runs covering `renderer`'s content:
    /// its own text or break, everything inside it, and everything inside the
    /// other parts of its continuation chain.
    pub fn range_for_renderer(&self, tree: &RenderTree, renderer: NodeId) -> Runs<'layout> {
        let chain: Vec<NodeId> = tree
            .continuation_chain(tree.continuation_head(renderer))
            .collect();
        let covers = |owner: NodeId| {
            chain
                .iter()
                .any(|&part| part == owner || tree.is_ancestor_of(part, owner))
        };
        match self.backing {
            Backing::Simple(table) => {
                let segments = table.contents().segments();
                let first = segments.iter().find(|segment| covers(segment.owner.renderer()));
                let last = segments
                    .iter()
                    .rev()
                    .find(|segment| covers(segment.owner.renderer()));
                let Some((start, end)) = first.zip(last).map(|(first, last)| (first.start, last.end))
                else {
                    return self.runs_in(0..0);
                };
                let runs = table.runs();
                let front = self
                    .run_index_for_position(start)
                    .unwrap_or_else(|| runs.partition_point(|run| run.end <= start));
                let back = end
                    .checked_sub(1)
                    .and_then(|last| self.run_index_for_position(last))
                    .map_or_else(|| runs.partition_point(|run| run.start < end), |index| index + 1);
                self.runs_in(front..back.max(front))
            }
            Backing::LineBoxes(line_boxes) => {
                let leaves = line_boxes.leaves();
                let first = leaves.iter().position(|leaf| covers(leaf.renderer));
                let last = leaves.iter().rposition(|leaf| covers(leaf.renderer));
                match first.zip(last) {
                    Some((first, last)) => self.runs_in(first..last + 1),
                    None => self.runs_in(0..0),
                }
            }
        }
    }

    /// Whether the runs describe atomic inlines as well as text.
    pub fn has_atomic_runs(&self) -> bool {
        match self.backing {
            Backing::Simple(_) => false,
            Backing::LineBoxes(tree) => tree.leaves().iter().any(|leaf| leaf.kind == LeafKind::Atomic),
        }
    }
}

/// Runs in flow order; walks from either end.
#[derive(Clone, Debug)]
pub struct Runs<'layout> {
    resolver: RunResolver<'layout>,
    front: usize,
    back: usize,
}

impl<'layout> Iterator for Runs<'layout> {
    type Item = RunView<'layout>;

    fn next(&mut self) -> Option<RunView<'layout>> {
        if self.front >= self.back {
            return None;
        }
        let run = self.resolver.run(self.front);
        self.front += 1;
        run
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<'layout> DoubleEndedIterator for Runs<'layout> {
    fn next_back(&mut self) -> Option<RunView<'layout>> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.resolver.run(self.back)
    }
}

impl ExactSizeIterator for Runs<'_> {}

impl FusedIterator for Runs<'_> {}

/// A read-only view of one line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineView {
    pub index: usize,
    pub rect: LayoutRect,
    pub baseline: f32,
}

/// Line-level queries over a block's layout.
#[derive(Clone, Copy, Debug)]
pub struct LineResolver<'layout> {
    runs: RunResolver<'layout>,
}

impl<'layout> LineResolver<'layout> {
    pub const fn new(runs: RunResolver<'layout>) -> Self {
        Self { runs }
    }

    pub fn line(&self, index: usize) -> Option<LineView> {
        let (top, height, baseline) = self.runs.line_geometry(index)?;
        let range = self.runs.line_runs(index)?;
        let (left, right) = range
            .filter_map(|run| self.runs.run(run))
            .fold(None, |extent: Option<(f32, f32)>, run| {
                Some(extent.map_or((run.rect.x, run.rect.right()), |(left, right)| {
                    (left.min(run.rect.x), right.max(run.rect.right()))
                }))
            })
            .unwrap_or((0.0, 0.0));
        Some(LineView {
            index,
            rect: LayoutRect::new(left, top, right - left, height),
            baseline: top + baseline,
        })
    }

    /// Every line, top to bottom.
    pub fn lines(&self) -> Lines<'layout> {
        Lines {
            resolver: *self,
            front: 0,
            back: self.runs.line_count(),
        }
    }

    /// Lines whose vertical extent intersects `rect`.
    pub fn range_for_rect(&self, rect: &LayoutRect) -> Lines<'layout> {
        let range = self.runs.lines_for_rect(rect);
        Lines {
            resolver: *self,
            front: range.start,
            back: range.end,
        }
    }

    /// Runs of line `index`.
    pub fn runs_for_line(&self, index: usize) -> Runs<'layout> {
        let range = self.runs.line_runs(index).unwrap_or(0..0);
        self.runs.runs_in(range)
    }
}

#[derive(Clone, Debug)]
pub struct Lines<'layout> {
    resolver: LineResolver<'layout>,
    front: usize,
    back: usize,
}

impl Iterator for Lines<'_> {
    type Item = LineView;

    fn next(&mut self) -> Option<LineView> {
        if self.front >= self.back {
            return None;
        }
        let line = self.resolver.line(self.front);
        self.front += 1;
        line
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Lines<'_> {
    fn next_back(&mut self) -> Option<LineView> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.resolver.line(self.back)
    }
}

impl ExactSizeIterator for Lines<'_> {}

impl FusedIterator for Lines<'_> {}
