//! Flattened, offset-addressable view of a block's inline content.

use core::cell::Cell;
use css_display::{NodeId, RenderKind, RenderTree};
use css_style_model::ComputedStyle;
use log::error;
use std::rc::Rc;

/// What produced a segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SegmentOwner {
    Text(NodeId),
    /// A forced break; occupies one offset and has no text.
    LineBreak(NodeId),
}

impl SegmentOwner {
    pub const fn renderer(self) -> NodeId {
        match self {
            Self::Text(id) | Self::LineBreak(id) => id,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Segment {
    /// Offset of the first byte in the flow.
    pub start: usize,
    /// Offset one past the last byte in the flow.
    pub end: usize,
    pub owner: SegmentOwner,
    text: Rc<str>,
    style: Rc<ComputedStyle>,
    all_ascii: bool,
}

impl Segment {
    /// The segment's characters; empty for a forced break.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &ComputedStyle {
        &self.style
    }

    pub const fn is_all_ascii(&self) -> bool {
        self.all_ascii
    }

    pub const fn is_line_break(&self) -> bool {
        matches!(self.owner, SegmentOwner::LineBreak(_))
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Flow range `[start, end)` as text local to this segment.
    pub fn text_for_range(&self, start: usize, end: usize) -> &str {
        if self.is_line_break() {
            return "";
        }
        let local_start = start.saturating_sub(self.start).min(self.text.len());
        let local_end = end.saturating_sub(self.start).clamp(local_start, self.text.len());
        self.text.get(local_start..local_end).unwrap_or_default()
    }
}

/// A block's text and forced breaks as one contiguous sequence of segments.
#[derive(Debug)]
pub struct FlowContents {
    segments: Vec<Segment>,
    /// Concatenated text; a forced break contributes `'\n'`.
    text: String,
    last_index: Cell<usize>,
}

impl FlowContents {
    /// Segment the text and line-break descendants of `block`, descending
    /// through inline boxes. Empty text fragments produce no segment.
    ///
    /// The caller has already checked that nothing else is in the flow.
    pub fn new(tree: &RenderTree, block: NodeId) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        for node in tree.descendants(block).into_iter().skip(1) {
            let Some(object) = tree.get(node) else {
                continue;
            };
            let start = text.len();
            match &object.kind {
                RenderKind::Text(fragment) => {
                    if fragment.is_empty() {
                        continue;
                    }
                    text.push_str(fragment.text());
                    segments.push(Segment {
                        start,
                        end: text.len(),
                        owner: SegmentOwner::Text(node),
                        text: fragment.shared_text(),
                        style: Rc::clone(&object.style),
                        all_ascii: fragment.is_all_ascii(),
                    });
                }
                RenderKind::LineBreak => {
                    text.push('\n');
                    segments.push(Segment {
                        start,
                        end: text.len(),
                        owner: SegmentOwner::LineBreak(node),
                        text: Rc::from(""),
                        style: Rc::clone(&object.style),
                        all_ascii: true,
                    });
                }
                RenderKind::Inline => {}
                RenderKind::Block { .. } => {
                    debug_assert!(false, "block-level {node:?} inside simple flow {block:?}");
                    error!("flow contents: skipping non-inline {node:?} in {block:?}");
                }
            }
        }
        Self {
            segments,
            text,
            last_index: Cell::new(0),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total length; the end offset of the last segment.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the segment containing offset `position`.
    pub fn segment_index_for_position(&self, position: usize) -> Option<usize> {
        let index = self
            .segments
            .partition_point(|segment| segment.end <= position);
        (index < self.segments.len()).then_some(index)
    }

    /// The segment containing the whole range `[start, end)`.
    ///
    /// Queries walking forward are answered from the previous result or its
    /// successor; others fall back to binary search. A range crossing a segment
    /// boundary is a caller bug: it asserts in debug builds and resolves to the
    /// segment containing `start` otherwise.
    pub fn segment_for_run(&self, start: usize, end: usize) -> Option<&Segment> {
        let fits = |segment: &Segment| segment.start <= start && end <= segment.end;
        let cached = self.last_index.get();
        for candidate in [cached, cached + 1] {
            if let Some(segment) = self.segments.get(candidate)
                && fits(segment)
            {
                self.last_index.set(candidate);
                return Some(segment);
            }
        }
        let index = self
            .segment_index_for_position(start)
            .or_else(|| self.segments.len().checked_sub(1))?;
        let segment = self.segments.get(index)?;
        if !fits(segment) {
            debug_assert!(
                false,
                "range {start}..{end} straddles segment {}..{}",
                segment.start, segment.end
            );
            error!(
                "range {start}..{end} straddles segment {}..{}; clamping",
                segment.start, segment.end
            );
        }
        self.last_index.set(index);
        Some(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_display::NodeKey;
    use css_text::TextFragment;

    fn flow(parts: &[Option<&str>]) -> (RenderTree, NodeId) {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let root = tree.root();
        for (index, part) in parts.iter().enumerate() {
            let key = Some(NodeKey(index as u64 + 1));
            let style = Rc::new(ComputedStyle::default());
            let child = match part {
                Some(text) => tree.create_text(TextFragment::new(*text), style, key),
                None => tree.create_line_break(style, key),
            };
            tree.add_child(root, child, None);
        }
        (tree, root)
    }

    /// # Panics
    /// Panics if segment offsets are not contiguous and strictly increasing.
    #[test]
    fn segments_are_contiguous() {
        let (tree, root) = flow(&[Some("Hello "), Some(""), None, Some("world")]);
        let contents = FlowContents::new(&tree, root);
        let segments = contents.segments();
        assert_eq!(segments.len(), 3);
        let mut expected_start = 0;
        for segment in segments {
            assert_eq!(segment.start, expected_start);
            assert!(segment.end > segment.start);
            expected_start = segment.end;
        }
        assert_eq!(expected_start, contents.len());
        assert_eq!(contents.text(), "Hello \nworld");
        assert!(segments[1].is_line_break());
        assert_eq!(segments[1].text(), "");
    }

    /// # Panics
    /// Panics if lookups return a segment not containing the query.
    #[test]
    fn segment_for_run_forward_and_random_access() {
        let (tree, root) = flow(&[Some("ab"), Some("cde"), Some("f")]);
        let contents = FlowContents::new(&tree, root);
        let found = |start, end| contents.segment_for_run(start, end).map(|segment| segment.start);
        assert_eq!(found(0, 2), Some(0));
        assert_eq!(found(2, 3), Some(2));
        assert_eq!(found(3, 5), Some(2));
        assert_eq!(found(5, 6), Some(5));
        // Backwards jump goes through binary search.
        assert_eq!(found(0, 1), Some(0));
        assert_eq!(found(4, 5), Some(2));
        assert_eq!(
            contents
                .segment_for_run(2, 5)
                .map(|segment| segment.text_for_range(3, 5)),
            Some("de")
        );
    }
}
