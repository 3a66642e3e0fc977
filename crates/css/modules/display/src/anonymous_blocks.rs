//! Anonymous block synthesis.
//! Spec: CSS 2.2 §9.4.1 — Anonymous block boxes
//!   <https://www.w3.org/TR/CSS22/visuren.html#anonymous-block-level>

use crate::tree::RenderTree;
use indextree::NodeId;
use log::trace;

/// Kind of anonymous-block-related run found during analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnonymousRunKind {
    /// A contiguous run of inline-level children that would be wrapped in an anonymous block.
    InlineRun,
    /// A single block-level child (delimiter between inline runs).
    Block,
}

/// Describes a contiguous run of children for anonymous-block synthesis.
#[derive(Clone, Debug)]
pub struct AnonymousChildRun {
    /// Start (inclusive) index into the children list.
    pub start: usize,
    /// End (exclusive) index into the children list.
    pub end: usize,
    /// Kind of the run.
    pub kind: AnonymousRunKind,
}

/// Compute anonymous block candidate runs over `children`.
/// This is a pure analysis pass: it does not synthesize nodes.
///
/// Inline-level children adjacent to block-level children are grouped so they
/// can be wrapped into anonymous block boxes. Floats and out-of-flow boxes
/// join a neighbouring inline run; a run of nothing but those is left
/// unwrapped. A run never spans `boundary`, the child a block is about to be
/// inserted before.
pub fn build_anonymous_block_runs(
    tree: &RenderTree,
    children: &[NodeId],
    boundary: Option<NodeId>,
) -> Vec<AnonymousChildRun> {
    let mut out: Vec<AnonymousChildRun> = Vec::new();
    let is_block_level = |node: NodeId| {
        tree.get(node).is_none_or(|object| {
            !object.is_inline_level() && !object.is_floating_or_out_of_flow()
        })
    };
    let is_inline = |node: NodeId| tree.get(node).is_some_and(|object| object.is_inline_level());

    let mut index = 0;
    let len = children.len();
    while index < len {
        let Some(&current) = children.get(index) else {
            break;
        };
        if is_block_level(current) {
            out.push(AnonymousChildRun {
                start: index,
                end: index.saturating_add(1),
                kind: AnonymousRunKind::Block,
            });
            index = index.saturating_add(1);
            continue;
        }
        let start_index = index;
        let mut saw_inline = is_inline(current);
        index = index.saturating_add(1);
        while index < len {
            let Some(&next) = children.get(index) else {
                break;
            };
            if is_block_level(next) || Some(next) == boundary {
                break;
            }
            saw_inline |= is_inline(next);
            index = index.saturating_add(1);
        }
        out.push(AnonymousChildRun {
            start: start_index,
            end: index,
            kind: if saw_inline {
                AnonymousRunKind::InlineRun
            } else {
                AnonymousRunKind::Block
            },
        });
    }
    out
}

impl RenderTree {
    /// Wrap every inline run of `block`'s children into an anonymous block so a
    /// block-level child can be inserted before `insertion_point`.
    pub fn make_children_non_inline(&mut self, block: NodeId, insertion_point: Option<NodeId>) {
        self.set_children_inline(block, false);
        let children = self.children(block);
        let runs = build_anonymous_block_runs(self, &children, insertion_point);
        for run in runs {
            if run.kind != AnonymousRunKind::InlineRun {
                continue;
            }
            let Some(members) = children.get(run.start..run.end) else {
                continue;
            };
            let Some(&first) = members.first() else {
                continue;
            };
            let wrapper = self.create_anonymous_block(block);
            self.insert_child(block, wrapper, Some(first));
            for member in members {
                self.insert_child(wrapper, *member, None);
            }
            trace!(
                "anonymous block {wrapper:?} wraps {} inline children of {block:?}",
                members.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKey;
    use css_style_model::{ComputedStyle, Display, Float};
    use css_text::TextFragment;
    use std::rc::Rc;

    fn with_display(display: Display) -> Rc<ComputedStyle> {
        Rc::new(ComputedStyle {
            display,
            ..ComputedStyle::default()
        })
    }

    /// # Panics
    /// Panics if inline runs are not delimited by block-level children.
    #[test]
    fn runs_split_at_blocks_and_boundary() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let root = tree.root();
        let inline_style = with_display(Display::Inline);
        let first = tree.create_text(
            TextFragment::new("a"),
            Rc::clone(&inline_style),
            Some(NodeKey(1)),
        );
        let second = tree.create_inline(Rc::clone(&inline_style), Some(NodeKey(2)));
        let block = tree.create_block(with_display(Display::Block), Some(NodeKey(3)));
        let third = tree.create_text(TextFragment::new("b"), inline_style, Some(NodeKey(4)));
        for child in [first, second, block, third] {
            tree.insert_child(root, child, None);
        }
        let children = tree.children(root);

        let runs = build_anonymous_block_runs(&tree, &children, None);
        let kinds: Vec<(usize, usize, AnonymousRunKind)> = runs
            .iter()
            .map(|run| (run.start, run.end, run.kind.clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (0, 2, AnonymousRunKind::InlineRun),
                (2, 3, AnonymousRunKind::Block),
                (3, 4, AnonymousRunKind::InlineRun),
            ]
        );

        let split = build_anonymous_block_runs(&tree, &children, Some(second));
        assert_eq!(split.len(), 4);
        assert_eq!((split[0].start, split[0].end), (0, 1));
    }

    /// # Panics
    /// Panics if the inline run (with its float) is left unwrapped.
    #[test]
    fn make_children_non_inline_wraps_runs() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let root = tree.root();
        let floated = tree.create_block(
            Rc::new(ComputedStyle {
                float: Float::Left,
                ..ComputedStyle::default()
            }),
            Some(NodeKey(1)),
        );
        let text = tree.create_text(
            TextFragment::new("x"),
            with_display(Display::Inline),
            Some(NodeKey(2)),
        );
        tree.insert_child(root, text, None);
        let block = tree.create_block(with_display(Display::Block), Some(NodeKey(3)));
        tree.insert_child(root, floated, None);
        tree.add_child(root, block, None);

        let children = tree.children(root);
        assert_eq!(children.len(), 2);
        let wrapper = children[0];
        assert!(tree.get(wrapper).is_some_and(|object| object.is_anonymous_block()));
        assert_eq!(tree.children(wrapper), vec![text, floated]);
        assert_eq!(children[1], block);
        assert!(!tree.get(root).is_some_and(|object| object.children_inline()));
    }
}
