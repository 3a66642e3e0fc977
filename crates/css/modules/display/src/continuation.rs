//! Continuations: block-level content inside inline boxes.
//! Spec: CSS 2.2 §9.2.1.1 — Anonymous block boxes
//!   <https://www.w3.org/TR/CSS22/visuren.html#anonymous-block-level>
//!
//! When a block-level box is inserted into an inline box, the inline is broken
//! around it. The content before the block stays in an anonymous "pre" block,
//! the block itself moves into a new anonymous block, and the content after it
//! moves into clones of the inline ancestors placed in an anonymous "post"
//! block. The pieces of one inline are linked front to back:
//!
//! ```text
//! inline -> anonymous block -> inline clone -> ...
//! ```
//!
//! Links are non-owning handles; the parent/child structure owns every box.

use crate::tree::{RenderKind, RenderTree};
use css_style_model::{ComputedStyle, Position};
use indextree::NodeId;
use log::{error, trace, warn};
use smallvec::SmallVec;
use std::rc::Rc;

/// Most inline nesting levels cloned by one split. Deeper levels keep their
/// trailing content in the "pre" block: wrong rendering, bounded work.
pub const MAX_SPLIT_DEPTH: usize = 200;

/// Forward walk over a continuation chain, starting with the given box.
///
/// The walk is bounded by the number of live boxes, so a corrupted chain ends
/// instead of looping.
pub struct ContinuationChain<'tree> {
    tree: &'tree RenderTree,
    next: Option<NodeId>,
    remaining: usize,
}

impl Iterator for ContinuationChain<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        if self.remaining == 0 {
            debug_assert!(false, "continuation chain through {current:?} is cyclic");
            error!("continuation chain through {current:?} is cyclic; truncating walk");
            self.next = None;
            return None;
        }
        self.remaining -= 1;
        self.next = self.tree.continuation_of(current);
        Some(current)
    }
}

impl RenderTree {
    /// The next link after `id`, if it is still alive.
    pub fn continuation_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)
            .and_then(|object| object.continuation)
            .filter(|next| self.contains(*next))
    }

    /// `id` followed by every box it continues into.
    pub fn continuation_chain(&self, id: NodeId) -> ContinuationChain<'_> {
        ContinuationChain {
            tree: self,
            next: self.contains(id).then_some(id),
            remaining: self.node_bound(),
        }
    }

    /// First box of the chain `id` belongs to.
    pub fn continuation_head(&self, id: NodeId) -> NodeId {
        let mut head = id;
        for _ in 0..self.node_bound() {
            match self
                .get(head)
                .and_then(|object| object.continuation_prev)
                .filter(|prev| self.contains(*prev))
            {
                Some(prev) => head = prev,
                None => return head,
            }
        }
        debug_assert!(false, "continuation back-links through {id:?} are cyclic");
        error!("continuation back-links through {id:?} are cyclic");
        head
    }

    /// Point `id` at `next`, keeping back-links consistent.
    pub(crate) fn set_continuation(&mut self, id: NodeId, next: Option<NodeId>) {
        let old = self.get(id).and_then(|object| object.continuation);
        if let Some(old) = old
            && let Some(object) = self.get_mut(old)
            && object.continuation_prev == Some(id)
        {
            object.continuation_prev = None;
        }
        if let Some(object) = self.get_mut(id) {
            object.continuation = next;
        }
        let Some(next) = next else {
            return;
        };
        let previous_owner = self.get(next).and_then(|object| object.continuation_prev);
        if let Some(owner) = previous_owner
            && owner != id
            && let Some(object) = self.get_mut(owner)
            && object.continuation == Some(next)
        {
            object.continuation = None;
        }
        if let Some(object) = self.get_mut(next) {
            object.continuation_prev = Some(id);
        }
    }

    /// Remove `id` from its chain, joining its neighbours.
    pub(crate) fn unlink_continuation(&mut self, id: NodeId) {
        let Some((prev, next)) = self
            .get(id)
            .map(|object| (object.continuation_prev, object.continuation))
        else {
            return;
        };
        if let Some(prev) = prev
            && let Some(object) = self.get_mut(prev)
            && object.continuation == Some(id)
        {
            object.continuation = next;
        }
        if let Some(next) = next
            && let Some(object) = self.get_mut(next)
            && object.continuation_prev == Some(id)
        {
            object.continuation_prev = prev;
        }
        if let Some(object) = self.get_mut(id) {
            object.continuation = None;
            object.continuation_prev = None;
        }
    }

    /// Insert `child` into `parent` before `before` (or last), restructuring
    /// the tree so block-level and inline-level boxes never share a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        let Some(kind) = self.get(parent).map(|object| object.kind.clone()) else {
            error!("add_child: parent {parent:?} is not in the render tree");
            return;
        };
        match kind {
            RenderKind::Inline => {
                if self.continuation_of(parent).is_some() {
                    self.add_child_to_continuation(parent, child, before);
                } else {
                    self.inline_add_child(parent, child, before);
                }
            }
            RenderKind::Block { .. } => self.block_add_child(parent, child, before),
            RenderKind::Text(_) | RenderKind::LineBreak => {
                debug_assert!(false, "leaf renderer {parent:?} cannot take children");
                error!("add_child: leaf renderer {parent:?} cannot take children");
            }
        }
    }

    fn add_child_ignoring_continuation(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) {
        if self.get(parent).is_some_and(|object| object.is_inline_box()) {
            self.inline_add_child(parent, child, before);
        } else {
            self.block_add_child(parent, child, before);
        }
    }

    fn inline_add_child(&mut self, inline: NodeId, child: NodeId, before: Option<NodeId>) {
        let block_level = self.get(child).is_some_and(|object| {
            !object.is_inline_level() && !object.is_floating_or_out_of_flow()
        });
        if block_level {
            self.split_inline_for_block_child(inline, child, before);
            return;
        }
        self.insert_child(inline, child, before);
        self.set_needs_layout_and_pref_widths_recalc(child);
    }

    /// Break `inline` around the block-level `block_child`, inserted before
    /// `insert_before` (or at the end).
    pub fn split_inline_for_block_child(
        &mut self,
        inline: NodeId,
        block_child: NodeId,
        insert_before: Option<NodeId>,
    ) {
        let Some(containing) = self.containing_block(inline) else {
            error!("split: inline {inline:?} has no containing block; inserting in place");
            self.insert_child(inline, block_child, insert_before);
            return;
        };
        let style = self.anonymous_style_for_split(inline, containing);
        let middle = self.create_block(Rc::new(style), None);
        let old_continuation = self.continuation_of(inline);
        self.set_continuation(inline, Some(middle));
        trace!("split: inline {inline:?} around block child {block_child:?}");
        self.split_flow(inline, insert_before, middle, block_child, old_continuation);
    }

    /// Anonymous block style for the box holding a split-out block child.
    /// Relative positioning of an enclosing inline carries over.
    fn anonymous_style_for_split(&self, inline: NodeId, containing: NodeId) -> ComputedStyle {
        let mut style = self
            .get(containing)
            .map_or_else(ComputedStyle::default, |object| {
                object.style.anonymous_block()
            });
        let mut current = Some(inline);
        while let Some(node) = current
            && node != containing
        {
            if let Some(object) = self.get(node)
                && object.is_inline_box()
                && object.style.position == Position::Relative
            {
                style.position = Position::Relative;
                break;
            }
            current = self.parent(node);
        }
        style
    }

    fn split_flow(
        &mut self,
        inline: NodeId,
        before: Option<NodeId>,
        middle: NodeId,
        block_child: NodeId,
        old_continuation: Option<NodeId>,
    ) {
        let Some(mut block) = self.containing_block(inline) else {
            return;
        };
        let mut made_new_pre = false;
        let pre = if self.get(block).is_some_and(|object| object.is_anonymous_block()) {
            let reused = block;
            match self.containing_block(reused) {
                Some(outer) => block = outer,
                None => {
                    error!("split: anonymous block {reused:?} is detached");
                    return;
                }
            }
            reused
        } else {
            made_new_pre = true;
            self.create_anonymous_block(block)
        };
        let post = self.create_anonymous_block(block);

        let box_first = if made_new_pre {
            self.first_child(block)
        } else {
            self.next_sibling(pre)
        };
        if made_new_pre {
            self.insert_child(block, pre, box_first);
        }
        self.insert_child(block, middle, box_first);
        self.insert_child(block, post, box_first);
        self.set_children_inline(block, false);

        if made_new_pre {
            let mut moving = box_first;
            while let Some(node) = moving {
                moving = self.next_sibling(node);
                self.insert_child(pre, node, None);
                self.set_needs_layout_and_pref_widths_recalc(node);
            }
        }

        self.split_inlines(inline, pre, post, middle, before, old_continuation);

        self.set_children_inline(middle, false);
        self.block_add_child(middle, block_child, None);

        self.set_needs_layout_and_pref_widths_recalc(pre);
        self.set_needs_layout_and_pref_widths_recalc(block);
        self.set_needs_layout_and_pref_widths_recalc(post);
    }

    fn split_inlines(
        &mut self,
        inline: NodeId,
        from_block: NodeId,
        to_block: NodeId,
        middle: NodeId,
        before: Option<NodeId>,
        old_continuation: Option<NodeId>,
    ) {
        let Some(mut clone) = self.clone_inline(inline) else {
            return;
        };
        self.set_continuation(clone, old_continuation);

        // Content inside an anonymous wrapper moves with its wrapper.
        let mut moving = before.map(|node| self.child_of_ancestor(inline, node));
        while let Some(node) = moving {
            moving = self.next_sibling(node);
            self.insert_child(clone, node, None);
            self.set_needs_layout_and_pref_widths_recalc(node);
        }
        self.set_continuation(middle, Some(clone));

        let mut current_child = inline;
        let mut current = self.parent(inline);
        let mut split_depth = 1_usize;
        let mut degraded = false;
        while let Some(level) = current
            && level != from_block
        {
            if split_depth < self.max_split_depth {
                let Some(level_clone) = self.clone_inline(level) else {
                    break;
                };
                self.insert_child(level_clone, clone, None);
                clone = level_clone;

                let level_continuation = self.continuation_of(level);
                self.set_continuation(level, Some(clone));
                self.set_continuation(clone, level_continuation);

                let mut trailing = self.next_sibling(current_child);
                while let Some(node) = trailing {
                    trailing = self.next_sibling(node);
                    self.insert_child(clone, node, None);
                    self.set_needs_layout_and_pref_widths_recalc(node);
                }
            } else {
                degraded = true;
            }
            current_child = level;
            current = self.parent(level);
            split_depth += 1;
        }
        if degraded {
            warn!(
                "split: inline nesting depth {split_depth} exceeds {}; trailing content of outer levels stays before the block",
                self.max_split_depth
            );
        }

        self.insert_child(to_block, clone, None);
        let mut trailing = self.next_sibling(current_child);
        while let Some(node) = trailing {
            trailing = self.next_sibling(node);
            self.insert_child(to_block, node, None);
            self.set_needs_layout_and_pref_widths_recalc(node);
        }
    }

    /// The child of `ancestor` that contains `node` (or `node` itself).
    fn child_of_ancestor(&self, ancestor: NodeId, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if parent == ancestor {
                return current;
            }
            current = parent;
        }
        node
    }

    /// The chain link that `before` should be inserted into, or the link new
    /// content appends to.
    pub fn continuation_before(&self, inline: NodeId, before: Option<NodeId>) -> NodeId {
        if let Some(before) = before
            && self.parent(before) == Some(inline)
        {
            return inline;
        }
        let mut next_to_last = inline;
        let mut last = inline;
        for current in self.continuation_chain(inline).skip(1) {
            if let Some(before) = before
                && self.parent(before) == Some(current)
            {
                if self.first_child(current) == Some(before) {
                    return last;
                }
                return current;
            }
            next_to_last = last;
            last = current;
        }
        if before.is_none() && self.first_child(last).is_none() {
            return next_to_last;
        }
        last
    }

    /// Route `child` into the right link of `inline`'s chain: inline content
    /// joins inline links, block-level content joins block links.
    pub fn add_child_to_continuation(
        &mut self,
        inline: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) {
        let chain: SmallVec<NodeId, 8> = self.continuation_chain(inline).collect();
        let before = before.filter(|node| {
            let owned = self.parent(*node).is_some_and(|parent| chain.contains(&parent));
            if !owned {
                error!("add_child_to_continuation: {node:?} is not a child of {inline:?}'s chain");
            }
            owned
        });

        let flow = self.continuation_before(inline, before);
        let before_parent = before.and_then(|node| self.parent(node)).unwrap_or_else(|| {
            self.continuation_of(flow).unwrap_or(flow)
        });

        if self
            .get(child)
            .is_some_and(|object| object.is_floating_or_out_of_flow())
        {
            self.add_child_ignoring_continuation(before_parent, child, before);
            return;
        }

        let child_inline = self.get(child).is_some_and(|object| object.is_inline_level());
        let before_parent_inline = self
            .get(before_parent)
            .is_some_and(|object| object.is_inline_box());
        let flow_inline = self.get(flow).is_some_and(|object| object.is_inline_box());
        let before_inline = before
            .and_then(|node| self.get(node))
            .is_some_and(|object| object.is_inline_level());

        if flow == before_parent {
            self.add_child_ignoring_continuation(flow, child, before);
        } else if child_inline == before_parent_inline || before_inline {
            self.add_child_ignoring_continuation(before_parent, child, before);
        } else if flow_inline == child_inline {
            self.add_child_ignoring_continuation(flow, child, None);
        } else {
            self.add_child_ignoring_continuation(before_parent, child, before);
        }
    }

    fn block_add_child(&mut self, block: NodeId, child: NodeId, before: Option<NodeId>) {
        let mut before = before;
        let child_inline = self.get(child).is_some_and(|object| object.is_inline_level());
        let child_floating = self
            .get(child)
            .is_some_and(|object| object.is_floating_or_out_of_flow());

        if let Some(node) = before
            && self.parent(node) != Some(block)
        {
            let container = self.child_of_ancestor(block, node);
            if self.parent(container) != Some(block) {
                error!("add_child: {node:?} is not inside block {block:?}; appending");
                before = None;
            } else if self
                .get(container)
                .is_some_and(|object| object.is_anonymous_block())
            {
                if child_inline || child_floating {
                    if let Some(parent) = self.parent(node) {
                        self.add_child(parent, child, Some(node));
                    }
                    return;
                }
                before = Some(self.split_anonymous_block_before(container, node));
            }
        }

        let children_inline = self.get(block).is_some_and(|object| object.children_inline());
        if children_inline && !child_inline && !child_floating {
            self.make_children_non_inline(block, before);
            if let Some(node) = before
                && self.parent(node) != Some(block)
            {
                before = self.parent(node);
            }
        } else if !children_inline && (child_inline || child_floating) {
            let after = match before {
                Some(node) => self.previous_sibling(node),
                None => self.last_child(block),
            };
            if let Some(wrapper) = after
                && self
                    .get(wrapper)
                    .is_some_and(|object| object.is_anonymous_block())
            {
                self.block_add_child(wrapper, child, None);
                return;
            }
            if child_inline {
                let wrapper = self.create_anonymous_block(block);
                self.insert_child(block, wrapper, before);
                self.block_add_child(wrapper, child, None);
                return;
            }
        }
        self.insert_child(block, child, before);
        self.set_needs_layout_and_pref_widths_recalc(child);
    }

    /// Split `wrapper` so that `node` (a descendant) starts a box of its own.
    /// Returns the box now starting at `node`.
    fn split_anonymous_block_before(&mut self, wrapper: NodeId, node: NodeId) -> NodeId {
        let start = self.child_of_ancestor(wrapper, node);
        if self.first_child(wrapper) == Some(start) {
            return wrapper;
        }
        let Some(block) = self.parent(wrapper) else {
            return wrapper;
        };
        let tail = self.create_anonymous_block(block);
        let after_wrapper = self.next_sibling(wrapper);
        self.insert_child(block, tail, after_wrapper);
        let mut moving = Some(start);
        while let Some(current) = moving {
            moving = self.next_sibling(current);
            self.insert_child(tail, current, None);
        }
        tail
    }

    /// `child`, already in an inline parent, now generates a block-level box.
    pub fn child_became_non_inline(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if self.get(parent).is_some_and(|object| object.is_inline_box()) {
            let Some(containing) = self.containing_block(parent) else {
                return;
            };
            let style = self.anonymous_style_for_split(parent, containing);
            let middle = self.create_block(Rc::new(style), None);
            let old_continuation = self.continuation_of(parent);
            self.set_continuation(parent, Some(middle));
            let before = self.next_sibling(child);
            self.remove_child(child);
            self.split_flow(parent, before, middle, child, old_continuation);
        } else if self.get(parent).is_some_and(|object| object.children_inline()) {
            self.make_children_non_inline(parent, Some(child));
            self.set_needs_layout_and_pref_widths_recalc(parent);
        }
    }

    /// Destroy a renderer together with every other link of its chain.
    ///
    /// Anonymous blocks left empty by the removal are destroyed as well.
    pub fn destroy_renderer(&mut self, id: NodeId) {
        let head = self.continuation_head(id);
        let chain: SmallVec<NodeId, 8> = self.continuation_chain(head).collect();
        let mut parents: SmallVec<NodeId, 8> = SmallVec::new();
        for link in chain {
            if !self.contains(link) {
                continue;
            }
            if let Some(parent) = self.parent(link) {
                parents.push(parent);
            }
            self.destroy_subtree(link);
        }
        for parent in parents {
            self.destroy_empty_anonymous_ancestors(parent);
        }
    }

    fn destroy_empty_anonymous_ancestors(&mut self, start: NodeId) {
        let mut current = Some(start);
        while let Some(node) = current {
            let disposable = self
                .get(node)
                .is_some_and(|object| object.is_anonymous_block())
                && self.first_child(node).is_none();
            if !disposable {
                break;
            }
            current = self.parent(node);
            self.destroy_subtree(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKey;
    use css_style_model::Display;
    use css_text::TextFragment;

    fn style(display: Display) -> Rc<ComputedStyle> {
        Rc::new(ComputedStyle {
            display,
            ..ComputedStyle::default()
        })
    }

    fn text(tree: &mut RenderTree, key: u64, content: &str) -> NodeId {
        tree.create_text(
            TextFragment::new(content),
            style(Display::Inline),
            Some(NodeKey(key)),
        )
    }

    fn text_of(tree: &RenderTree, id: NodeId) -> Option<String> {
        tree.get(id)
            .and_then(|object| object.text_fragment())
            .map(|fragment| fragment.text().to_owned())
    }

    /// `<p><span>A<div>B</div>C</span></p>` built in document order.
    fn block_in_inline() -> (RenderTree, NodeId, NodeId, NodeId) {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let root = tree.root();
        let para = tree.create_block(style(Display::Block), Some(NodeKey(1)));
        tree.add_child(root, para, None);
        let span = tree.create_inline(style(Display::Inline), Some(NodeKey(2)));
        tree.add_child(para, span, None);
        let first = text(&mut tree, 3, "A");
        tree.add_child(span, first, None);
        let div = tree.create_block(style(Display::Block), Some(NodeKey(4)));
        tree.add_child(span, div, None);
        let middle_text = text(&mut tree, 5, "B");
        tree.add_child(div, middle_text, None);
        let last = text(&mut tree, 6, "C");
        tree.add_child(span, last, None);
        (tree, para, span, div)
    }

    /// # Panics
    /// Panics if a block inside an inline does not yield pre/middle/post blocks.
    #[test]
    fn block_child_splits_inline_into_three_blocks() {
        let (tree, para, span, div) = block_in_inline();
        let blocks = tree.children(para);
        assert_eq!(blocks.len(), 3, "{}", tree.dump());
        for block in &blocks {
            assert!(tree.get(*block).is_some_and(|object| object.is_anonymous_block()));
        }
        assert!(!tree.get(para).is_some_and(|object| object.children_inline()));

        assert_eq!(tree.children(blocks[0]), vec![span]);
        assert_eq!(text_of(&tree, tree.children(span)[0]).as_deref(), Some("A"));
        assert_eq!(tree.children(blocks[1]), vec![div]);

        let post = tree.children(blocks[2]);
        assert_eq!(post.len(), 1);
        let clone = post[0];
        assert!(tree.get(clone).is_some_and(|object| object.is_inline_box()));
        assert_eq!(tree.get(clone).and_then(|object| object.node), Some(NodeKey(2)));
        let clone_children = tree.children(clone);
        assert_eq!(text_of(&tree, clone_children[0]).as_deref(), Some("C"));

        let chain: Vec<NodeId> = tree.continuation_chain(span).collect();
        assert_eq!(chain, vec![span, blocks[1], clone]);
        assert_eq!(tree.renderer_for(NodeKey(2)), Some(span));
    }

    /// # Panics
    /// Panics if each nesting level does not get its own clone and chain.
    #[test]
    fn nested_inlines_clone_every_level() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let root = tree.root();
        let outer = tree.create_inline(style(Display::Inline), Some(NodeKey(1)));
        tree.add_child(root, outer, None);
        let inner = tree.create_inline(style(Display::Inline), Some(NodeKey(2)));
        tree.add_child(outer, inner, None);
        let head = text(&mut tree, 3, "x");
        tree.add_child(inner, head, None);
        let tail = text(&mut tree, 4, "tail");
        tree.add_child(outer, tail, None);
        let div = tree.create_block(style(Display::Block), Some(NodeKey(5)));
        tree.add_child(inner, div, None);

        let blocks = tree.children(root);
        assert_eq!(blocks.len(), 3);
        let post = tree.children(blocks[2]);
        assert_eq!(post.len(), 1);
        let outer_clone = post[0];
        let inner_clone = tree.children(outer_clone)[0];
        assert_eq!(tree.get(inner_clone).and_then(|object| object.node), Some(NodeKey(2)));
        // Trailing content of the outer level follows the inner clone.
        assert_eq!(tree.children(outer_clone).get(1).copied(), Some(tail));

        let inner_chain: Vec<NodeId> = tree.continuation_chain(inner).collect();
        assert_eq!(inner_chain, vec![inner, blocks[1], inner_clone]);
        let outer_chain: Vec<NodeId> = tree.continuation_chain(outer).collect();
        assert_eq!(outer_chain, vec![outer, outer_clone]);
    }

    /// # Panics
    /// Panics if nesting beyond the depth bound loops or skips the block.
    #[test]
    fn depth_bound_degrades_without_looping() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        tree.set_max_split_depth(2);
        let root = tree.root();
        let mut parent = root;
        let mut levels = Vec::new();
        for key in 1..=5 {
            let inline = tree.create_inline(style(Display::Inline), Some(NodeKey(key)));
            tree.add_child(parent, inline, None);
            levels.push(inline);
            parent = inline;
        }
        let trailing = text(&mut tree, 10, "after");
        tree.add_child(levels[0], trailing, None);
        let div = tree.create_block(style(Display::Block), Some(NodeKey(20)));
        tree.add_child(parent, div, None);

        let blocks = tree.children(root);
        assert_eq!(blocks.len(), 3);
        assert_eq!(tree.children(blocks[1]), vec![div]);
        // Only one ancestor level is cloned; the outermost trailing text stays in "pre".
        assert!(tree.is_ancestor_of(blocks[0], trailing));
        for level in &levels {
            assert!(tree.continuation_chain(*level).count() <= 3);
        }
    }

    /// # Panics
    /// Panics if a second block child does not split the trailing clone.
    #[test]
    fn appended_block_splits_last_clone() {
        let (mut tree, para, span, div) = block_in_inline();
        let second = tree.create_block(style(Display::Block), Some(NodeKey(7)));
        tree.add_child(span, second, None);
        // A new split happens in the clone; the chain grows.
        let chain: Vec<NodeId> = tree.continuation_chain(span).collect();
        assert_eq!(chain.len(), 5, "{}", tree.dump());
        assert!(tree.is_ancestor_of(para, second));
        assert!(tree.is_ancestor_of(para, div));
    }

    /// # Panics
    /// Panics if an inline inserted before a moved child misses the clone.
    #[test]
    fn insertion_before_moved_child_targets_clone() {
        let (mut tree, para, span, _div) = block_in_inline();
        let post = tree.children(para)[2];
        let clone = tree.children(post)[0];
        let moved = tree.children(clone)[0];
        let inserted = text(&mut tree, 8, "Z");
        tree.add_child(span, inserted, Some(moved));
        assert_eq!(tree.children(clone), vec![inserted, moved]);
    }

    /// # Panics
    /// Panics if destroying the inline leaves any link of its chain alive.
    #[test]
    fn destroy_removes_whole_chain() {
        let (mut tree, para, span, div) = block_in_inline();
        let chain: Vec<NodeId> = tree.continuation_chain(span).collect();
        tree.destroy_renderer(span);
        for link in chain {
            assert!(!tree.contains(link));
        }
        assert!(!tree.contains(div));
        assert_eq!(tree.renderer_for(NodeKey(2)), None);
        assert!(tree.children(para).is_empty(), "{}", tree.dump());
    }

    /// # Panics
    /// Panics if removing the block child leaves a dangling link.
    #[test]
    fn destroying_block_child_splices_chain() {
        let (mut tree, _para, span, div) = block_in_inline();
        tree.destroy_renderer(div);
        let chain: Vec<NodeId> = tree.continuation_chain(span).collect();
        assert_eq!(chain.len(), 2);
        assert!(chain.iter().all(|link| tree.contains(*link)));
    }

    /// # Panics
    /// Panics if a child turning block-level inside an inline does not split it.
    #[test]
    fn child_became_non_inline_splits_parent() {
        let mut tree = RenderTree::new(ComputedStyle::default());
        let root = tree.root();
        let span = tree.create_inline(style(Display::Inline), Some(NodeKey(1)));
        tree.add_child(root, span, None);
        let widget = tree.create_block(style(Display::InlineBlock), Some(NodeKey(2)));
        tree.add_child(span, widget, None);
        let after = text(&mut tree, 3, "after");
        tree.add_child(span, after, None);
        assert_eq!(tree.children(span), vec![widget, after]);

        tree.set_style(widget, style(Display::Block));
        tree.child_became_non_inline(widget);
        let blocks = tree.children(root);
        assert_eq!(blocks.len(), 3);
        assert_eq!(tree.children(blocks[1]), vec![widget]);
        assert!(tree.is_ancestor_of(blocks[2], after));
    }
}
