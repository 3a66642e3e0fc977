//! Render tree storage.
//!
//! Render objects live in an `indextree` arena; parent/child links own the
//! boxes, while continuation links are plain handles layered on top. Removed
//! nodes never resolve again, so a stale continuation handle reads as absent.

use crate::continuation::MAX_SPLIT_DEPTH;
use css_style_model::ComputedStyle;
use css_text::TextFragment;
use indextree::{Arena, Node, NodeError, NodeId};
use log::error;
use std::collections::HashMap;
use std::rc::Rc;

/// Stable identity of a DOM node, shared with the DOM mirror.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    pub const ROOT: Self = Self(0);
}

#[derive(Clone, Debug)]
pub enum RenderKind {
    /// A block container. `children_inline` is true while it establishes an
    /// inline formatting context (only inline-level children).
    Block {
        anonymous: bool,
        children_inline: bool,
    },
    /// A non-replaced inline box.
    Inline,
    Text(TextFragment),
    /// A `<br>` forced break.
    LineBreak,
}

#[derive(Clone, Debug)]
pub struct RenderObject {
    pub kind: RenderKind,
    pub style: Rc<ComputedStyle>,
    /// Generating DOM node; `None` for anonymous boxes. Continuation clones
    /// share the key of the inline they were cloned from.
    pub node: Option<NodeKey>,
    pub(crate) continuation: Option<NodeId>,
    pub(crate) continuation_prev: Option<NodeId>,
    pub needs_layout: bool,
    pub pref_widths_dirty: bool,
}

impl RenderObject {
    fn new(kind: RenderKind, style: Rc<ComputedStyle>, node: Option<NodeKey>) -> Self {
        Self {
            kind,
            style,
            node,
            continuation: None,
            continuation_prev: None,
            needs_layout: true,
            pref_widths_dirty: true,
        }
    }

    pub const fn is_block_container(&self) -> bool {
        matches!(self.kind, RenderKind::Block { .. })
    }

    pub const fn is_anonymous_block(&self) -> bool {
        matches!(
            self.kind,
            RenderKind::Block {
                anonymous: true,
                ..
            }
        )
    }

    pub const fn is_anonymous(&self) -> bool {
        self.node.is_none()
    }

    pub const fn is_inline_box(&self) -> bool {
        matches!(self.kind, RenderKind::Inline)
    }

    pub const fn is_text(&self) -> bool {
        matches!(self.kind, RenderKind::Text(_))
    }

    /// Participates in its parent's inline formatting context.
    pub fn is_inline_level(&self) -> bool {
        match self.kind {
            RenderKind::Inline | RenderKind::Text(_) | RenderKind::LineBreak => true,
            RenderKind::Block { .. } => self.style.is_inline_level(),
        }
    }

    pub fn is_floating_or_out_of_flow(&self) -> bool {
        match self.kind {
            RenderKind::Text(_) | RenderKind::LineBreak => false,
            RenderKind::Inline | RenderKind::Block { .. } => {
                self.style.is_floating_or_out_of_flow()
            }
        }
    }

    pub const fn children_inline(&self) -> bool {
        matches!(
            self.kind,
            RenderKind::Block {
                children_inline: true,
                ..
            }
        )
    }

    pub const fn text_fragment(&self) -> Option<&TextFragment> {
        match &self.kind {
            RenderKind::Text(fragment) => Some(fragment),
            _ => None,
        }
    }

    pub const fn continuation(&self) -> Option<NodeId> {
        self.continuation
    }

    /// The link this box continues from; `None` for the head of a chain.
    pub const fn continuation_prev(&self) -> Option<NodeId> {
        self.continuation_prev
    }
}

fn report_link(linked: Result<(), NodeError>, child: NodeId, parent: NodeId) {
    if let Err(link_error) = linked {
        debug_assert!(false, "cannot link {child:?} under {parent:?}: {link_error}");
        error!("cannot link {child:?} under {parent:?}: {link_error}");
    }
}

/// Render tree plus the DOM-to-render index.
#[derive(Debug)]
pub struct RenderTree {
    arena: Arena<RenderObject>,
    root: NodeId,
    renderers: HashMap<NodeKey, NodeId>,
    pub(crate) max_split_depth: usize,
}

impl RenderTree {
    pub fn new(root_style: ComputedStyle) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(RenderObject::new(
            RenderKind::Block {
                anonymous: false,
                children_inline: true,
            },
            Rc::new(root_style),
            Some(NodeKey::ROOT),
        ));
        let mut renderers = HashMap::new();
        renderers.insert(NodeKey::ROOT, root);
        Self {
            arena,
            root,
            renderers,
            max_split_depth: MAX_SPLIT_DEPTH,
        }
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Bound on inline nesting levels cloned by a continuation split, clamped to `1..=200`.
    pub fn set_max_split_depth(&mut self, depth: usize) {
        self.max_split_depth = depth.clamp(1, MAX_SPLIT_DEPTH);
    }

    pub const fn max_split_depth(&self) -> usize {
        self.max_split_depth
    }

    fn node(&self, id: NodeId) -> Option<&Node<RenderObject>> {
        self.arena.get(id).filter(|node| !node.is_removed())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&RenderObject> {
        self.node(id).map(Node::get)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut RenderObject> {
        self.arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(Node::get_mut)
    }

    /// The primary render object generated by `key` (the head of its continuation chain).
    ///
    /// An entry whose box is gone, or whose slot now holds another node's box,
    /// resolves to nothing.
    pub fn renderer_for(&self, key: NodeKey) -> Option<NodeId> {
        self.renderers
            .get(&key)
            .copied()
            .filter(|&id| self.get(id).is_some_and(|object| object.node == Some(key)))
    }

    /// Point `key` at a new primary renderer, e.g. after a display change rebuilt it.
    pub fn register(&mut self, key: NodeKey, id: NodeId) {
        self.renderers.insert(key, id);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::first_child)
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::last_child)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::next_sibling)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::previous_sibling)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        if self.contains(id) {
            id.children(&self.arena).collect()
        } else {
            Vec::new()
        }
    }

    /// `id` and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        if self.contains(id) {
            id.descendants(&self.arena).collect()
        } else {
            Vec::new()
        }
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.contains(id) && id.ancestors(&self.arena).skip(1).any(|node| node == ancestor)
    }

    fn alloc(&mut self, kind: RenderKind, style: Rc<ComputedStyle>, node: Option<NodeKey>) -> NodeId {
        let id = self.arena.new_node(RenderObject::new(kind, style, node));
        if let Some(key) = node {
            self.renderers.entry(key).or_insert(id);
        }
        id
    }

    pub fn create_block(&mut self, style: Rc<ComputedStyle>, node: Option<NodeKey>) -> NodeId {
        self.alloc(
            RenderKind::Block {
                anonymous: node.is_none(),
                children_inline: true,
            },
            style,
            node,
        )
    }

    /// Anonymous block inheriting from `parent`'s style.
    pub fn create_anonymous_block(&mut self, parent: NodeId) -> NodeId {
        let style = self.get(parent).map_or_else(ComputedStyle::default, |object| {
            object.style.anonymous_block()
        });
        self.create_block(Rc::new(style), None)
    }

    pub fn create_inline(&mut self, style: Rc<ComputedStyle>, node: Option<NodeKey>) -> NodeId {
        self.alloc(RenderKind::Inline, style, node)
    }

    pub fn create_text(
        &mut self,
        fragment: TextFragment,
        style: Rc<ComputedStyle>,
        node: Option<NodeKey>,
    ) -> NodeId {
        self.alloc(RenderKind::Text(fragment), style, node)
    }

    pub fn create_line_break(&mut self, style: Rc<ComputedStyle>, node: Option<NodeKey>) -> NodeId {
        self.alloc(RenderKind::LineBreak, style, node)
    }

    /// Style-only copy of an inline box, sharing its DOM key.
    pub(crate) fn clone_inline(&mut self, inline: NodeId) -> Option<NodeId> {
        let (style, node) = self
            .get(inline)
            .map(|object| (Rc::clone(&object.style), object.node))?;
        // Clones share the DOM key but never become the primary renderer.
        Some(
            self.arena
                .new_node(RenderObject::new(RenderKind::Inline, style, node)),
        )
    }

    /// Raw structural insertion of `child` under `parent`, before `before` or at the end.
    ///
    /// `child` is detached from any previous parent first.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        let linked = match before {
            Some(sibling) if self.parent(sibling) == Some(parent) => {
                sibling.checked_insert_before(child, &mut self.arena)
            }
            Some(sibling) => {
                debug_assert!(false, "insertion point {sibling:?} is not a child of {parent:?}");
                error!("insertion point {sibling:?} is not a child of {parent:?}; appending");
                parent.checked_append(child, &mut self.arena)
            }
            None => parent.checked_append(child, &mut self.arena),
        };
        report_link(linked, child, parent);
        self.mark_children_changed(parent);
    }

    /// Detach `child` (and its subtree) from its parent without destroying it.
    pub fn remove_child(&mut self, child: NodeId) {
        let parent = self.parent(child);
        if self.contains(child) {
            child.detach(&mut self.arena);
        }
        if let Some(parent) = parent {
            self.mark_children_changed(parent);
        }
    }

    fn mark_children_changed(&mut self, parent: NodeId) {
        self.set_needs_layout_and_pref_widths_recalc(parent);
    }

    /// Mark `id` for layout and preferred-width recomputation, along with its
    /// ancestors whose sizes may depend on it.
    pub fn set_needs_layout_and_pref_widths_recalc(&mut self, id: NodeId) {
        if let Some(RenderKind::Text(fragment)) = self.get_mut(id).map(|object| &mut object.kind) {
            fragment.invalidate();
        }
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(object) = self.get_mut(node) else {
                break;
            };
            if object.needs_layout && object.pref_widths_dirty && node != id {
                break;
            }
            object.needs_layout = true;
            object.pref_widths_dirty = true;
            current = self.parent(node);
        }
    }

    /// Clear dirty bits below `id` after a completed pass.
    pub fn clear_needs_layout(&mut self, id: NodeId) {
        for node in self.descendants(id) {
            if let Some(object) = self.get_mut(node) {
                object.needs_layout = false;
                object.pref_widths_dirty = false;
            }
        }
    }

    /// Nearest ancestor block container (the box that owns the line boxes of `id`).
    pub fn containing_block(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.get(node).is_some_and(RenderObject::is_block_container) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub(crate) fn set_children_inline(&mut self, block: NodeId, inline: bool) {
        if let Some(RenderObject {
            kind: RenderKind::Block {
                children_inline, ..
            },
            ..
        }) = self.get_mut(block)
        {
            *children_inline = inline;
        }
    }

    /// Replace the style of one render object (continuation clones are updated by the caller).
    pub fn set_style(&mut self, id: NodeId, style: Rc<ComputedStyle>) {
        if let Some(object) = self.get_mut(id) {
            object.style = style;
        }
        self.set_needs_layout_and_pref_widths_recalc(id);
    }

    /// Remove `id` and its subtree from the arena, unhooking DOM index entries
    /// and continuation links of every removed box.
    pub fn destroy_subtree(&mut self, id: NodeId) {
        let parent = self.parent(id);
        let removed = self.descendants(id);
        for node in &removed {
            self.unlink_continuation(*node);
        }
        for node in &removed {
            let key = self.get(*node).and_then(|object| object.node);
            if let Some(key) = key
                && self.renderers.get(&key) == Some(node)
            {
                self.renderers.remove(&key);
            }
        }
        if self.contains(id) {
            id.remove_subtree(&mut self.arena);
        }
        if let Some(parent) = parent {
            self.mark_children_changed(parent);
        }
    }

    /// Upper bound on live render objects; bounds chain walks.
    pub(crate) fn node_bound(&self) -> usize {
        self.arena.len()
    }

    /// Number of live render objects (for diagnostics and tests).
    pub fn len(&self) -> usize {
        self.arena.live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
