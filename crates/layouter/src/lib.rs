//! DOM mirror and inline layout driver.
//!
//! [`Layouter`] mirrors DOM updates into a render tree, tracks which nodes are
//! dirty and lays out the inline content of every block container on demand.
//! Layout results are read back per block through the run and line resolvers.

use anyhow::{Error, anyhow, bail};
use css_display::{NodeId, RenderKind, RenderTree};
use css_inline::{
    BlockLineLayout, IntrinsicWidths, LayoutRect, LineResolver, RunLineTable, RunResolver,
    RunView, block_preferred_widths, layout_simple,
};
use css_style_model::{ComputedStyle, Display};
use css_text::{
    FixedPitchMeasurer, Hyphenator, NoHyphenation, TextContext, TextFragment, TextMeasurer,
};
use log::{debug, trace};
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;
use std::time::Instant;
use tracing::{info, info_span};

pub mod config;
mod pass;
mod printing;

pub use config::LayouterConfig;
pub use css_display::NodeKey;
use pass::{LayoutPass, PassStats};

/// A single DOM mutation mirrored into the layouter.
#[derive(Clone, Debug)]
pub enum DOMUpdate {
    InsertElement {
        parent: NodeKey,
        node: NodeKey,
        style: ComputedStyle,
        pos: usize,
    },
    InsertText {
        parent: NodeKey,
        node: NodeKey,
        text: String,
        pos: usize,
    },
    /// A `<br>` element.
    InsertLineBreak {
        parent: NodeKey,
        node: NodeKey,
        pos: usize,
    },
    SetText {
        node: NodeKey,
        text: String,
    },
    /// A new computed style for an element. Changes of outer display type
    /// rebuild the element's boxes.
    SetStyle {
        node: NodeKey,
        style: ComputedStyle,
    },
    RemoveNode {
        node: NodeKey,
    },
    EndOfDocument,
}

/// Receiver of mirrored DOM updates.
pub trait DOMSubscriber {
    /// Apply one update.
    ///
    /// # Errors
    /// Returns an error when the update names an unknown node, reuses an
    /// existing key or inserts under a text or break node.
    fn apply_update(&mut self, update: DOMUpdate) -> Result<(), Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNodeKind {
    Document,
    Element,
    Text { text: String },
    LineBreak,
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub kind: LayoutNodeKind,
    /// Element style, or for text and breaks the style inherited from the parent.
    pub style: Rc<ComputedStyle>,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
}

impl LayoutNode {
    fn new(kind: LayoutNodeKind, style: Rc<ComputedStyle>, parent: Option<NodeKey>) -> Self {
        Self {
            kind,
            style,
            parent,
            children: Vec::new(),
        }
    }

    const fn is_leaf(&self) -> bool {
        matches!(self.kind, LayoutNodeKind::Text { .. } | LayoutNodeKind::LineBreak)
    }
}

/// Kinds of dirtiness that can affect layout. Multiple flags can be combined.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirtyKind(u32);

impl DirtyKind {
    /// No dirtiness.
    pub const NONE: Self = Self(0);
    /// Structural changes: insertion or removal.
    pub const STRUCTURE: Self = Self(1);
    /// Style changes affecting layout.
    pub const STYLE: Self = Self(1 << 1);
    /// Size or position potentially altered.
    pub const LAYOUT: Self = Self(1 << 2);

    pub const INLINE_AXIS: Self = Self(1 << 4);
    pub const BLOCK_AXIS: Self = Self(1 << 5);

    pub const REASON_TEXT: Self = Self(1 << 6);
    pub const REASON_STYLE: Self = Self(1 << 8);
    pub const REASON_STRUCTURE: Self = Self(1 << 9);

    /// Combine two dirty kinds.
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if all flags in `other` are present.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

/// Style text and breaks take from the element that contains them.
fn inherited_text_style(parent: &ComputedStyle) -> ComputedStyle {
    ComputedStyle {
        display: Display::Inline,
        ..parent.anonymous_block()
    }
}

/// Whether switching from `old` to `new` changes the kind of box generated.
fn changes_box_kind(old: &ComputedStyle, new: &ComputedStyle) -> bool {
    let generates = |style: &ComputedStyle| match style.display {
        Display::None => 0,
        Display::Inline => 1,
        Display::Block | Display::InlineBlock | Display::Flex | Display::InlineFlex => 2,
    };
    generates(old) != generates(new)
        || old.is_inline_level() != new.is_inline_level()
        || old.is_floating_or_out_of_flow() != new.is_floating_or_out_of_flow()
}

/// Layouter mirrors the DOM into a render tree and computes inline layout.
pub struct Layouter {
    nodes: HashMap<NodeKey, LayoutNode>,
    root: NodeKey,
    tree: RenderTree,
    config: LayouterConfig,
    measurer: Box<dyn TextMeasurer>,
    hyphenator: Box<dyn Hyphenator>,
    /// Global flag indicating that some change requires a layout recompute.
    layout_dirty: bool,
    /// Per-node dirty flags since the last pass.
    dirty_map: HashMap<NodeKey, DirtyKind>,
    /// Line layout of every block container with inline children.
    block_layouts: HashMap<NodeId, BlockLineLayout>,
    /// Border box of every laid out block, in document coordinates.
    block_rects: HashMap<NodeId, LayoutRect>,
    /// Telemetry: total number of DOM updates applied to the mirror.
    perf_updates_applied: u64,
    /// Telemetry: blocks laid out in the last pass.
    perf_blocks_last: u64,
    /// Telemetry: blocks that took the simple line layout in the last pass.
    perf_simple_blocks_last: u64,
    /// Telemetry: blocks that built line boxes in the last pass.
    perf_line_box_blocks_last: u64,
    /// Telemetry: last layout time in microseconds.
    perf_layout_time_last_us: u64,
    /// Telemetry: cumulative layout time in microseconds.
    perf_layout_time_total_us: u64,
}

impl Default for Layouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Layouter {
    /// Create a layouter with the default configuration and a fixed-pitch
    /// measurer (10px per character at 16px).
    pub fn new() -> Self {
        Self::with_config(LayouterConfig::default())
    }

    pub fn with_config(config: LayouterConfig) -> Self {
        Self::with_text_backend(
            config,
            Box::new(FixedPitchMeasurer::scaled(10.0, 16.0)),
            Box::new(NoHyphenation),
        )
    }

    /// Create a layouter measuring and hyphenating text with the given backends.
    pub fn with_text_backend(
        config: LayouterConfig,
        measurer: Box<dyn TextMeasurer>,
        hyphenator: Box<dyn Hyphenator>,
    ) -> Self {
        let root_style = Rc::new(ComputedStyle {
            display: Display::Block,
            ..ComputedStyle::default()
        });
        let mut tree = RenderTree::new((*root_style).clone());
        tree.set_max_split_depth(config.max_split_depth);
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeKey::ROOT,
            LayoutNode::new(LayoutNodeKind::Document, root_style, None),
        );
        Self {
            nodes,
            root: NodeKey::ROOT,
            tree,
            config,
            measurer,
            hyphenator,
            layout_dirty: true,
            dirty_map: HashMap::new(),
            block_layouts: HashMap::new(),
            block_rects: HashMap::new(),
            perf_updates_applied: 0,
            perf_blocks_last: 0,
            perf_simple_blocks_last: 0,
            perf_line_box_blocks_last: 0,
            perf_layout_time_last_us: 0,
            perf_layout_time_total_us: 0,
        }
    }

    pub const fn root(&self) -> NodeKey {
        self.root
    }

    pub const fn config(&self) -> &LayouterConfig {
        &self.config
    }

    pub const fn render_tree(&self) -> &RenderTree {
        &self.tree
    }

    /// Mirrored node for `key`, if any.
    pub fn node(&self, key: NodeKey) -> Option<&LayoutNode> {
        self.nodes.get(&key)
    }

    /// Primary renderer of `key`; `None` when the node generates no box.
    pub fn renderer_for(&self, key: NodeKey) -> Option<NodeId> {
        self.tree.renderer_for(key)
    }

    /// Mark a node as dirty with the provided kind(s) and set the global layout flag.
    pub fn mark_dirty(&mut self, node: NodeKey, kind: DirtyKind) {
        let entry = self.dirty_map.entry(node).or_insert(DirtyKind::NONE);
        *entry = entry.or(kind);
        self.layout_dirty = true;
    }

    /// Mark all ancestors of the given node (up to the root) as dirty with the provided kind(s).
    pub fn mark_ancestors_dirty(&mut self, node: NodeKey, kind: DirtyKind) {
        let mut current = node;
        while let Some(parent) = self.nodes.get(&current).and_then(|entry| entry.parent) {
            self.mark_dirty(parent, kind);
            current = parent;
        }
    }

    /// Return the current dirty kind flags for a node.
    pub fn dirty_kind_of(&self, node: NodeKey) -> DirtyKind {
        self.dirty_map
            .get(&node)
            .copied()
            .unwrap_or(DirtyKind::NONE)
    }

    /// Atomically read and clear the global layout dirty flag.
    pub fn take_and_clear_layout_dirty(&mut self) -> bool {
        mem::replace(&mut self.layout_dirty, false)
    }

    /// Performance counter: total DOM updates applied to the mirror.
    pub const fn perf_updates_applied(&self) -> u64 {
        self.perf_updates_applied
    }
    /// Performance counter: blocks laid out in the last pass.
    pub const fn perf_blocks_last(&self) -> u64 {
        self.perf_blocks_last
    }
    /// Performance counter: blocks laid out on the simple line layout in the last pass.
    pub const fn perf_simple_blocks_last(&self) -> u64 {
        self.perf_simple_blocks_last
    }
    /// Performance counter: blocks that built line boxes in the last pass.
    pub const fn perf_line_box_blocks_last(&self) -> u64 {
        self.perf_line_box_blocks_last
    }
    /// Performance metric: time spent in the last layout pass in microseconds.
    pub const fn perf_layout_time_last_us(&self) -> u64 {
        self.perf_layout_time_last_us
    }
    /// Performance metric: cumulative layout time in microseconds.
    pub const fn perf_layout_time_total_us(&self) -> u64 {
        self.perf_layout_time_total_us
    }

    /// Internal implementation for applying a single DOM update to the mirror.
    fn apply_update_impl(&mut self, update: DOMUpdate) -> Result<(), Error> {
        match update {
            DOMUpdate::InsertElement {
                parent,
                node,
                style,
                pos,
            } => {
                trace!("InsertElement parent={parent:?} node={node:?} display={:?} pos={pos}", style.display);
                self.insert_node(parent, node, pos, LayoutNodeKind::Element, Some(style))?;
                let node_flags = DirtyKind::STRUCTURE
                    .or(DirtyKind::LAYOUT)
                    .or(DirtyKind::BLOCK_AXIS)
                    .or(DirtyKind::REASON_STRUCTURE);
                self.mark_dirty(node, node_flags);
                let parent_flags = DirtyKind::LAYOUT
                    .or(DirtyKind::BLOCK_AXIS)
                    .or(DirtyKind::REASON_STRUCTURE);
                self.mark_ancestors_dirty(node, parent_flags);
            }
            DOMUpdate::InsertText {
                parent,
                node,
                text,
                pos,
            } => {
                trace!(
                    "InsertText parent={parent:?} node={node:?} text='{}' pos={pos}",
                    text.replace('\n', "\\n")
                );
                self.insert_node(parent, node, pos, LayoutNodeKind::Text { text }, None)?;
                self.mark_text_dirty(node);
            }
            DOMUpdate::InsertLineBreak { parent, node, pos } => {
                trace!("InsertLineBreak parent={parent:?} node={node:?} pos={pos}");
                self.insert_node(parent, node, pos, LayoutNodeKind::LineBreak, None)?;
                self.mark_text_dirty(node);
            }
            DOMUpdate::SetText { node, text } => {
                trace!("SetText node={node:?} text='{}'", text.replace('\n', "\\n"));
                self.set_text(node, text)?;
                self.mark_text_dirty(node);
            }
            DOMUpdate::SetStyle { node, style } => {
                trace!("SetStyle node={node:?} display={:?}", style.display);
                self.set_style(node, style)?;
                let node_flags = DirtyKind::STYLE
                    .or(DirtyKind::LAYOUT)
                    .or(DirtyKind::INLINE_AXIS)
                    .or(DirtyKind::BLOCK_AXIS)
                    .or(DirtyKind::REASON_STYLE);
                self.mark_dirty(node, node_flags);
                let ancestor_flags = DirtyKind::LAYOUT
                    .or(DirtyKind::BLOCK_AXIS)
                    .or(DirtyKind::REASON_STYLE);
                self.mark_ancestors_dirty(node, ancestor_flags);
            }
            DOMUpdate::RemoveNode { node } => {
                trace!("RemoveNode node={node:?}");
                let parent = self.remove_node(node)?;
                let parent_flags = DirtyKind::STRUCTURE
                    .or(DirtyKind::LAYOUT)
                    .or(DirtyKind::BLOCK_AXIS)
                    .or(DirtyKind::REASON_STRUCTURE);
                self.mark_dirty(parent, parent_flags);
                self.mark_ancestors_dirty(parent, parent_flags);
            }
            DOMUpdate::EndOfDocument => {
                debug!("EndOfDocument received by layouter");
            }
        }
        // Telemetry: count every DOM update applied to the mirror
        self.perf_updates_applied = self.perf_updates_applied.saturating_add(1);
        Ok(())
    }

    /// Apply a batch of updates, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first error reported by [`DOMSubscriber::apply_update`].
    pub fn apply_updates<I: IntoIterator<Item = DOMUpdate>>(
        &mut self,
        updates: I,
    ) -> Result<(), Error> {
        for update in updates {
            self.apply_update_impl(update)?;
        }
        Ok(())
    }

    fn mark_text_dirty(&mut self, node: NodeKey) {
        let node_flags = DirtyKind::STRUCTURE
            .or(DirtyKind::LAYOUT)
            .or(DirtyKind::INLINE_AXIS)
            .or(DirtyKind::REASON_TEXT);
        self.mark_dirty(node, node_flags);
        let parent_flags = DirtyKind::LAYOUT
            .or(DirtyKind::INLINE_AXIS)
            .or(DirtyKind::REASON_TEXT);
        self.mark_ancestors_dirty(node, parent_flags);
    }

    fn insert_node(
        &mut self,
        parent: NodeKey,
        node: NodeKey,
        pos: usize,
        kind: LayoutNodeKind,
        style: Option<ComputedStyle>,
    ) -> Result<(), Error> {
        if self.nodes.contains_key(&node) {
            bail!("node {node:?} is already in the layout mirror");
        }
        let parent_entry = self
            .nodes
            .get_mut(&parent)
            .ok_or_else(|| anyhow!("parent {parent:?} of {node:?} is not in the layout mirror"))?;
        if parent_entry.is_leaf() {
            bail!("cannot insert {node:?} under text or break node {parent:?}");
        }
        let style = Rc::new(style.unwrap_or_else(|| inherited_text_style(&parent_entry.style)));
        let siblings = &mut parent_entry.children;
        siblings.insert(pos.min(siblings.len()), node);
        self.nodes
            .insert(node, LayoutNode::new(kind, style, Some(parent)));
        self.attach(node);
        Ok(())
    }

    fn set_text(&mut self, node: NodeKey, text: String) -> Result<(), Error> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or_else(|| anyhow!("SetText for unknown node {node:?}"))?;
        let LayoutNodeKind::Text { text: current } = &mut entry.kind else {
            bail!("SetText on {node:?}, which is not a text node");
        };
        if let Some(renderer) = self.tree.renderer_for(node)
            && let Some(RenderKind::Text(fragment)) =
                self.tree.get_mut(renderer).map(|object| &mut object.kind)
        {
            fragment.set_text(text.as_str());
            self.tree.set_needs_layout_and_pref_widths_recalc(renderer);
        }
        *current = text;
        Ok(())
    }

    fn set_style(&mut self, node: NodeKey, style: ComputedStyle) -> Result<(), Error> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or_else(|| anyhow!("SetStyle for unknown node {node:?}"))?;
        if entry.is_leaf() {
            bail!("SetStyle on {node:?}; text and breaks inherit their style");
        }
        let style = Rc::new(style);
        let old = mem::replace(&mut entry.style, Rc::clone(&style));
        let leaves: Vec<NodeKey> = entry.children.clone();
        let text_style = Rc::new(inherited_text_style(&style));
        for child in leaves {
            if let Some(leaf) = self.nodes.get_mut(&child)
                && leaf.is_leaf()
            {
                leaf.style = Rc::clone(&text_style);
                if let Some(renderer) = self.tree.renderer_for(child) {
                    self.tree.set_style(renderer, Rc::clone(&text_style));
                }
            }
        }

        if node == self.root {
            let root = self.tree.root();
            self.tree.set_style(root, style);
            return Ok(());
        }
        match self.tree.renderer_for(node) {
            Some(renderer) if changes_box_kind(&old, &style) => {
                debug!(
                    "display of {node:?} changed from {:?} to {:?}; rebuilding its boxes",
                    old.display, style.display
                );
                self.tree.destroy_renderer(renderer);
                self.attach(node);
            }
            Some(renderer) => {
                let chain: Vec<NodeId> = self.tree.continuation_chain(renderer).collect();
                for link in chain {
                    // Anonymous blocks in the chain keep their own style.
                    if link == renderer
                        || self.tree.get(link).is_some_and(|object| object.is_inline_box())
                    {
                        self.tree.set_style(link, Rc::clone(&style));
                    }
                }
            }
            None => self.attach(node),
        }
        Ok(())
    }

    /// Remove `node` and its subtree; returns the former parent.
    fn remove_node(&mut self, node: NodeKey) -> Result<NodeKey, Error> {
        if node == self.root {
            bail!("the document root cannot be removed");
        }
        let parent = self
            .nodes
            .get(&node)
            .ok_or_else(|| anyhow!("RemoveNode for unknown node {node:?}"))?
            .parent
            .ok_or_else(|| anyhow!("node {node:?} has no parent"))?;
        if let Some(renderer) = self.tree.renderer_for(node) {
            self.tree.destroy_renderer(renderer);
        }
        if let Some(parent_entry) = self.nodes.get_mut(&parent) {
            parent_entry.children.retain(|child| *child != node);
        }
        self.forget_subtree(node);
        Ok(parent)
    }

    fn forget_subtree(&mut self, node: NodeKey) {
        if let Some(entry) = self.nodes.remove(&node) {
            self.dirty_map.remove(&node);
            for child in entry.children {
                self.forget_subtree(child);
            }
        }
    }

    /// Build boxes for `node` and its subtree and insert them before the box
    /// of the next rendered sibling. Nodes under a `display: none` ancestor
    /// generate nothing.
    fn attach(&mut self, node: NodeKey) {
        let Some(entry) = self.nodes.get(&node) else {
            return;
        };
        let Some(parent) = entry.parent else {
            return;
        };
        let Some(parent_renderer) = self.tree.renderer_for(parent) else {
            return;
        };
        let style = Rc::clone(&entry.style);
        let renderer = match &entry.kind {
            LayoutNodeKind::Document => return,
            LayoutNodeKind::Element => match style.display {
                Display::None => return,
                Display::Inline => self.tree.create_inline(style, Some(node)),
                Display::Block | Display::InlineBlock | Display::Flex | Display::InlineFlex => {
                    self.tree.create_block(style, Some(node))
                }
            },
            LayoutNodeKind::Text { text } => {
                self.tree
                    .create_text(TextFragment::new(text.as_str()), style, Some(node))
            }
            LayoutNodeKind::LineBreak => self.tree.create_line_break(style, Some(node)),
        };
        let children = entry.children.clone();
        let before = self.next_rendered_sibling(parent, node);
        self.tree.add_child(parent_renderer, renderer, before);
        for child in children {
            self.attach(child);
        }
    }

    fn next_rendered_sibling(&self, parent: NodeKey, node: NodeKey) -> Option<NodeId> {
        let siblings = &self.nodes.get(&parent)?.children;
        let index = siblings.iter().position(|sibling| *sibling == node)?;
        siblings
            .get(index + 1..)?
            .iter()
            .find_map(|sibling| self.tree.renderer_for(*sibling))
    }

    /// Lay out every block of the document. Returns the number of blocks laid
    /// out; a clean layouter keeps its previous results and returns zero.
    pub fn compute_layout(&mut self) -> usize {
        if !self.layout_dirty && !self.block_rects.is_empty() {
            self.perf_blocks_last = 0;
            self.perf_simple_blocks_last = 0;
            self.perf_line_box_blocks_last = 0;
            self.perf_layout_time_last_us = 0;
            return 0;
        }
        self.compute_layout_full()
    }

    /// Force a full layout pass regardless of dirtiness.
    pub fn compute_layout_full(&mut self) -> usize {
        let _span = info_span!("layouter.compute_layout").entered();
        let start = Instant::now();
        self.block_layouts.clear();
        self.block_rects.clear();
        let root = self.tree.root();
        let stats = {
            let mut pass = LayoutPass {
                tree: &mut self.tree,
                context: TextContext::new(self.measurer.as_ref(), self.hyphenator.as_ref()),
                config: &self.config,
                layouts: &mut self.block_layouts,
                rects: &mut self.block_rects,
                stats: PassStats::default(),
            };
            pass.layout_block(root, 0.0, 0.0, self.config.available_width);
            pass.stats
        };
        self.tree.clear_needs_layout(root);
        self.dirty_map.clear();
        self.layout_dirty = false;

        let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.perf_blocks_last = stats.blocks;
        self.perf_simple_blocks_last = stats.simple_blocks;
        self.perf_line_box_blocks_last = stats.line_box_blocks;
        self.perf_layout_time_last_us = elapsed_us;
        self.perf_layout_time_total_us = self.perf_layout_time_total_us.saturating_add(elapsed_us);
        if self.config.telemetry_enabled {
            info!(
                target: "layouter::telemetry",
                blocks = stats.blocks,
                simple_blocks = stats.simple_blocks,
                line_box_blocks = stats.line_box_blocks,
                updates_applied = self.perf_updates_applied,
                elapsed_us,
                "layout pass"
            );
        }
        usize::try_from(stats.blocks).unwrap_or(usize::MAX)
    }

    /// Border box of the block generated by `key` from the last pass.
    pub fn rect_for(&self, key: NodeKey) -> Option<LayoutRect> {
        let renderer = self.tree.renderer_for(key)?;
        self.block_rects.get(&renderer).copied()
    }

    /// Line layout of the block generated by `key` from the last pass.
    pub fn block_layout_for(&self, key: NodeKey) -> Option<&BlockLineLayout> {
        let renderer = self.tree.renderer_for(key)?;
        self.block_layouts.get(&renderer)
    }

    /// Run queries over the block generated by `key`; `None` unless the block
    /// holds inline content and a pass has run.
    pub fn resolver_for(&self, key: NodeKey) -> Option<RunResolver<'_>> {
        self.block_layout_for(key).map(BlockLineLayout::resolver)
    }

    pub fn line_resolver_for(&self, key: NodeKey) -> Option<LineResolver<'_>> {
        self.block_layout_for(key).map(BlockLineLayout::line_resolver)
    }

    /// Runs of every block, in document order, showing content of `key`.
    ///
    /// An inline split by block-level descendants spreads its runs over
    /// several anonymous blocks; all of them are visited.
    pub fn runs_for_node(&self, key: NodeKey) -> Vec<RunView<'_>> {
        let Some(renderer) = self.tree.renderer_for(key) else {
            return Vec::new();
        };
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .filter_map(|block| self.block_layouts.get(&block))
            .flat_map(|layout| layout.resolver().range_for_renderer(&self.tree, renderer))
            .collect()
    }

    /// Fresh simple line layout for the block generated by `key`, at its last
    /// laid out width; `None` when the block does not qualify.
    pub fn layout_simple_for(&self, key: NodeKey) -> Option<RunLineTable> {
        let renderer = self.tree.renderer_for(key)?;
        let width = self.block_rects.get(&renderer).map_or(self.config.available_width, |rect| {
            self.tree.get(renderer).map_or(rect.width, |object| {
                (rect.width - object.style.inline_start_extent() - object.style.inline_end_extent())
                    .max(0.0)
            })
        });
        let context = TextContext::new(self.measurer.as_ref(), self.hyphenator.as_ref());
        layout_simple(&self.tree, renderer, context, width)
    }

    /// Min-content and max-content widths of the block generated by `key`.
    pub fn preferred_widths_for(&mut self, key: NodeKey) -> Option<IntrinsicWidths> {
        let renderer = self.tree.renderer_for(key)?;
        if !self.tree.get(renderer)?.is_block_container() {
            return None;
        }
        let context = TextContext::new(self.measurer.as_ref(), self.hyphenator.as_ref());
        Some(block_preferred_widths(&mut self.tree, renderer, context))
    }

    /// Get a snapshot of the mirrored tree for debugging/inspection.
    pub fn snapshot(&self) -> Vec<(NodeKey, LayoutNodeKind, Vec<NodeKey>)> {
        let mut entries: Vec<_> = self
            .nodes
            .iter()
            .map(|(key, node)| (*key, node.kind.clone(), node.children.clone()))
            .collect();
        entries.sort_by_key(|(key, _, _)| key.0);
        entries
    }
}

impl DOMSubscriber for Layouter {
    fn apply_update(&mut self, update: DOMUpdate) -> Result<(), Error> {
        self.apply_update_impl(update)
    }
}
