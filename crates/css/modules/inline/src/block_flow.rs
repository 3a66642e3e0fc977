//! Choosing and running the inline layout path for one block.

use crate::flow_contents::FlowContents;
use crate::line_boxes::{LineBoxTree, build_line_boxes};
use crate::resolver::{LineResolver, RunResolver};
use crate::simple_line_layout::{
    AvoidanceReasons, IncludeReasons, RunLineTable, can_use_for, create, structural_reasons,
};
use css_display::{NodeId, RenderTree};
use css_text::TextContext;
use log::debug;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InlineLayoutOptions {
    pub available_width: f32,
    /// Allow the simple line layout for qualifying blocks.
    pub simple_line_layout: bool,
    /// Collect and log every reason a block falls back to line boxes.
    pub log_avoidance_reasons: bool,
}

impl Default for InlineLayoutOptions {
    fn default() -> Self {
        Self {
            available_width: 1024.0,
            simple_line_layout: true,
            log_avoidance_reasons: false,
        }
    }
}

/// The layout a block ended up with; exactly one of the two exists.
#[derive(Debug)]
pub enum BlockLineLayout {
    Simple(RunLineTable),
    LineBoxes(LineBoxTree),
}

impl BlockLineLayout {
    pub const fn is_simple(&self) -> bool {
        matches!(self, Self::Simple(_))
    }

    pub const fn resolver(&self) -> RunResolver<'_> {
        match self {
            Self::Simple(table) => RunResolver::for_simple(table),
            Self::LineBoxes(tree) => RunResolver::for_line_boxes(tree),
        }
    }

    pub const fn line_resolver(&self) -> LineResolver<'_> {
        LineResolver::new(self.resolver())
    }

    pub fn height(&self) -> f32 {
        match self {
            Self::Simple(table) => table.height(),
            Self::LineBoxes(tree) => tree.height(),
        }
    }

    pub fn line_count(&self) -> usize {
        match self {
            Self::Simple(table) => table.lines().len(),
            Self::LineBoxes(tree) => tree.lines().len(),
        }
    }
}

/// Lay out the inline content of `block`, on the simple path when allowed and
/// the block qualifies, otherwise with line boxes.
pub fn layout_inline_content(
    tree: &mut RenderTree,
    block: NodeId,
    context: TextContext<'_>,
    options: InlineLayoutOptions,
) -> BlockLineLayout {
    if options.simple_line_layout {
        // Text checks run inside `create`; the full reason set is only
        // gathered for logging.
        let structural = structural_reasons(tree, block, IncludeReasons::First);
        if structural.is_empty()
            && let Some(style) = tree.get(block).map(|object| Rc::clone(&object.style))
        {
            let contents = FlowContents::new(tree, block);
            match create(contents, &style, context, options.available_width) {
                Ok(table) => return BlockLineLayout::Simple(table),
                Err(late) => log_fallback(options, tree, block, context, late),
            }
        } else {
            log_fallback(options, tree, block, context, structural);
        }
    } else if options.log_avoidance_reasons {
        debug!(
            "simple line layout avoided for {block:?}: {:?}",
            AvoidanceReasons::FEATURE_DISABLED
        );
    }
    BlockLineLayout::LineBoxes(build_line_boxes(tree, block, context, options.available_width))
}

fn log_fallback(
    options: InlineLayoutOptions,
    tree: &RenderTree,
    block: NodeId,
    context: TextContext<'_>,
    found: AvoidanceReasons,
) {
    if options.log_avoidance_reasons {
        let mut reasons = can_use_for(tree, block, context, IncludeReasons::All);
        reasons.insert(found);
        debug!("simple line layout avoided for {block:?}: {reasons:?}");
    }
}
