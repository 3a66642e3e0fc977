//! One top-down layout pass over the render tree.

use crate::config::LayouterConfig;
use css_display::{NodeId, RenderTree};
use css_inline::{BlockLineLayout, LayoutRect, LeafKind, layout_inline_content};
use css_style_model::{BorderStyle, ComputedStyle};
use css_text::TextContext;
use std::collections::HashMap;
use std::rc::Rc;

/// Counters collected while a pass runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub blocks: u64,
    pub simple_blocks: u64,
    pub line_box_blocks: u64,
}

pub struct LayoutPass<'pass> {
    pub tree: &'pass mut RenderTree,
    pub context: TextContext<'pass>,
    pub config: &'pass LayouterConfig,
    pub layouts: &'pass mut HashMap<NodeId, BlockLineLayout>,
    pub rects: &'pass mut HashMap<NodeId, LayoutRect>,
    pub stats: PassStats,
}

/// Space a block adds above and below its content.
fn block_extents(style: &ComputedStyle) -> (f32, f32) {
    let (border_top, border_bottom) = if style.border_style == BorderStyle::None {
        (0.0, 0.0)
    } else {
        (style.border_width.top, style.border_width.bottom)
    };
    (
        style.margin.top + border_top + style.padding.top,
        style.padding.bottom + border_bottom + style.margin.bottom,
    )
}

impl LayoutPass<'_> {
    /// Lay out `block` at (`x`, `y`) in a space `width` px wide; returns the
    /// height it occupies including vertical margins.
    pub fn layout_block(&mut self, block: NodeId, x: f32, y: f32, width: f32) -> f32 {
        let Some((style, children_inline)) = self
            .tree
            .get(block)
            .map(|object| (Rc::clone(&object.style), object.children_inline()))
        else {
            return 0.0;
        };
        let (above, below) = block_extents(&style);
        let content_x = x + style.inline_start_extent();
        let content_y = y + above;
        let content_width =
            (width - style.inline_start_extent() - style.inline_end_extent()).max(0.0);
        self.stats.blocks += 1;

        let content_height = if children_inline {
            self.layout_inline(block, content_x, content_y, content_width)
        } else {
            self.layout_block_children(block, content_x, content_y, content_width)
        };
        let height = above + content_height + below;
        self.rects.insert(block, LayoutRect::new(x, y, width, height));
        height
    }

    fn layout_block_children(&mut self, block: NodeId, x: f32, y: f32, width: f32) -> f32 {
        let mut cursor = 0.0;
        for child in self.tree.children(block) {
            let Some((is_block, out_of_flow)) = self.tree.get(child).map(|object| {
                (
                    object.is_block_container(),
                    object.is_floating_or_out_of_flow(),
                )
            }) else {
                continue;
            };
            if !is_block {
                continue;
            }
            let height = self.layout_block(child, x, y + cursor, width);
            // Floats and positioned boxes sit at their static position without
            // taking up room in the flow.
            if !out_of_flow {
                cursor += height;
            }
        }
        cursor
    }

    fn layout_inline(&mut self, block: NodeId, x: f32, y: f32, width: f32) -> f32 {
        let layout = layout_inline_content(
            self.tree,
            block,
            self.context,
            self.config.inline_options(width),
        );
        if let BlockLineLayout::LineBoxes(boxes) = &layout {
            self.stats.line_box_blocks += 1;
            let atomics: Vec<(NodeId, f32, f32, f32)> = boxes
                .leaves()
                .iter()
                .filter(|leaf| leaf.kind == LeafKind::Atomic)
                .filter_map(|leaf| {
                    boxes.lines().get(leaf.line_index).map(|line| {
                        (leaf.renderer, leaf.left, line.top, leaf.right - leaf.left)
                    })
                })
                .collect();
            let out_of_flow = boxes.out_of_flow().to_vec();
            for (renderer, left, top, atomic_width) in atomics {
                self.layout_block(renderer, x + left, y + top, atomic_width);
            }
            for renderer in out_of_flow {
                self.layout_block(renderer, x, y, width);
            }
        } else {
            self.stats.simple_blocks += 1;
        }
        let height = layout.height();
        self.layouts.insert(block, layout);
        height
    }
}
