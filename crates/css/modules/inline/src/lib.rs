//! CSS Inline Layout Module Level 3 — line breaking, line boxes, run queries.
//! Spec: <https://www.w3.org/TR/css-inline-3/>
//!
//! A block's inline content is laid out on one of two paths. Blocks holding
//! only uniformly styled text and forced breaks take [`simple_line_layout`],
//! which produces a flat run table. Everything else builds [`line_boxes`].
//! [`resolver`] answers run and line queries over either.

pub mod block_flow;
pub mod flow_contents;
pub mod geometry;
pub mod intrinsic;
pub mod line_boxes;
mod line_breaker;
pub mod resolver;
pub mod simple_line_layout;

pub use block_flow::{BlockLineLayout, InlineLayoutOptions, layout_inline_content};
pub use flow_contents::{FlowContents, Segment, SegmentOwner};
pub use geometry::{BaselinePoint, LayoutRect};
pub use intrinsic::{IntrinsicWidths, block_preferred_widths};
pub use line_boxes::{InlineFlowBox, LeafBox, LeafKind, LineBox, LineBoxTree, build_line_boxes};
pub use resolver::{LineResolver, LineView, Lines, RunResolver, RunView, Runs};
pub use simple_line_layout::{
    AvoidanceReasons, IncludeReasons, Line, Run, RunLineTable, can_use_for, create, layout_simple,
};
