//! CSS Display Module Level 3 — Box generation and the render tree.
//! Spec: <https://www.w3.org/TR/css-display-3/>
//!
//! Render objects are stored in an arena owned by [`RenderTree`]. Structural
//! edits go through [`RenderTree::add_child`], which keeps block-level and
//! inline-level siblings apart by wrapping inline runs in anonymous blocks and
//! by splitting inline boxes around block-level children (continuations).

mod anonymous_blocks;
pub use anonymous_blocks::{AnonymousChildRun, AnonymousRunKind, build_anonymous_block_runs};
mod continuation;
pub use continuation::{ContinuationChain, MAX_SPLIT_DEPTH};
mod printing;
pub use printing::TreeDump;
mod tree;
pub use tree::{NodeKey, RenderKind, RenderObject, RenderTree};

pub use indextree::NodeId;
