use core::fmt;

use indextree::NodeId;

use crate::tree::{RenderKind, RenderTree};

/// Indented outline of a render tree, one box per line.
pub struct TreeDump<'tree> {
    tree: &'tree RenderTree,
    start: NodeId,
}

impl RenderTree {
    pub const fn outline(&self, start: NodeId) -> TreeDump<'_> {
        TreeDump { tree: self, start }
    }

    /// The whole tree as text, for test failure messages and debug logging.
    pub fn dump(&self) -> String {
        self.outline(self.root()).to_string()
    }
}

fn write_indent(formatter: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        formatter.write_str("  ")?;
    }
    Ok(())
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\u{ad}' => out.push_str("\\u{ad}"),
            _ => out.push(character),
        }
    }
    out
}

impl TreeDump<'_> {
    fn fmt_node(
        &self,
        node: NodeId,
        formatter: &mut fmt::Formatter<'_>,
        depth: usize,
    ) -> fmt::Result {
        let Some(object) = self.tree.get(node) else {
            return Ok(());
        };
        write_indent(formatter, depth)?;
        match &object.kind {
            RenderKind::Block {
                anonymous,
                children_inline,
            } => {
                formatter.write_str(if *anonymous { "anonymous-block" } else { "block" })?;
                if *children_inline {
                    formatter.write_str(" inline-children")?;
                }
            }
            RenderKind::Inline => formatter.write_str("inline")?,
            RenderKind::Text(fragment) => write!(formatter, "\"{}\"", escape_text(fragment.text()))?,
            RenderKind::LineBreak => formatter.write_str("br")?,
        }
        if let Some(key) = object.node {
            write!(formatter, " #{}", key.0)?;
        }
        if let Some(next) = self.tree.continuation_of(node) {
            write!(formatter, " -> {next:?}")?;
        }
        writeln!(formatter, " [{node:?}]")?;
        for child in self.tree.children(node) {
            self.fmt_node(child, formatter, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.start, formatter, 0)
    }
}
