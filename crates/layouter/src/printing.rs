use core::fmt;

use crate::{LayoutNodeKind, Layouter, NodeKey};

fn write_indent(formatter: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        formatter.write_str("  ")?;
    }
    Ok(())
}

impl Layouter {
    fn fmt_node(
        &self,
        key: NodeKey,
        formatter: &mut fmt::Formatter<'_>,
        depth: usize,
    ) -> fmt::Result {
        let Some(node) = self.nodes.get(&key) else {
            return Ok(());
        };
        write_indent(formatter, depth)?;
        match &node.kind {
            LayoutNodeKind::Document => writeln!(formatter, "#document")?,
            LayoutNodeKind::Element => {
                writeln!(formatter, "<element {} {:?}>", key.0, node.style.display)?;
            }
            LayoutNodeKind::Text { text } => writeln!(formatter, "{text:?}")?,
            LayoutNodeKind::LineBreak => writeln!(formatter, "<br>")?,
        }
        for child in &node.children {
            self.fmt_node(*child, formatter, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Layouter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "LAYOUT")?;
        self.fmt_node(self.root, formatter, 0)?;

        writeln!(formatter, "RENDER")?;
        write!(formatter, "{}", self.tree.outline(self.tree.root()))?;

        writeln!(formatter, "LINES")?;
        for block in self.tree.descendants(self.tree.root()) {
            let Some(layout) = self.block_layouts.get(&block) else {
                continue;
            };
            let path = if layout.is_simple() {
                "simple"
            } else {
                "line boxes"
            };
            writeln!(
                formatter,
                "{block:?}: {} lines, {} runs, height {} ({path})",
                layout.line_count(),
                layout.resolver().run_count(),
                layout.height()
            )?;
            for run in layout.resolver().runs() {
                writeln!(
                    formatter,
                    "  line {} [{}..{}) x={}..{} {:?}",
                    run.line_index,
                    run.start,
                    run.end,
                    run.rect.x,
                    run.rect.right(),
                    run.text
                )?;
            }
        }
        Ok(())
    }
}
