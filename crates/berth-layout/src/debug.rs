use std::fmt;

use berth_core::Side;

use crate::node::DockNode;
use crate::stash::StashedPanel;
use crate::tree::Root;
use crate::DockLayout;

/// Indented dump of every tree, e.g.
///
/// ```text
/// main
///   split horizontal
///     [0.50] leaf: *editor, preview
///     [0.50] leaf: *log
/// floating #1 at (100, 80) 640x420
///   leaf: *search
/// left side bar (pinned open): outline
/// hidden: terminal
/// ```
///
/// Side bars are listed only when they hold panels.
impl fmt::Display for DockLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "main")?;
        write_root(f, self.main())?;
        for (id, root, bounds) in self.floating().list_floating_roots() {
            writeln!(
                f,
                "floating {} at ({}, {}) {}x{}",
                id, bounds.x, bounds.y, bounds.width, bounds.height
            )?;
            write_root(f, root)?;
        }
        for side in Side::ALL {
            let bar = self.sidebar(side);
            if bar.panels().is_empty() {
                continue;
            }
            write!(f, "{} side bar", side.as_str())?;
            if bar.is_pinned_open() {
                f.write_str(" (pinned open)")?;
            }
            f.write_str(": ")?;
            write_ids(f, bar.panels())?;
        }
        if !self.hidden_panels().is_empty() {
            f.write_str("hidden: ")?;
            write_ids(f, self.hidden_panels())?;
        }
        Ok(())
    }
}

fn write_ids(f: &mut fmt::Formatter<'_>, panels: &[StashedPanel]) -> fmt::Result {
    for (i, entry) in panels.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", entry.panel.id)?;
    }
    writeln!(f)
}

fn write_root(f: &mut fmt::Formatter<'_>, root: &Root) -> fmt::Result {
    match root.node() {
        Some(node) => write_node(f, node, 1, None),
        None => writeln!(f, "  (empty)"),
    }
}

fn write_node(
    f: &mut fmt::Formatter<'_>,
    node: &DockNode,
    depth: usize,
    weight: Option<f32>,
) -> fmt::Result {
    write!(f, "{:width$}", "", width = depth * 2)?;
    if let Some(weight) = weight {
        write!(f, "[{:.2}] ", weight)?;
    }
    match node {
        DockNode::Leaf(leaf) => {
            f.write_str("leaf: ")?;
            for (i, panel) in leaf.panels().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                if i == leaf.selected() {
                    f.write_str("*")?;
                }
                write!(f, "{}", panel.id)?;
            }
            writeln!(f)
        }
        DockNode::Split(split) => {
            writeln!(f, "split {}", split.direction().as_str())?;
            for (child, weight) in split.children().iter().zip(split.weights()) {
                write_node(f, child, depth + 1, Some(*weight))?;
            }
            Ok(())
        }
    }
}
