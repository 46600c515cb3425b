use berth_core::{DockOperation, DropZone, PanelId, Rect, SplitSide, Vec2, WindowId};

use crate::node::{DockNode, NodePath, Split};
use crate::{DockLayout, NodeRef};

/// Where a drop at the current pointer position would land.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTarget {
    pub node: NodeRef,
    pub operation: DockOperation,
    /// Area to highlight while hovering.
    pub preview: Rect,
    /// Insertion point for `TabInto`; `None` appends.
    pub tab_index: Option<usize>,
    /// Layout revision the target was resolved against.
    pub revision: u64,
}

impl DockLayout {
    /// Topmost window under `point`: floating windows first, then main.
    pub fn window_at(&self, point: Vec2) -> Option<WindowId> {
        if let Some(id) = self.floating.window_at(point) {
            return Some(WindowId::Floating(id));
        }
        if self.main_bounds().is_valid() && self.main_bounds().contains(point) {
            return Some(WindowId::Main);
        }
        None
    }

    /// Resolve the drop target for `dragged` with the pointer at `pointer`.
    /// `None` when nothing would happen on release.
    pub fn resolve_drop(&self, pointer: Vec2, dragged: &PanelId) -> Option<DropTarget> {
        let window = self.window_at(pointer)?;
        let root = self.root(window)?;
        let window_rect = self.window_rect(window)?;

        let Some(top) = root.node() else {
            return Some(self.target(
                NodeRef::new(window, NodePath::root()),
                DockOperation::TabInto,
                window_rect,
                None,
            ));
        };

        let (path, leaf, leaf_rect) = root.leaf_at(window_rect, pointer)?;
        let zones = leaf_zone_rect(leaf_rect, !path.is_root(), self.config.leaf_inset);

        // Inside the leaf's zones the leaf wins. The margin around a nested
        // leaf belongs to the window band, then to the leaf's nearest edge.
        let zone = if zones.contains(pointer) {
            leaf_zone(zones, pointer, self.config.edge_band)
        } else {
            if let Some(target) = self.root_zone_target(window, top, window_rect, pointer, dragged) {
                return Some(target);
            }
            nearest_edge(leaf_rect, pointer, |_| f32::INFINITY).unwrap_or(DropZone::Center)
        };

        if leaf.contains(dragged) {
            if leaf.len() == 1 {
                return None;
            }
            if zone == DropZone::Center {
                let end = leaf.len();
                if !leaf.would_move(dragged, end) {
                    return None;
                }
                return Some(self.target(
                    NodeRef::new(window, path),
                    DockOperation::TabInto,
                    leaf_rect,
                    Some(end),
                ));
            }
        }

        Some(self.target(
            NodeRef::new(window, path),
            DockOperation::from(zone),
            leaf_rect.half(zone),
            None,
        ))
    }

    /// Window-level drop onto a top split, unless it would leave the dragged
    /// panel where it already is.
    fn root_zone_target(
        &self,
        window: WindowId,
        top: &DockNode,
        window_rect: Rect,
        pointer: Vec2,
        dragged: &PanelId,
    ) -> Option<DropTarget> {
        let DockNode::Split(split) = top else {
            return None;
        };
        let zone = window_zone(window_rect, pointer, self.config.window_band)?;
        if redundant_root_drop(split, dragged, zone) {
            return None;
        }
        Some(self.target(
            NodeRef::new(window, NodePath::root()),
            DockOperation::from(zone),
            window_rect.half(zone),
            None,
        ))
    }

    fn target(
        &self,
        node: NodeRef,
        operation: DockOperation,
        preview: Rect,
        tab_index: Option<usize>,
    ) -> DropTarget {
        DropTarget {
            node,
            operation,
            preview,
            tab_index,
            revision: self.revision(),
        }
    }
}

/// Area covered by a leaf's five zones: nested leaves give up `inset` on
/// every side to the window band, a window's only leaf keeps its full rect.
pub(crate) fn leaf_zone_rect(leaf: Rect, nested: bool, inset: f32) -> Rect {
    if !nested {
        return leaf;
    }
    let inner = leaf.inset(inset);
    if inner.is_valid() {
        inner
    } else {
        leaf
    }
}

/// Leaf zone under `pointer`: the nearest edge whose band contains it, or
/// Center. Bands are `band` of the leaf's shorter side.
pub(crate) fn leaf_zone(rect: Rect, pointer: Vec2, band: f32) -> DropZone {
    let width = band * rect.shorter_side();
    nearest_edge(rect, pointer, |_| width).unwrap_or(DropZone::Center)
}

/// Window band under `pointer`, each `band` of the window extent on its axis.
pub(crate) fn window_zone(rect: Rect, pointer: Vec2, band: f32) -> Option<DropZone> {
    nearest_edge(rect, pointer, |zone| match zone {
        DropZone::Left | DropZone::Right => band * rect.width,
        _ => band * rect.height,
    })
}

fn nearest_edge(rect: Rect, pointer: Vec2, band: impl Fn(DropZone) -> f32) -> Option<DropZone> {
    let distances = [
        (DropZone::Top, pointer.y - rect.y),
        (DropZone::Bottom, rect.bottom() - pointer.y),
        (DropZone::Left, pointer.x - rect.x),
        (DropZone::Right, rect.right() - pointer.x),
    ];
    distances
        .into_iter()
        .filter(|(zone, d)| *d < band(*zone))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(zone, _)| zone)
}

/// The dragged panel already sits alone at that end of a top split with the
/// same orientation, so a window-level drop would change nothing.
fn redundant_root_drop(split: &Split, dragged: &PanelId, zone: DropZone) -> bool {
    let Some((direction, side)) = zone.split() else {
        return false;
    };
    if split.direction() != direction {
        return false;
    }
    let edge_child = match side {
        SplitSide::Before => split.children().first(),
        SplitSide::After => split.children().last(),
    };
    matches!(
        edge_child,
        Some(DockNode::Leaf(leaf)) if leaf.len() == 1 && leaf.contains(dragged)
    )
}
