// Divider dragging: resize two neighbouring children of a split.

use berth_core::{Rect, SplitDirection, Vec2, WindowId};

use crate::error::{DockError, Result};
use crate::node::{DockNode, NodePath};
use crate::{DockLayout, NodeRef};

/// The divider between children `index` and `index + 1` of the split at `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividerHandle {
    pub window: WindowId,
    pub path: NodePath,
    pub index: usize,
}

impl DockNode {
    /// Find the divider closest to `position` among all splits in this subtree.
    pub(crate) fn find_divider(
        &self,
        rect: Rect,
        position: Vec2,
        best: &mut Option<(f32, Vec<usize>, usize)>,
        path: &mut Vec<usize>,
    ) {
        let DockNode::Split(split) = self else {
            return;
        };
        let rects = split.child_rects(rect);

        // Pointer must lie within the divider's perpendicular extent
        let in_range = match split.direction() {
            SplitDirection::Horizontal => position.y >= rect.y && position.y <= rect.bottom(),
            SplitDirection::Vertical => position.x >= rect.x && position.x <= rect.right(),
        };
        if in_range {
            for (i, child_rect) in rects.iter().enumerate().take(rects.len().saturating_sub(1)) {
                let dist = match split.direction() {
                    SplitDirection::Horizontal => (position.x - child_rect.right()).abs(),
                    SplitDirection::Vertical => (position.y - child_rect.bottom()).abs(),
                };
                let closer = match best {
                    Some((best_dist, _, _)) => dist < *best_dist,
                    None => true,
                };
                if closer {
                    *best = Some((dist, path.clone(), i));
                }
            }
        }

        for (i, (child, child_rect)) in split.children().iter().zip(rects).enumerate() {
            path.push(i);
            child.find_divider(child_rect, position, best, path);
            path.pop();
        }
    }
}

/// Weights after moving the divider after child `index` to `position`. Only
/// the two neighbours change; each keeps at least `min_ratio` of their pair.
fn dragged_weights(
    weights: &[f32],
    rects: &[Rect],
    direction: SplitDirection,
    index: usize,
    position: Vec2,
    min_ratio: f32,
) -> Option<Vec<f32>> {
    let first = rects.get(index)?;
    let second = rects.get(index + 1)?;
    let (start, extent, at) = match direction {
        SplitDirection::Horizontal => (first.x, first.width + second.width, position.x),
        SplitDirection::Vertical => (first.y, first.height + second.height, position.y),
    };
    if extent <= 0.0 {
        return None;
    }
    let ratio = ((at - start) / extent).clamp(min_ratio, 1.0 - min_ratio);
    let combined = weights[index] + weights[index + 1];
    let mut out = weights.to_vec();
    out[index] = combined * ratio;
    out[index + 1] = combined * (1.0 - ratio);
    Some(out)
}

impl DockLayout {
    /// The divider within the hit threshold of `position`, if any.
    pub fn divider_at(&self, position: Vec2) -> Option<DividerHandle> {
        let window = self.window_at(position)?;
        let rect = self.window_rect(window)?;
        let node = self.root(window)?.node()?;

        let mut best = None;
        node.find_divider(rect, position, &mut best, &mut Vec::new());
        let (dist, path, index) = best?;
        if dist > self.config.divider_hit_threshold {
            return None;
        }
        Some(DividerHandle {
            window,
            path: NodePath::from(path),
            index,
        })
    }

    /// Start a divider drag if `position` is on a divider.
    pub fn begin_divider_drag(&mut self, position: Vec2) -> bool {
        self.active_divider = self.divider_at(position);
        self.active_divider.is_some()
    }

    /// Move the active divider to `position`.
    pub fn drag_divider(&mut self, position: Vec2) -> Result<bool> {
        let Some(handle) = self.active_divider.clone() else {
            return Ok(false);
        };
        let split_ref = NodeRef::new(handle.window, handle.path.clone());
        let rect = self
            .node_rect(&split_ref)
            .ok_or_else(|| DockError::InvalidTarget {
                path: handle.path.clone(),
            })?;
        let Some(DockNode::Split(split)) = self.node(&split_ref) else {
            self.active_divider = None;
            return Err(DockError::InvalidTarget { path: handle.path });
        };
        let weights = dragged_weights(
            split.weights(),
            &split.child_rects(rect),
            split.direction(),
            handle.index,
            position,
            self.config.min_split_ratio,
        );
        match weights {
            Some(weights) => {
                self.set_weights(&split_ref, &weights)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn end_divider_drag(&mut self) {
        self.active_divider = None;
    }

    pub fn active_divider(&self) -> Option<&DividerHandle> {
        self.active_divider.as_ref()
    }
}
