// Root: the top of one window's dock tree, plus the structural primitives
// every docking operation is built from.

use std::collections::HashSet;

use berth_core::{PanelHandle, PanelId, Rect, SplitDirection, SplitSide, Vec2};

use crate::error::{DockError, Result};
use crate::node::{DockNode, Leaf, NodePath};

/// Top of a dock tree. The main window's root may be empty; a floating root
/// always holds a node and carries its window bounds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    node: Option<DockNode>,
    bounds: Option<Rect>,
}

impl Root {
    pub fn new(node: Option<DockNode>) -> Self {
        Self { node, bounds: None }
    }

    pub(crate) fn floating(node: DockNode, bounds: Rect) -> Self {
        Self {
            node: Some(node),
            bounds: Some(bounds),
        }
    }

    pub fn node(&self) -> Option<&DockNode> {
        self.node.as_ref()
    }

    /// Window bounds. Only floating roots carry them.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub(crate) fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    pub fn panel_count(&self) -> usize {
        self.node.as_ref().map_or(0, DockNode::panel_count)
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        self.node.as_ref().is_some_and(|n| n.contains(id))
    }

    pub fn panels(&self) -> Vec<&PanelHandle> {
        let mut out = Vec::new();
        if let Some(node) = &self.node {
            node.panels(&mut out);
        }
        out
    }

    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.panels().into_iter().map(|p| p.id.clone()).collect()
    }

    /// Path of the leaf holding `id` and the panel's tab index.
    pub fn find_panel(&self, id: &PanelId) -> Option<(NodePath, usize)> {
        let node = self.node.as_ref()?;
        let mut path = Vec::new();
        let index = node.find_panel(id, &mut path)?;
        Some((NodePath::from(path), index))
    }

    pub fn node_at(&self, path: &NodePath) -> Option<&DockNode> {
        self.node.as_ref()?.node_at(path.as_slice())
    }

    pub fn leaf_at_path(&self, path: &NodePath) -> Option<&Leaf> {
        self.node_at(path)?.as_leaf()
    }

    pub fn node_rect(&self, path: &NodePath, window: Rect) -> Option<Rect> {
        self.node.as_ref()?.rect_of(path.as_slice(), window)
    }

    pub fn leaf_rects(&self, window: Rect) -> Vec<(NodePath, Rect)> {
        let mut out = Vec::new();
        if let Some(node) = &self.node {
            node.leaf_rects(window, &mut Vec::new(), &mut out);
        }
        out
    }

    /// The leaf under `point`, its path and its rect.
    pub(crate) fn leaf_at(&self, window: Rect, point: Vec2) -> Option<(NodePath, &Leaf, Rect)> {
        let node = self.node.as_ref()?;
        let mut path = Vec::new();
        let (leaf, rect) = node.leaf_at(window, point, &mut path)?;
        Some((NodePath::from(path), leaf, rect))
    }

    pub(crate) fn take_node(&mut self) -> Option<DockNode> {
        self.node.take()
    }

    // ──────────────────────────────────────────────
    // Primitives
    // ──────────────────────────────────────────────

    /// Insert a panel into the leaf at `target`, at `index` (clamped). An
    /// empty root accepts its first panel at the root path.
    pub(crate) fn insert_panel(
        &mut self,
        target: &NodePath,
        panel: PanelHandle,
        index: usize,
    ) -> Result<usize> {
        if self.node.is_none() && target.is_root() {
            self.node = Some(DockNode::leaf(panel));
            return Ok(0);
        }
        let leaf = self
            .node
            .as_mut()
            .and_then(|n| n.node_at_mut(target.as_slice()))
            .and_then(DockNode::as_leaf_mut)
            .ok_or_else(|| DockError::InvalidTarget {
                path: target.clone(),
            })?;
        Ok(leaf.insert(index, panel))
    }

    /// Remove a panel. Emptied leaves are dropped and single-child splits are
    /// replaced by their child; the root becomes empty when its last panel goes.
    pub(crate) fn remove_panel(&mut self, id: &PanelId) -> Result<PanelHandle> {
        let node = self
            .node
            .as_mut()
            .ok_or_else(|| DockError::PanelNotFound(id.clone()))?;
        let (panel, emptied) = node
            .remove_panel(id)
            .ok_or_else(|| DockError::PanelNotFound(id.clone()))?;
        if emptied {
            self.node = None;
        }
        Ok(panel)
    }

    /// Replace the node at `target` with a split of it and a new leaf holding
    /// `panel`. Returns the path of the new leaf.
    pub(crate) fn split_node(
        &mut self,
        target: &NodePath,
        panel: PanelHandle,
        direction: SplitDirection,
        side: SplitSide,
    ) -> Result<NodePath> {
        if self.node.is_none() && target.is_root() {
            self.node = Some(DockNode::leaf(panel));
            return Ok(NodePath::root());
        }
        let node = self
            .node
            .as_mut()
            .and_then(|n| n.node_at_mut(target.as_slice()))
            .ok_or_else(|| DockError::InvalidTarget {
                path: target.clone(),
            })?;
        node.wrap(DockNode::leaf(panel), direction, side);
        Ok(target.child(match side {
            SplitSide::Before => 0,
            SplitSide::After => 1,
        }))
    }

    /// Replace the weights of the split at `target`.
    pub(crate) fn set_weights(&mut self, target: &NodePath, weights: &[f32]) -> Result<()> {
        match self
            .node
            .as_mut()
            .and_then(|n| n.node_at_mut(target.as_slice()))
        {
            Some(DockNode::Split(split)) => split.set_weights(weights),
            _ => Err(DockError::InvalidTarget {
                path: target.clone(),
            }),
        }
    }

    /// Attach a subtree at the end of this root.
    pub(crate) fn append(&mut self, node: DockNode) {
        match &mut self.node {
            None => self.node = Some(node),
            Some(DockNode::Split(split)) => split.push_child(node),
            Some(existing) => existing.wrap(node, SplitDirection::Horizontal, SplitSide::After),
        }
    }

    pub(crate) fn select_tab(&mut self, leaf: &NodePath, index: usize) -> bool {
        self.leaf_mut(leaf).is_some_and(|l| l.select(index))
    }

    pub(crate) fn move_tab(&mut self, leaf: &NodePath, id: &PanelId, desired: usize) -> bool {
        self.leaf_mut(leaf).is_some_and(|l| l.move_tab(id, desired))
    }

    fn leaf_mut(&mut self, path: &NodePath) -> Option<&mut Leaf> {
        self.node
            .as_mut()?
            .node_at_mut(path.as_slice())?
            .as_leaf_mut()
    }

    pub(crate) fn check(&self, seen: &mut HashSet<PanelId>, issues: &mut Vec<String>) {
        if let Some(node) = &self.node {
            node.check(&mut Vec::new(), seen, issues);
        }
    }
}
