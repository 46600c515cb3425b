use std::collections::HashSet;
use std::fmt;

use berth_core::{PanelHandle, PanelId, Rect, SplitDirection, SplitSide, Vec2};

use crate::error::{DockError, Result};

/// Tolerance used when checking that split weights sum to 1.0.
pub(crate) const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

// ──────────────────────────────────────────────
// NodePath: child indices from a window's top node
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The window's top node.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Parent path and this node's index in the parent, `None` for the root.
    pub fn parent(&self) -> Option<(NodePath, usize)> {
        let (last, rest) = self.0.split_last()?;
        Some((NodePath(rest.to_vec()), *last))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", index)?;
        }
        f.write_str("]")
    }
}

// ──────────────────────────────────────────────
// Leaf: a tab group
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    panels: Vec<PanelHandle>,
    selected: usize,
}

impl Leaf {
    pub fn new(panel: PanelHandle) -> Self {
        Self {
            panels: vec![panel],
            selected: 0,
        }
    }

    /// `None` when `panels` is empty. An out-of-range selection is clamped.
    pub fn with_panels(panels: Vec<PanelHandle>, selected: usize) -> Option<Self> {
        if panels.is_empty() {
            return None;
        }
        let selected = selected.min(panels.len() - 1);
        Some(Self { panels, selected })
    }

    pub fn panels(&self) -> &[PanelHandle] {
        &self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_panel(&self) -> &PanelHandle {
        &self.panels[self.selected]
    }

    pub fn position(&self, id: &PanelId) -> Option<usize> {
        self.panels.iter().position(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        self.position(id).is_some()
    }

    /// Insert at `index` (clamped to the tab count) and select the new tab.
    pub(crate) fn insert(&mut self, index: usize, panel: PanelHandle) -> usize {
        let index = index.min(self.panels.len());
        self.panels.insert(index, panel);
        self.selected = index;
        index
    }

    /// Remove a tab. The selection stays on the same position when possible,
    /// so closing the active tab activates its right neighbour.
    pub(crate) fn remove(&mut self, id: &PanelId) -> Option<PanelHandle> {
        let index = self.position(id)?;
        let panel = self.panels.remove(index);
        if index < self.selected {
            self.selected -= 1;
        } else if self.selected >= self.panels.len() {
            self.selected = self.panels.len().saturating_sub(1);
        }
        Some(panel)
    }

    /// Index the tab would land on when moved to `desired` (an insertion point
    /// counted before the tab is taken out).
    fn reorder_index(&self, source: usize, desired: usize) -> usize {
        let mut insert = desired.min(self.panels.len());
        if source < insert {
            insert -= 1;
        }
        insert
    }

    /// Whether moving `id` to the insertion point `desired` changes the order.
    pub(crate) fn would_move(&self, id: &PanelId, desired: usize) -> bool {
        match self.position(id) {
            Some(source) => self.reorder_index(source, desired) != source,
            None => false,
        }
    }

    /// Move a tab to the insertion point `desired` and select it.
    pub(crate) fn move_tab(&mut self, id: &PanelId, desired: usize) -> bool {
        let Some(source) = self.position(id) else {
            return false;
        };
        let insert = self.reorder_index(source, desired);
        if insert == source {
            return false;
        }
        let panel = self.panels.remove(source);
        self.panels.insert(insert, panel);
        self.selected = insert;
        true
    }

    pub(crate) fn select(&mut self, index: usize) -> bool {
        if index >= self.panels.len() || index == self.selected {
            return false;
        }
        self.selected = index;
        true
    }
}

// ──────────────────────────────────────────────
// Split: weighted children along one axis
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    direction: SplitDirection,
    children: Vec<DockNode>,
    weights: Vec<f32>,
}

impl Split {
    pub(crate) fn pair(direction: SplitDirection, first: DockNode, second: DockNode) -> Self {
        Self {
            direction,
            children: vec![first, second],
            weights: vec![0.5, 0.5],
        }
    }

    /// Build from already validated parts; weights are renormalized.
    pub(crate) fn from_parts(
        direction: SplitDirection,
        children: Vec<DockNode>,
        mut weights: Vec<f32>,
    ) -> Self {
        debug_assert_eq!(children.len(), weights.len());
        normalize(&mut weights);
        Self {
            direction,
            children,
            weights,
        }
    }

    pub fn direction(&self) -> SplitDirection {
        self.direction
    }

    pub fn children(&self) -> &[DockNode] {
        &self.children
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn remove_child(&mut self, index: usize) -> DockNode {
        self.weights.remove(index);
        normalize(&mut self.weights);
        self.children.remove(index)
    }

    /// Append a child sized like an average sibling.
    pub(crate) fn push_child(&mut self, node: DockNode) {
        let share = 1.0 / self.children.len().max(1) as f32;
        self.children.push(node);
        self.weights.push(share);
        normalize(&mut self.weights);
    }

    pub(crate) fn set_weights(&mut self, weights: &[f32]) -> Result<()> {
        check_weights(weights, self.children.len())
            .map_err(|reason| DockError::InvalidWeights { reason })?;
        self.weights = weights.to_vec();
        normalize(&mut self.weights);
        Ok(())
    }

    /// Rects of all children. The last child absorbs rounding so the
    /// children tile `rect` exactly.
    pub fn child_rects(&self, rect: Rect) -> Vec<Rect> {
        split_rects(rect, self.direction, &self.weights)
    }
}

/// Scale weights so they sum to 1.0. Degenerate input becomes an even split.
pub(crate) fn normalize(weights: &mut [f32]) {
    if weights.is_empty() {
        return;
    }
    let sum: f32 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        let even = 1.0 / weights.len() as f32;
        weights.iter_mut().for_each(|w| *w = even);
        return;
    }
    weights.iter_mut().for_each(|w| *w /= sum);
}

/// Length matches and every weight is finite and positive.
pub(crate) fn check_weights(weights: &[f32], expected: usize) -> std::result::Result<(), String> {
    if weights.len() != expected {
        return Err(format!(
            "expected {} weights, got {}",
            expected,
            weights.len()
        ));
    }
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w <= 0.0) {
        return Err(format!("weight {} is not strictly positive", bad));
    }
    Ok(())
}

/// Split a rect into consecutive pieces along `direction`, one per weight.
pub(crate) fn split_rects(rect: Rect, direction: SplitDirection, weights: &[f32]) -> Vec<Rect> {
    let (total, end) = match direction {
        SplitDirection::Horizontal => (rect.width, rect.right()),
        SplitDirection::Vertical => (rect.height, rect.bottom()),
    };
    let mut out = Vec::with_capacity(weights.len());
    // Each child starts exactly where the previous one ends.
    let mut start = match direction {
        SplitDirection::Horizontal => rect.x,
        SplitDirection::Vertical => rect.y,
    };
    for (i, weight) in weights.iter().enumerate() {
        let len = if i + 1 == weights.len() {
            end - start
        } else {
            total * weight
        };
        let child = match direction {
            SplitDirection::Horizontal => Rect::new(start, rect.y, len, rect.height),
            SplitDirection::Vertical => Rect::new(rect.x, start, rect.width, len),
        };
        start = match direction {
            SplitDirection::Horizontal => child.right(),
            SplitDirection::Vertical => child.bottom(),
        };
        out.push(child);
    }
    out
}

// ──────────────────────────────────────────────
// DockNode
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DockNode {
    Leaf(Leaf),
    Split(Split),
}

impl DockNode {
    pub fn leaf(panel: PanelHandle) -> Self {
        DockNode::Leaf(Leaf::new(panel))
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            DockNode::Leaf(leaf) => Some(leaf),
            DockNode::Split(_) => None,
        }
    }

    pub fn as_split(&self) -> Option<&Split> {
        match self {
            DockNode::Split(split) => Some(split),
            DockNode::Leaf(_) => None,
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            DockNode::Leaf(leaf) => Some(leaf),
            DockNode::Split(_) => None,
        }
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        match self {
            DockNode::Leaf(leaf) => leaf.contains(id),
            DockNode::Split(split) => split.children.iter().any(|c| c.contains(id)),
        }
    }

    pub fn panel_count(&self) -> usize {
        match self {
            DockNode::Leaf(leaf) => leaf.len(),
            DockNode::Split(split) => split.children.iter().map(DockNode::panel_count).sum(),
        }
    }

    /// Collect panel handles in traversal order.
    pub(crate) fn panels<'a>(&'a self, out: &mut Vec<&'a PanelHandle>) {
        match self {
            DockNode::Leaf(leaf) => out.extend(leaf.panels.iter()),
            DockNode::Split(split) => {
                for child in &split.children {
                    child.panels(out);
                }
            }
        }
    }

    /// Find the leaf holding `id`. Fills `path` and returns the tab index.
    pub(crate) fn find_panel(&self, id: &PanelId, path: &mut Vec<usize>) -> Option<usize> {
        match self {
            DockNode::Leaf(leaf) => leaf.position(id),
            DockNode::Split(split) => {
                for (i, child) in split.children.iter().enumerate() {
                    path.push(i);
                    if let Some(index) = child.find_panel(id, path) {
                        return Some(index);
                    }
                    path.pop();
                }
                None
            }
        }
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&DockNode> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self {
                DockNode::Split(split) => split.children.get(*first)?.node_at(rest),
                DockNode::Leaf(_) => None,
            },
        }
    }

    pub(crate) fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut DockNode> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self {
                DockNode::Split(split) => split.children.get_mut(*first)?.node_at_mut(rest),
                DockNode::Leaf(_) => None,
            },
        }
    }

    /// Rect of the node at `path`, given the rect this node occupies.
    pub(crate) fn rect_of(&self, path: &[usize], rect: Rect) -> Option<Rect> {
        match path.split_first() {
            None => Some(rect),
            Some((first, rest)) => match self {
                DockNode::Split(split) => {
                    let child = split.children.get(*first)?;
                    let child_rect = *split.child_rects(rect).get(*first)?;
                    child.rect_of(rest, child_rect)
                }
                DockNode::Leaf(_) => None,
            },
        }
    }

    /// Traverse the tree and compute the rect of every leaf.
    pub(crate) fn leaf_rects(
        &self,
        rect: Rect,
        path: &mut Vec<usize>,
        out: &mut Vec<(NodePath, Rect)>,
    ) {
        match self {
            DockNode::Leaf(_) => out.push((NodePath(path.clone()), rect)),
            DockNode::Split(split) => {
                for (i, (child, child_rect)) in
                    split.children.iter().zip(split.child_rects(rect)).enumerate()
                {
                    path.push(i);
                    child.leaf_rects(child_rect, path, out);
                    path.pop();
                }
            }
        }
    }

    /// Descend towards `point`, visiting only the child that contains it.
    pub(crate) fn leaf_at(
        &self,
        rect: Rect,
        point: Vec2,
        path: &mut Vec<usize>,
    ) -> Option<(&Leaf, Rect)> {
        match self {
            DockNode::Leaf(leaf) => Some((leaf, rect)),
            DockNode::Split(split) => {
                let rects = split.child_rects(rect);
                let (i, child_rect) = rects
                    .into_iter()
                    .enumerate()
                    .find(|(_, r)| r.contains(point))?;
                path.push(i);
                split.children[i].leaf_at(child_rect, point, path)
            }
        }
    }

    /// Remove a panel from this subtree. Returns the handle and whether this
    /// node itself is now empty (only possible for a leaf; the parent must
    /// drop it). Splits left with a single child are replaced by that child.
    pub(crate) fn remove_panel(&mut self, id: &PanelId) -> Option<(PanelHandle, bool)> {
        match self {
            DockNode::Leaf(leaf) => {
                let panel = leaf.remove(id)?;
                Some((panel, leaf.is_empty()))
            }
            DockNode::Split(split) => {
                let (index, panel, emptied) = split
                    .children
                    .iter_mut()
                    .enumerate()
                    .find_map(|(i, child)| {
                        child.remove_panel(id).map(|(panel, emptied)| (i, panel, emptied))
                    })?;
                if emptied {
                    split.remove_child(index);
                }
                self.promote_single_child();
                Some((panel, false))
            }
        }
    }

    /// Replace a split holding exactly one child with that child.
    fn promote_single_child(&mut self) {
        let promoted = match self {
            DockNode::Split(split) if split.children.len() == 1 => split.children.pop(),
            _ => None,
        };
        if let Some(child) = promoted {
            *self = child;
        }
    }

    /// Replace this node with a two-child split of itself and `other`.
    pub(crate) fn wrap(&mut self, other: DockNode, direction: SplitDirection, side: SplitSide) {
        let placeholder = DockNode::Split(Split {
            direction,
            children: Vec::new(),
            weights: Vec::new(),
        });
        let original = std::mem::replace(self, placeholder);
        let (first, second) = match side {
            SplitSide::Before => (other, original),
            SplitSide::After => (original, other),
        };
        *self = DockNode::Split(Split::pair(direction, first, second));
    }

    /// Collect invariant violations below this node.
    pub(crate) fn check(
        &self,
        path: &mut Vec<usize>,
        seen: &mut HashSet<PanelId>,
        issues: &mut Vec<String>,
    ) {
        let here = NodePath(path.clone());
        match self {
            DockNode::Leaf(leaf) => {
                if leaf.panels.is_empty() {
                    issues.push(format!("leaf {} has no panels", here));
                } else if leaf.selected >= leaf.panels.len() {
                    issues.push(format!(
                        "leaf {} selects tab {} of {}",
                        here,
                        leaf.selected,
                        leaf.panels.len()
                    ));
                }
                for panel in &leaf.panels {
                    if !seen.insert(panel.id.clone()) {
                        issues.push(format!("panel `{}` appears more than once", panel.id));
                    }
                }
            }
            DockNode::Split(split) => {
                if split.children.len() < 2 {
                    issues.push(format!(
                        "split {} has {} children",
                        here,
                        split.children.len()
                    ));
                }
                if let Err(reason) = check_weights(&split.weights, split.children.len()) {
                    issues.push(format!("split {}: {}", here, reason));
                } else {
                    let sum: f32 = split.weights.iter().sum();
                    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                        issues.push(format!("split {} weights sum to {}", here, sum));
                    }
                }
                for (i, child) in split.children.iter().enumerate() {
                    path.push(i);
                    child.check(path, seen, issues);
                    path.pop();
                }
            }
        }
    }
}
