// Panels kept out of the dock trees: pinned to a side bar or hidden after a
// close. Each remembers where it sat so it can go back there.

use serde::{Deserialize, Serialize};

use berth_core::{DockOperation, PanelHandle, PanelId, Rect, Side, SplitDirection, WindowId};

use crate::config::CloseBehavior;
use crate::error::{DockError, Result};
use crate::executor::DockOutcome;
use crate::node::{DockNode, NodePath};
use crate::{DockLayout, NodeRef, PanelLocation};

pub const DEFAULT_SIDEBAR_WIDTH: f32 = 300.0;

/// Where a panel goes back to when it returns to the dock trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Placement {
    /// Next to the leaf holding `anchor`.
    Docked {
        anchor: PanelId,
        operation: DockOperation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tab_index: Option<usize>,
    },
    /// In a floating window of its own.
    Floating { bounds: Rect },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StashedPanel {
    pub panel: PanelHandle,
    /// `None` falls back to the right of the main window.
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SideBar {
    panels: Vec<StashedPanel>,
    pinned_open: bool,
    panel_width: f32,
}

impl Default for SideBar {
    fn default() -> Self {
        Self {
            panels: Vec::new(),
            pinned_open: false,
            panel_width: DEFAULT_SIDEBAR_WIDTH,
        }
    }
}

impl SideBar {
    pub fn panels(&self) -> &[StashedPanel] {
        &self.panels
    }

    /// The bar's panel stays expanded instead of sliding in on hover.
    pub fn is_pinned_open(&self) -> bool {
        self.pinned_open
    }

    pub fn panel_width(&self) -> f32 {
        self.panel_width
    }

    /// Nothing worth persisting.
    pub fn is_default(&self) -> bool {
        self.panels.is_empty() && !self.pinned_open && self.panel_width == DEFAULT_SIDEBAR_WIDTH
    }

    pub(crate) fn set_pinned_open(&mut self, pinned_open: bool) {
        self.pinned_open = pinned_open;
    }

    pub(crate) fn set_panel_width(&mut self, width: f32) {
        self.panel_width = width;
    }

    fn position(&self, id: &PanelId) -> Option<usize> {
        self.panels.iter().position(|p| &p.panel.id == id)
    }
}

/// Side bars and the hidden list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stash {
    left: SideBar,
    right: SideBar,
    hidden: Vec<StashedPanel>,
}

impl Stash {
    pub fn sidebar(&self, side: Side) -> &SideBar {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub(crate) fn sidebar_mut(&mut self, side: Side) -> &mut SideBar {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn hidden(&self) -> &[StashedPanel] {
        &self.hidden
    }

    pub fn side_of(&self, id: &PanelId) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.sidebar(*side).position(id).is_some())
    }

    pub fn is_hidden(&self, id: &PanelId) -> bool {
        self.hidden.iter().any(|p| &p.panel.id == id)
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        self.side_of(id).is_some() || self.is_hidden(id)
    }

    pub fn get(&self, id: &PanelId) -> Option<&StashedPanel> {
        self.entries().find(|p| &p.panel.id == id)
    }

    /// Side bar panels left then right, then hidden ones.
    pub fn entries(&self) -> impl Iterator<Item = &StashedPanel> {
        self.left
            .panels
            .iter()
            .chain(&self.right.panels)
            .chain(&self.hidden)
    }

    pub(crate) fn take(&mut self, id: &PanelId) -> Option<StashedPanel> {
        if let Some(side) = self.side_of(id) {
            let bar = self.sidebar_mut(side);
            let index = bar.position(id)?;
            return Some(bar.panels.remove(index));
        }
        let index = self.hidden.iter().position(|p| &p.panel.id == id)?;
        Some(self.hidden.remove(index))
    }

    pub(crate) fn pin(&mut self, side: Side, entry: StashedPanel, index: Option<usize>) {
        let panels = &mut self.sidebar_mut(side).panels;
        let index = index.unwrap_or(panels.len()).min(panels.len());
        panels.insert(index, entry);
    }

    pub(crate) fn hide(&mut self, entry: StashedPanel) {
        self.hidden.push(entry);
    }
}

// ──────────────────────────────────────────────
// Layout-level operations
// ──────────────────────────────────────────────

impl DockLayout {
    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    pub fn sidebar(&self, side: Side) -> &SideBar {
        self.stash.sidebar(side)
    }

    pub fn hidden_panels(&self) -> &[StashedPanel] {
        self.stash.hidden()
    }

    /// Move a panel to a side bar at `index` (default: the end). Docked and
    /// floating panels remember their place; a panel already on that bar is
    /// reordered.
    pub fn pin_to_sidebar(
        &mut self,
        id: &PanelId,
        side: Side,
        index: Option<usize>,
    ) -> Result<DockOutcome> {
        self.ensure_unlocked()?;
        let mut outcome = DockOutcome {
            changed: true,
            ..DockOutcome::default()
        };

        let entry = if let Some(entry) = self.stash.take(id) {
            entry
        } else {
            let placement = self.placement_of(id);
            let (panel, destroyed) = self.remove_panel(id)?;
            outcome.destroyed = destroyed;
            StashedPanel { panel, placement }
        };
        self.stash.pin(side, entry, index);
        self.commit(format_args!("pinned `{}` to the {} side bar", id, side.as_str()));
        Ok(outcome)
    }

    /// Take a panel off its side bar and dock it where it was.
    pub fn restore_from_sidebar(&mut self, id: &PanelId) -> Result<DockOutcome> {
        self.ensure_unlocked()?;
        if self.stash.side_of(id).is_none() {
            return Err(DockError::PanelNotFound(id.clone()));
        }
        self.unstash(id)
    }

    /// Keep a side bar's panel expanded, or let it collapse again.
    pub fn set_sidebar_pinned_open(&mut self, side: Side, pinned_open: bool) {
        let bar = self.stash.sidebar_mut(side);
        if bar.pinned_open != pinned_open {
            bar.pinned_open = pinned_open;
            self.commit(format_args!(
                "{} side bar pinned open: {}",
                side.as_str(),
                pinned_open
            ));
        }
    }

    /// Width of a side bar's expanded panel. Must be finite and positive.
    pub fn set_sidebar_width(&mut self, side: Side, width: f32) -> Result<()> {
        if !width.is_finite() || width <= 0.0 {
            return Err(DockError::InvariantViolation(format!(
                "side bar width must be positive, got {}",
                width
            )));
        }
        let bar = self.stash.sidebar_mut(side);
        if bar.panel_width != width {
            bar.panel_width = width;
            self.commit(format_args!("{} side bar width {}", side.as_str(), width));
        }
        Ok(())
    }

    /// Take a panel out of the layout but remember it, and where it was, in
    /// the hidden list. Side bar panels keep the place they remembered.
    pub fn hide_panel(&mut self, id: &PanelId) -> Result<DockOutcome> {
        self.ensure_unlocked()?;
        if self.stash.is_hidden(id) {
            return Ok(DockOutcome::default());
        }
        let mut outcome = DockOutcome {
            changed: true,
            ..DockOutcome::default()
        };
        let entry = if let Some(entry) = self.stash.take(id) {
            entry
        } else {
            let placement = self.placement_of(id);
            let (panel, destroyed) = self.remove_panel(id)?;
            outcome.destroyed = destroyed;
            StashedPanel { panel, placement }
        };
        self.stash.hide(entry);
        self.commit(format_args!("hid `{}`", id));
        Ok(outcome)
    }

    /// Bring a hidden panel back where it was.
    pub fn restore_hidden(&mut self, id: &PanelId) -> Result<DockOutcome> {
        self.ensure_unlocked()?;
        if !self.stash.is_hidden(id) {
            return Err(DockError::PanelNotFound(id.clone()));
        }
        self.unstash(id)
    }

    /// Close a panel the configured way: hide it, or drop it for good.
    pub fn close_panel(&mut self, id: &PanelId) -> Result<DockOutcome> {
        self.ensure_unlocked()?;
        let panel = self
            .panel(id)
            .ok_or_else(|| DockError::PanelNotFound(id.clone()))?;
        if !panel.closable {
            return Err(DockError::NotClosable(id.clone()));
        }
        match self.config.close_behavior {
            CloseBehavior::Hide => self.hide_panel(id),
            CloseBehavior::Remove => self.remove_for_good(id),
        }
    }

    fn remove_for_good(&mut self, id: &PanelId) -> Result<DockOutcome> {
        let destroyed = match self.stash.take(id) {
            Some(_) => None,
            None => self.remove_panel(id)?.1,
        };
        self.commit(format_args!("closed `{}`", id));
        Ok(DockOutcome {
            changed: true,
            created: None,
            destroyed,
        })
    }

    /// Dock a stashed panel at its remembered place, or at the right of the
    /// main window when that place is gone. The panel stays stashed on error.
    fn unstash(&mut self, id: &PanelId) -> Result<DockOutcome> {
        let saved = self.stash.clone();
        let entry = self
            .stash
            .take(id)
            .ok_or_else(|| DockError::PanelNotFound(id.clone()))?;

        let anchor_leaf = match &entry.placement {
            Some(Placement::Docked { anchor, .. }) => {
                self.find_panel(anchor).map(|loc| loc.leaf())
            }
            _ => None,
        };
        let result = match (&entry.placement, anchor_leaf) {
            (Some(Placement::Floating { bounds }), _) if bounds.is_valid() => {
                let root = self
                    .floating
                    .insert_root(DockNode::leaf(entry.panel.clone()), *bounds);
                self.commit(format_args!("restored `{}` into window {}", id, root));
                Ok(DockOutcome {
                    changed: true,
                    created: Some(root),
                    destroyed: None,
                })
            }
            (
                Some(Placement::Docked {
                    operation,
                    tab_index,
                    ..
                }),
                Some(target),
            ) => self.execute(&entry.panel, &target, *operation, *tab_index),
            _ => {
                let operation = if self.main.is_empty() {
                    DockOperation::TabInto
                } else {
                    DockOperation::SplitRight
                };
                self.execute(&entry.panel, &NodeRef::main(NodePath::root()), operation, None)
            }
        };
        if result.is_err() {
            self.stash = saved;
        }
        result
    }

    /// Where a docked panel sits, relative to a neighbour that stays behind
    /// once it is gone.
    fn placement_of(&self, id: &PanelId) -> Option<Placement> {
        let PanelLocation {
            window,
            path,
            index,
        } = self.find_panel(id)?;
        let root = self.root(window)?;
        let leaf = root.leaf_at_path(&path)?;

        if leaf.len() > 1 {
            let neighbour = if index > 0 { index - 1 } else { 1 };
            return Some(Placement::Docked {
                anchor: leaf.panels().get(neighbour)?.id.clone(),
                operation: DockOperation::TabInto,
                tab_index: Some(index),
            });
        }

        let Some((parent, child)) = path.parent() else {
            return match window {
                WindowId::Floating(root_id) => self.floating.get(root_id).map(|w| {
                    Placement::Floating {
                        bounds: w.bounds(),
                    }
                }),
                WindowId::Main => None,
            };
        };
        let split = root.node_at(&parent)?.as_split()?;
        let (anchor, operation) = if child > 0 {
            let sibling = split.children().get(child - 1)?;
            (last_panel(sibling)?, after(split.direction()))
        } else {
            let sibling = split.children().get(1)?;
            (first_panel(sibling)?, before(split.direction()))
        };
        Some(Placement::Docked {
            anchor,
            operation,
            tab_index: None,
        })
    }
}

fn first_panel(node: &DockNode) -> Option<PanelId> {
    let mut panels = Vec::new();
    node.panels(&mut panels);
    panels.first().map(|p| p.id.clone())
}

fn last_panel(node: &DockNode) -> Option<PanelId> {
    let mut panels = Vec::new();
    node.panels(&mut panels);
    panels.last().map(|p| p.id.clone())
}

fn before(direction: SplitDirection) -> DockOperation {
    match direction {
        SplitDirection::Horizontal => DockOperation::SplitLeft,
        SplitDirection::Vertical => DockOperation::SplitTop,
    }
}

fn after(direction: SplitDirection) -> DockOperation {
    match direction {
        SplitDirection::Horizontal => DockOperation::SplitRight,
        SplitDirection::Vertical => DockOperation::SplitBottom,
    }
}
