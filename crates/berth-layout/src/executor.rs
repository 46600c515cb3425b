use berth_core::{DockOperation, PanelHandle, PanelId, RootId, Vec2, WindowId};

use crate::error::{DockError, Result};
use crate::hit_test::DropTarget;
use crate::node::{DockNode, NodePath};
use crate::{DockLayout, NodeRef, PanelLocation};

/// What a docking operation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DockOutcome {
    /// False when the operation was a no-op.
    pub changed: bool,
    /// Floating window opened by the operation.
    pub created: Option<RootId>,
    /// Floating window destroyed because it became empty.
    pub destroyed: Option<RootId>,
}

impl DockOutcome {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }
}

impl DockLayout {
    /// Commit a resolved drop. Fails without touching the layout when the
    /// target is stale or no longer valid.
    pub fn apply_drop(&mut self, panel: &PanelHandle, target: &DropTarget) -> Result<DockOutcome> {
        self.ensure_unlocked()?;
        if target.revision != self.revision() {
            return Err(DockError::StaleTarget {
                resolved: target.revision,
                current: self.revision(),
            });
        }
        self.execute(panel, &target.node, target.operation, target.tab_index)
    }

    /// Dock a panel at an explicit node. The panel may be docked elsewhere
    /// already (it is moved) or be new to the layout.
    pub fn dock(
        &mut self,
        panel: &PanelHandle,
        node: &NodeRef,
        operation: DockOperation,
        tab_index: Option<usize>,
    ) -> Result<DockOutcome> {
        self.ensure_unlocked()?;
        self.execute(panel, node, operation, tab_index)
    }

    /// Undock a panel into a new floating window at `position`. A panel that
    /// is already alone in a floating window moves that window instead.
    pub fn float_panel(&mut self, panel: &PanelHandle, position: Vec2) -> Result<DockOutcome> {
        self.ensure_unlocked()?;
        let origin = self.find_panel(&panel.id);

        if let Some(PanelLocation {
            window: WindowId::Floating(id),
            ..
        }) = origin
        {
            let alone = self
                .root(WindowId::Floating(id))
                .is_some_and(|root| root.panel_count() == 1);
            if alone {
                let grab = self.config.floating_grab_offset;
                let origin = Vec2::new(position.x - grab.x, position.y - grab.y);
                self.move_floating(id, origin)?;
                self.floating.bring_to_front(id);
                return Ok(DockOutcome::changed());
            }
        }

        let mut outcome = DockOutcome::changed();
        let handle = match origin {
            Some(_) => {
                let (handle, destroyed) = self.remove_panel(&panel.id)?;
                outcome.destroyed = destroyed;
                handle
            }
            None => self.take_stashed(panel),
        };
        let id = self.floating.create_floating_root(handle, position);
        outcome.created = Some(id);
        self.commit(format_args!("floated `{}` into window {}", panel.id, id));
        Ok(outcome)
    }

    pub(crate) fn execute(
        &mut self,
        panel: &PanelHandle,
        node: &NodeRef,
        operation: DockOperation,
        tab_index: Option<usize>,
    ) -> Result<DockOutcome> {
        let origin = self.find_panel(&panel.id);
        let anchor = self.validate(&panel.id, origin.as_ref(), node, operation)?;

        if let Some(origin) = origin.as_ref().filter(|o| o.leaf() == *node) {
            return self.execute_in_leaf(&panel.id, origin, operation, tab_index);
        }

        let snapshot = (self.main.clone(), self.floating.clone(), self.stash.clone());
        match self.relocate_and_apply(panel, origin.is_some(), anchor, node, operation, tab_index) {
            Ok(outcome) => {
                self.commit(format_args!(
                    "{:?} `{}` at {}",
                    operation, panel.id, node
                ));
                Ok(outcome)
            }
            Err(err) => {
                (self.main, self.floating, self.stash) = snapshot;
                Err(err)
            }
        }
    }

    /// Check everything that could make the operation fail. Returns an anchor
    /// panel of the target leaf, used to find it again after removal.
    fn validate(
        &self,
        dragged: &PanelId,
        origin: Option<&PanelLocation>,
        node: &NodeRef,
        operation: DockOperation,
    ) -> Result<Option<PanelId>> {
        let root = self.root(node.window).ok_or(match node.window {
            WindowId::Floating(id) => DockError::UnknownWindow(id),
            WindowId::Main => DockError::InvalidTarget {
                path: node.path.clone(),
            },
        })?;
        let invalid = || DockError::InvalidTarget {
            path: node.path.clone(),
        };

        let anchor = match root.node_at(&node.path) {
            None if node.path.is_root() && root.is_empty() => None,
            None => return Err(invalid()),
            Some(DockNode::Split(_)) if operation == DockOperation::TabInto => {
                return Err(invalid())
            }
            Some(DockNode::Split(_)) if !node.path.is_root() => return Err(invalid()),
            Some(DockNode::Split(_)) => None,
            Some(DockNode::Leaf(leaf)) => leaf
                .panels()
                .iter()
                .find(|p| &p.id != dragged)
                .map(|p| p.id.clone()),
        };

        if let Some(origin) = origin {
            let same_window = origin.window == node.window;
            if same_window && origin.leaf() != *node && root.panel_count() == 1 {
                return Err(invalid());
            }
        }
        Ok(anchor)
    }

    fn relocate_and_apply(
        &mut self,
        panel: &PanelHandle,
        docked: bool,
        anchor: Option<PanelId>,
        node: &NodeRef,
        operation: DockOperation,
        tab_index: Option<usize>,
    ) -> Result<DockOutcome> {
        let mut outcome = DockOutcome::changed();
        let handle = if docked {
            let (handle, destroyed) = self.remove_panel(&panel.id)?;
            outcome.destroyed = destroyed;
            handle
        } else {
            self.take_stashed(panel)
        };

        let path = match &anchor {
            Some(anchor) => self
                .find_panel(anchor)
                .filter(|loc| loc.window == node.window)
                .map(|loc| loc.path)
                .ok_or_else(|| {
                    DockError::InvariantViolation(format!("lost anchor panel `{}`", anchor))
                })?,
            None => NodePath::root(),
        };
        let target = NodeRef::new(node.window, path);

        match operation.zone().split() {
            None => {
                self.insert_panel(&target, handle, tab_index.unwrap_or(usize::MAX))?;
            }
            Some((direction, side)) => {
                self.split_node(&target, handle, direction, side)?;
            }
        }
        Ok(outcome)
    }

    /// A panel coming from a side bar or the hidden list leaves it. Any other
    /// panel is new to the layout.
    fn take_stashed(&mut self, panel: &PanelHandle) -> PanelHandle {
        self.stash
            .take(&panel.id)
            .map_or_else(|| panel.clone(), |entry| entry.panel)
    }

    /// Drop onto the panel's own leaf: reorder, pull out beside the group, or nothing.
    fn execute_in_leaf(
        &mut self,
        dragged: &PanelId,
        origin: &PanelLocation,
        operation: DockOperation,
        tab_index: Option<usize>,
    ) -> Result<DockOutcome> {
        let root = self.root(origin.window).ok_or_else(|| DockError::InvalidTarget {
            path: origin.path.clone(),
        })?;
        let len = root
            .leaf_at_path(&origin.path)
            .map_or(0, |leaf| leaf.len());

        match operation.zone().split() {
            None => {
                let desired = tab_index.unwrap_or(len);
                let moved = self
                    .root_mut(origin.window)
                    .is_some_and(|root| root.move_tab(&origin.path, dragged, desired));
                if !moved {
                    return Ok(DockOutcome::unchanged());
                }
                self.commit(format_args!("moved tab `{}` to {}", dragged, desired));
                Ok(DockOutcome::changed())
            }
            Some(_) if len <= 1 => Ok(DockOutcome::unchanged()),
            Some((direction, side)) => {
                let root = self.root_mut(origin.window).ok_or_else(|| DockError::InvalidTarget {
                    path: origin.path.clone(),
                })?;
                let handle = root.remove_panel(dragged)?;
                root.split_node(&origin.path, handle, direction, side)?;
                self.commit(format_args!("pulled `{}` out of its group", dragged));
                Ok(DockOutcome::changed())
            }
        }
    }
}
