// Floating windows: independent dock trees with their own bounds, kept in
// z-order (last = topmost).

use berth_core::{PanelHandle, Rect, RootId, Size, Vec2};

use crate::config::DockConfig;
use crate::error::{DockError, Result};
use crate::events::DockEvent;
use crate::node::DockNode;
use crate::tree::Root;
use crate::DockLayout;

/// Lifecycle of a floating window. `Populated` and `Empty` are the observable
/// steady states; `Created` and `Destroyed` are reported as transitions only,
/// through [`DockEvent::FloatingStateChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatingState {
    Created,
    Populated,
    Empty,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingWindow {
    id: RootId,
    root: Root,
    always_on_top: bool,
}

impl FloatingWindow {
    pub fn id(&self) -> RootId {
        self.id
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn bounds(&self) -> Rect {
        self.root.bounds().unwrap_or_default()
    }

    /// Pinned above the main window.
    pub fn always_on_top(&self) -> bool {
        self.always_on_top
    }

    pub fn state(&self) -> FloatingState {
        if self.root.is_empty() {
            FloatingState::Empty
        } else {
            FloatingState::Populated
        }
    }
}

#[derive(Debug, Clone)]
pub struct FloatingWindows {
    windows: Vec<FloatingWindow>,
    next_id: u64,
    default_size: Size,
    grab_offset: Vec2,
    default_always_on_top: bool,
    /// Lifecycle transitions not yet published by a commit.
    transitions: Vec<DockEvent>,
}

impl FloatingWindows {
    pub(crate) fn new(config: &DockConfig) -> Self {
        Self {
            windows: Vec::new(),
            next_id: 1,
            default_size: config.floating_size,
            grab_offset: config.floating_grab_offset,
            default_always_on_top: config.floating_always_on_top,
            transitions: Vec::new(),
        }
    }

    /// Open a window holding `panel`, placed so the pointer at `position_hint`
    /// sits at the grab offset inside it. The new window is topmost.
    pub fn create_floating_root(&mut self, panel: PanelHandle, position_hint: Vec2) -> RootId {
        let size = panel
            .preferred_size
            .filter(|s| s.width > 0.0 && s.height > 0.0)
            .unwrap_or(self.default_size);
        let origin = Vec2::new(
            position_hint.x - self.grab_offset.x,
            position_hint.y - self.grab_offset.y,
        );
        self.insert_root(DockNode::leaf(panel), Rect::from_origin_size(origin, size))
    }

    pub(crate) fn insert_root(&mut self, node: DockNode, bounds: Rect) -> RootId {
        let id = RootId(self.next_id);
        self.next_id += 1;
        self.windows.push(FloatingWindow {
            id,
            root: Root::floating(node, bounds),
            always_on_top: self.default_always_on_top,
        });
        self.transition(id, FloatingState::Created, bounds);
        self.transition(id, FloatingState::Populated, bounds);
        id
    }

    /// Remove a window and hand back its tree.
    pub fn destroy_floating_root(&mut self, id: RootId) -> Result<Root> {
        let index = self.index_of(id).ok_or(DockError::UnknownWindow(id))?;
        let window = self.windows.remove(index);
        let bounds = window.bounds();
        if window.state() == FloatingState::Empty {
            self.transition(id, FloatingState::Empty, bounds);
        }
        self.transition(id, FloatingState::Destroyed, bounds);
        Ok(window.root)
    }

    fn transition(&mut self, id: RootId, state: FloatingState, bounds: Rect) {
        log::debug!("floating window {} -> {:?}", id, state);
        self.transitions
            .push(DockEvent::FloatingStateChanged { id, state, bounds });
    }

    pub(crate) fn take_transitions(&mut self) -> Vec<DockEvent> {
        std::mem::take(&mut self.transitions)
    }

    /// Windows bottom to top, with their bounds.
    pub fn list_floating_roots(&self) -> impl Iterator<Item = (RootId, &Root, Rect)> {
        self.windows.iter().map(|w| (w.id, &w.root, w.bounds()))
    }

    pub fn windows(&self) -> &[FloatingWindow] {
        &self.windows
    }

    pub fn get(&self, id: RootId) -> Option<&FloatingWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub(crate) fn root_mut(&mut self, id: RootId) -> Option<&mut Root> {
        self.windows
            .iter_mut()
            .find(|w| w.id == id)
            .map(|w| &mut w.root)
    }

    /// `None` once the window has been destroyed.
    pub fn state(&self, id: RootId) -> Option<FloatingState> {
        self.get(id).map(FloatingWindow::state)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Topmost window containing `point`.
    pub fn window_at(&self, point: Vec2) -> Option<RootId> {
        self.windows
            .iter()
            .rev()
            .find(|w| w.bounds().contains(point))
            .map(|w| w.id)
    }

    pub(crate) fn bring_to_front(&mut self, id: RootId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if index + 1 == self.windows.len() {
            return false;
        }
        let window = self.windows.remove(index);
        self.windows.push(window);
        true
    }

    pub(crate) fn set_bounds(&mut self, id: RootId, bounds: Rect) -> bool {
        match self.root_mut(id) {
            Some(root) => {
                root.set_bounds(bounds);
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_always_on_top(&mut self, id: RootId, always_on_top: bool) -> Option<bool> {
        let window = self.windows.iter_mut().find(|w| w.id == id)?;
        let changed = window.always_on_top != always_on_top;
        window.always_on_top = always_on_top;
        Some(changed)
    }

    /// Destroy the window if its tree has become empty.
    pub(crate) fn reap_if_empty(&mut self, id: RootId) -> bool {
        if self.state(id) != Some(FloatingState::Empty) {
            return false;
        }
        self.destroy_floating_root(id).is_ok()
    }

    fn index_of(&self, id: RootId) -> Option<usize> {
        self.windows.iter().position(|w| w.id == id)
    }
}

// ──────────────────────────────────────────────
// Snapping
// ──────────────────────────────────────────────

/// Snap a window origin to nearby edges of `targets`, independently per axis.
/// A candidate only counts when it lies within `distance` of the request.
pub fn snap_origin(requested: Vec2, size: Size, targets: &[Rect], distance: f32) -> Vec2 {
    if distance <= 0.0 {
        return requested;
    }
    let x = snap_axis(
        requested.x,
        size.width,
        targets.iter().map(|t| {
            let overlaps = ranges_overlap(requested.y, size.height, t.y, t.height, distance);
            (t.x, t.width, overlaps)
        }),
        distance,
    );
    let y = snap_axis(
        requested.y,
        size.height,
        targets.iter().map(|t| {
            let overlaps = ranges_overlap(requested.x, size.width, t.x, t.width, distance);
            (t.y, t.height, overlaps)
        }),
        distance,
    );
    Vec2::new(x, y)
}

fn snap_axis(
    requested: f32,
    extent: f32,
    targets: impl Iterator<Item = (f32, f32, bool)>,
    distance: f32,
) -> f32 {
    let mut best = requested;
    let mut best_delta = distance;
    let mut consider = |candidate: f32| {
        let delta = (candidate - requested).abs();
        if delta <= best_delta {
            best = candidate;
            best_delta = delta;
        }
    };
    for (start, len, overlaps) in targets {
        let end = start + len;
        // Align with the target's edges.
        consider(start);
        consider(end - extent);
        // Sit flush against the target when the windows face each other.
        if overlaps {
            consider(start - extent);
            consider(end);
        }
    }
    best
}

fn ranges_overlap(a_start: f32, a_len: f32, b_start: f32, b_len: f32, tolerance: f32) -> bool {
    a_start <= b_start + b_len + tolerance && b_start <= a_start + a_len + tolerance
}

// ──────────────────────────────────────────────
// Layout-level operations
// ──────────────────────────────────────────────

impl DockLayout {
    /// Move a floating window so its origin lands at `origin`, snapped to the
    /// main window and the other floating windows. Returns the new bounds.
    pub fn move_floating(&mut self, id: RootId, origin: Vec2) -> Result<Rect> {
        let current = self
            .floating
            .get(id)
            .map(FloatingWindow::bounds)
            .ok_or(DockError::UnknownWindow(id))?;
        let mut targets: Vec<Rect> = self
            .floating
            .windows()
            .iter()
            .filter(|w| w.id() != id)
            .map(FloatingWindow::bounds)
            .collect();
        if self.main_bounds().is_valid() {
            targets.push(self.main_bounds());
        }
        let snapped = snap_origin(origin, current.size(), &targets, self.config.snap_distance);
        let bounds = Rect::from_origin_size(snapped, current.size());
        if bounds != current {
            self.floating.set_bounds(id, bounds);
            self.push_event(DockEvent::FloatingMoved { id, bounds });
        }
        Ok(bounds)
    }

    /// Resize a floating window. Invalid rects are rejected.
    pub fn set_floating_bounds(&mut self, id: RootId, bounds: Rect) -> Result<()> {
        if !bounds.is_valid() {
            return Err(DockError::InvariantViolation(format!(
                "floating bounds must have a positive size, got {:?}",
                bounds
            )));
        }
        if !self.floating.set_bounds(id, bounds) {
            return Err(DockError::UnknownWindow(id));
        }
        self.push_event(DockEvent::FloatingMoved { id, bounds });
        Ok(())
    }

    /// Pin a floating window above the main window, or release it.
    pub fn set_floating_always_on_top(&mut self, id: RootId, always_on_top: bool) -> Result<()> {
        let changed = self
            .floating
            .set_always_on_top(id, always_on_top)
            .ok_or(DockError::UnknownWindow(id))?;
        if changed {
            self.push_event(DockEvent::FloatingPinChanged { id, always_on_top });
        }
        Ok(())
    }

    /// Raise a floating window to the top of the z-order.
    pub fn bring_to_front(&mut self, id: RootId) -> Result<()> {
        if self.floating.get(id).is_none() {
            return Err(DockError::UnknownWindow(id));
        }
        self.floating.bring_to_front(id);
        Ok(())
    }

    /// Dock a whole floating window back into the main window, appended at the
    /// end of the main tree. The floating window is destroyed.
    pub fn attach_floating(&mut self, id: RootId) -> Result<()> {
        self.ensure_unlocked()?;
        let mut root = self.floating.destroy_floating_root(id)?;
        if let Some(node) = root.take_node() {
            self.main.append(node);
        }
        self.commit(format_args!("attached floating window {}", id));
        Ok(())
    }

    /// Destroy a floating window, returning the panels it held so the host can
    /// release them.
    pub fn close_floating(&mut self, id: RootId) -> Result<Vec<PanelHandle>> {
        self.ensure_unlocked()?;
        let window = self.floating.get(id).ok_or(DockError::UnknownWindow(id))?;
        if let Some(panel) = window.root().panels().into_iter().find(|p| !p.closable) {
            return Err(DockError::NotClosable(panel.id.clone()));
        }
        let root = self.floating.destroy_floating_root(id)?;
        let panels = root.panels().into_iter().cloned().collect();
        self.commit(format_args!("closed floating window {}", id));
        Ok(panels)
    }
}
