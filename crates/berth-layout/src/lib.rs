// Docking layout engine: dock trees for the main window and any number of
// floating windows, side bars and hidden panels, pointer-driven drop
// resolution, transactional docking operations and a JSON snapshot codec.

use std::collections::HashSet;
use std::fmt;

use berth_core::{PanelHandle, PanelId, Rect, RootId, WindowId};

pub mod config;
pub mod debug;
pub mod drag;
pub mod error;
pub mod events;
pub mod executor;
pub mod floating;
pub mod hit_test;
pub mod node;
pub mod resize;
pub mod snapshot;
pub mod stash;
pub mod tree;


pub use berth_core::{DockOperation, DropZone, Side, Size, SplitDirection, SplitSide, Vec2};
pub use config::{CloseBehavior, DockConfig};
pub use drag::{DockObserver, DragSession, DropResult};
pub use error::{DockError, Result, SnapshotError};
pub use events::DockEvent;
pub use executor::DockOutcome;
pub use floating::{snap_origin, FloatingState, FloatingWindow, FloatingWindows};
pub use hit_test::DropTarget;
pub use node::{DockNode, Leaf, NodePath, Split};
pub use resize::DividerHandle;
pub use snapshot::{
    LayoutSnapshot, NodeDescriptor, RootDescriptor, SideBarDescriptor, StashedDescriptor,
};
pub use stash::{Placement, SideBar, Stash, StashedPanel};
pub use tree::Root;

/// A node addressed by window and path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub window: WindowId,
    pub path: NodePath,
}

impl NodeRef {
    pub fn new(window: WindowId, path: NodePath) -> Self {
        Self { window, path }
    }

    pub fn main(path: impl Into<NodePath>) -> Self {
        Self::new(WindowId::Main, path.into())
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.window, self.path)
    }
}

/// Where a panel currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLocation {
    pub window: WindowId,
    /// Path of the leaf holding the panel.
    pub path: NodePath,
    /// Tab index within that leaf.
    pub index: usize,
}

impl PanelLocation {
    pub fn leaf(&self) -> NodeRef {
        NodeRef::new(self.window, self.path.clone())
    }
}

/// The complete docking state: the main window's tree, the floating windows,
/// and the panels parked on side bars or hidden.
///
/// Every structural change goes through this type, which keeps panel ids
/// unique across all of them and bumps `revision` on each commit so drop
/// targets resolved earlier can be recognised as stale.
#[derive(Debug, Clone)]
pub struct DockLayout {
    pub(crate) main: Root,
    pub(crate) floating: FloatingWindows,
    pub(crate) stash: Stash,
    pub(crate) config: DockConfig,
    main_bounds: Rect,
    revision: u64,
    locked: bool,
    pub(crate) active_divider: Option<DividerHandle>,
    pending_events: Vec<DockEvent>,
}

impl DockLayout {
    pub fn new(config: DockConfig) -> Self {
        let config = config.sanitized();
        Self {
            main: Root::default(),
            floating: FloatingWindows::new(&config),
            stash: Stash::default(),
            config,
            main_bounds: Rect::default(),
            revision: 0,
            locked: false,
            active_divider: None,
            pending_events: Vec::new(),
        }
    }

    /// A layout with all `panels` as tabs of a single leaf in the main window.
    /// Later duplicates of an id are skipped.
    pub fn with_panels(panels: Vec<PanelHandle>, config: DockConfig) -> Self {
        let mut layout = Self::new(config);
        let mut seen = HashSet::new();
        let unique: Vec<PanelHandle> = panels
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        if let Some(leaf) = Leaf::with_panels(unique, 0) {
            layout.main = Root::new(Some(DockNode::Leaf(leaf)));
        }
        layout
    }

    pub(crate) fn from_parts(main: Root, floating: FloatingWindows, config: DockConfig) -> Self {
        let mut layout = Self::new(config);
        layout.main = main;
        layout.floating = floating;
        layout.pending_events = layout.floating.take_transitions();
        layout
    }

    pub fn config(&self) -> &DockConfig {
        &self.config
    }

    pub fn main(&self) -> &Root {
        &self.main
    }

    pub fn floating(&self) -> &FloatingWindows {
        &self.floating
    }

    pub fn root(&self, window: WindowId) -> Option<&Root> {
        match window {
            WindowId::Main => Some(&self.main),
            WindowId::Floating(id) => self.floating.get(id).map(FloatingWindow::root),
        }
    }

    pub(crate) fn root_mut(&mut self, window: WindowId) -> Option<&mut Root> {
        match window {
            WindowId::Main => Some(&mut self.main),
            WindowId::Floating(id) => self.floating.root_mut(id),
        }
    }

    pub fn main_bounds(&self) -> Rect {
        self.main_bounds
    }

    /// The main window's content area. Owned by the host; not persisted.
    pub fn set_main_bounds(&mut self, bounds: Rect) {
        self.main_bounds = bounds;
    }

    pub fn window_rect(&self, window: WindowId) -> Option<Rect> {
        match window {
            WindowId::Main => Some(self.main_bounds),
            WindowId::Floating(id) => self.floating.get(id).map(FloatingWindow::bounds),
        }
    }

    /// Incremented on every committed change to any tree.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// A locked layout rejects drags and structural changes. Persisted.
    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            self.locked = locked;
            self.push_event(DockEvent::LockChanged { locked });
        }
    }

    pub(crate) fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(DockError::Locked);
        }
        Ok(())
    }

    /// Bump the revision and queue the change for the host, after any
    /// floating-window transitions it caused.
    pub(crate) fn commit(&mut self, what: fmt::Arguments<'_>) {
        self.revision += 1;
        log::debug!("layout revision {}: {}", self.revision, what);
        let transitions = self.floating.take_transitions();
        self.pending_events.extend(transitions);
        self.push_event(DockEvent::TreeChanged {
            revision: self.revision,
        });
    }

    /// Ids of the docked panels: main window first, then floating windows
    /// bottom to top. Side bar and hidden panels are not included.
    pub fn panel_ids(&self) -> Vec<PanelId> {
        let mut ids = self.main.panel_ids();
        for window in self.floating.windows() {
            ids.extend(window.root().panel_ids());
        }
        ids
    }

    pub fn panel_count(&self) -> usize {
        self.main.panel_count()
            + self
                .floating
                .windows()
                .iter()
                .map(|w| w.root().panel_count())
                .sum::<usize>()
    }

    /// Docked, on a side bar or hidden.
    pub fn contains_panel(&self, id: &PanelId) -> bool {
        self.find_panel(id).is_some() || self.stash.contains(id)
    }

    /// Location of a docked panel.
    pub fn find_panel(&self, id: &PanelId) -> Option<PanelLocation> {
        let windows = std::iter::once((WindowId::Main, &self.main)).chain(
            self.floating
                .windows()
                .iter()
                .map(|w| (WindowId::Floating(w.id()), w.root())),
        );
        for (window, root) in windows {
            if let Some((path, index)) = root.find_panel(id) {
                return Some(PanelLocation {
                    window,
                    path,
                    index,
                });
            }
        }
        None
    }

    pub fn panel(&self, id: &PanelId) -> Option<&PanelHandle> {
        let Some(location) = self.find_panel(id) else {
            return self.stash.get(id).map(|entry| &entry.panel);
        };
        let leaf = self.root(location.window)?.leaf_at_path(&location.path)?;
        leaf.panels().get(location.index)
    }

    pub fn node(&self, node: &NodeRef) -> Option<&DockNode> {
        self.root(node.window)?.node_at(&node.path)
    }

    pub fn node_rect(&self, node: &NodeRef) -> Option<Rect> {
        let window = self.window_rect(node.window)?;
        self.root(node.window)?.node_rect(&node.path, window)
    }

    pub fn leaf_rects(&self, window: WindowId) -> Vec<(NodePath, Rect)> {
        match (self.root(window), self.window_rect(window)) {
            (Some(root), Some(rect)) => root.leaf_rects(rect),
            _ => Vec::new(),
        }
    }

    // ──────────────────────────────────────────────
    // Uncommitted primitives (callers bump the revision)
    // ──────────────────────────────────────────────

    pub(crate) fn insert_panel(
        &mut self,
        target: &NodeRef,
        panel: PanelHandle,
        index: usize,
    ) -> Result<usize> {
        if self.contains_panel(&panel.id) {
            return Err(DockError::DuplicatePanel(panel.id));
        }
        self.root_mut_checked(target.window)?
            .insert_panel(&target.path, panel, index)
    }

    pub(crate) fn split_node(
        &mut self,
        target: &NodeRef,
        panel: PanelHandle,
        direction: SplitDirection,
        side: SplitSide,
    ) -> Result<NodePath> {
        if self.contains_panel(&panel.id) {
            return Err(DockError::DuplicatePanel(panel.id));
        }
        self.root_mut_checked(target.window)?
            .split_node(&target.path, panel, direction, side)
    }

    /// Remove a panel wherever it lives. A floating window left empty is
    /// destroyed and its id returned alongside the handle.
    pub(crate) fn remove_panel(&mut self, id: &PanelId) -> Result<(PanelHandle, Option<RootId>)> {
        let location = self
            .find_panel(id)
            .ok_or_else(|| DockError::PanelNotFound(id.clone()))?;
        let panel = self.root_mut_checked(location.window)?.remove_panel(id)?;
        let destroyed = match location.window {
            WindowId::Floating(root_id) if self.floating.reap_if_empty(root_id) => Some(root_id),
            _ => None,
        };
        Ok((panel, destroyed))
    }

    fn root_mut_checked(&mut self, window: WindowId) -> Result<&mut Root> {
        self.root_mut(window).ok_or(match window {
            WindowId::Floating(id) => DockError::UnknownWindow(id),
            WindowId::Main => DockError::InvalidTarget {
                path: NodePath::root(),
            },
        })
    }

    // ──────────────────────────────────────────────
    // Committed edits
    // ──────────────────────────────────────────────

    /// Replace the weights of the split at `split`.
    pub fn set_weights(&mut self, split: &NodeRef, weights: &[f32]) -> Result<()> {
        self.root_mut_checked(split.window)?
            .set_weights(&split.path, weights)?;
        self.commit(format_args!("set weights at {}", split));
        Ok(())
    }

    /// Dock a new panel at the end of the main window.
    pub fn add_panel(&mut self, panel: PanelHandle) -> Result<()> {
        self.ensure_unlocked()?;
        if self.contains_panel(&panel.id) {
            return Err(DockError::DuplicatePanel(panel.id));
        }
        let id = panel.id.clone();
        self.main.append(DockNode::leaf(panel));
        self.commit(format_args!("added `{}`", id));
        Ok(())
    }

    /// Make a panel the selected tab of its leaf.
    pub fn select_tab(&mut self, id: &PanelId) -> Result<()> {
        let location = self
            .find_panel(id)
            .ok_or_else(|| DockError::PanelNotFound(id.clone()))?;
        let changed = self
            .root_mut_checked(location.window)?
            .select_tab(&location.path, location.index);
        if changed {
            self.commit(format_args!("selected `{}`", id));
        }
        Ok(())
    }

    /// Verify the structural invariants of every tree.
    pub fn check_invariants(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut issues = Vec::new();
        self.main.check(&mut seen, &mut issues);
        for window in self.floating.windows() {
            if window.root().is_empty() {
                issues.push(format!("floating window {} is empty", window.id()));
            }
            if !window.bounds().is_valid() {
                issues.push(format!("floating window {} has invalid bounds", window.id()));
            }
            window.root().check(&mut seen, &mut issues);
        }
        for entry in self.stash.entries() {
            if !seen.insert(entry.panel.id.clone()) {
                issues.push(format!("panel `{}` appears more than once", entry.panel.id));
            }
        }
        for side in Side::ALL {
            let width = self.stash.sidebar(side).panel_width();
            if !width.is_finite() || width <= 0.0 {
                issues.push(format!("{} side bar width {}", side.as_str(), width));
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(DockError::InvariantViolation(issues.join("; ")))
        }
    }
}

impl Default for DockLayout {
    fn default() -> Self {
        Self::new(DockConfig::default())
    }
}
