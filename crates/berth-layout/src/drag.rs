use berth_core::{PanelHandle, Rect, RootId, Vec2};

use crate::error::DockError;
use crate::executor::DockOutcome;
use crate::floating::FloatingState;
use crate::hit_test::DropTarget;
use crate::DockLayout;

/// Host-side callbacks. Every method has an empty default.
///
/// Committed edits queue their notifications on the layout; the host delivers
/// them with [`DockLayout::dispatch_events`]. Drag sessions dispatch on release.
pub trait DockObserver {
    /// Called after every committed change.
    fn tree_changed(&mut self, _layout: &DockLayout) {}

    /// The hover target changed; `None` clears the preview.
    fn preview_changed(&mut self, _target: Option<&DropTarget>) {}

    /// Every lifecycle step of a floating window, `Created` through `Destroyed`.
    fn floating_state_changed(&mut self, _id: RootId, _state: FloatingState) {}

    fn floating_created(&mut self, _id: RootId, _bounds: Rect) {}

    fn floating_destroyed(&mut self, _id: RootId) {}

    fn floating_moved(&mut self, _id: RootId, _bounds: Rect) {}

    fn floating_pin_changed(&mut self, _id: RootId, _always_on_top: bool) {}

    fn lock_changed(&mut self, _locked: bool) {}
}

impl DockObserver for () {}

/// How a drag ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DropResult {
    /// Docked at the resolved target.
    Docked(DockOutcome),
    /// Undocked into a floating window.
    Floated(DockOutcome),
    /// Dropped where nothing happens, or the operation failed.
    Cancelled,
}

// ──────────────────────────────────────────────
// Drag state machine
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        panel: PanelHandle,
        target: Option<DropTarget>,
    },
}

/// Tracks one pointer-driven drag from press to release.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn current_target(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Dragging { target, .. } => target.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Start dragging `panel`. Refused while the layout is locked.
    pub fn drag_started(&mut self, layout: &DockLayout, panel: PanelHandle) -> bool {
        if layout.is_locked() {
            log::debug!("drag of `{}` refused: layout locked", panel.id);
            return false;
        }
        log::debug!("drag started: `{}`", panel.id);
        self.state = DragState::Dragging {
            panel,
            target: None,
        };
        true
    }

    /// Re-resolve the hover target. The observer only hears about changes.
    pub fn pointer_moved(
        &mut self,
        layout: &DockLayout,
        position: Vec2,
        observer: &mut dyn DockObserver,
    ) {
        let DragState::Dragging { panel, target } = &mut self.state else {
            return;
        };
        let resolved = layout.resolve_drop(position, &panel.id);
        if resolved != *target {
            *target = resolved;
            observer.preview_changed(target.as_ref());
        }
    }

    /// Finish the drag. Drop targets are resolved afresh against the current
    /// layout; executor errors are logged and reported as `Cancelled`.
    pub fn pointer_released(
        &mut self,
        layout: &mut DockLayout,
        position: Vec2,
        observer: &mut dyn DockObserver,
    ) -> DropResult {
        let state = std::mem::take(&mut self.state);
        let DragState::Dragging { panel, target } = state else {
            return DropResult::Cancelled;
        };
        if target.is_some() {
            observer.preview_changed(None);
        }

        let result = match layout.resolve_drop(position, &panel.id) {
            Some(target) => layout
                .apply_drop(&panel, &target)
                .map(DropResult::Docked),
            None if layout.window_at(position).is_none()
                && layout.config().float_on_release_outside =>
            {
                layout
                    .float_panel(&panel, position)
                    .map(DropResult::Floated)
            }
            None => Ok(DropResult::Cancelled),
        };

        let result = match result {
            Ok(DropResult::Docked(outcome)) | Ok(DropResult::Floated(outcome))
                if !outcome.changed =>
            {
                DropResult::Cancelled
            }
            Ok(result) => result,
            Err(err) => {
                log_drop_error(&panel, &err);
                DropResult::Cancelled
            }
        };
        layout.dispatch_events(observer);
        result
    }

    /// Abandon the drag without touching the layout.
    pub fn cancel(&mut self, observer: &mut dyn DockObserver) {
        if let DragState::Dragging { panel, target } = std::mem::take(&mut self.state) {
            log::debug!("drag of `{}` cancelled", panel.id);
            if target.is_some() {
                observer.preview_changed(None);
            }
        }
    }
}

fn log_drop_error(panel: &PanelHandle, err: &DockError) {
    match err {
        DockError::PanelNotFound(_) => log::debug!("drop of `{}` ignored: {}", panel.id, err),
        _ => log::warn!("drop of `{}` failed: {}", panel.id, err),
    }
}
