// Change notifications queued by committed edits and drained by the host.

use berth_core::{Rect, RootId};

use crate::drag::DockObserver;
use crate::floating::FloatingState;
use crate::DockLayout;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DockEvent {
    /// A structural change was committed.
    TreeChanged { revision: u64 },
    /// A floating window moved through its lifecycle.
    FloatingStateChanged {
        id: RootId,
        state: FloatingState,
        bounds: Rect,
    },
    /// A floating window was moved or resized.
    FloatingMoved { id: RootId, bounds: Rect },
    FloatingPinChanged { id: RootId, always_on_top: bool },
    LockChanged { locked: bool },
}

impl DockLayout {
    pub(crate) fn push_event(&mut self, event: DockEvent) {
        self.pending_events.push(event);
    }

    /// Events not yet handed to the host, oldest first.
    pub fn pending_events(&self) -> &[DockEvent] {
        &self.pending_events
    }

    pub fn take_events(&mut self) -> Vec<DockEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Hand every pending event to `observer`, in commit order.
    pub fn dispatch_events(&mut self, observer: &mut dyn DockObserver) {
        for event in self.take_events() {
            match event {
                DockEvent::TreeChanged { .. } => observer.tree_changed(self),
                DockEvent::FloatingStateChanged { id, state, bounds } => {
                    observer.floating_state_changed(id, state);
                    match state {
                        FloatingState::Created => observer.floating_created(id, bounds),
                        FloatingState::Destroyed => observer.floating_destroyed(id),
                        FloatingState::Populated | FloatingState::Empty => {}
                    }
                }
                DockEvent::FloatingMoved { id, bounds } => observer.floating_moved(id, bounds),
                DockEvent::FloatingPinChanged { id, always_on_top } => {
                    observer.floating_pin_changed(id, always_on_top)
                }
                DockEvent::LockChanged { locked } => observer.lock_changed(locked),
            }
        }
    }
}
