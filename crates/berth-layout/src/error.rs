use berth_core::{PanelId, RootId};
use thiserror::Error;

use crate::NodePath;

pub type Result<T> = std::result::Result<T, DockError>;

/// Errors raised by tree primitives and the executor. None of them leaves the
/// layout modified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DockError {
    /// The operation references a node that is not (or no longer) in the tree.
    #[error("no suitable node at {path}")]
    InvalidTarget { path: NodePath },

    /// The drop target was resolved against an older revision of the layout.
    #[error("stale drop target (resolved at revision {resolved}, layout is at {current})")]
    StaleTarget { resolved: u64, current: u64 },

    #[error("panel `{0}` is not docked")]
    PanelNotFound(PanelId),

    #[error("panel `{0}` is already docked")]
    DuplicatePanel(PanelId),

    #[error("panel `{0}` cannot be closed")]
    NotClosable(PanelId),

    #[error("invalid split weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("floating window {0} does not exist")]
    UnknownWindow(RootId),

    #[error("layout is locked")]
    Locked,

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// Errors raised while decoding or validating a persisted layout. `path` is a
/// JSON path into the document (`$.main.node.children[1]`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("malformed layout snapshot at {path}: {message}")]
    Malformed { path: String, message: String },
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed("$", err.to_string())
    }
}

impl SnapshotError {
    pub(crate) fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}
