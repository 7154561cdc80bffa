use std::path::PathBuf;

use rustc_hash::FxHashSet;

/// Canonical paths of the watched documents.
pub(super) type WatchedPaths = FxHashSet<PathBuf>;

/// How a raw notify event is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EventAction {
    /// Content may have changed
    Change,
    /// Metadata, access, removal: nothing to re-render
    Ignore,
}

impl EventAction {
    pub(super) fn of(kind: &notify::EventKind) -> Self {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match kind {
            EventKind::Create(_) => Self::Change,
            // mtime/atime/chmod noise
            EventKind::Modify(ModifyKind::Metadata(_)) => Self::Ignore,
            EventKind::Modify(_) => Self::Change,
            _ => Self::Ignore,
        }
    }
}
