use std::path::PathBuf;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

use super::types::{EventAction, WatchedPaths};
use crate::utils::path::normalize_path;

/// Quiet period before a burst of events is released.
pub(super) const DEBOUNCE_MS: u64 = 100;

/// Pure debouncer: timing and de-duplication of changed document paths.
pub(super) struct Debouncer {
    pub(super) changes: FxHashSet<PathBuf>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashSet::default(),
            last_event: None,
        }
    }

    /// Record the watched documents touched by `event`.
    ///
    /// Events on other files in the same directories are dropped here.
    pub(super) fn add_event(&mut self, event: &notify::Event, watched: &WatchedPaths) {
        if EventAction::of(&event.kind) == EventAction::Ignore {
            return;
        }

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            let path = normalize_path(path);
            if !watched.contains(&path) {
                continue;
            }
            self.changes.insert(path);
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the changed paths (sorted) once the quiet period has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        if !self.is_ready() {
            return None;
        }

        self.last_event = None;
        let mut changes: Vec<_> = std::mem::take(&mut self.changes).into_iter().collect();
        changes.sort();
        Some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        last_event.elapsed() >= Duration::from_millis(DEBOUNCE_MS) && !self.changes.is_empty()
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}
