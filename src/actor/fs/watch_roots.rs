use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::document::DocumentSet;

/// The documents' parent directories, watched non-recursively.
///
/// Watching the directory instead of the file keeps saves that replace the
/// file (write temp + rename) visible. A directory that is removed and
/// recreated while serving loses its watch and is attached again once it
/// exists.
pub(super) struct WatchRoots {
    dirs: Vec<DocumentDir>,
}

struct DocumentDir {
    path: PathBuf,
    /// How many documents live here, for logging
    documents: usize,
    attached: bool,
}

impl WatchRoots {
    /// One root per distinct parent directory, in document order.
    pub(super) fn for_documents(docs: &DocumentSet) -> Self {
        let mut dirs: Vec<DocumentDir> = Vec::new();
        for parent in docs.paths().filter_map(Path::parent) {
            match dirs.iter_mut().find(|dir| dir.path == parent) {
                Some(dir) => dir.documents += 1,
                None => dirs.push(DocumentDir {
                    path: parent.to_path_buf(),
                    documents: 1,
                    attached: false,
                }),
            }
        }
        Self { dirs }
    }

    /// Attach every root. The documents were just resolved, so a root that
    /// cannot be watched is a startup error.
    pub(super) fn attach(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        for dir in &mut self.dirs {
            watcher.watch(&dir.path, RecursiveMode::NonRecursive)?;
            dir.attached = true;
        }
        Ok(())
    }

    /// Track removed roots and re-attach the ones that came back.
    ///
    /// Returns how many roots were re-attached.
    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) -> usize {
        let mut reattached = 0;
        for dir in &mut self.dirs {
            let exists = dir.path.is_dir();
            if dir.attached && !exists {
                let _ = watcher.unwatch(&dir.path);
                dir.attached = false;
                crate::debug!("watch"; "lost {} ({} documents)", dir.path.display(), dir.documents);
            } else if !dir.attached
                && exists
                && watcher.watch(&dir.path, RecursiveMode::NonRecursive).is_ok()
            {
                dir.attached = true;
                reattached += 1;
                crate::debug!("watch"; "re-attached {}", dir.path.display());
            }
        }
        reattached
    }
}
