//! Document Set - the fixed, ordered list of previewed files.
//!
//! Resolved once at startup and read-only for the life of the process.
//! Indices are stable: `0..len()` in first-seen order of the de-duplicated,
//! canonicalized input paths.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::utils::path::{display_name, normalize_path};

/// Errors raised while resolving the Document Set.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("No markdown files provided.")]
    Empty,

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Cannot access `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

/// One watched, renderable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub index: usize,
    /// Canonical absolute path.
    pub path: PathBuf,
    /// File name shown in navigation.
    pub display_name: String,
}

/// Position of a document relative to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct DocumentSet {
    docs: Vec<Document>,
}

impl DocumentSet {
    /// Resolve command line paths into a Document Set.
    ///
    /// Paths are canonicalized before de-duplication, so `a.md` and `./a.md`
    /// collapse into one entry that keeps the first position.
    pub fn resolve<I, P>(paths: I) -> Result<Self, DocumentError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut seen = FxHashSet::default();
        let mut docs = Vec::new();

        for raw in paths {
            let path = normalize_path(raw.as_ref());

            let meta = match std::fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(DocumentError::NotFound(path));
                }
                Err(e) => return Err(DocumentError::Io(path, e)),
            };
            if !meta.is_file() {
                return Err(DocumentError::NotAFile(path));
            }

            if !seen.insert(path.clone()) {
                continue;
            }

            docs.push(Document {
                index: docs.len(),
                display_name: display_name(&path),
                path,
            });
        }

        if docs.is_empty() {
            return Err(DocumentError::Empty);
        }

        Ok(Self { docs })
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.docs.get(index)
    }

    /// Neighbour indices of `index`. `index` must be in range.
    pub fn neighbors(&self, index: usize) -> Neighbors {
        Neighbors {
            prev: index.checked_sub(1),
            next: (index + 1 < self.docs.len()).then_some(index + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// All documents in index order.
    pub fn all(&self) -> &[Document] {
        &self.docs
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.docs.iter().map(|doc| doc.path.as_path())
    }
}
