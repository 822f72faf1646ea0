//! The backend capability required by the engine.

use std::io::{self, Read};

/// Stat information for one entry, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes (directory sizes are backend-defined).
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// One step of a source walk.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Source-relative slash-joined path of the entry. The walk base
    /// itself is yielded too; for a root walk its path is empty.
    pub path: String,
    /// Stat of the entry.
    pub stat: FileStat,
}

/// A pull-based directory walker.
///
/// `step` yields entries in backend-defined order; an `Err` step reports a
/// problem with one entry without ending the walk. Calling `skip_dir`
/// after a directory step prunes that directory's subtree.
pub trait SourceWalker: Send {
    /// Advances to the next entry. `None` ends the walk.
    fn step(&mut self) -> Option<io::Result<WalkEntry>>;

    /// Skips descending into the most recently yielded directory.
    fn skip_dir(&mut self);
}

/// What the engine requires of a source backend.
///
/// All paths are source-relative and slash-joined; implementations must
/// confine every operation to their own root.
pub trait SourceFs: Send + Sync + 'static {
    /// Opens a file for sequential reading.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the path is absent, is a directory, or
    /// escapes the source root.
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;

    /// Stats an entry without following symlinks.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the path is absent or escapes the source
    /// root.
    fn lstat(&self, path: &str) -> io::Result<FileStat>;

    /// Starts a walk rooted at `base` (empty = source root).
    fn walk(&self, base: &str) -> Box<dyn SourceWalker>;

    /// Joins path segments into a source-relative path.
    fn join(&self, segments: &[String]) -> String {
        segments.join("/")
    }
}
