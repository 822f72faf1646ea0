//! Local directory backend.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::fs::{FileStat, SourceFs, SourceWalker, WalkEntry};

/// A source backed by a local directory.
///
/// Every operation is confined to the root: relative paths may not
/// contain empty, `.` or `..` segments, and never resolve outside it.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Creates a backend rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The backend's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" => continue,
                "." | ".." => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path escapes source root: {path}"),
                    ))
                }
                other => resolved.push(other),
            }
        }
        Ok(resolved)
    }
}

impl SourceFs for LocalFs {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(self.resolve(path)?)?;
        Ok(Box::new(file))
    }

    fn lstat(&self, path: &str) -> io::Result<FileStat> {
        let meta = std::fs::symlink_metadata(self.resolve(path)?)?;
        Ok(FileStat {
            size: meta.len(),
            is_dir: meta.is_dir(),
        })
    }

    fn walk(&self, base: &str) -> Box<dyn SourceWalker> {
        let start = match self.resolve(base) {
            Ok(start) => start,
            Err(err) => return Box::new(FailedWalk { err: Some(err) }),
        };
        Box::new(LocalWalker {
            iter: WalkDir::new(start).follow_links(false).into_iter(),
            root: self.root.clone(),
        })
    }
}

struct LocalWalker {
    iter: walkdir::IntoIter,
    root: PathBuf,
}

impl SourceWalker for LocalWalker {
    fn step(&mut self) -> Option<io::Result<WalkEntry>> {
        let next = self.iter.next()?;
        Some(next.map_err(io::Error::from).and_then(|entry| {
            let meta = entry.metadata().map_err(io::Error::from)?;
            Ok(WalkEntry {
                path: relative_slash_path(&self.root, entry.path()),
                stat: FileStat {
                    size: meta.len(),
                    is_dir: meta.is_dir(),
                },
            })
        }))
    }

    fn skip_dir(&mut self) {
        self.iter.skip_current_dir();
    }
}

/// Walk whose base failed to resolve; yields the error once.
struct FailedWalk {
    err: Option<io::Error>,
}

impl SourceWalker for FailedWalk {
    fn step(&mut self) -> Option<io::Result<WalkEntry>> {
        self.err.take().map(Err)
    }

    fn skip_dir(&mut self) {}
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("dir1")).expect("mkdir");
        std::fs::write(dir.path().join("service1.log"), "find me").expect("write");
        std::fs::write(dir.path().join("dir1/service3.log"), "a\nb\n").expect("write");
        let mut f = File::create(dir.path().join("service2.log")).expect("create");
        f.flush().expect("flush");
        dir
    }

    fn walk_keys(fs: &LocalFs, base: &str) -> Vec<String> {
        let mut walker = fs.walk(base);
        let mut keys = Vec::new();
        while let Some(step) = walker.step() {
            let entry = step.expect("walk step");
            keys.push(entry.path);
        }
        keys.sort();
        keys
    }

    #[test]
    fn walk_yields_source_relative_paths() {
        let dir = fixture();
        let fs = LocalFs::new(dir.path());
        let keys = walk_keys(&fs, "");
        assert_eq!(
            keys,
            vec![
                "",
                "dir1",
                "dir1/service3.log",
                "service1.log",
                "service2.log"
            ]
        );
    }

    #[test]
    fn walk_of_subdir_keeps_full_relative_paths() {
        let dir = fixture();
        let fs = LocalFs::new(dir.path());
        let keys = walk_keys(&fs, "dir1");
        assert_eq!(keys, vec!["dir1", "dir1/service3.log"]);
    }

    #[test]
    fn skip_dir_prunes_subtree() {
        let dir = fixture();
        let fs = LocalFs::new(dir.path());
        let mut walker = fs.walk("");
        let mut keys = Vec::new();
        while let Some(step) = walker.step() {
            let entry = step.expect("walk step");
            if entry.stat.is_dir && entry.path == "dir1" {
                walker.skip_dir();
                continue;
            }
            keys.push(entry.path);
        }
        assert!(!keys.iter().any(|k| k.starts_with("dir1")));
        assert!(keys.contains(&"service1.log".to_string()));
    }

    #[test]
    fn walk_of_missing_base_yields_one_error() {
        let dir = fixture();
        let fs = LocalFs::new(dir.path());
        let mut walker = fs.walk("no-such-dir");
        assert!(matches!(walker.step(), Some(Err(_))));
        assert!(walker.step().is_none());
    }

    #[test]
    fn open_reads_file_contents() {
        let dir = fixture();
        let fs = LocalFs::new(dir.path());
        let mut reader = fs.open("service1.log").expect("open");
        let mut contents = String::new();
        reader.read_to_string(&mut contents).expect("read");
        assert_eq!(contents, "find me");
    }

    #[test]
    fn lstat_reports_size_and_kind() {
        let dir = fixture();
        let fs = LocalFs::new(dir.path());
        let stat = fs.lstat("service1.log").expect("lstat");
        assert_eq!(stat.size, 7);
        assert!(!stat.is_dir);
        assert!(fs.lstat("dir1").expect("lstat").is_dir);
    }

    #[test]
    fn parent_segments_are_rejected() {
        let dir = fixture();
        let fs = LocalFs::new(dir.path());
        assert!(fs.lstat("../outside").is_err());
        assert!(fs.open("dir1/../../etc/passwd").is_err());
    }

    #[test]
    fn join_is_slash_join() {
        let dir = fixture();
        let fs = LocalFs::new(dir.path());
        let segments = vec!["dir1".to_string(), "service3.log".to_string()];
        assert_eq!(fs.join(&segments), "dir1/service3.log");
    }
}
