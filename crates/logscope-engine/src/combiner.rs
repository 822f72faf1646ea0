//! Merging per-source walks into one logical tree.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::protocol::{File, FileInstance};

/// Merges concurrent per-source walks into unique logical files.
///
/// The first sighting of a key appends a new [`File`]; every sighting
/// appends that source's [`FileInstance`]. Emission order is insertion
/// order, which is nondeterministic because source walks race.
#[derive(Debug, Default)]
pub struct TreeCombiner {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    files: Vec<File>,
    index: HashMap<String, usize>,
}

impl TreeCombiner {
    /// Creates an empty combiner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one walked entry from one source.
    pub fn add(&self, file: File, instance: FileInstance) {
        let mut inner = self.inner.lock();
        let index = match inner.index.get(&file.key) {
            Some(&index) => index,
            None => {
                let index = inner.files.len();
                inner.index.insert(file.key.clone(), index);
                inner.files.push(file);
                index
            }
        };
        inner.files[index].instances.push(instance);
    }

    /// Number of distinct keys seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().files.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().files.is_empty()
    }

    /// Takes the merged files, leaving the combiner empty.
    #[must_use]
    pub fn take_files(&self) -> Vec<File> {
        let mut inner = self.inner.lock();
        inner.index.clear();
        std::mem::take(&mut inner.files)
    }
}
