//! Ordered directory tree holding an archive's entries.

use crate::Entry;

/// A directory node.
///
/// Tree order is a directory's own entries in insertion order, followed by
/// each subdirectory (recursively) in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    name: String,
    entries: Vec<Entry>,
    subdirs: Vec<Directory>,
}

/// Splits `path` into its directory part and final component.
pub(crate) fn split_path(path: &str) -> (&str, &str) {
    let path = path.trim_matches('/');
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

impl Directory {
    /// Creates an empty root directory.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates an empty directory with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the directory name (empty for the root).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns this directory's own entries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns this directory's subdirectories.
    pub fn subdirs(&self) -> &[Directory] {
        &self.subdirs
    }

    /// Returns the number of entries, optionally including subdirectories.
    pub fn num_entries(&self, recursive: bool) -> usize {
        let own = self.entries.len();
        if !recursive {
            return own;
        }
        own + self
            .subdirs
            .iter()
            .map(|d| d.num_entries(true))
            .sum::<usize>()
    }

    /// Returns true if the tree holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.num_entries(true) == 0
    }

    /// Returns this directory's entry named `name`.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Appends an entry.
    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Returns the subdirectory at `path` (relative, `/`-separated).
    ///
    /// An empty path returns `self`.
    pub fn dir(&self, path: &str) -> Option<&Directory> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |dir, name| dir.subdirs.iter().find(|d| d.name == name))
    }

    /// Returns the subdirectory at `path`, mutably.
    pub fn dir_mut(&mut self, path: &str) -> Option<&mut Directory> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |dir, name| {
                dir.subdirs.iter_mut().find(|d| d.name == name)
            })
    }

    /// Returns the subdirectory at `path`, creating missing directories.
    pub fn ensure_dir(&mut self, path: &str) -> &mut Directory {
        let mut dir = self;
        for name in path.split('/').filter(|s| !s.is_empty()) {
            let idx = match dir.subdirs.iter().position(|d| d.name == name) {
                Some(idx) => idx,
                None => {
                    dir.subdirs.push(Directory::new(name));
                    dir.subdirs.len() - 1
                }
            };
            dir = &mut dir.subdirs[idx];
        }
        dir
    }

    /// Returns the entry at `path`, e.g. `maps/MAP01`.
    pub fn entry_at_path(&self, path: &str) -> Option<&Entry> {
        let (dir, name) = split_path(path);
        self.dir(dir)?.entry(name)
    }

    /// Returns the entry at `path`, mutably.
    pub fn entry_at_path_mut(&mut self, path: &str) -> Option<&mut Entry> {
        let (dir, name) = split_path(path);
        self.dir_mut(dir)?
            .entries
            .iter_mut()
            .find(|e| e.name() == name)
    }

    /// Removes and returns the entry at `path`.
    pub fn remove_entry(&mut self, path: &str) -> Option<Entry> {
        let (dir, name) = split_path(path);
        let dir = self.dir_mut(dir)?;
        let idx = dir.entries.iter().position(|e| e.name() == name)?;
        Some(dir.entries.remove(idx))
    }

    /// Returns the first entry in tree order.
    pub fn first_entry(&self) -> Option<&Entry> {
        self.entries
            .first()
            .or_else(|| self.subdirs.iter().find_map(|d| d.first_entry()))
    }

    /// Returns the first entry in tree order, mutably.
    pub fn first_entry_mut(&mut self) -> Option<&mut Entry> {
        if !self.entries.is_empty() {
            return self.entries.first_mut();
        }
        self.subdirs.iter_mut().find_map(|d| d.first_entry_mut())
    }

    /// Collects entries in tree order.
    pub fn walk<'a>(&'a self, recursive: bool, out: &mut Vec<&'a Entry>) {
        out.extend(self.entries.iter());
        if recursive {
            for dir in &self.subdirs {
                dir.walk(true, out);
            }
        }
    }

    /// Removes all entries and subdirectories.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.subdirs.clear();
    }
}
