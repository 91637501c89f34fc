//! The archive contract shared by every format.
//!
//! An archive owns a tree of [`Entry`] values plus open/modified state and a
//! list of observers that are told about state transitions. Formats
//! implement [`Archive`] and keep their shared state in an [`ArchiveCore`].
//!
//! # Example
//!
//! ```rust,no_run
//! use resarc::{Archive, Bzip2Archive, SearchOptions};
//! use std::path::Path;
//!
//! let mut archive = Bzip2Archive::new();
//! archive.open_file(Path::new("level.bz2"))?;
//!
//! if let Some(entry) = archive.find_first(&SearchOptions::new()) {
//!     println!("{}: {} bytes", entry.name(), entry.size());
//! }
//! # Ok::<(), resarc::Error>(())
//! ```

mod tree;

pub use tree::Directory;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::entry_type::EntryTypeRegistry;
use crate::format::ArchiveFormat;
use crate::options::ArchiveOptions;
use crate::search::{self, SearchOptions};
use crate::{ByteBuffer, Entry, EntryState, Error, Result};

/// A state transition announced to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArchiveEvent {
    /// The archive was opened successfully.
    Opened,
    /// An entry was added, removed, renamed, or changed.
    Modified,
    /// The archive was written to backing storage.
    Saved,
    /// The archive was closed and its tree emptied.
    Closed,
}

impl ArchiveEvent {
    /// Returns the event name, e.g. `"opened"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveEvent::Opened => "opened",
            ArchiveEvent::Modified => "modified",
            ArchiveEvent::Saved => "saved",
            ArchiveEvent::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ArchiveEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives archive state transitions.
///
/// Closures taking an [`ArchiveEvent`] implement this trait.
pub trait ArchiveObserver: Send {
    /// Called after a successful state transition.
    fn announce(&mut self, event: ArchiveEvent);
}

impl<F: FnMut(ArchiveEvent) + Send> ArchiveObserver for F {
    fn announce(&mut self, event: ArchiveEvent) {
        self(event)
    }
}

/// State shared by every archive format.
pub struct ArchiveCore {
    root: Directory,
    filename: Option<PathBuf>,
    muted: bool,
    modified: bool,
    options: ArchiveOptions,
    types: Arc<EntryTypeRegistry>,
    observers: Vec<Box<dyn ArchiveObserver>>,
}

impl std::fmt::Debug for ArchiveCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveCore")
            .field("filename", &self.filename)
            .field("entries", &self.root.num_entries(true))
            .field("muted", &self.muted)
            .field("modified", &self.modified)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for ArchiveCore {
    fn default() -> Self {
        Self::new(
            ArchiveOptions::default(),
            Arc::new(EntryTypeRegistry::builtin()),
        )
    }
}

impl ArchiveCore {
    /// Creates an empty, unmodified core.
    pub fn new(options: ArchiveOptions, types: Arc<EntryTypeRegistry>) -> Self {
        Self {
            root: Directory::root(),
            filename: None,
            muted: false,
            modified: false,
            options,
            types,
            observers: Vec::new(),
        }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Returns the root directory, mutably.
    ///
    /// Changes made through this reference are not tracked; formats use it
    /// while building a tree with notifications muted.
    pub fn root_mut(&mut self) -> &mut Directory {
        &mut self.root
    }

    /// Replaces the whole tree.
    pub fn replace_root(&mut self, root: Directory) {
        self.root = root;
    }

    /// Returns the path of the backing file, if any.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Returns the backing file's name without its directory.
    pub fn file_name(&self) -> Option<&str> {
        self.filename
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
    }

    /// Sets the backing file path and returns the previous one.
    pub fn set_filename(&mut self, filename: Option<PathBuf>) -> Option<PathBuf> {
        std::mem::replace(&mut self.filename, filename)
    }

    /// Returns the archive options.
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Returns the entry type registry used for detection.
    pub fn types(&self) -> &EntryTypeRegistry {
        &self.types
    }

    /// Returns true while notifications are suppressed.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Suppresses or resumes notifications.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Returns true if the tree changed since the last open or save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Sets the modified flag, announcing [`ArchiveEvent::Modified`] when it becomes set.
    pub fn set_modified(&mut self, modified: bool) {
        let changed = self.modified != modified;
        self.modified = modified;
        if changed && modified {
            self.announce(ArchiveEvent::Modified);
        }
    }

    /// Registers an observer.
    pub fn add_observer(&mut self, observer: Box<dyn ArchiveObserver>) {
        self.observers.push(observer);
    }

    /// Notifies observers of `event` unless muted.
    pub fn announce(&mut self, event: ArchiveEvent) {
        if self.muted {
            return;
        }
        for observer in &mut self.observers {
            observer.announce(event);
        }
    }

    fn touch(&mut self) {
        self.modified = true;
        self.announce(ArchiveEvent::Modified);
    }

    /// Returns the number of entries in the whole tree.
    pub fn num_entries(&self) -> usize {
        self.root.num_entries(true)
    }

    /// Returns the entry at `path`.
    pub fn entry(&self, path: &str) -> Option<&Entry> {
        self.root.entry_at_path(path)
    }

    /// Returns the entry at `path`, or [`Error::EntryNotFound`].
    pub fn check_entry(&mut self, path: &str) -> Result<&mut Entry> {
        self.root
            .entry_at_path_mut(path)
            .ok_or_else(|| Error::EntryNotFound {
                path: path.to_string(),
            })
    }

    /// Adds `entry` to the directory at `dir`, creating it if needed.
    pub fn add_entry(&mut self, dir: &str, mut entry: Entry) -> Result<()> {
        let target = self.root.ensure_dir(dir);
        if target.entry(entry.name()).is_some() {
            return Err(Error::EntryExists {
                path: format!("{}/{}", dir.trim_matches('/'), entry.name())
                    .trim_start_matches('/')
                    .to_string(),
            });
        }
        entry.set_state(EntryState::New);
        target.add_entry(entry);
        self.touch();
        Ok(())
    }

    /// Removes and returns the entry at `path`.
    pub fn remove_entry(&mut self, path: &str) -> Result<Entry> {
        let entry = self
            .root
            .remove_entry(path)
            .ok_or_else(|| Error::EntryNotFound {
                path: path.to_string(),
            })?;
        self.touch();
        Ok(entry)
    }

    /// Renames the entry at `path`.
    pub fn rename_entry(&mut self, path: &str, new_name: &str) -> Result<()> {
        let (dir, _) = tree::split_path(path);
        let taken = self
            .root
            .dir(dir)
            .and_then(|d| d.entry(new_name))
            .is_some();
        if taken {
            return Err(Error::EntryExists {
                path: new_name.to_string(),
            });
        }
        self.check_entry(path)?.rename(new_name);
        self.touch();
        Ok(())
    }

    /// Replaces the bytes of the entry at `path` and re-detects its type.
    pub fn import_entry_data(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let types = self.types.clone();
        let entry = self.check_entry(path)?;
        entry.import_bytes(data);
        types.detect(entry);
        self.touch();
        Ok(())
    }

    /// Shared lazy-load logic: succeeds when nothing needs to be read.
    ///
    /// Entries that are empty or already in memory are marked loaded. Any
    /// other entry needs reading by `format`, which the core cannot do.
    pub fn load_entry_data(&mut self, format: ArchiveFormat, path: &str) -> Result<()> {
        let entry = self.check_entry(path)?;
        if entry.size() == 0 || entry.is_loaded() {
            entry.set_loaded();
            return Ok(());
        }
        Err(Error::UnsupportedOperation {
            format,
            operation: "lazy entry loading",
        })
    }

    /// Empties the tree and announces [`ArchiveEvent::Closed`].
    pub fn close(&mut self) {
        self.root.clear();
        self.filename = None;
        self.modified = false;
        self.announce(ArchiveEvent::Closed);
    }
}

/// The capability interface every archive format implements.
///
/// `open` is all-or-nothing: on error the archive is left exactly as it was
/// before the call. `find_*` scan the tree in tree order and are shared by
/// all formats unless a format overrides them.
pub trait Archive {
    /// Returns the format identity.
    fn format(&self) -> ArchiveFormat;

    /// Returns the shared archive state.
    fn core(&self) -> &ArchiveCore;

    /// Returns the shared archive state, mutably.
    fn core_mut(&mut self) -> &mut ArchiveCore;

    /// Decodes `data` into the entry tree.
    fn open(&mut self, data: &ByteBuffer) -> Result<()>;

    /// Encodes the entry tree into `out`.
    ///
    /// When `update` is set, entries are marked unmodified afterwards. On
    /// error `out` is left untouched.
    fn write(&mut self, out: &mut ByteBuffer, update: bool) -> Result<()>;

    /// Makes sure the bytes of the entry at `path` are in memory.
    fn load_entry_data(&mut self, path: &str) -> Result<()> {
        let format = self.format();
        self.core_mut().load_entry_data(format, path)
    }

    /// Returns the first entry matching `options`.
    fn find_first(&self, options: &SearchOptions) -> Option<&Entry> {
        let core = self.core();
        search::find_first(core.root(), options, core.types())
    }

    /// Returns the last entry matching `options`.
    fn find_last(&self, options: &SearchOptions) -> Option<&Entry> {
        let core = self.core();
        search::find_last(core.root(), options, core.types())
    }

    /// Returns all entries matching `options`.
    fn find_all(&self, options: &SearchOptions) -> Vec<&Entry> {
        let core = self.core();
        search::find_all(core.root(), options, core.types())
    }

    /// Reads the file at `path` and opens it.
    ///
    /// The file name is recorded before decoding since single-stream formats
    /// derive their entry name from it. It is restored if opening fails.
    fn open_file(&mut self, path: &Path) -> Result<()> {
        let data = std::fs::read(path).map_err(|e| {
            log::warn!("Failed to read archive '{}': {}", path.display(), e);
            Error::Io(e)
        })?;
        let previous = self.core_mut().set_filename(Some(path.to_path_buf()));
        if let Err(e) = self.open(&ByteBuffer::from(data)) {
            self.core_mut().set_filename(previous);
            return Err(e);
        }
        Ok(())
    }

    /// Writes the archive to `path` and records it as the backing file.
    fn save_file(&mut self, path: &Path) -> Result<()> {
        let mut out = ByteBuffer::new();
        self.write(&mut out, true)?;
        std::fs::write(path, out.data())?;

        let core = self.core_mut();
        core.set_filename(Some(path.to_path_buf()));
        core.set_modified(false);
        core.announce(ArchiveEvent::Saved);
        Ok(())
    }

    /// Empties the archive.
    fn close(&mut self) {
        self.core_mut().close();
    }

    /// Returns true if the tree changed since the last open or save.
    fn is_modified(&self) -> bool {
        self.core().is_modified()
    }

    /// Returns the number of entries in the tree.
    fn num_entries(&self) -> usize {
        self.core().num_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_core() -> (ArchiveCore, Arc<Mutex<Vec<ArchiveEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut core = ArchiveCore::default();
        core.add_observer(Box::new(move |event: ArchiveEvent| sink.lock().unwrap().push(event)));
        (core, events)
    }

    #[test]
    fn test_mutations_set_modified() {
        let (mut core, events) = recording_core();
        assert!(!core.is_modified());

        core.add_entry("", Entry::with_data("DECORATE", b"actor Foo")).unwrap();
        assert!(core.is_modified());
        assert_eq!(core.entry("DECORATE").unwrap().state(), EntryState::New);

        core.set_modified(false);
        core.rename_entry("DECORATE", "ZSCRIPT").unwrap();
        assert!(core.is_modified());

        core.set_modified(false);
        core.import_entry_data("ZSCRIPT", b"class Foo {}").unwrap();
        assert!(core.is_modified());
        assert_eq!(core.entry("ZSCRIPT").unwrap().entry_type().unwrap().id(), "text");

        core.remove_entry("ZSCRIPT").unwrap();
        assert_eq!(core.num_entries(), 0);
        assert_eq!(events.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_muted_suppresses_announcements() {
        let (mut core, events) = recording_core();
        core.set_muted(true);
        core.add_entry("", Entry::with_data("A", b"a")).unwrap();
        core.announce(ArchiveEvent::Opened);
        assert!(events.lock().unwrap().is_empty());

        core.set_muted(false);
        core.announce(ArchiveEvent::Opened);
        assert_eq!(*events.lock().unwrap(), [ArchiveEvent::Opened]);
    }

    #[test]
    fn test_duplicate_and_missing_entries() {
        let mut core = ArchiveCore::default();
        core.add_entry("maps", Entry::with_data("MAP01", b"")).unwrap();
        let err = core.add_entry("maps", Entry::with_data("MAP01", b"")).unwrap_err();
        assert!(matches!(err, Error::EntryExists { path } if path == "maps/MAP01"));

        assert!(matches!(
            core.remove_entry("MAP01"),
            Err(Error::EntryNotFound { .. })
        ));
        assert!(core.rename_entry("maps/MAP02", "MAP03").is_err());
    }

    #[test]
    fn test_load_entry_data_base_logic() {
        let mut core = ArchiveCore::default();
        core.add_entry("", Entry::with_data("loaded", b"abc")).unwrap();
        core.root_mut().add_entry(Entry::new("empty", 0));
        core.root_mut().add_entry(Entry::new("lazy", 10));

        let format = ArchiveFormat::Bzip2;
        assert!(core.load_entry_data(format, "loaded").is_ok());
        assert!(core.load_entry_data(format, "empty").is_ok());
        assert!(core.entry("empty").unwrap().is_loaded());
        assert!(matches!(
            core.load_entry_data(format, "lazy"),
            Err(Error::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            core.load_entry_data(format, "missing"),
            Err(Error::EntryNotFound { .. })
        ));
    }

    #[test]
    fn test_close_resets() {
        let (mut core, events) = recording_core();
        core.set_filename(Some(PathBuf::from("/tmp/level.bz2")));
        assert_eq!(core.file_name(), Some("level.bz2"));
        core.add_entry("", Entry::with_data("A", b"a")).unwrap();

        core.close();
        assert_eq!(core.num_entries(), 0);
        assert!(!core.is_modified());
        assert!(core.filename().is_none());
        assert_eq!(events.lock().unwrap().last(), Some(&ArchiveEvent::Closed));
    }

    #[test]
    fn test_event_names() {
        assert_eq!(ArchiveEvent::Opened.as_str(), "opened");
        assert_eq!(ArchiveEvent::Modified.to_string(), "modified");
    }
}
