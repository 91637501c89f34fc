//! Archive entries.

use std::sync::Arc;

use crate::ByteBuffer;
use crate::entry_type::EntryType;

/// Modification state of an entry relative to the last open or save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryState {
    /// Matches what was last read from or written to backing storage.
    #[default]
    Unmodified,
    /// Content or name changed since the last open or save.
    Modified,
    /// Added since the last open or save.
    New,
}

impl EntryState {
    /// Returns the numeric state code (0 = unmodified, 1 = modified, 2 = new).
    pub fn as_u8(&self) -> u8 {
        match self {
            EntryState::Unmodified => 0,
            EntryState::Modified => 1,
            EntryState::New => 2,
        }
    }
}

/// A named, sized unit of content inside an archive.
///
/// An entry owns its bytes exclusively. Archives own their entries; formats
/// replace an entry's bytes through [`import_bytes`](Self::import_bytes)
/// but never hold on to them.
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    size: u64,
    data: ByteBuffer,
    entry_type: Option<Arc<EntryType>>,
    loaded: bool,
    state: EntryState,
}

impl Entry {
    /// Creates an unloaded entry with a declared size and no data yet.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            data: ByteBuffer::new(),
            entry_type: None,
            loaded: false,
            state: EntryState::New,
        }
    }

    /// Creates a loaded entry holding a copy of `data`.
    pub fn with_data(name: impl Into<String>, data: &[u8]) -> Self {
        let mut entry = Self::new(name, 0);
        entry.import_bytes(data);
        entry.state = EntryState::New;
        entry
    }

    /// Returns the entry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entry name in upper case, as resource lookups compare it.
    pub fn upper_name(&self) -> String {
        self.name.to_uppercase()
    }

    /// Returns the extension of the entry name, without the dot.
    pub fn extension(&self) -> Option<&str> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
    }

    /// Renames the entry and marks it modified.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.mark_modified();
    }

    /// Returns the size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the entry's bytes.
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns the entry's backing buffer.
    pub fn buffer(&self) -> &ByteBuffer {
        &self.data
    }

    /// Replaces the entry's bytes with a copy of `data`.
    ///
    /// The entry becomes loaded and modified, and its detected type is
    /// cleared since the content changed.
    pub fn import_bytes(&mut self, data: &[u8]) {
        self.data.import(data);
        self.after_import();
    }

    /// Replaces the entry's bytes with `buffer` without copying.
    pub fn import_buffer(&mut self, buffer: ByteBuffer) {
        self.data = buffer;
        let _ = self.data.seek(0);
        self.after_import();
    }

    fn after_import(&mut self) {
        self.size = self.data.size() as u64;
        self.loaded = true;
        self.entry_type = None;
        self.mark_modified();
    }

    fn mark_modified(&mut self) {
        if self.state == EntryState::Unmodified {
            self.state = EntryState::Modified;
        }
    }

    /// Returns true if the entry's bytes are in memory.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Marks the entry's bytes as present in memory.
    pub fn set_loaded(&mut self) {
        self.loaded = true;
    }

    /// Returns the modification state.
    pub fn state(&self) -> EntryState {
        self.state
    }

    /// Sets the modification state.
    pub fn set_state(&mut self, state: EntryState) {
        self.state = state;
    }

    /// Returns the detected type, or `None` if detection has not run.
    pub fn entry_type(&self) -> Option<&Arc<EntryType>> {
        self.entry_type.as_ref()
    }

    /// Sets the detected type.
    pub fn set_type(&mut self, entry_type: Arc<EntryType>) {
        self.entry_type = Some(entry_type);
    }
}
