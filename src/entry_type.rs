//! Entry content types and type detection.
//!
//! Types are sniffed from entry content by an ordered list of detectors.
//! The first detector that claims an entry wins; when none does, the entry
//! gets the registry's `unknown` sentinel.
//!
//! ```rust
//! use resarc::{Entry, EntryTypeRegistry};
//!
//! let types = EntryTypeRegistry::builtin();
//! let mut entry = Entry::with_data("MAP01.wad", b"PWAD\x00\x00\x00\x00\x0c\x00\x00\x00");
//! types.detect(&mut entry);
//! assert_eq!(entry.entry_type().unwrap().id(), "wad");
//! ```

use std::sync::Arc;

use crate::Entry;

/// A content predicate used to recognize an entry type.
pub type TypeDetector = fn(&Entry) -> bool;

/// A detected content format.
///
/// Two types are equal when their ids are equal.
pub struct EntryType {
    id: String,
    name: String,
    detector: Option<TypeDetector>,
}

impl EntryType {
    /// Creates a type recognized by `detector`.
    pub fn new(id: impl Into<String>, name: impl Into<String>, detector: TypeDetector) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            detector: Some(detector),
        }
    }

    fn unknown() -> Self {
        Self {
            id: "unknown".into(),
            name: "Unknown".into(),
            detector: None,
        }
    }

    /// Returns the type id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this type claims `entry`'s content.
    ///
    /// The `unknown` sentinel claims nothing.
    pub fn is_this_type(&self, entry: &Entry) -> bool {
        self.detector.is_some_and(|detect| detect(entry))
    }
}

impl PartialEq for EntryType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntryType {}

impl std::fmt::Debug for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryType")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An ordered set of entry types.
#[derive(Debug)]
pub struct EntryTypeRegistry {
    types: Vec<Arc<EntryType>>,
    unknown: Arc<EntryType>,
}

impl Default for EntryTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryTypeRegistry {
    /// Creates a registry that knows no types besides `unknown`.
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            unknown: Arc::new(EntryType::unknown()),
        }
    }

    /// Creates a registry with the built-in detectors.
    ///
    /// Detection order is `png`, `wad`, `bzip2`, then `text` as a catch-all
    /// for readable content.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(EntryType::new("png", "PNG Image", is_png));
        registry.register(EntryType::new("wad", "Doom Wad", is_wad));
        registry.register(EntryType::new("bzip2", "BZip2 Data", is_bzip2));
        registry.register(EntryType::new("text", "Text", is_text));
        registry
    }

    /// Appends a type. Earlier registrations take precedence.
    pub fn register(&mut self, entry_type: EntryType) -> Arc<EntryType> {
        let entry_type = Arc::new(entry_type);
        self.types.push(entry_type.clone());
        entry_type
    }

    /// Returns the `unknown` sentinel.
    pub fn unknown(&self) -> &Arc<EntryType> {
        &self.unknown
    }

    /// Returns true if `entry_type` is the `unknown` sentinel.
    pub fn is_unknown(&self, entry_type: &EntryType) -> bool {
        *entry_type == *self.unknown
    }

    /// Looks up a registered type by id.
    pub fn by_id(&self, id: &str) -> Option<&Arc<EntryType>> {
        if id == self.unknown.id() {
            return Some(&self.unknown);
        }
        self.types.iter().find(|t| t.id() == id)
    }

    /// Detects `entry`'s type and stores it on the entry.
    pub fn detect(&self, entry: &mut Entry) {
        let detected = self
            .types
            .iter()
            .find(|t| t.is_this_type(entry))
            .unwrap_or(&self.unknown)
            .clone();
        log::debug!("Entry '{}' detected as {}", entry.name(), detected.id());
        entry.set_type(detected);
    }
}

fn is_png(entry: &Entry) -> bool {
    entry.data().starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
}

fn is_wad(entry: &Entry) -> bool {
    let data = entry.data();
    data.len() >= 12 && (data.starts_with(b"IWAD") || data.starts_with(b"PWAD"))
}

fn is_bzip2(entry: &Entry) -> bool {
    crate::codec::bzip2::block_size(entry.data()).is_some()
}

fn is_text(entry: &Entry) -> bool {
    let data = entry.data();
    !data.is_empty() && !data.contains(&0) && std::str::from_utf8(data).is_ok()
}
