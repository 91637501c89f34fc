//! Entry search by name pattern and type.
//!
//! # Example
//!
//! ```rust
//! use resarc::{Directory, Entry, EntryTypeRegistry, SearchOptions, search};
//!
//! let mut root = Directory::root();
//! root.add_entry(Entry::with_data("MAP01.wad", b"PWAD"));
//! root.add_entry(Entry::with_data("readme.txt", b"hi"));
//!
//! let types = EntryTypeRegistry::builtin();
//! let found = search::find_all(&root, &SearchOptions::new().name("*.TXT"), &types);
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].name(), "readme.txt");
//! ```

use std::sync::Arc;

use glob::{MatchOptions, Pattern};

use crate::archive::Directory;
use crate::entry_type::{EntryType, EntryTypeRegistry};
use crate::Entry;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Criteria for finding entries.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Case-insensitive glob matched against entry names. Empty matches all.
    pub match_name: String,
    /// Type filter. `None` matches all.
    pub match_type: Option<Arc<EntryType>>,
    /// Directory to search in, relative to the root. `None` searches from the root.
    pub dir: Option<String>,
    /// Whether to descend into subdirectories.
    pub search_subdirs: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            match_name: String::new(),
            match_type: None,
            dir: None,
            search_subdirs: true,
        }
    }
}

impl SearchOptions {
    /// Creates options that match every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name pattern.
    pub fn name(mut self, pattern: impl Into<String>) -> Self {
        self.match_name = pattern.into();
        self
    }

    /// Sets the type filter.
    pub fn entry_type(mut self, entry_type: Arc<EntryType>) -> Self {
        self.match_type = Some(entry_type);
        self
    }

    /// Restricts the search to the directory at `path`.
    pub fn dir(mut self, path: impl Into<String>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Sets whether subdirectories are searched.
    pub fn search_subdirs(mut self, recursive: bool) -> Self {
        self.search_subdirs = recursive;
        self
    }
}

/// How an entry name is tested.
enum NameMatch {
    Any,
    Glob(Pattern),
    Literal(String),
}

impl NameMatch {
    fn new(pattern: &str) -> Self {
        if pattern.is_empty() {
            return NameMatch::Any;
        }
        match Pattern::new(pattern) {
            Ok(glob) => NameMatch::Glob(glob),
            // Unparseable patterns such as "[" are matched literally
            Err(_) => NameMatch::Literal(pattern.to_lowercase()),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Any => true,
            NameMatch::Glob(glob) => glob.matches_with(name, MATCH_OPTIONS),
            NameMatch::Literal(literal) => name.to_lowercase() == *literal,
        }
    }
}

/// A compiled form of [`SearchOptions`].
struct Matcher<'a> {
    options: &'a SearchOptions,
    name: NameMatch,
    types: &'a EntryTypeRegistry,
}

impl<'a> Matcher<'a> {
    fn new(options: &'a SearchOptions, types: &'a EntryTypeRegistry) -> Self {
        Self {
            options,
            name: NameMatch::new(&options.match_name),
            types,
        }
    }

    fn matches(&self, entry: &Entry) -> bool {
        if let Some(filter) = &self.options.match_type {
            match entry.entry_type() {
                Some(detected) if !self.types.is_unknown(detected) => {
                    if **detected != **filter {
                        return false;
                    }
                }
                // Undetected content: ask the filter type whether it claims it
                _ => {
                    if !filter.is_this_type(entry) {
                        return false;
                    }
                }
            }
        }

        self.name.matches(entry.name())
    }
}

fn candidates<'a>(root: &'a Directory, options: &SearchOptions) -> Vec<&'a Entry> {
    let mut out = Vec::new();
    let start = match &options.dir {
        Some(path) => root.dir(path),
        None => Some(root),
    };
    if let Some(dir) = start {
        dir.walk(options.search_subdirs, &mut out);
    }
    out
}

/// Returns the first entry in tree order matching `options`.
pub fn find_first<'a>(
    root: &'a Directory,
    options: &SearchOptions,
    types: &EntryTypeRegistry,
) -> Option<&'a Entry> {
    let matcher = Matcher::new(options, types);
    candidates(root, options)
        .into_iter()
        .find(|e| matcher.matches(e))
}

/// Returns the last entry in tree order matching `options`.
pub fn find_last<'a>(
    root: &'a Directory,
    options: &SearchOptions,
    types: &EntryTypeRegistry,
) -> Option<&'a Entry> {
    let matcher = Matcher::new(options, types);
    candidates(root, options)
        .into_iter()
        .rev()
        .find(|e| matcher.matches(e))
}

/// Returns every entry matching `options`, in tree order.
pub fn find_all<'a>(
    root: &'a Directory,
    options: &SearchOptions,
    types: &EntryTypeRegistry,
) -> Vec<&'a Entry> {
    let matcher = Matcher::new(options, types);
    candidates(root, options)
        .into_iter()
        .filter(|e| matcher.matches(e))
        .collect()
}
