//! Archive configuration.
//!
//! # Example
//!
//! ```rust
//! use resarc::{ArchiveOptions, ResourceLimits};
//!
//! let options = ArchiveOptions::new()
//!     .level(5)
//!     .limits(ResourceLimits::new().max_entry_size(16 << 20));
//! assert_eq!(options.level, Some(5));
//! ```

/// Limits applied while decoding untrusted archive data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum decoded size of a single entry.
    pub max_entry_size: u64,
    /// Maximum ratio of decoded to encoded bytes.
    pub ratio_limit: Option<u32>,
}

impl Default for ResourceLimits {
    /// Creates resource limits with the following default values:
    ///
    /// | Limit | Default Value |
    /// |-------|---------------|
    /// | `max_entry_size` | 1 GiB |
    /// | `ratio_limit` | none |
    ///
    /// Highly repetitive payloads (blank lumps, padding) routinely compress
    /// far past any fixed ratio, so only the size cap is on by default.
    fn default() -> Self {
        Self {
            max_entry_size: 1 << 30,
            ratio_limit: None,
        }
    }
}

impl ResourceLimits {
    /// Creates new resource limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates resource limits with no restrictions.
    pub fn unlimited() -> Self {
        Self {
            max_entry_size: u64::MAX,
            ratio_limit: None,
        }
    }

    /// Sets the maximum decoded size of a single entry.
    pub fn max_entry_size(mut self, max: u64) -> Self {
        self.max_entry_size = max;
        self
    }

    /// Sets the maximum compression ratio, or `None` to disable the check.
    pub fn ratio_limit(mut self, ratio: Option<u32>) -> Self {
        self.ratio_limit = ratio;
        self
    }
}

/// Options shared by every archive format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Limits applied when decoding.
    pub limits: ResourceLimits,
    /// Compression level used on write.
    ///
    /// When unset, single-stream formats re-use the parameters they were
    /// opened with.
    pub level: Option<u32>,
}

impl ArchiveOptions {
    /// Creates options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the decoding limits.
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the compression level used on write.
    pub fn level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }
}
