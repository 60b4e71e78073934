//! Field registries
//!
//! A [`Format`] is the ordered, append-only set of fields a family of records
//! shares. Asking for a name that does not exist yet creates it; nothing is
//! ever removed. Each change to the field set produces a new
//! [`FormatVersion`], which lets callers cache per-format work and notice when
//! the set grew underneath them.
//!
//! Two implementations:
//!
//! - [`ListFormat`]: positional, lock-free (copy-on-write snapshots behind an
//!   `ArcSwap`). Backs [`ListRecord`](crate::record::ListRecord).
//! - [`KvFormat`]: name-only, behind a `parking_lot::RwLock`. Backs
//!   [`KvRecord`](crate::record::KvRecord).

mod kv;
mod list;

pub use kv::KvFormat;
pub use list::ListFormat;

use crate::field::Field;
use std::fmt;

/// Opaque token identifying one state of a format's field set
///
/// Equal tokens from the same format mean the field set did not change in
/// between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FormatVersion(pub u64);

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Append-only registry of fields
pub trait Format: Send + Sync + fmt::Debug {
    /// Get the field called `name`, creating it if needed
    fn field(&self, name: &str) -> Field;

    /// Get the field called `name` without creating it
    fn lookup(&self, name: &str) -> Option<Field>;

    /// Whether a field called `name` exists
    fn has_field(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Field at `index` in creation order
    fn field_at(&self, index: usize) -> Option<Field>;

    /// Creation-order index of `name`
    fn position_of(&self, name: &str) -> Option<usize>;

    /// Number of fields
    fn field_count(&self) -> usize;

    /// Current version token
    fn version(&self) -> FormatVersion;

    /// All fields in creation order
    fn fields(&self) -> Vec<Field>;
}
