//! LaptopStore - concurrency-safe keyed collection of catalog entries.

use crate::context::CallContext;
use crate::error::StoreError;
use crate::pb::{Filter, Laptop};

/// Lazy sequence of laptops matching a filter.
///
/// Yields at most one `Err` (lock failure, I/O failure or an interrupted
/// scan) and then ends. Not restartable: run a fresh search per call.
pub type Matches<'a> = Box<dyn Iterator<Item = Result<Laptop, StoreError>> + Send + 'a>;

/// Keyed catalog storage shared by every call of the service.
///
/// Implementations own their synchronisation; callers never see the
/// underlying collection.
pub trait LaptopStore: Send + Sync {
    /// Insert a laptop. Fails with `AlreadyExists` if its id is taken; never overwrites.
    fn save(&self, laptop: &Laptop) -> Result<(), StoreError>;

    /// Get a copy of the laptop with `id`. Returns None if not found.
    fn find(&self, id: &str) -> Result<Option<Laptop>, StoreError>;

    /// Scan all laptops in unspecified order, yielding those that match `filter`.
    ///
    /// `ctx` is checked before every entry; once it fires the sequence yields
    /// `StoreError::Interrupted` and ends.
    fn search<'a>(
        &'a self,
        ctx: &'a CallContext,
        filter: &'a Filter,
    ) -> Result<Matches<'a>, StoreError>;

    /// Number of stored laptops.
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
