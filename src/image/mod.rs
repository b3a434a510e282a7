//! Image store: immutable binary assets attached to catalog entries.

mod disk;
mod in_memory;
mod store;

pub use disk::DiskImageStore;
pub use in_memory::InMemoryImageStore;
pub use store::{ImageRecord, ImageStore};
