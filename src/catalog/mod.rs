//! Catalog store: laptops keyed by id, with insert-if-absent, point lookup
//! and filtered scans.

mod disk;
pub mod filter;
mod in_memory;
mod store;

pub use disk::DiskLaptopStore;
pub use in_memory::InMemoryLaptopStore;
pub use store::{LaptopStore, Matches};
