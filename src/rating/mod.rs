//! Rating aggregator: running (count, sum) per laptop.

mod in_memory;
mod store;

pub use in_memory::InMemoryRatingStore;
pub use store::{Rating, RatingStore};
