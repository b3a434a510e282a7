//! RatingStore - running score aggregates per laptop.

use crate::error::StoreError;

/// Immutable snapshot of a laptop's rating aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub count: u32,
    pub sum: f64,
}

impl Rating {
    /// `sum / count`, computed on every call. Zero for an empty aggregate.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / f64::from(self.count)
        }
    }
}

pub trait RatingStore: Send + Sync {
    /// Atomically create-if-absent, add one score, and return the updated aggregate.
    fn add(&self, laptop_id: &str, score: f64) -> Result<Rating, StoreError>;

    /// Current aggregate for `laptop_id`. Returns None if it was never rated.
    fn find(&self, laptop_id: &str) -> Result<Option<Rating>, StoreError>;
}
