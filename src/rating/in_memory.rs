//! InMemoryRatingStore - HashMap-backed rating aggregates.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{Rating, RatingStore};
use crate::error::StoreError;

#[derive(Clone, Default)]
pub struct InMemoryRatingStore {
    ratings: Arc<RwLock<HashMap<String, Rating>>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RatingStore for InMemoryRatingStore {
    fn add(&self, laptop_id: &str, score: f64) -> Result<Rating, StoreError> {
        let mut ratings = self
            .ratings
            .write()
            .map_err(|_| StoreError::LockPoisoned("add"))?;

        let rating = ratings.entry(laptop_id.to_string()).or_insert(Rating {
            count: 0,
            sum: 0.0,
        });
        rating.count = rating
            .count
            .checked_add(1)
            .ok_or_else(|| StoreError::Overflow(format!("rating count of {}", laptop_id)))?;
        rating.sum += score;
        Ok(*rating)
    }

    fn find(&self, laptop_id: &str) -> Result<Option<Rating>, StoreError> {
        let ratings = self
            .ratings
            .read()
            .map_err(|_| StoreError::LockPoisoned("find"))?;
        Ok(ratings.get(laptop_id).copied())
    }
}
