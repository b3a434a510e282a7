//! Rating exchange state machine: Ready -> Rating -> Drained.

use crate::catalog::LaptopStore;
use crate::context::CallContext;
use crate::pb::{RateLaptopRequest, RateLaptopResponse};
use crate::rating::RatingStore;

use super::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateState {
    /// No request received yet.
    Ready,
    /// At least one rating applied; `handled` responses produced so far.
    Rating { handled: u64 },
    /// Caller closed its side or the exchange failed; nothing more is accepted.
    Drained,
}

/// Applies rating requests one at a time, in receive order.
#[derive(Debug)]
pub struct RateSession {
    state: RateState,
}

impl Default for RateSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RateSession {
    pub fn new() -> Self {
        Self {
            state: RateState::Ready,
        }
    }

    pub fn state(&self) -> RateState {
        self.state
    }

    /// Apply one request and build its response.
    ///
    /// The laptop lookup and the rating update are two separate atomic store
    /// operations, not one transaction.
    pub fn rate(
        &mut self,
        ctx: &CallContext,
        laptops: &dyn LaptopStore,
        ratings: &dyn RatingStore,
        request: RateLaptopRequest,
    ) -> Result<RateLaptopResponse, ServiceError> {
        let result = self.apply(ctx, laptops, ratings, request);
        match (&result, self.state) {
            (Err(_), _) => self.state = RateState::Drained,
            (Ok(_), RateState::Ready) => self.state = RateState::Rating { handled: 1 },
            (Ok(_), RateState::Rating { handled }) => {
                self.state = RateState::Rating {
                    handled: handled + 1,
                }
            }
            (Ok(_), RateState::Drained) => {}
        }
        result
    }

    fn apply(
        &self,
        ctx: &CallContext,
        laptops: &dyn LaptopStore,
        ratings: &dyn RatingStore,
        request: RateLaptopRequest,
    ) -> Result<RateLaptopResponse, ServiceError> {
        if self.state == RateState::Drained {
            return Err(ServiceError::Unknown("rating exchange is already drained".into()));
        }
        ctx.check()?;

        let RateLaptopRequest { laptop_id, score } = request;
        tracing::info!(laptop_id = %laptop_id, score, "received a rate-laptop request");

        let found = laptops
            .find(&laptop_id)
            .map_err(|e| ServiceError::from_store("cannot find laptop", e))?;
        if found.is_none() {
            return Err(ServiceError::NotFound(format!(
                "laptop {} is not found",
                laptop_id
            )));
        }

        let rating = ratings
            .add(&laptop_id, score)
            .map_err(|e| ServiceError::from_store("cannot add rating to the store", e))?;

        Ok(RateLaptopResponse {
            laptop_id,
            rated_count: rating.count,
            average_score: rating.average(),
        })
    }

    /// The caller closed its side; no further requests are accepted.
    pub fn drain(&mut self) {
        self.state = RateState::Drained;
    }
}
