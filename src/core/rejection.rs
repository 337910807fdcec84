//! Rejection-sampling event selector.
//!
//! Rejection KMC never looks at all rates at once. Each attempt draws a
//! candidate uniformly from the event list and accepts it with
//! probability `rate / rate_upper_bound`; time accumulates over the
//! failed attempts so the returned step is exact under the Poisson model
//! with total-rate envelope `rate_upper_bound * M`. This wins when
//! per-event rate evaluation is cheap and the event set is large, because
//! no cumulative structure has to be maintained.

use crate::core::error::SelectorError;
use crate::core::selector::{EventId, EventSelectorBase, RateCalculator};

/// Attempts between long-run warnings in the selection loop.
const WARN_INTERVAL: u64 = 1_000_000;

/// Event selector using the rejection KMC algorithm.
#[derive(Debug)]
pub struct RejectionEventSelector<I, C> {
    base: EventSelectorBase<C>,
    /// Upper bound on every event rate. Immutable after construction.
    rate_upper_bound: f64,
    /// All candidate event ids.
    event_id_list: Vec<I>,
    /// Attempts the most recent `select_event` call needed.
    last_attempt_count: u64,
}

impl<I: EventId, C: RateCalculator<I>> RejectionEventSelector<I, C> {
    /// Create a selector over `event_id_list` with the given rate upper
    /// bound.
    ///
    /// # Errors
    ///
    /// Fails if `rate_upper_bound` is not positive and finite, or the id
    /// list is empty.
    pub fn new(
        rate_calculator: C,
        rate_upper_bound: f64,
        event_id_list: Vec<I>,
    ) -> Result<Self, SelectorError> {
        if !rate_upper_bound.is_finite() || rate_upper_bound <= 0.0 {
            return Err(SelectorError::NonPositiveUpperBound {
                bound: rate_upper_bound,
            });
        }
        if event_id_list.is_empty() {
            return Err(SelectorError::EmptyEventIdList);
        }
        Ok(Self {
            base: EventSelectorBase::new(rate_calculator),
            rate_upper_bound,
            event_id_list,
            last_attempt_count: 0,
        })
    }

    /// Attempt events until one is accepted; returns its id and the time
    /// step accumulated over all attempts.
    ///
    /// The loop is deliberately uncapped: an iteration limit would bias
    /// selection. When the mean rate is far below the upper bound the
    /// loop can run for a long time; a warning is logged every million
    /// attempts so such runs are visible.
    ///
    /// # Errors
    ///
    /// Fails if the calculator returns an invalid rate or a rate above
    /// the upper bound.
    pub fn select_event(&mut self) -> Result<(I, f64), SelectorError> {
        let total_rate_bound = self.rate_upper_bound * self.event_id_list.len() as f64;
        let mut accumulated_time_step = 0.0;
        let mut attempts: u64 = 0;
        loop {
            attempts += 1;
            if attempts % WARN_INTERVAL == 0 {
                log::warn!(
                    "rejection selection still running after {attempts} attempts; \
                     mean rate may be far below the upper bound {}",
                    self.rate_upper_bound
                );
            }

            accumulated_time_step += self.base.calculate_time_step(total_rate_bound);
            let index = self
                .base
                .random_generator
                .sample_integer_range(self.event_id_list.len() as u64 - 1)
                as usize;
            let candidate = self.event_id_list[index];
            let rate = self.base.calculate_rate(candidate)?;
            if rate > self.rate_upper_bound {
                return Err(SelectorError::RateAboveUpperBound {
                    id: format!("{candidate:?}"),
                    rate,
                    bound: self.rate_upper_bound,
                });
            }
            if rate / self.rate_upper_bound >= self.base.random_generator.sample_unit_interval() {
                self.last_attempt_count = attempts;
                return Ok((candidate, accumulated_time_step));
            }
        }
    }

    /// Reseed the internal random generator.
    pub fn reseed(&mut self, seed: u64) {
        self.base.reseed(seed);
    }

    /// Seed the internal generator was last initialised with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.base.seed()
    }

    /// Attempts the most recent `select_event` call needed (0 before the
    /// first call).
    #[must_use]
    pub const fn attempt_count(&self) -> u64 {
        self.last_attempt_count
    }

    /// The rate upper bound.
    #[must_use]
    pub const fn rate_upper_bound(&self) -> f64 {
        self.rate_upper_bound
    }

    /// The candidate event ids.
    #[must_use]
    pub fn event_ids(&self) -> &[I] {
        &self.event_id_list
    }

    /// The injected rate calculator.
    #[must_use]
    pub const fn rate_calculator(&self) -> &C {
        &self.base.rate_calculator
    }
}
