//! Shared machinery for event selectors.
//!
//! Both selector flavours are generic over the caller's event identifier
//! type and rate calculator. The calculator is the seam between the
//! library and the simulation: the simulation mutates its own state
//! between selections, and the selector re-reads rates through the
//! calculator whenever it needs them.

use std::fmt::Debug;
use std::hash::Hash;

use crate::core::error::SelectorError;
use crate::core::random::RandomGenerator;

/// Bounds required of caller-chosen event identifier types.
///
/// Identifiers are small value types: copied freely, hashed and compared
/// for the id-to-leaf map, ordered so event sets have a canonical order,
/// and debug-printable so errors can name the offending event. Blanket
/// implemented; callers never implement this by hand.
pub trait EventId: Copy + Eq + Ord + Hash + Debug {}

impl<T: Copy + Eq + Ord + Hash + Debug> EventId for T {}

/// Capability to compute the current rate of an event.
///
/// Implemented by the caller. `calculate_rate` must return a finite,
/// non-negative value reflecting the simulation state at the time of the
/// call; the selector re-reads rates through this between selections.
/// Reading a rate must not mutate anything the selector observes.
pub trait RateCalculator<I> {
    /// The instantaneous rate of `id`.
    fn calculate_rate(&self, id: I) -> f64;
}

/// A shared reference to a calculator is itself a calculator. This is the
/// intended way to hand a calculator to a selector: the caller keeps
/// ownership and mutates it (through interior mutability) between
/// `select_event` calls.
impl<I, C: RateCalculator<I>> RateCalculator<I> for &C {
    fn calculate_rate(&self, id: I) -> f64 {
        (**self).calculate_rate(id)
    }
}

/// State shared by the selector implementations: the calculator handle
/// and the random generator.
#[derive(Debug)]
pub(crate) struct EventSelectorBase<C> {
    pub(crate) rate_calculator: C,
    pub(crate) random_generator: RandomGenerator,
}

impl<C> EventSelectorBase<C> {
    pub(crate) fn new(rate_calculator: C) -> Self {
        Self {
            rate_calculator,
            random_generator: RandomGenerator::new(),
        }
    }

    /// Rate of `id` from the calculator, validated.
    ///
    /// # Errors
    ///
    /// Fails if the calculator returns a negative or non-finite value.
    pub(crate) fn calculate_rate<I: EventId>(&self, id: I) -> Result<f64, SelectorError>
    where
        C: RateCalculator<I>,
    {
        let rate = self.rate_calculator.calculate_rate(id);
        if !rate.is_finite() || rate < 0.0 {
            return Err(SelectorError::InvalidRate {
                id: format!("{id:?}"),
                rate,
            });
        }
        Ok(rate)
    }

    /// Rates for a list of ids, in order. Used at tree construction.
    pub(crate) fn calculate_rates<I: EventId>(&self, ids: &[I]) -> Result<Vec<f64>, SelectorError>
    where
        C: RateCalculator<I>,
    {
        ids.iter().map(|&id| self.calculate_rate(id)).collect()
    }

    /// Poisson time step for the given total rate: `-ln(u) / total_rate`
    /// with `u` uniform on `(0, 1]`, so the result is finite and
    /// non-negative.
    ///
    /// # Panics
    ///
    /// Panics if `total_rate` is not positive; every library call site
    /// checks this first.
    pub(crate) fn calculate_time_step(&mut self, total_rate: f64) -> f64 {
        assert!(
            total_rate > 0.0,
            "time step requires a positive total rate, got {total_rate}"
        );
        -self.random_generator.sample_unit_interval().ln() / total_rate
    }

    pub(crate) fn reseed(&mut self, seed: u64) {
        self.random_generator.reseed(seed);
    }

    pub(crate) fn seed(&self) -> u64 {
        self.random_generator.seed()
    }
}
