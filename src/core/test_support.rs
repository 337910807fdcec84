//! Shared fixtures for the test suite: deterministic id sequences and
//! small interior-mutable rate calculators.
//!
//! The calculators use `Cell` so a test can mutate them while a selector
//! holds a shared reference — the same relationship a real simulation
//! has with its rate calculator between selections.

use std::cell::Cell;

use crate::core::selector::{EventId, RateCalculator};

/// Fixed seed for deterministic tests.
pub(crate) const TEST_SEED: u64 = 0;

/// Standard-error tolerance for statistical tests.
pub(crate) const TEST_SIGMA: f64 = 4.0;

/// Integer sequence with non-consecutive values (i maps to 7i).
pub(crate) fn hashed_sequence(length: usize) -> Vec<i64> {
    (0..length as i64).map(|i| i * 7).collect()
}

/// Returns the same rate for every event id.
pub(crate) struct UniformRateCalculator {
    rate: Cell<f64>,
}

impl UniformRateCalculator {
    pub(crate) const fn new(rate: f64) -> Self {
        Self {
            rate: Cell::new(rate),
        }
    }

    pub(crate) fn set_rate(&self, new_rate: f64) {
        self.rate.set(new_rate);
    }
}

impl<I> RateCalculator<I> for UniformRateCalculator {
    fn calculate_rate(&self, _id: I) -> f64 {
        self.rate.get()
    }
}

/// Returns rate 1 for a single "hot" event id and 0 for all others.
pub(crate) struct OneHotRateCalculator<I> {
    hot_id: Cell<I>,
}

impl<I: EventId> OneHotRateCalculator<I> {
    pub(crate) const fn new(hot_id: I) -> Self {
        Self {
            hot_id: Cell::new(hot_id),
        }
    }

    pub(crate) fn set_hot_id(&self, new_hot_id: I) {
        self.hot_id.set(new_hot_id);
    }
}

impl<I: EventId> RateCalculator<I> for OneHotRateCalculator<I> {
    fn calculate_rate(&self, id: I) -> f64 {
        if id == self.hot_id.get() {
            1.0
        } else {
            0.0
        }
    }
}

/// Returns one rate for even ids and another for odd ids.
pub(crate) struct EvenOddRateCalculator {
    even_rate: Cell<f64>,
    odd_rate: Cell<f64>,
}

impl EvenOddRateCalculator {
    pub(crate) const fn new(even_rate: f64, odd_rate: f64) -> Self {
        Self {
            even_rate: Cell::new(even_rate),
            odd_rate: Cell::new(odd_rate),
        }
    }

    pub(crate) fn set_even_rate(&self, new_rate: f64) {
        self.even_rate.set(new_rate);
    }
}

impl RateCalculator<i64> for EvenOddRateCalculator {
    fn calculate_rate(&self, id: i64) -> f64 {
        if id % 2 == 0 {
            self.even_rate.get()
        } else {
            self.odd_rate.get()
        }
    }
}
