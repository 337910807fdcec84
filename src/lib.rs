//! Kinetic Monte Carlo event selection.
//!
//! Given a finite set of events, each with a time-varying non-negative
//! rate, this crate repeatedly selects one event in proportion to its
//! rate and produces the elapsed simulated time until that event fires
//! under a Poisson-process model. It is the inner sampling kernel for
//! simulations such as lattice kinetics and stochastic chemistry.
//!
//! Two selection strategies are provided:
//!
//! - **Rejection-free**: all rates are held in a cumulative-rate binary
//!   tree; each call selects exactly one event in `O(log N)` and refreshes
//!   only the rates invalidated by the previous selection, as described by
//!   an impact table.
//! - **Rejection**: candidates are drawn uniformly and accepted with
//!   probability `rate / rate_upper_bound`; nothing is stored per event.
//!
//! The caller supplies rates through the
//! [`RateCalculator`](core::RateCalculator) capability and mutates its own
//! simulation state between calls; selectors re-read rates exactly when
//! the algorithm requires them.
//!
//! ```
//! use std::collections::HashMap;
//! use kmc_select::core::{RateCalculator, RejectionFreeEventSelector, SelectorError};
//!
//! struct Uniform;
//!
//! impl RateCalculator<u32> for Uniform {
//!     fn calculate_rate(&self, _id: u32) -> f64 {
//!         1.0
//!     }
//! }
//!
//! # fn main() -> Result<(), SelectorError> {
//! let calculator = Uniform;
//! let mut selector =
//!     RejectionFreeEventSelector::new(&calculator, vec![0_u32, 1, 2], HashMap::new())?;
//! selector.reseed(7);
//! let (event, time_step) = selector.select_event()?;
//! assert!(event <= 2);
//! assert!(time_step >= 0.0);
//! # Ok(())
//! # }
//! ```

pub mod core;

#[cfg(feature = "python")]
mod python_bindings {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::core::{
        RateCalculator, RejectionEventSelector, RejectionFreeEventSelector, SelectorError,
    };

    impl From<SelectorError> for PyErr {
        fn from(err: SelectorError) -> Self {
            PyValueError::new_err(err.to_string())
        }
    }

    /// Rate calculator that defers to a Python callable.
    ///
    /// The callable receives an integer event id and must return a
    /// finite, non-negative float. Exceptions raised by the callable are
    /// stashed and re-raised from the selection call; the rate reported
    /// for the failing call is NaN, which the selector rejects.
    struct PyRateCalculator {
        rate_callback: Py<PyAny>,
        last_error: RefCell<Option<PyErr>>,
    }

    impl PyRateCalculator {
        fn new(rate_callback: Py<PyAny>) -> Self {
            Self {
                rate_callback,
                last_error: RefCell::new(None),
            }
        }

        fn take_error(&self) -> Option<PyErr> {
            self.last_error.borrow_mut().take()
        }
    }

    impl RateCalculator<i64> for PyRateCalculator {
        fn calculate_rate(&self, id: i64) -> f64 {
            Python::with_gil(|py| {
                let result = self
                    .rate_callback
                    .bind(py)
                    .call1((id,))
                    .and_then(|value| value.extract::<f64>());
                match result {
                    Ok(rate) => rate,
                    Err(err) => {
                        *self.last_error.borrow_mut() = Some(err);
                        f64::NAN
                    }
                }
            })
        }
    }

    /// Re-raise a stashed callback exception in preference to the
    /// library's own diagnostic.
    fn surface_error(
        calculator_error: Option<PyErr>,
        selector_error: SelectorError,
    ) -> PyErr {
        calculator_error.map_or_else(|| selector_error.into(), |err| err)
    }

    /// Event selector using the rejection KMC algorithm.
    ///
    /// Draws uniform candidates and accepts with probability
    /// `rate / rate_upper_bound`. The rate callback is invoked once per
    /// attempt.
    ///
    /// Selection is strictly sequential; instances must stay on the
    /// thread that created them.
    #[pyclass(unsendable)]
    pub struct RejectionSampler {
        selector: RejectionEventSelector<i64, PyRateCalculator>,
    }

    #[pymethods]
    impl RejectionSampler {
        /// Create a sampler over `event_ids` with the given rate upper
        /// bound.
        ///
        /// # Errors
        ///
        /// Returns error if the upper bound is not positive and finite
        /// or `event_ids` is empty.
        #[new]
        #[pyo3(signature = (rate_callback, rate_upper_bound, event_ids, seed=None))]
        pub fn new(
            rate_callback: Py<PyAny>,
            rate_upper_bound: f64,
            event_ids: Vec<i64>,
            seed: Option<u64>,
        ) -> PyResult<Self> {
            let calculator = PyRateCalculator::new(rate_callback);
            let mut selector =
                RejectionEventSelector::new(calculator, rate_upper_bound, event_ids)?;
            if let Some(seed) = seed {
                selector.reseed(seed);
            }
            Ok(Self { selector })
        }

        /// Select one event; returns `(event_id, time_step)`.
        ///
        /// # Errors
        ///
        /// Re-raises exceptions from the rate callback; raises
        /// `ValueError` for invalid rates or rates above the upper
        /// bound.
        pub fn select_event(&mut self) -> PyResult<(i64, f64)> {
            let selected = self.selector.select_event();
            selected.map_err(|err| {
                surface_error(self.selector.rate_calculator().take_error(), err)
            })
        }

        /// Reseed the internal random number generator.
        pub fn reseed(&mut self, seed: u64) {
            self.selector.reseed(seed);
        }

        /// The seed the generator was last initialised with.
        #[must_use]
        pub fn seed(&self) -> u64 {
            self.selector.seed()
        }

        /// Attempts the most recent selection needed.
        #[must_use]
        pub fn attempt_count(&self) -> u64 {
            self.selector.attempt_count()
        }
    }

    /// Event selector using the rejection-free KMC algorithm.
    ///
    /// Holds every rate in a cumulative-rate tree and refreshes, on each
    /// call, exactly the rates invalidated by the previous selection per
    /// the impact table.
    ///
    /// Selection is strictly sequential; instances must stay on the
    /// thread that created them.
    #[pyclass(unsendable)]
    pub struct RejectionFreeSampler {
        selector: RejectionFreeEventSelector<i64, PyRateCalculator>,
    }

    #[pymethods]
    impl RejectionFreeSampler {
        /// Create a sampler over `event_ids` with the given impact
        /// table; ids missing from the table impact nothing.
        ///
        /// # Errors
        ///
        /// Returns error if `event_ids` is empty or contains duplicates,
        /// or the rate callback fails or returns an invalid rate.
        #[new]
        #[pyo3(signature = (rate_callback, event_ids, impact_table, seed=None))]
        pub fn new(
            rate_callback: Py<PyAny>,
            event_ids: Vec<i64>,
            impact_table: HashMap<i64, Vec<i64>>,
            seed: Option<u64>,
        ) -> PyResult<Self> {
            let calculator = PyRateCalculator::new(rate_callback);
            let mut selector =
                RejectionFreeEventSelector::new(calculator, event_ids, impact_table)?;
            if let Some(seed) = seed {
                selector.reseed(seed);
            }
            Ok(Self { selector })
        }

        /// Select one event; returns `(event_id, time_step)`.
        ///
        /// # Errors
        ///
        /// Re-raises exceptions from the rate callback; raises
        /// `ValueError` if the total rate is zero.
        pub fn select_event(&mut self) -> PyResult<(i64, f64)> {
            let selected = self.selector.select_event();
            selected.map_err(|err| {
                surface_error(self.selector.rate_calculator().take_error(), err)
            })
        }

        /// Reseed the internal random number generator.
        pub fn reseed(&mut self, seed: u64) {
            self.selector.reseed(seed);
        }

        /// The seed the generator was last initialised with.
        #[must_use]
        pub fn seed(&self) -> u64 {
            self.selector.seed()
        }

        /// Sum of all event rates currently stored in the tree.
        #[must_use]
        pub fn total_rate(&self) -> f64 {
            self.selector.total_rate()
        }
    }

    /// Python module definition.
    #[pymodule]
    pub fn kmc_select(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> PyResult<()> {
        m.add_class::<RejectionSampler>()?;
        m.add_class::<RejectionFreeSampler>()?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python_bindings::*;
