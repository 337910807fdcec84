//! Statistical helpers for validating sampling behaviour.
//!
//! Selection output is stochastic, so correctness checks compare sample
//! means against their analytic values within a tolerance measured in
//! standard errors. The helpers here are small enough to be useful to
//! library users validating their own simulation output as well.

/// Arithmetic mean of `values`.
///
/// # Panics
///
/// Panics if `values` is empty.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    assert!(!values.is_empty(), "mean of an empty sample");
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard error of the mean of `n_samples` draws from a distribution
/// with the given standard deviation.
#[must_use]
pub fn standard_error_of_mean(standard_deviation: f64, n_samples: usize) -> f64 {
    standard_deviation / (n_samples as f64).sqrt()
}

/// Whether `sample_mean` lies within `sigma_tolerance` standard errors
/// of `true_mean`.
#[must_use]
pub fn deviation_within(
    sample_mean: f64,
    true_mean: f64,
    standard_error: f64,
    sigma_tolerance: f64,
) -> bool {
    (sample_mean - true_mean).abs() <= sigma_tolerance * standard_error
}
