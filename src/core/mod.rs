//! Core event-selection implementation.
//!
//! Kinetic Monte Carlo advances a simulation one event at a time: each
//! step draws one event with probability proportional to its current
//! rate and an exponentially distributed time increment with mean
//! `1 / total_rate`. This module provides two interchangeable selection
//! kernels over a caller-supplied rate calculator:
//!
//! - [`RejectionFreeEventSelector`] keeps every rate in a cumulative-sum
//!   tree ([`EventRateTree`]) and resolves each draw with one `O(log N)`
//!   descent, maintaining the tree lazily through an impact table.
//! - [`RejectionEventSelector`] keeps no per-event state and instead
//!   accepts or rejects uniformly drawn candidates against a rate upper
//!   bound.
//!
//! Both share the seeded [`RandomGenerator`], so any run is exactly
//! reproducible from its seed.

pub mod error;
pub mod event_tree;
pub mod random;
pub mod rejection;
pub mod rejection_free;
pub mod selector;
pub mod stats;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ErrorKind, SelectorError};
pub use event_tree::{EventRateNode, EventRateTree};
pub use random::RandomGenerator;
pub use rejection::RejectionEventSelector;
pub use rejection_free::RejectionFreeEventSelector;
pub use selector::{EventId, RateCalculator};
pub use stats::{deviation_within, mean, standard_error_of_mean};
pub use tree::{InvertedSumTree, NodeIndex, SumPayload};
