//! Error types for event selection.
//!
//! A single enum covers every failure the library recognises. Messages
//! always carry the offending value(s) so a failed simulation run can be
//! diagnosed from the error alone. There are no retries and no partial
//! recovery: statistical correctness depends on every draw being valid,
//! so any invalid input is surfaced immediately.

use thiserror::Error;

/// Policy classification for [`SelectorError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected at construction: the selector was never built.
    InvalidConfiguration,
    /// A runtime precondition was violated; the selection is unusable.
    PreconditionViolated,
    /// An event id outside the constructed event set was used.
    OutOfDomain,
}

/// Errors produced by selectors and the event-rate tree.
///
/// Event ids are pre-formatted into strings so the error type stays
/// independent of the caller's id type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectorError {
    /// The event id list was empty at construction.
    #[error("event id list must not be empty")]
    EmptyEventIdList,

    /// The rejection selector's rate upper bound was not a positive,
    /// finite value.
    #[error("rate upper bound must be positive and finite, got {bound}")]
    NonPositiveUpperBound { bound: f64 },

    /// The same event id appeared more than once in the id list.
    #[error("duplicate event id {id} in event id list")]
    DuplicateEventId { id: String },

    /// The id and rate lists passed to the event-rate tree differ in
    /// length.
    #[error("{id_count} event ids provided with {rate_count} rates")]
    LengthMismatch { id_count: usize, rate_count: usize },

    /// A rate calculator produced a negative or non-finite rate.
    #[error("rate calculator returned invalid rate {rate} for event id {id}")]
    InvalidRate { id: String, rate: f64 },

    /// A calculated rate exceeded the rejection selector's upper bound.
    #[error("rate {rate} for event id {id} exceeds upper bound {bound}")]
    RateAboveUpperBound { id: String, rate: f64, bound: f64 },

    /// The total rate was zero (or negative) when a selection was
    /// requested; no event can fire.
    #[error("total event rate is not positive, no event can be selected")]
    ZeroTotalRate,

    /// A tree query value fell outside `(0, total_rate]`.
    #[error("query value {query_value} outside (0, {total_rate}]")]
    QueryOutOfRange { query_value: f64, total_rate: f64 },

    /// An event id with no leaf in the tree was used.
    #[error("unknown event id {id}")]
    UnknownEventId { id: String },
}

impl SelectorError {
    /// The policy group this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyEventIdList
            | Self::NonPositiveUpperBound { .. }
            | Self::DuplicateEventId { .. }
            | Self::LengthMismatch { .. } => ErrorKind::InvalidConfiguration,
            Self::InvalidRate { .. }
            | Self::RateAboveUpperBound { .. }
            | Self::ZeroTotalRate
            | Self::QueryOutOfRange { .. } => ErrorKind::PreconditionViolated,
            Self::UnknownEventId { .. } => ErrorKind::OutOfDomain,
        }
    }
}
