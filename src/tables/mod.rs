//! Reference tables backing the exact tests.
//!
//! Three shapes of lookup structure, all allocated once with fixed
//! dimensions and filled from literature reference data:
//!
//! - [`Approximate1KeyTable`]: an exact integer key plus a row of
//!   `(real key, value)` pairs matched within [`EPSILON`].
//! - [`Critical1KeyTable`] / [`Critical2KeyTable`]: critical values of a
//!   statistic per significance level, with [`Critical1KeyTable::estimate`]
//!   returning the smallest tabulated p-value the statistic reaches.
//! - [`Incomplete2KeyTable`] / [`Incomplete3KeyTable`]: dense grids whose
//!   out-of-range reads return `None` and out-of-range writes are ignored.
//!
//! Absent cells are `None`; no sentinel value is stored in a cell.

mod approximate;
mod critical;
mod incomplete;

pub use approximate::Approximate1KeyTable;
pub use critical::{Critical1KeyTable, Critical2KeyTable};
pub use incomplete::{Incomplete2KeyTable, Incomplete3KeyTable};

use thiserror::Error;

/// Tolerance used by [`Approximate1KeyTable`] key matching.
pub const EPSILON: f64 = 0.002;

/// Probability reported when a statistic reaches no tabulated level, or a
/// tail is undefined: "certain", i.e. not significant.
pub const ALL: f64 = 1.0;

/// Errors raised while shaping or filling a table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("row {row} outside table with {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("slot {slot} outside row of width {width}")]
    SlotOutOfRange { slot: usize, width: usize },

    #[error("expected {expected} cells, got {got}")]
    WidthMismatch { expected: usize, got: usize },

    #[error("significance levels must be strictly monotone and inside (0, 1]")]
    HeadersNotMonotonic,

    #[error("row {row}: critical value at level {level} breaks the ordering of its neighbours")]
    NonMonotonicRow { row: usize, level: f64 },
}
