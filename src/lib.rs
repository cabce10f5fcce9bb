//! # u-nonparametric
//!
//! Probability distributions and reference tables behind exact and
//! asymptotic nonparametric hypothesis tests.
//!
//! This crate computes p-values; it knows nothing about data containers,
//! report formatting or the validation rules of individual tests.
//!
//! ## Modules
//!
//! - [`special`]: Special functions: ln Γ, incomplete gamma, erf, normal quantile
//! - [`distributions`]: Discrete and continuous distributions behind one trait
//! - [`tables`]: Critical-value, tolerance-keyed and sparse lookup tables
//! - [`nonparametric`]: Lilliefors, Page, runs, runs up and down, Chakraborti–Desu
//! - [`context`]: Lazily built, shareable owner of the test distributions
//! - [`config`]: TOML-backed context settings
//! - [`error`]: Crate error type
//!
//! ## Design Philosophy
//!
//! - **Valid by construction**: distributions validate their parameters
//!   once; queries never fail
//! - **Absence is explicit**: table misses are `None`, never a sentinel
//! - **Exact where possible**: tabulated or combinatorial values first, a
//!   flagged normal approximation beyond them

pub mod config;
pub mod context;
pub mod distributions;
pub mod error;
pub mod nonparametric;
pub mod special;
pub mod tables;

pub use error::{Result, StatsError};
