//! CLI command implementations.
//!
//! - [`check`] - The single check run: probe, notify, save

pub mod check;

pub use check::{CheckCommand, RunReport};
