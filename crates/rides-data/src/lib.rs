//! Data layer for the bike-sharing dashboard.
//!
//! Loads the CSV dataset, derives cluster labels, filters and aggregates
//! observations, exports subsets, and assembles the dashboard panels consumed
//! by the UI and the plain report.

pub mod aggregator;
pub mod analysis;
pub mod clustering;
pub mod export;
pub mod filter;
pub mod reader;

pub use rides_core as core;
