//! Core types for the bike-sharing dashboard.
//!
//! Holds the observation model, the categorical code mappings, the error
//! taxonomy, scalar metric summaries, number formatting and CLI settings
//! shared by the data, UI and binary crates.

pub mod categories;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod summary;

pub use error::{Result, RidesError};
