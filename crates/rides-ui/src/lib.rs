//! Terminal UI layer for the bike-sharing dashboard.
//!
//! Provides themes, header and metric components, chart and table views, and
//! the application event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod themes;

pub use rides_core as core;
