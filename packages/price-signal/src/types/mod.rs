//! Data types for the price-signal engine.

pub mod config;
pub mod document;
pub mod observation;
pub mod sentiment;
pub mod trend;
