//! Ames house price prediction service.
//!
//! Validates fifteen raw property attributes, derives the engineered features
//! the model was trained on, and serves log10-inverted price predictions over HTTP.

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod features;
pub mod ml;
pub mod monitoring;
pub mod schema;
