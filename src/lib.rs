//! Stocky stock mood pipeline
//!
//! Resolves block tags to stock names, fetches headlines for each stock,
//! asks a language model to describe the mood, and scores it from 1 to 5.
//! The reference table itself can be refreshed from a stock ranking page.

pub mod config;
pub mod describer;
pub mod error;
pub mod model;
pub mod news;
pub mod pipeline;
pub mod reference;
pub mod resolver;
pub mod scorer;
pub mod types;

#[cfg(test)]
mod error_tests;
