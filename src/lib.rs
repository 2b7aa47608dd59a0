pub mod analysis;
pub mod bot;
pub mod cli;
pub mod config;
pub mod data_loader;
pub mod decision;
pub mod error;
pub mod logging;
pub mod models;
pub mod positions;
pub mod strategies;

pub use error::{Error, Result};

// Declare tests module only when testing
#[cfg(test)]
pub mod tests;
