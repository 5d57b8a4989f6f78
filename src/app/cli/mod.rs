//! Command line and configuration file parsing

pub mod args;
pub mod config;

#[cfg(test)]
mod tests;

pub use args::Args;
pub use config::{load_config, ConfigLayer, LoggingLayer};
