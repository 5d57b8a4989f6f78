//! Application module

pub mod cli;
pub mod error;
pub mod startup;

pub use error::{AppError, AppResult};
