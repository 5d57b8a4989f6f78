//! Test modules for the scanner
//!
//! Walker tests need real repositories, built with the `git` executable by
//! the helpers module.

pub mod helpers;
