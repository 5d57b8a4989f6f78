//! Tests for command line and configuration file parsing

pub mod args_tests;
