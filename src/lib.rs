pub mod analyzer;
pub mod app;
pub mod core;
pub mod detector;
pub mod executor;
pub mod export;
pub mod pipeline;
pub mod scanner;
