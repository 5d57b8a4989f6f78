//! Scanner Component
//!
//! Everything that touches the repository under audit:
//!
//! - **VersionWalker**: chronological tag listing and tag checkout
//! - **CheckoutManager**: sequential, forced working tree moves and best-effort restore
//! - **FileCollector**: extension and excluded-directory filtering of the checked-out tree

pub mod checkout;
pub mod collector;
pub mod error;
pub mod types;
pub mod walker;

pub use checkout::{CheckoutManager, OriginalState};
pub use collector::FileCollector;
pub use error::{CheckoutError, CheckoutResult, WalkerError, WalkerResult};
pub use types::{sort_chronologically, CollectedFile, SkippedTag, Tag};
pub use walker::{GitVersionWalker, VersionWalker};

#[cfg(test)]
mod tests;
