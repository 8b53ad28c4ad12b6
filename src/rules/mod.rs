//! Conventional commit type registry.

pub mod registry;

pub use registry::{CONVENTIONAL_TYPES, CommitRules, CommitTypeRule};
