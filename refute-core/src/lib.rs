//! Core execution engine for Refute property-based testing.
//!
//! This crate provides the lazy evaluation tree, the quantifier
//! combinators, the test-running state machine, and the shrink search
//! that turn generators and predicates into checked properties.

pub mod arbitrary;
pub mod data;
pub mod error;
pub mod gen;
pub mod property;
pub mod report;
pub mod result;
pub mod rose;
pub mod runner;
pub mod shrink;
pub mod state;

// Re-export the main types
pub use arbitrary::*;
pub use data::*;
pub use error::*;
pub use gen::*;
pub use property::*;
pub use report::*;
pub use result::*;
pub use rose::*;
pub use runner::*;
pub use shrink::*;
pub use state::*;
