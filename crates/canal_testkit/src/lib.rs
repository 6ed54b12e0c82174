//! # Canal Testkit
//!
//! Test utilities for the Canal encoder.
//!
//! This crate provides:
//! - Fixture events for a small `shop` schema
//! - A callback recorder for asserting acknowledgment order
//! - Property-based test generators using proptest

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
