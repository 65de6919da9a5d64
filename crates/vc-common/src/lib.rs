//! Voter count common types, IDs, and errors.
//!
//! This crate provides foundational types shared across vc-core modules:
//! - The county reference table used to build point-source filters
//! - Run identity types used to scope temporary artifacts
//! - Common error types
//! - Output format for command results

pub mod county;
pub mod error;
pub mod id;
pub mod output;

pub use county::County;
pub use error::{Error, Result};
pub use id::RunId;
pub use output::OutputFormat;
