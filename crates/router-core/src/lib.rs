//! Router-core: Shared types, token ledger, errors, and configuration
//!
//! This crate provides the foundational types used across the router workspace.

pub mod config;
pub mod errors;
pub mod ledger;
pub mod types;

pub use config::*;
pub use errors::*;
pub use ledger::*;
pub use types::*;
