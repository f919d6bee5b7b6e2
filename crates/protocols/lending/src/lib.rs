//! cToken Lending Market Integration
//!
//! This crate models the lending market side of the router: the
//! `LendingMarket` interface the router wraps and unwraps through, the
//! exchange-rate math with explicit rounding, and an in-memory market book.
//!
//! # Exchange Rate
//!
//! Markets quote a Compound-style exchange-rate mantissa scaled by 1e18:
//! `underlying = wrapped * mantissa / 1e18`. The rate only grows as interest
//! accrues, so a wrapped share is worth more underlying over time.

pub mod calculator;
pub mod constants;
pub mod market;
pub mod state;

// Re-exports
pub use calculator::*;
pub use market::{LendingMarket, MarketBook};
pub use state::*;
