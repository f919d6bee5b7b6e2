//! cToken Router
//!
//! Lets a user supply AMM liquidity and swap using plain stablecoins while
//! the pools hold interest-bearing cTokens. Each call pulls underlying from
//! the caller, wraps it through the lending market, acts on the AMM, and
//! unwraps whatever comes back, all within one atomic call that leaves the
//! router holding nothing.
//!
//! # Modules
//!
//! - `adapter`: wrap and unwrap through a lending market
//! - `liquidity`: wrap-then-add and remove-then-unwrap
//! - `swap`: quotes and multi-hop swaps between underlyings
//! - `router`: the atomic entry points

pub mod adapter;
pub mod chain;
pub mod errors;
pub mod liquidity;
pub mod router;
pub mod state;
pub mod swap;

#[cfg(test)]
mod fixtures;

// Re-exports
pub use chain::{Chain, SimulatedChain};
pub use errors::RouterError;
pub use router::Router;
pub use state::{
    AddLiquidityRequest, ExactInSwap, ExactOutSwap, LiquidityAdded, LiquidityRemoved,
    RemoveLiquidityRequest, SwapQuote, SwapSummary,
};
