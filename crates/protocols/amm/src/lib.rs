//! Constant-Product AMM
//!
//! This crate models the AMM side of the router: the `Amm` interface the
//! router adds liquidity and swaps through, the x * y = k calculator, path
//! quoting, and an in-memory Uniswap-V2-style exchange over the shared ledger.

pub mod calculator;
pub mod constants;
pub mod exchange;
pub mod router;
pub mod state;

// Re-exports
pub use calculator::{calculate_price_impact, get_amount_in, get_amount_out, quote};
pub use constants::{fees, lp};
pub use exchange::{Amm, ConstantProductAmm};
pub use router::{amounts_in, amounts_out, quote_route, quote_route_reverse, resolve_path, PoolEdge};
pub use state::{
    AddLiquidityParams, AmmError, HopQuote, LiquidityReceipt, Pair, PathQuote,
    RemoveLiquidityParams,
};
