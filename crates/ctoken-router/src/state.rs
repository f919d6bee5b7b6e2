//! Router request and result types

use serde::{Deserialize, Serialize};

use lending::ExchangeRate;
use router_core::{Address, Amount, AmountBounds, SwapPath};

/// Supply two underlyings as wrapped liquidity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityRequest {
    pub market_a: Address,
    pub market_b: Address,
    /// Underlying A to pull, and the least of it the pool must take
    pub amount_a: AmountBounds,
    pub amount_b: AmountBounds,
}

impl AddLiquidityRequest {
    pub fn new(
        market_a: Address,
        market_b: Address,
        amount_a_desired: Amount,
        amount_b_desired: Amount,
        amount_a_min: Amount,
        amount_b_min: Amount,
    ) -> Self {
        Self {
            market_a,
            market_b,
            amount_a: AmountBounds::new(amount_a_desired, amount_a_min),
            amount_b: AmountBounds::new(amount_b_desired, amount_b_min),
        }
    }
}

/// Result of `mint_wrapped_and_add_liquidity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityAdded {
    pub pair: Address,
    /// LP minted to the caller
    pub liquidity: Amount,
    /// Underlying A kept by the call (desired minus refund)
    pub amount_a_used: Amount,
    pub amount_b_used: Amount,
    /// Wrapped A deposited into the pool
    pub wrapped_a_deposited: Amount,
    pub wrapped_b_deposited: Amount,
    /// Underlying A returned to the caller
    pub refunded_a: Amount,
    pub refunded_b: Amount,
    /// Wrapped A too small to redeem, forwarded as-is
    pub dust_a: Amount,
    pub dust_b: Amount,
}

/// Remove wrapped liquidity and receive underlyings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidityRequest {
    pub market_a: Address,
    pub market_b: Address,
    /// Pair the LP belongs to
    pub pool: Address,
    pub liquidity: Amount,
    #[serde(default)]
    pub amount_a_min: Amount,
    #[serde(default)]
    pub amount_b_min: Amount,
}

/// Result of `remove_liquidity_and_redeem`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityRemoved {
    /// Underlying A paid to the caller
    pub amount_a: Amount,
    pub amount_b: Amount,
    /// Wrapped A withdrawn from the pool
    pub wrapped_a: Amount,
    pub wrapped_b: Amount,
    pub dust_a: Amount,
    pub dust_b: Amount,
}

/// Swap an exact underlying input along a path of markets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInSwap {
    pub amount_in: Amount,
    #[serde(default)]
    pub amount_out_min: Amount,
    pub path: SwapPath,
}

/// Swap for an exact underlying output along a path of markets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutSwap {
    pub amount_out: Amount,
    pub amount_in_max: Amount,
    pub path: SwapPath,
}

/// Read-only swap preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub path: SwapPath,
    /// Underlying pulled from the caller
    pub amount_in: Amount,
    /// Underlying delivered to the caller
    pub amount_out: Amount,
    /// Wrapped amounts per hop, `[in, out_hop_0, ...]`
    pub wrapped_amounts: Vec<Amount>,
    pub head_rate: ExchangeRate,
    pub tail_rate: ExchangeRate,
}

impl SwapQuote {
    pub fn wrapped_in(&self) -> Amount {
        self.wrapped_amounts.first().copied().unwrap_or(0)
    }

    pub fn wrapped_out(&self) -> Amount {
        self.wrapped_amounts.last().copied().unwrap_or(0)
    }
}

/// Result of either swap entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSummary {
    pub path: SwapPath,
    pub amount_in: Amount,
    pub amount_out: Amount,
    /// Wrapped amounts the AMM moved, `[in, out_hop_0, ...]`
    pub wrapped_amounts: Vec<Amount>,
    /// Wrapped output too small to redeem, forwarded as-is
    pub dust: Amount,
}
