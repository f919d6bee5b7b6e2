//! AMM State Types
//!
//! Pair state, quote results, liquidity parameters, and AMM errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use router_core::{Address, Amount, FeeConfig, LedgerError};

/// A constant-product pair. The pair address doubles as its LP token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub address: Address,
    /// Lower-sorted token
    pub token0: Address,
    pub token1: Address,
    pub reserve0: Amount,
    pub reserve1: Amount,
    pub fee: FeeConfig,
}

impl Pair {
    pub fn new(address: Address, token_a: Address, token_b: Address, fee: FeeConfig) -> Self {
        let (token0, token1) = sort_tokens(token_a, token_b);
        Self {
            address,
            token0,
            token1,
            reserve0: 0,
            reserve1: 0,
            fee,
        }
    }

    pub fn contains(&self, token: &Address) -> bool {
        &self.token0 == token || &self.token1 == token
    }

    /// Reserves ordered as (reserve of `token`, reserve of the other side)
    pub fn reserves_for(&self, token: &Address) -> Option<(Amount, Amount)> {
        if token == &self.token0 {
            Some((self.reserve0, self.reserve1))
        } else if token == &self.token1 {
            Some((self.reserve1, self.reserve0))
        } else {
            None
        }
    }

    pub fn other(&self, token: &Address) -> Option<Address> {
        if token == &self.token0 {
            Some(self.token1)
        } else if token == &self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reserve0 == 0 && self.reserve1 == 0
    }
}

/// Order two tokens the way pairs key them
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// One hop of a quoted path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopQuote {
    pub pair: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub reserve_in: Amount,
    pub reserve_out: Amount,
    /// Percent difference between spot and execution price
    pub price_impact: f64,
}

/// Quote for a full path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathQuote {
    pub hops: Vec<HopQuote>,
    /// `amounts[0]` is the input, `amounts[i + 1]` the output of hop `i`
    pub amounts: Vec<Amount>,
}

impl PathQuote {
    pub fn amount_in(&self) -> Amount {
        self.amounts.first().copied().unwrap_or(0)
    }

    pub fn amount_out(&self) -> Amount {
        self.amounts.last().copied().unwrap_or(0)
    }

    /// Sum of per-hop price impacts
    pub fn total_price_impact(&self) -> f64 {
        self.hops.iter().map(|h| h.price_impact).sum()
    }
}

/// Parameters of an add-liquidity call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: Amount,
    pub amount_b_desired: Amount,
    pub amount_a_min: Amount,
    pub amount_b_min: Amount,
    /// LP recipient
    pub to: Address,
}

/// Parameters of a remove-liquidity call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub liquidity: Amount,
    pub amount_a_min: Amount,
    pub amount_b_min: Amount,
    /// Recipient of both tokens
    pub to: Address,
}

/// Outcome of an add-liquidity call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReceipt {
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub liquidity: Amount,
}

/// AMM errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    #[error("Pair not found: {token_a} / {token_b}")]
    PairNotFound { token_a: Address, token_b: Address },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Insufficient liquidity for swap")]
    InsufficientLiquidity,

    #[error("Insufficient input amount")]
    InsufficientInputAmount,

    #[error("Output below minimum: got {amount}, need {min}")]
    InsufficientOutputAmount { amount: Amount, min: Amount },

    #[error("Token A amount below minimum: got {amount}, need {min}")]
    InsufficientAAmount { amount: Amount, min: Amount },

    #[error("Token B amount below minimum: got {amount}, need {min}")]
    InsufficientBAmount { amount: Amount, min: Amount },

    #[error("Insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    #[error("Insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    #[error("Arithmetic overflow: {0}")]
    Arithmetic(&'static str),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl AmmError {
    /// Get a stable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PairNotFound { .. } => "pair_not_found",
            Self::InvalidPath(_) => "invalid_path",
            Self::InsufficientLiquidity => "insufficient_liquidity",
            Self::InsufficientInputAmount => "insufficient_input_amount",
            Self::InsufficientOutputAmount { .. } => "insufficient_output_amount",
            Self::InsufficientAAmount { .. } => "insufficient_a_amount",
            Self::InsufficientBAmount { .. } => "insufficient_b_amount",
            Self::InsufficientLiquidityMinted => "insufficient_liquidity_minted",
            Self::InsufficientLiquidityBurned => "insufficient_liquidity_burned",
            Self::Arithmetic(_) => "arithmetic",
            Self::Ledger(e) => e.error_code(),
        }
    }
}
