//! Lending State Types
//!
//! Exchange rates, per-market state, and lending errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use router_core::{Address, Amount, BlockNumber, LedgerError};

use crate::constants::EXP_SCALE;

/// Underlying-per-wrapped exchange rate, mantissa scaled by 1e18
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRate {
    pub mantissa: u128,
}

impl ExchangeRate {
    pub fn from_mantissa(mantissa: u128) -> Self {
        Self { mantissa }
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Approximate rate for display only
    pub fn as_f64(&self) -> f64 {
        self.mantissa as f64 / EXP_SCALE as f64
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.12}", self.as_f64())
    }
}

/// State of one cToken market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    /// Wrapped token (market) address
    pub wrapped: Address,
    /// Underlying token address
    pub underlying: Address,
    pub symbol: String,
    /// Exchange rate as of `accrual_block`
    pub exchange_rate: ExchangeRate,
    /// Per-block growth of the exchange rate, scaled by 1e18
    #[serde(default)]
    pub supply_rate_per_block: u128,
    /// Block the exchange rate was last accrued at
    #[serde(default)]
    pub accrual_block: BlockNumber,
    /// Mint guardian switch
    #[serde(default)]
    pub mint_paused: bool,
}

impl MarketState {
    pub fn new(
        symbol: impl Into<String>,
        wrapped: Address,
        underlying: Address,
        exchange_rate: ExchangeRate,
    ) -> Self {
        Self {
            wrapped,
            underlying,
            symbol: symbol.into(),
            exchange_rate,
            supply_rate_per_block: 0,
            accrual_block: 0,
            mint_paused: false,
        }
    }

    pub fn with_supply_rate(mut self, supply_rate_per_block: u128) -> Self {
        self.supply_rate_per_block = supply_rate_per_block;
        self
    }

    pub fn with_accrual_block(mut self, block: BlockNumber) -> Self {
        self.accrual_block = block;
        self
    }
}

/// Market summary for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub wrapped: Address,
    pub underlying: Address,
    pub exchange_rate: ExchangeRate,
    /// Underlying held by the market
    pub cash: Amount,
    /// Wrapped shares outstanding
    pub total_supply: Amount,
    /// Annual supply rate as a decimal (0.05 = 5%)
    pub supply_apr: f64,
}

/// Lending market errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LendingError {
    #[error("Unknown market: {0}")]
    UnknownMarket(Address),

    #[error("Minting is paused on {0}")]
    MintPaused(Address),

    #[error("Insufficient cash in {market}: need {required}, have {available}")]
    InsufficientCash {
        market: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Exchange rate is zero")]
    ZeroRate,

    #[error("Arithmetic overflow: {0}")]
    Arithmetic(&'static str),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl LendingError {
    /// Get a stable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownMarket(_) => "unknown_market",
            Self::MintPaused(_) => "mint_paused",
            Self::InsufficientCash { .. } => "insufficient_cash",
            Self::ZeroRate => "zero_rate",
            Self::Arithmetic(_) => "arithmetic",
            Self::Ledger(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_display() {
        let rate = ExchangeRate::from_mantissa(EXP_SCALE / 2);
        assert_eq!(rate.to_string(), "0.500000000000");
    }

    #[test]
    fn test_market_state_builders() {
        let state = MarketState::new(
            "kUSDC",
            Address::from_low_u64(1),
            Address::from_low_u64(2),
            ExchangeRate::from_mantissa(EXP_SCALE),
        )
        .with_supply_rate(10)
        .with_accrual_block(7);
        assert_eq!(state.supply_rate_per_block, 10);
        assert_eq!(state.accrual_block, 7);
        assert!(!state.mint_paused);
    }

    #[test]
    fn test_market_state_json_defaults() {
        let json = r#"{
            "wrapped": "0x6D11F074131E3FC61C983cCe538F5D0ca3553c0F",
            "underlying": "0xEA32A96608495e54156Ae48931A7c20f0dcc1a21",
            "symbol": "kUSDC",
            "exchange_rate": 203448030196818
        }"#;
        let state: MarketState = serde_json::from_str(json).unwrap();
        assert_eq!(state.exchange_rate, ExchangeRate::from_mantissa(203_448_030_196_818));
        assert_eq!(state.supply_rate_per_block, 0);
        assert!(!state.mint_paused);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LendingError::ZeroRate.error_code(), "zero_rate");
        let err = LendingError::from(LedgerError::Overflow {
            token: Address::from_low_u64(1),
        });
        assert_eq!(err.error_code(), "overflow");
    }
}
