//! Error types shared across the router workspace

use thiserror::Error;

use crate::types::{Address, Amount};

/// Token ledger errors (ERC20 transfer/transferFrom semantics)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient balance of {token} for {holder}: need {required}, have {available}")]
    InsufficientBalance {
        token: Address,
        holder: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient allowance of {token} from {owner} to {spender}: need {required}, have {available}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Balance or supply overflow for {token}")]
    Overflow { token: Address },
}

impl LedgerError {
    /// Get a stable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InsufficientAllowance { .. } => "insufficient_allowance",
            Self::Overflow { .. } => "overflow",
        }
    }
}

/// Swap path construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path needs at least 2 markets, got {len}")]
    TooShort { len: usize },

    #[error("Path repeats market {market} in consecutive hops")]
    RepeatedHop { market: Address },
}

/// Address parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("Invalid address length for {address}: expected 40 hex digits, found {length}")]
    InvalidLength { address: String, length: usize },

    #[error("Invalid hex in address {address}: {message}")]
    InvalidHex { address: String, message: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown market: {0}")]
    UnknownMarket(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
