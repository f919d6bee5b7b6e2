//! Router errors
//!
//! Every variant is terminal for the call that raised it; the call is rolled
//! back before the error reaches the caller.

use thiserror::Error;

use amm::AmmError;
use lending::LendingError;
use router_core::{Address, Amount, LedgerError, PathError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Insufficient allowance of {token} from {owner}: need {required}, have {available}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient balance of {token} for {holder}: need {required}, have {available}")]
    InsufficientBalance {
        token: Address,
        holder: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Slippage exceeded: got {realized}, minimum {minimum}")]
    SlippageExceeded { realized: Amount, minimum: Amount },

    #[error("Excessive input amount: need {required}, maximum {maximum}")]
    ExcessiveInputAmount { required: Amount, maximum: Amount },

    #[error("Market call to {market} failed: {reason}")]
    MarketCallFailed { market: Address, reason: String },

    #[error("AMM call failed: {0}")]
    AmmCallFailed(String),

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),

    #[error("Router left holding {amount} of {token}")]
    ResidualBalance { token: Address, amount: Amount },
}

impl RouterError {
    /// Get a stable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "invalid_path",
            Self::InsufficientAllowance { .. } => "insufficient_allowance",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::SlippageExceeded { .. } => "slippage_exceeded",
            Self::ExcessiveInputAmount { .. } => "excessive_input_amount",
            Self::MarketCallFailed { .. } => "market_call_failed",
            Self::AmmCallFailed(_) => "amm_call_failed",
            Self::ArithmeticOverflow(_) => "arithmetic_overflow",
            Self::ResidualBalance { .. } => "residual_balance",
        }
    }

    /// Wrap a lending market failure
    pub fn market(market: &Address, err: LendingError) -> Self {
        match err {
            LendingError::Arithmetic(what) => Self::ArithmeticOverflow(what),
            other => Self::MarketCallFailed {
                market: *market,
                reason: other.to_string(),
            },
        }
    }
}

impl From<LedgerError> for RouterError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                token,
                holder,
                required,
                available,
            } => Self::InsufficientBalance {
                token,
                holder,
                required,
                available,
            },
            LedgerError::InsufficientAllowance {
                token,
                owner,
                required,
                available,
                ..
            } => Self::InsufficientAllowance {
                token,
                owner,
                required,
                available,
            },
            LedgerError::Overflow { .. } => Self::ArithmeticOverflow("token balance"),
        }
    }
}

impl From<AmmError> for RouterError {
    fn from(err: AmmError) -> Self {
        match err {
            AmmError::PairNotFound { token_a, token_b } => {
                Self::InvalidPath(format!("no pool for {} / {}", token_a, token_b))
            }
            AmmError::InvalidPath(reason) => Self::InvalidPath(reason),
            AmmError::InsufficientAAmount { amount, min }
            | AmmError::InsufficientBAmount { amount, min }
            | AmmError::InsufficientOutputAmount { amount, min } => Self::SlippageExceeded {
                realized: amount,
                minimum: min,
            },
            AmmError::Arithmetic(what) => Self::ArithmeticOverflow(what),
            other => Self::AmmCallFailed(other.to_string()),
        }
    }
}

impl From<PathError> for RouterError {
    fn from(err: PathError) -> Self {
        Self::InvalidPath(err.to_string())
    }
}
