//! Configuration types for the router

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::constants::MAX_DECIMALS;
use crate::types::{Address, Network};

/// One lending market: a wrapped cToken and the asset it wraps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Wrapped token symbol (e.g., "kUSDC")
    pub symbol: String,
    /// Wrapped token (market) address
    pub wrapped: Address,
    /// Underlying token address
    pub underlying: Address,
    /// Underlying token symbol (e.g., "USDC")
    pub underlying_symbol: String,
    #[serde(default = "default_underlying_decimals")]
    pub underlying_decimals: u8,
    #[serde(default = "default_wrapped_decimals")]
    pub wrapped_decimals: u8,
}

fn default_underlying_decimals() -> u8 {
    6
}

fn default_wrapped_decimals() -> u8 {
    8
}

/// AMM swap fee as a fraction kept by the trader (997/1000 = 0.3% fee)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub fee_num: u32,
    pub fee_denom: u32,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            fee_num: 997,
            fee_denom: 1000,
        }
    }
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Network (mainnet or a local fork)
    #[serde(default = "default_network")]
    pub network: Network,

    /// Address the router operates from
    pub router_address: Address,

    /// AMM router the liquidity and swap calls go to
    pub amm_address: Address,

    /// Known lending markets
    #[serde(default)]
    pub markets: Vec<MarketConfig>,

    /// AMM fee settings
    #[serde(default)]
    pub fee: FeeConfig,
}

fn default_network() -> Network {
    Network::Fork
}

impl RouterConfig {
    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the router cannot operate with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fee.fee_denom == 0 || self.fee.fee_num == 0 || self.fee.fee_num > self.fee.fee_denom {
            return Err(ConfigError::Invalid(format!(
                "fee {}/{} must be in (0, 1]",
                self.fee.fee_num, self.fee.fee_denom
            )));
        }
        for (i, market) in self.markets.iter().enumerate() {
            if market.wrapped == market.underlying {
                return Err(ConfigError::Invalid(format!(
                    "market {} wraps itself",
                    market.symbol
                )));
            }
            if market.underlying_decimals > MAX_DECIMALS || market.wrapped_decimals > MAX_DECIMALS {
                return Err(ConfigError::Invalid(format!(
                    "market {} decimals exceed {}",
                    market.symbol, MAX_DECIMALS
                )));
            }
            if self.markets[..i].iter().any(|m| m.wrapped == market.wrapped) {
                return Err(ConfigError::Invalid(format!(
                    "market {} listed twice",
                    market.symbol
                )));
            }
        }
        Ok(())
    }

    /// Look up a market by wrapped-token symbol
    pub fn market(&self, symbol: &str) -> Result<&MarketConfig, ConfigError> {
        self.markets
            .iter()
            .find(|m| m.symbol == symbol)
            .ok_or_else(|| ConfigError::UnknownMarket(symbol.to_string()))
    }

    /// Symbol and decimals for any token the config knows (wrapped or underlying)
    pub fn token_metadata(&self, token: &Address) -> Option<(&str, u8)> {
        self.markets.iter().find_map(|m| {
            if &m.wrapped == token {
                Some((m.symbol.as_str(), m.wrapped_decimals))
            } else if &m.underlying == token {
                Some((m.underlying_symbol.as_str(), m.underlying_decimals))
            } else {
                None
            }
        })
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            router_address: Address::from_low_u64(0x1000),
            amm_address: Address::from_low_u64(0x2000),
            markets: Vec::new(),
            fee: FeeConfig::default(),
        }
    }
}
