//! Core type definitions for the router

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AddressParseError, PathError};

/// Token amount in the token's smallest unit
pub type Amount = u128;

/// Block number
pub type BlockNumber = u64;

/// Account or contract address (20 bytes, `0x`-prefixed hex)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address, counterparty of mints and burns
    pub const ZERO: Address = Address([0u8; 20]);

    /// Build an address whose low 8 bytes hold `n`. Handy for fixtures.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// First 4 bytes as hex, for compact log output
    pub fn short(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 40 {
            return Err(AddressParseError::InvalidLength {
                address: s.to_string(),
                length: digits.len(),
            });
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| AddressParseError::InvalidHex {
            address: s.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Block context the lending market reads its exchange rate at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockContext {
    pub number: BlockNumber,
    /// Unix seconds
    pub timestamp: u64,
}

impl BlockContext {
    pub fn new(number: BlockNumber, timestamp: u64) -> Self {
        Self { number, timestamp }
    }

    /// Block `blocks` later, assuming a fixed block time
    pub fn advanced(&self, blocks: u64, block_time_secs: u64) -> Self {
        Self {
            number: self.number.saturating_add(blocks),
            timestamp: self
                .timestamp
                .saturating_add(blocks.saturating_mul(block_time_secs)),
        }
    }
}

/// Rounding direction for fixed-point conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Toward zero. Used for amounts the protocol accepts or pays out.
    Down,
    /// Away from zero. Used for amounts the caller must supply.
    Up,
}

/// Desired amount plus the minimum the caller accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBounds {
    pub desired: Amount,
    #[serde(default)]
    pub min: Amount,
}

impl AmountBounds {
    pub fn new(desired: Amount, min: Amount) -> Self {
        Self { desired, min }
    }
}

/// Ordered, immutable sequence of wrapped-asset markets a swap routes through
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct SwapPath(Vec<Address>);

impl SwapPath {
    /// Validate and build a path. Needs at least two entries and no
    /// entry may repeat its predecessor.
    pub fn new(markets: Vec<Address>) -> Result<Self, PathError> {
        if markets.len() < 2 {
            return Err(PathError::TooShort { len: markets.len() });
        }
        if let Some(pair) = markets.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(PathError::RepeatedHop { market: pair[0] });
        }
        Ok(Self(markets))
    }

    pub fn head(&self) -> &Address {
        &self.0[0]
    }

    pub fn tail(&self) -> &Address {
        &self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a valid path has at least two entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of AMM hops (`len - 1`)
    pub fn hop_count(&self) -> usize {
        self.0.len() - 1
    }

    /// Consecutive (input, output) market pairs
    pub fn hops(&self) -> impl DoubleEndedIterator<Item = (&Address, &Address)> + '_ {
        self.0.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.0
    }
}

impl TryFrom<Vec<Address>> for SwapPath {
    type Error = PathError;

    fn try_from(value: Vec<Address>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SwapPath> for Vec<Address> {
    fn from(path: SwapPath) -> Self {
        path.0
    }
}

impl fmt::Display for SwapPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(Address::short).collect();
        write!(f, "{}", parts.join(" -> "))
    }
}

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    /// Local fork of mainnet state
    Fork,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Fork => "fork",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render a smallest-unit amount with `decimals` fractional digits,
/// trimming trailing zeros (e.g. `10_000000` at 6 decimals is `"10.0"`).
/// Above `MAX_DECIMALS` every amount is a pure fraction.
pub fn format_units(amount: Amount, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let (whole, frac) = match 10u128.checked_pow(decimals as u32) {
        Some(scale) => (amount / scale, amount % scale),
        None => (0, amount),
    };
    let mut frac_str = format!("{:0width$}", frac, width = decimals as usize);
    while frac_str.len() > 1 && frac_str.ends_with('0') {
        frac_str.pop();
    }
    format!("{}.{}", whole, frac_str)
}

/// Constants
pub mod constants {
    use super::Amount;

    /// Fixed-point scale of exchange-rate mantissas (1e18)
    pub const EXP_SCALE: Amount = 1_000_000_000_000_000_000;

    /// Largest decimals whose scale fits an `Amount`
    pub const MAX_DECIMALS: u8 = 38;

    /// Allowance treated as unlimited (never decremented)
    pub const MAX_ALLOWANCE: Amount = Amount::MAX;
}
