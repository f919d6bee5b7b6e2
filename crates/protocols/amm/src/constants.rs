//! AMM Constants
//!
//! Fee and LP parameters for Uniswap-V2-style constant-product pairs.

/// Fee constants
pub mod fees {
    /// Default fee numerator (0.3% fee = 997/1000)
    pub const DEFAULT_FEE_NUM: u32 = 997;

    /// Default fee denominator
    pub const DEFAULT_FEE_DENOM: u32 = 1000;
}

/// LP token constants
pub mod lp {
    /// LP shares locked at the zero address when a pair is first funded
    pub const MINIMUM_LIQUIDITY: u128 = 1_000;

    /// LP token decimal places
    pub const DECIMALS: u8 = 18;
}
