//! Lending Market Constants

pub use router_core::constants::EXP_SCALE;

/// Interest accrual constants
pub mod interest {
    /// Blocks per year assumed when converting an annual rate to a per-block rate
    pub const BLOCKS_PER_YEAR: u64 = 2_102_400;
    /// Basis points in 100%
    pub const BPS_DENOM: u128 = 10_000;
}
