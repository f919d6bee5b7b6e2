//! Lending Calculator
//!
//! Pure exchange-rate math. No I/O, no ledger access: every function takes
//! the rate it converts through as an argument, with an explicit rounding
//! direction. Intermediates use BigInt so the 1e18 scaling never overflows.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use router_core::{Amount, Rounding};

use crate::constants::{interest, EXP_SCALE};
use crate::state::{ExchangeRate, LendingError};

/// `a * b / denom` rounded in the given direction. `None` on a zero
/// denominator or a result that does not fit in `u128`.
pub fn mul_div(a: u128, b: u128, denom: u128, rounding: Rounding) -> Option<u128> {
    if denom == 0 {
        return None;
    }
    let numerator = BigUint::from(a) * BigUint::from(b);
    let denom = BigUint::from(denom);
    let quotient = &numerator / &denom;
    let result = match rounding {
        Rounding::Down => quotient,
        Rounding::Up => {
            if (&numerator % &denom).is_zero() {
                quotient
            } else {
                quotient + 1u32
            }
        }
    };
    result.to_u128()
}

/// Wrapped shares worth `amount` underlying at `rate`.
///
/// shares = amount * 1e18 / mantissa
pub fn underlying_to_wrapped(
    amount: Amount,
    rate: &ExchangeRate,
    rounding: Rounding,
) -> Result<Amount, LendingError> {
    if rate.is_zero() {
        return Err(LendingError::ZeroRate);
    }
    mul_div(amount, EXP_SCALE, rate.mantissa, rounding)
        .ok_or(LendingError::Arithmetic("underlying to wrapped"))
}

/// Underlying worth `shares` wrapped at `rate`.
///
/// amount = shares * mantissa / 1e18
pub fn wrapped_to_underlying(
    shares: Amount,
    rate: &ExchangeRate,
    rounding: Rounding,
) -> Result<Amount, LendingError> {
    if rate.is_zero() {
        return Err(LendingError::ZeroRate);
    }
    mul_div(shares, rate.mantissa, EXP_SCALE, rounding)
        .ok_or(LendingError::Arithmetic("wrapped to underlying"))
}

/// Exchange rate after `blocks` blocks of simple interest at
/// `supply_rate_per_block` (scaled by 1e18).
///
/// mantissa' = mantissa + mantissa * supply_rate_per_block * blocks / 1e18
pub fn accrue_exchange_rate(
    rate: &ExchangeRate,
    supply_rate_per_block: u128,
    blocks: u64,
) -> Result<ExchangeRate, LendingError> {
    if blocks == 0 || supply_rate_per_block == 0 {
        return Ok(*rate);
    }
    let growth = supply_rate_per_block
        .checked_mul(blocks as u128)
        .ok_or(LendingError::Arithmetic("accrual growth"))?;
    let interest = mul_div(rate.mantissa, growth, EXP_SCALE, Rounding::Down)
        .ok_or(LendingError::Arithmetic("accrual interest"))?;
    let mantissa = rate
        .mantissa
        .checked_add(interest)
        .ok_or(LendingError::Arithmetic("accrued mantissa"))?;
    Ok(ExchangeRate::from_mantissa(mantissa))
}

/// Per-block supply rate (scaled by 1e18) for an annual rate in basis points
pub fn supply_rate_per_block_from_bps(annual_bps: u32) -> u128 {
    EXP_SCALE * annual_bps as u128 / interest::BPS_DENOM / interest::BLOCKS_PER_YEAR as u128
}

/// Annual supply rate as a decimal (0.05 = 5%) for display
pub fn supply_apr(supply_rate_per_block: u128) -> f64 {
    supply_rate_per_block as f64 * interest::BLOCKS_PER_YEAR as f64 / EXP_SCALE as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kusdc_rate() -> ExchangeRate {
        // 10 USDC -> 491.52601725 kUSDC
        ExchangeRate::from_mantissa(203_448_030_196_818)
    }

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div(10, 10, 3, Rounding::Down), Some(33));
        assert_eq!(mul_div(10, 10, 3, Rounding::Up), Some(34));
        assert_eq!(mul_div(9, 10, 3, Rounding::Up), Some(30));
        assert_eq!(mul_div(1, 1, 0, Rounding::Down), None);
    }

    #[test]
    fn test_mul_div_large_intermediate() {
        // u128::MAX * 1e18 overflows u128 but the quotient fits
        assert_eq!(
            mul_div(u128::MAX, EXP_SCALE, EXP_SCALE, Rounding::Down),
            Some(u128::MAX)
        );
        assert_eq!(mul_div(u128::MAX, 2, 1, Rounding::Down), None);
    }

    #[test]
    fn test_underlying_to_wrapped_reference_amount() {
        let shares = underlying_to_wrapped(10_000000, &kusdc_rate(), Rounding::Down).unwrap();
        assert_eq!(shares, 49152601725);
    }

    #[test]
    fn test_rounding_directions() {
        let rate = kusdc_rate();
        let down = underlying_to_wrapped(1_000000, &rate, Rounding::Down).unwrap();
        let up = underlying_to_wrapped(1_000000, &rate, Rounding::Up).unwrap();
        assert_eq!(up, down + 1);

        let out_down = wrapped_to_underlying(4_915_260_173, &rate, Rounding::Down).unwrap();
        let out_up = wrapped_to_underlying(4_915_260_173, &rate, Rounding::Up).unwrap();
        assert!(out_up >= out_down);
        assert!(out_up - out_down <= 1);
    }

    #[test]
    fn test_round_trip_never_creates_value() {
        let rate = kusdc_rate();
        for amount in [1u128, 7, 999, 1_000000, 10_000000, 123_456_789_012] {
            let shares = underlying_to_wrapped(amount, &rate, Rounding::Down).unwrap();
            let back = wrapped_to_underlying(shares, &rate, Rounding::Down).unwrap();
            assert!(back <= amount, "round trip created value for {}", amount);
            assert!(amount - back <= 1, "round trip lost more than 1 unit for {}", amount);
        }
    }

    #[test]
    fn test_conversion_monotonic_in_rate() {
        let low = ExchangeRate::from_mantissa(200_000_000_000_000);
        let high = ExchangeRate::from_mantissa(210_000_000_000_000);
        let shares_low = underlying_to_wrapped(1_000000, &low, Rounding::Down).unwrap();
        let shares_high = underlying_to_wrapped(1_000000, &high, Rounding::Down).unwrap();
        assert!(shares_high < shares_low);

        let out_low = wrapped_to_underlying(100_000_000, &low, Rounding::Down).unwrap();
        let out_high = wrapped_to_underlying(100_000_000, &high, Rounding::Down).unwrap();
        assert!(out_high > out_low);
    }

    #[test]
    fn test_zero_rate_rejected() {
        let zero = ExchangeRate::from_mantissa(0);
        assert_eq!(
            underlying_to_wrapped(1, &zero, Rounding::Down),
            Err(LendingError::ZeroRate)
        );
        assert_eq!(
            wrapped_to_underlying(1, &zero, Rounding::Down),
            Err(LendingError::ZeroRate)
        );
    }

    #[test]
    fn test_accrue_exchange_rate() {
        let rate = ExchangeRate::from_mantissa(EXP_SCALE);
        // 1e-6 per block for 100 blocks = 1e-4 growth
        let accrued = accrue_exchange_rate(&rate, 1_000_000_000_000, 100).unwrap();
        assert_eq!(accrued.mantissa, EXP_SCALE + 100_000_000_000_000);
        assert_eq!(accrue_exchange_rate(&rate, 0, 100).unwrap(), rate);
        assert_eq!(accrue_exchange_rate(&rate, 5, 0).unwrap(), rate);
    }

    #[test]
    fn test_supply_rate_from_bps() {
        let per_block = supply_rate_per_block_from_bps(500);
        let apr = supply_apr(per_block);
        assert!((apr - 0.05).abs() < 1e-6);
    }
}
