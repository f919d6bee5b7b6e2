//! AMM Calculator
//!
//! Swap and liquidity math using the constant product formula (x * y = k).
//! Products go through BigUint since reserve * amount * fee can exceed u128.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use router_core::{Amount, FeeConfig};

use crate::constants::lp::MINIMUM_LIQUIDITY;
use crate::state::AmmError;

fn big(value: Amount) -> BigUint {
    BigUint::from(value)
}

fn to_amount(value: BigUint, what: &'static str) -> Result<Amount, AmmError> {
    value.to_u128().ok_or(AmmError::Arithmetic(what))
}

/// Output for an exact input
///
/// Formula: output = (reserve_out * input * fee_num) / (reserve_in * fee_denom + input * fee_num)
pub fn get_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: &FeeConfig,
) -> Result<Amount, AmmError> {
    if amount_in == 0 {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }

    let amount_in_with_fee = big(amount_in) * fee.fee_num;
    let numerator = &amount_in_with_fee * big(reserve_out);
    let denominator = big(reserve_in) * fee.fee_denom + amount_in_with_fee;

    to_amount(numerator / denominator, "amount out")
}

/// Input required for an exact output, rounded up
///
/// Formula: input = (reserve_in * output * fee_denom) / ((reserve_out - output) * fee_num) + 1
pub fn get_amount_in(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: &FeeConfig,
) -> Result<Amount, AmmError> {
    if amount_out == 0 {
        return Err(AmmError::InsufficientOutputAmount { amount: 0, min: 1 });
    }
    if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
        // Can't take more than reserves
        return Err(AmmError::InsufficientLiquidity);
    }

    let numerator = big(reserve_in) * big(amount_out) * fee.fee_denom;
    let denominator = big(reserve_out - amount_out) * fee.fee_num;

    to_amount(numerator / denominator + 1u32, "amount in")
}

/// Amount of B worth `amount_a` at the current reserve ratio
///
/// Formula: amount_b = amount_a * reserve_b / reserve_a
pub fn quote(amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount, AmmError> {
    if amount_a == 0 {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_a == 0 || reserve_b == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    to_amount(big(amount_a) * big(reserve_b) / big(reserve_a), "quote")
}

/// Price impact as a percentage of the spot price
pub fn calculate_price_impact(
    reserve_in: Amount,
    reserve_out: Amount,
    amount_in: Amount,
    amount_out: Amount,
) -> f64 {
    if reserve_in == 0 || amount_in == 0 || amount_out == 0 {
        return 0.0;
    }

    let spot_price = reserve_out as f64 / reserve_in as f64;
    let execution_price = amount_out as f64 / amount_in as f64;

    if spot_price == 0.0 {
        return 0.0;
    }

    ((spot_price - execution_price) / spot_price).abs() * 100.0
}

/// Amounts actually deposited for the desired amounts, keeping the pair's ratio.
///
/// An empty pair takes both desired amounts as-is. Otherwise one side is
/// used in full and the other scaled down to match.
pub fn optimal_deposit(
    amount_a_desired: Amount,
    amount_b_desired: Amount,
    amount_a_min: Amount,
    amount_b_min: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
) -> Result<(Amount, Amount), AmmError> {
    if reserve_a == 0 && reserve_b == 0 {
        return Ok((amount_a_desired, amount_b_desired));
    }

    let amount_b_optimal = quote(amount_a_desired, reserve_a, reserve_b)?;
    if amount_b_optimal <= amount_b_desired {
        if amount_b_optimal < amount_b_min {
            return Err(AmmError::InsufficientBAmount {
                amount: amount_b_optimal,
                min: amount_b_min,
            });
        }
        return Ok((amount_a_desired, amount_b_optimal));
    }

    let amount_a_optimal = quote(amount_b_desired, reserve_b, reserve_a)?;
    if amount_a_optimal > amount_a_desired {
        return Err(AmmError::Arithmetic("optimal deposit"));
    }
    if amount_a_optimal < amount_a_min {
        return Err(AmmError::InsufficientAAmount {
            amount: amount_a_optimal,
            min: amount_a_min,
        });
    }
    Ok((amount_a_optimal, amount_b_desired))
}

/// Initial LP share for a fresh pair using the geometric mean,
/// before `MINIMUM_LIQUIDITY` is locked.
///
/// Formula: sqrt(amount0 * amount1)
pub fn calculate_initial_lp_share(amount0: Amount, amount1: Amount) -> Amount {
    if amount0 == 0 || amount1 == 0 {
        return 0;
    }
    let root = (big(amount0) * big(amount1)).sqrt();
    root.to_u128().unwrap_or(Amount::MAX)
}

/// LP tokens minted for a deposit.
///
/// First deposit: sqrt(amount0 * amount1) - MINIMUM_LIQUIDITY.
/// Later deposits: min(amount0 * supply / reserve0, amount1 * supply / reserve1)
pub fn calculate_lp_reward(
    amount0: Amount,
    amount1: Amount,
    reserve0: Amount,
    reserve1: Amount,
    total_supply: Amount,
) -> Result<Amount, AmmError> {
    let liquidity = if total_supply == 0 {
        calculate_initial_lp_share(amount0, amount1).saturating_sub(MINIMUM_LIQUIDITY)
    } else {
        if reserve0 == 0 || reserve1 == 0 {
            return Err(AmmError::InsufficientLiquidity);
        }
        let reward0 = big(amount0) * big(total_supply) / big(reserve0);
        let reward1 = big(amount1) * big(total_supply) / big(reserve1);
        to_amount(reward0.min(reward1), "lp reward")?
    };

    if liquidity == 0 {
        return Err(AmmError::InsufficientLiquidityMinted);
    }
    Ok(liquidity)
}

/// Share of each reserve paid out for burning `liquidity` LP tokens.
///
/// amount0 = liquidity * balance0 / supply
/// amount1 = liquidity * balance1 / supply
pub fn calculate_redeem_shares(
    liquidity: Amount,
    balance0: Amount,
    balance1: Amount,
    total_supply: Amount,
) -> Result<(Amount, Amount), AmmError> {
    if total_supply == 0 {
        return Err(AmmError::InsufficientLiquidityBurned);
    }
    let supply = big(total_supply);
    let amount0 = big(liquidity) * big(balance0) / &supply;
    let amount1 = big(liquidity) * big(balance1) / &supply;
    if amount0.is_zero() || amount1.is_zero() {
        return Err(AmmError::InsufficientLiquidityBurned);
    }
    Ok((
        to_amount(amount0, "redeem share")?,
        to_amount(amount1, "redeem share")?,
    ))
}
