//! Liquidity Orchestrator
//!
//! Wrap-then-add and remove-then-unwrap. Caller bounds are expressed in
//! underlying units; they are converted to wrapped units with the same rate
//! snapshot used for wrapping, rounded down.

use amm::{AddLiquidityParams, Amm, RemoveLiquidityParams};
use lending::{underlying_to_wrapped, LendingMarket};
use router_core::{Address, Amount, Rounding};

use crate::adapter::{rate_of, redeem_or_forward, underlying_of, wrap, Redeemed};
use crate::chain::Chain;
use crate::errors::RouterError;
use crate::state::{AddLiquidityRequest, LiquidityAdded, LiquidityRemoved, RemoveLiquidityRequest};

/// Pair for two distinct markets, or `InvalidPath`
fn pair_of<M, A: Amm>(
    chain: &Chain<M, A>,
    market_a: &Address,
    market_b: &Address,
) -> Result<Address, RouterError> {
    if market_a == market_b {
        return Err(RouterError::InvalidPath(format!(
            "market {} paired with itself",
            market_a
        )));
    }
    Ok(chain.amm.pair_for(market_a, market_b)?)
}

/// Convert an underlying minimum to wrapped units, rounded down
fn wrapped_min<M: LendingMarket, A>(
    chain: &Chain<M, A>,
    market: &Address,
    min: Amount,
) -> Result<Amount, RouterError> {
    let rate = rate_of(chain, market)?;
    underlying_to_wrapped(min, &rate, Rounding::Down).map_err(|e| RouterError::market(market, e))
}

/// Hand a redeemed balance to `recipient`
fn pay_out<M, A>(
    chain: &mut Chain<M, A>,
    router: &Address,
    recipient: &Address,
    underlying: &Address,
    redeemed: &Redeemed,
) -> Result<(), RouterError> {
    if redeemed.underlying > 0 {
        chain
            .ledger
            .transfer(underlying, router, recipient, redeemed.underlying)?;
    }
    Ok(())
}

pub fn mint_wrapped_and_add_liquidity<M: LendingMarket, A: Amm>(
    chain: &mut Chain<M, A>,
    router: &Address,
    caller: &Address,
    request: &AddLiquidityRequest,
) -> Result<LiquidityAdded, RouterError> {
    let (market_a, market_b) = (request.market_a, request.market_b);
    let pair = pair_of(chain, &market_a, &market_b)?;
    let underlying_a = underlying_of(chain, &market_a)?;
    let underlying_b = underlying_of(chain, &market_b)?;

    let desired_a = request.amount_a.desired;
    let desired_b = request.amount_b.desired;
    let min_a = wrapped_min(chain, &market_a, request.amount_a.min)?;
    let min_b = wrapped_min(chain, &market_b, request.amount_b.min)?;

    chain
        .ledger
        .transfer_from(&underlying_a, router, caller, router, desired_a)?;
    let wrapped_a = wrap(chain, router, &market_a, desired_a)?;
    chain
        .ledger
        .transfer_from(&underlying_b, router, caller, router, desired_b)?;
    let wrapped_b = wrap(chain, router, &market_b, desired_b)?;
    tracing::debug!(wrapped_a, wrapped_b, min_a, min_b, "Wrapped liquidity inputs");

    let amm_address = chain.amm.address();
    chain.ledger.approve(&market_a, router, &amm_address, wrapped_a);
    chain.ledger.approve(&market_b, router, &amm_address, wrapped_b);
    let receipt = chain.amm.add_liquidity(
        &mut chain.ledger,
        router,
        &AddLiquidityParams {
            token_a: market_a,
            token_b: market_b,
            amount_a_desired: wrapped_a,
            amount_b_desired: wrapped_b,
            amount_a_min: min_a,
            amount_b_min: min_b,
            to: *caller,
        },
    )?;
    chain.ledger.approve(&market_a, router, &amm_address, 0);
    chain.ledger.approve(&market_b, router, &amm_address, 0);

    let remainder_a = wrapped_a
        .checked_sub(receipt.amount_a)
        .ok_or(RouterError::ArithmeticOverflow("wrapped A remainder"))?;
    let remainder_b = wrapped_b
        .checked_sub(receipt.amount_b)
        .ok_or(RouterError::ArithmeticOverflow("wrapped B remainder"))?;

    let refund_a = redeem_or_forward(chain, router, caller, &market_a, remainder_a)?;
    let refund_b = redeem_or_forward(chain, router, caller, &market_b, remainder_b)?;
    pay_out(chain, router, caller, &underlying_a, &refund_a)?;
    pay_out(chain, router, caller, &underlying_b, &refund_b)?;
    if refund_a.underlying > 0 || refund_b.underlying > 0 {
        tracing::debug!(
            refunded_a = refund_a.underlying,
            refunded_b = refund_b.underlying,
            "Refunded unused principal"
        );
    }

    Ok(LiquidityAdded {
        pair,
        liquidity: receipt.liquidity,
        amount_a_used: desired_a
            .checked_sub(refund_a.underlying)
            .ok_or(RouterError::ArithmeticOverflow("amount A used"))?,
        amount_b_used: desired_b
            .checked_sub(refund_b.underlying)
            .ok_or(RouterError::ArithmeticOverflow("amount B used"))?,
        wrapped_a_deposited: receipt.amount_a,
        wrapped_b_deposited: receipt.amount_b,
        refunded_a: refund_a.underlying,
        refunded_b: refund_b.underlying,
        dust_a: refund_a.dust,
        dust_b: refund_b.dust,
    })
}

pub fn remove_liquidity_and_redeem<M: LendingMarket, A: Amm>(
    chain: &mut Chain<M, A>,
    router: &Address,
    caller: &Address,
    request: &RemoveLiquidityRequest,
) -> Result<LiquidityRemoved, RouterError> {
    let (market_a, market_b) = (request.market_a, request.market_b);
    let pair = pair_of(chain, &market_a, &market_b)?;
    if pair != request.pool {
        return Err(RouterError::InvalidPath(format!(
            "pool {} is not the pair for {} / {} ({})",
            request.pool, market_a, market_b, pair
        )));
    }
    let underlying_a = underlying_of(chain, &market_a)?;
    let underlying_b = underlying_of(chain, &market_b)?;

    chain
        .ledger
        .transfer_from(&pair, router, caller, router, request.liquidity)?;

    let min_a = wrapped_min(chain, &market_a, request.amount_a_min)?;
    let min_b = wrapped_min(chain, &market_b, request.amount_b_min)?;
    let amm_address = chain.amm.address();
    chain
        .ledger
        .approve(&pair, router, &amm_address, request.liquidity);
    let (wrapped_a, wrapped_b) = chain.amm.remove_liquidity(
        &mut chain.ledger,
        router,
        &RemoveLiquidityParams {
            token_a: market_a,
            token_b: market_b,
            liquidity: request.liquidity,
            amount_a_min: min_a,
            amount_b_min: min_b,
            to: *router,
        },
    )?;
    chain.ledger.approve(&pair, router, &amm_address, 0);

    let out_a = redeem_or_forward(chain, router, caller, &market_a, wrapped_a)?;
    let out_b = redeem_or_forward(chain, router, caller, &market_b, wrapped_b)?;
    for (out, min) in [
        (out_a.underlying, request.amount_a_min),
        (out_b.underlying, request.amount_b_min),
    ] {
        if out < min {
            return Err(RouterError::SlippageExceeded {
                realized: out,
                minimum: min,
            });
        }
    }
    pay_out(chain, router, caller, &underlying_a, &out_a)?;
    pay_out(chain, router, caller, &underlying_b, &out_b)?;

    Ok(LiquidityRemoved {
        amount_a: out_a.underlying,
        amount_b: out_b.underlying,
        wrapped_a,
        wrapped_b,
        dust_a: out_a.dust,
        dust_b: out_b.dust,
    })
}
