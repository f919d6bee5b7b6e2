//! Path Swap Engine
//!
//! Swaps between underlyings along a path of wrapped markets. The head
//! market is wrapped once and the tail unwrapped once; intermediate hops
//! trade wrapped assets directly. Every swap quotes first, checks the
//! caller's bound against the quote, then executes.

use amm::Amm;
use lending::{underlying_to_wrapped, wrapped_to_underlying, LendingMarket};
use router_core::{Address, Amount, Rounding, SwapPath};

use crate::adapter::{rate_of, redeem_or_forward, underlying_of, wrap};
use crate::chain::Chain;
use crate::errors::RouterError;
use crate::state::{ExactInSwap, ExactOutSwap, SwapQuote, SwapSummary};

/// Fail unless the quoted output meets the caller's minimum
pub fn ensure_min_output(quoted: Amount, minimum: Amount) -> Result<(), RouterError> {
    if quoted < minimum {
        return Err(RouterError::SlippageExceeded {
            realized: quoted,
            minimum,
        });
    }
    Ok(())
}

/// Fail unless the required input fits the caller's maximum
pub fn ensure_max_input(required: Amount, maximum: Amount) -> Result<(), RouterError> {
    if required > maximum {
        return Err(RouterError::ExcessiveInputAmount { required, maximum });
    }
    Ok(())
}

/// Every consecutive pair of `path` must have a pool
pub fn validate_path<M, A: Amm>(chain: &Chain<M, A>, path: &SwapPath) -> Result<(), RouterError> {
    for (market_in, market_out) in path.hops() {
        chain.amm.pair_for(market_in, market_out)?;
    }
    Ok(())
}

/// Quote `wrapped_in` shares of the head market along `path`.
/// `amount_in` is the underlying the shares came from.
fn quote_wrapped_exact_in<M: LendingMarket, A: Amm>(
    chain: &Chain<M, A>,
    path: &SwapPath,
    amount_in: Amount,
    wrapped_in: Amount,
) -> Result<SwapQuote, RouterError> {
    let head_rate = rate_of(chain, path.head())?;
    let tail_rate = rate_of(chain, path.tail())?;
    let wrapped_amounts = chain.amm.get_amounts_out(wrapped_in, path.as_slice())?;
    let wrapped_out = wrapped_amounts.last().copied().unwrap_or(0);
    let amount_out = wrapped_to_underlying(wrapped_out, &tail_rate, Rounding::Down)
        .map_err(|e| RouterError::market(path.tail(), e))?;

    Ok(SwapQuote {
        path: path.clone(),
        amount_in,
        amount_out,
        wrapped_amounts,
        head_rate,
        tail_rate,
    })
}

/// Preview an exact-in swap without changing state
pub fn quote_exact_in<M: LendingMarket, A: Amm>(
    chain: &Chain<M, A>,
    path: &SwapPath,
    amount_in: Amount,
) -> Result<SwapQuote, RouterError> {
    validate_path(chain, path)?;
    let head_rate = rate_of(chain, path.head())?;
    let wrapped_in = underlying_to_wrapped(amount_in, &head_rate, Rounding::Down)
        .map_err(|e| RouterError::market(path.head(), e))?;
    quote_wrapped_exact_in(chain, path, amount_in, wrapped_in)
}

/// Preview an exact-out swap without changing state.
///
/// The wrapped output needed is rounded up, and so is the underlying input
/// that covers the reverse-quoted wrapped input.
pub fn quote_exact_out<M: LendingMarket, A: Amm>(
    chain: &Chain<M, A>,
    path: &SwapPath,
    amount_out: Amount,
) -> Result<SwapQuote, RouterError> {
    validate_path(chain, path)?;
    let head_rate = rate_of(chain, path.head())?;
    let tail_rate = rate_of(chain, path.tail())?;

    let wrapped_out = underlying_to_wrapped(amount_out, &tail_rate, Rounding::Up)
        .map_err(|e| RouterError::market(path.tail(), e))?;
    let wrapped_amounts = chain.amm.get_amounts_in(wrapped_out, path.as_slice())?;
    let wrapped_in = wrapped_amounts.first().copied().unwrap_or(0);
    let amount_in = wrapped_to_underlying(wrapped_in, &head_rate, Rounding::Up)
        .map_err(|e| RouterError::market(path.head(), e))?;

    Ok(SwapQuote {
        path: path.clone(),
        amount_in,
        amount_out,
        wrapped_amounts,
        head_rate,
        tail_rate,
    })
}

/// Swap `wrapped_in` head shares held by the router along the path,
/// requiring at least `wrapped_out_min` tail shares, then unwrap and pay
/// the caller. Returns (AMM amounts, underlying paid, dust forwarded).
fn execute<M: LendingMarket, A: Amm>(
    chain: &mut Chain<M, A>,
    router: &Address,
    caller: &Address,
    path: &SwapPath,
    wrapped_in: Amount,
    wrapped_out_min: Amount,
) -> Result<(Vec<Amount>, Amount, Amount), RouterError> {
    let amm_address = chain.amm.address();
    chain
        .ledger
        .approve(path.head(), router, &amm_address, wrapped_in);
    let amounts = chain.amm.swap_exact_tokens_for_tokens(
        &mut chain.ledger,
        router,
        wrapped_in,
        wrapped_out_min,
        path.as_slice(),
        router,
    )?;
    chain.ledger.approve(path.head(), router, &amm_address, 0);

    let wrapped_out = amounts.last().copied().unwrap_or(0);
    let redeemed = redeem_or_forward(chain, router, caller, path.tail(), wrapped_out)?;
    if redeemed.underlying > 0 {
        let tail_underlying = underlying_of(chain, path.tail())?;
        chain
            .ledger
            .transfer(&tail_underlying, router, caller, redeemed.underlying)?;
    }
    Ok((amounts, redeemed.underlying, redeemed.dust))
}

pub fn swap_exact_underlying_for_underlying<M: LendingMarket, A: Amm>(
    chain: &mut Chain<M, A>,
    router: &Address,
    caller: &Address,
    request: &ExactInSwap,
) -> Result<SwapSummary, RouterError> {
    let path = &request.path;
    validate_path(chain, path)?;
    let head_underlying = underlying_of(chain, path.head())?;

    chain
        .ledger
        .transfer_from(&head_underlying, router, caller, router, request.amount_in)?;
    let wrapped_in = wrap(chain, router, path.head(), request.amount_in)?;

    let quote = quote_wrapped_exact_in(chain, path, request.amount_in, wrapped_in)?;
    ensure_min_output(quote.amount_out, request.amount_out_min)?;
    tracing::debug!(
        wrapped_in,
        wrapped_out = quote.wrapped_out(),
        expected_out = quote.amount_out,
        "Quoted exact-in swap"
    );

    let (wrapped_amounts, amount_out, dust) =
        execute(chain, router, caller, path, wrapped_in, quote.wrapped_out())?;
    ensure_min_output(amount_out, request.amount_out_min)?;

    Ok(SwapSummary {
        path: path.clone(),
        amount_in: request.amount_in,
        amount_out,
        wrapped_amounts,
        dust,
    })
}

/// Pulls exactly the quoted input and swaps all of its wrapped shares, so
/// the caller receives at least `amount_out` and the router keeps nothing.
pub fn swap_underlying_for_exact_underlying<M: LendingMarket, A: Amm>(
    chain: &mut Chain<M, A>,
    router: &Address,
    caller: &Address,
    request: &ExactOutSwap,
) -> Result<SwapSummary, RouterError> {
    let path = &request.path;
    let quote = quote_exact_out(chain, path, request.amount_out)?;
    ensure_max_input(quote.amount_in, request.amount_in_max)?;
    tracing::debug!(
        required_in = quote.amount_in,
        wrapped_in = quote.wrapped_in(),
        wrapped_out = quote.wrapped_out(),
        "Quoted exact-out swap"
    );

    let head_underlying = underlying_of(chain, path.head())?;
    chain
        .ledger
        .transfer_from(&head_underlying, router, caller, router, quote.amount_in)?;
    let wrapped_in = wrap(chain, router, path.head(), quote.amount_in)?;

    let (wrapped_amounts, amount_out, dust) =
        execute(chain, router, caller, path, wrapped_in, quote.wrapped_out())?;
    ensure_min_output(amount_out, request.amount_out)?;

    Ok(SwapSummary {
        path: path.clone(),
        amount_in: quote.amount_in,
        amount_out,
        wrapped_amounts,
        dust,
    })
}
