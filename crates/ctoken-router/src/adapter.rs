//! Wrap/Unwrap Adapter
//!
//! Converts between an underlying asset and its market's wrapped shares on
//! behalf of the router. Both directions require the router to already hold
//! the input and return exactly what the market reports.

use lending::{wrapped_to_underlying, ExchangeRate, LendingMarket};
use router_core::{Address, Amount, LedgerError, Rounding};

use crate::chain::Chain;
use crate::errors::RouterError;

/// Underlying of `market`
pub fn underlying_of<M: LendingMarket, A>(
    chain: &Chain<M, A>,
    market: &Address,
) -> Result<Address, RouterError> {
    chain
        .markets
        .underlying(market)
        .map_err(|e| RouterError::market(market, e))
}

/// Current exchange rate of `market`
pub fn rate_of<M: LendingMarket, A>(
    chain: &Chain<M, A>,
    market: &Address,
) -> Result<ExchangeRate, RouterError> {
    chain
        .markets
        .exchange_rate(market, &chain.block)
        .map_err(|e| RouterError::market(market, e))
}

fn ensure_held<M, A>(
    chain: &Chain<M, A>,
    holder: &Address,
    token: &Address,
    amount: Amount,
) -> Result<(), RouterError> {
    let available = chain.ledger.balance_of(token, holder);
    if available < amount {
        return Err(LedgerError::InsufficientBalance {
            token: *token,
            holder: *holder,
            required: amount,
            available,
        }
        .into());
    }
    Ok(())
}

/// Mint `market` shares from `amount` of underlying held by `router`.
pub fn wrap<M: LendingMarket, A>(
    chain: &mut Chain<M, A>,
    router: &Address,
    market: &Address,
    amount: Amount,
) -> Result<Amount, RouterError> {
    if amount == 0 {
        return Ok(0);
    }
    let underlying = underlying_of(chain, market)?;
    ensure_held(chain, router, &underlying, amount)?;

    chain.ledger.approve(&underlying, router, market, amount);
    let shares = chain
        .markets
        .mint(&mut chain.ledger, &chain.block, market, router, amount)
        .map_err(|e| RouterError::market(market, e))?;
    if shares == 0 {
        return Err(RouterError::MarketCallFailed {
            market: *market,
            reason: format!("mint of {} returned zero shares", amount),
        });
    }

    tracing::debug!(market = %market, amount, shares, "Wrapped underlying");
    Ok(shares)
}

/// Redeem `shares` of `market` held by `router` for underlying.
pub fn unwrap<M: LendingMarket, A>(
    chain: &mut Chain<M, A>,
    router: &Address,
    market: &Address,
    shares: Amount,
) -> Result<Amount, RouterError> {
    if shares == 0 {
        return Ok(0);
    }
    ensure_held(chain, router, market, shares)?;

    let amount = chain
        .markets
        .redeem(&mut chain.ledger, &chain.block, market, router, shares)
        .map_err(|e| RouterError::market(market, e))?;
    if amount == 0 {
        return Err(RouterError::MarketCallFailed {
            market: *market,
            reason: format!("redeem of {} shares returned zero", shares),
        });
    }

    tracing::debug!(market = %market, shares, amount, "Unwrapped shares");
    Ok(amount)
}

/// Outcome of settling a wrapped balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Redeemed {
    /// Underlying now held by the router
    pub underlying: Amount,
    /// Wrapped shares forwarded to the recipient instead of redeemed
    pub dust: Amount,
}

/// Unwrap `shares`, or forward them to `recipient` when they are worth
/// less than one unit of underlying.
pub fn redeem_or_forward<M: LendingMarket, A>(
    chain: &mut Chain<M, A>,
    router: &Address,
    recipient: &Address,
    market: &Address,
    shares: Amount,
) -> Result<Redeemed, RouterError> {
    if shares == 0 {
        return Ok(Redeemed::default());
    }
    let rate = rate_of(chain, market)?;
    let preview = wrapped_to_underlying(shares, &rate, Rounding::Down)
        .map_err(|e| RouterError::market(market, e))?;
    if preview == 0 {
        chain.ledger.transfer(market, router, recipient, shares)?;
        tracing::debug!(market = %market, shares, "Forwarded unredeemable dust");
        return Ok(Redeemed {
            underlying: 0,
            dust: shares,
        });
    }
    Ok(Redeemed {
        underlying: unwrap(chain, router, market, shares)?,
        dust: 0,
    })
}
