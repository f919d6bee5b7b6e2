//! Router Facade
//!
//! The four entry points. Each runs inside `Chain::atomically`, so a failure
//! at any step leaves balances, reserves and the event log as they were.
//! After a successful call the router must hold no more of any token the
//! call touched than it held before.

use amm::Amm;
use lending::LendingMarket;
use router_core::{Address, Amount, SwapPath};

use crate::adapter::underlying_of;
use crate::chain::Chain;
use crate::errors::RouterError;
use crate::liquidity;
use crate::state::{
    AddLiquidityRequest, ExactInSwap, ExactOutSwap, LiquidityAdded, LiquidityRemoved,
    RemoveLiquidityRequest, SwapQuote, SwapSummary,
};
use crate::swap;

/// Stateless router operating from `address`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Router {
    address: Address,
}

/// Router balances of a set of tokens, taken before a call
#[derive(Debug, Clone)]
struct Holdings(Vec<(Address, Amount)>);

impl Holdings {
    fn capture<M, A>(chain: &Chain<M, A>, holder: &Address, tokens: &[Address]) -> Self {
        Self(
            tokens
                .iter()
                .map(|token| (*token, chain.ledger.balance_of(token, holder)))
                .collect(),
        )
    }

    /// Fail if `holder` gained any of the captured tokens
    fn ensure_unchanged<M, A>(&self, chain: &Chain<M, A>, holder: &Address) -> Result<(), RouterError> {
        for (token, before) in &self.0 {
            let after = chain.ledger.balance_of(token, holder);
            if after > *before {
                return Err(RouterError::ResidualBalance {
                    token: *token,
                    amount: after - before,
                });
            }
        }
        Ok(())
    }
}

/// Markets, their underlyings, and the pools between consecutive markets
fn touched_tokens<M: LendingMarket, A: Amm>(
    chain: &Chain<M, A>,
    markets: &[Address],
) -> Result<Vec<Address>, RouterError> {
    let mut tokens = Vec::with_capacity(markets.len() * 3);
    for market in markets {
        tokens.push(*market);
        tokens.push(underlying_of(chain, market)?);
    }
    for hop in markets.windows(2) {
        if let Ok(pair) = chain.amm.pair_for(&hop[0], &hop[1]) {
            tokens.push(pair);
        }
    }
    tokens.sort();
    tokens.dedup();
    Ok(tokens)
}

impl Router {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Run `op` atomically and check the router kept nothing
    fn execute<M, A, T>(
        &self,
        chain: &mut Chain<M, A>,
        operation: &'static str,
        markets: &[Address],
        op: impl FnOnce(&mut Chain<M, A>, &Address) -> Result<T, RouterError>,
    ) -> Result<T, RouterError>
    where
        M: LendingMarket + Clone,
        A: Amm + Clone,
    {
        let router = self.address;
        let result: Result<T, RouterError> = chain.atomically(|chain| {
            let tokens = touched_tokens(chain, markets)?;
            let before = Holdings::capture(chain, &router, &tokens);
            let value = op(chain, &router)?;
            before.ensure_unchanged(chain, &router)?;
            Ok(value)
        });
        if let Err(e) = &result {
            tracing::warn!(
                operation,
                code = e.error_code(),
                error = %e,
                "Router call reverted"
            );
        }
        result
    }

    /// Pull both underlyings, wrap them, and add them to the pair as
    /// liquidity minted to `caller`. Unused principal is refunded.
    pub fn mint_wrapped_and_add_liquidity<M, A>(
        &self,
        chain: &mut Chain<M, A>,
        caller: &Address,
        request: &AddLiquidityRequest,
    ) -> Result<LiquidityAdded, RouterError>
    where
        M: LendingMarket + Clone,
        A: Amm + Clone,
    {
        let markets = [request.market_a, request.market_b];
        let added = self.execute(chain, "add_liquidity", &markets, |chain, router| {
            liquidity::mint_wrapped_and_add_liquidity(chain, router, caller, request)
        })?;
        tracing::info!(
            caller = %caller,
            pair = %added.pair,
            liquidity = added.liquidity,
            amount_a = added.amount_a_used,
            amount_b = added.amount_b_used,
            "Added wrapped liquidity"
        );
        Ok(added)
    }

    /// Burn `caller`'s LP and pay out both underlyings
    pub fn remove_liquidity_and_redeem<M, A>(
        &self,
        chain: &mut Chain<M, A>,
        caller: &Address,
        request: &RemoveLiquidityRequest,
    ) -> Result<LiquidityRemoved, RouterError>
    where
        M: LendingMarket + Clone,
        A: Amm + Clone,
    {
        let markets = [request.market_a, request.market_b];
        let removed = self.execute(chain, "remove_liquidity", &markets, |chain, router| {
            liquidity::remove_liquidity_and_redeem(chain, router, caller, request)
        })?;
        tracing::info!(
            caller = %caller,
            pool = %request.pool,
            liquidity = request.liquidity,
            amount_a = removed.amount_a,
            amount_b = removed.amount_b,
            "Removed wrapped liquidity"
        );
        Ok(removed)
    }

    pub fn swap_exact_underlying_for_underlying<M, A>(
        &self,
        chain: &mut Chain<M, A>,
        caller: &Address,
        request: &ExactInSwap,
    ) -> Result<SwapSummary, RouterError>
    where
        M: LendingMarket + Clone,
        A: Amm + Clone,
    {
        let summary = self.execute(chain, "swap_exact_in", request.path.as_slice(), |chain, router| {
            swap::swap_exact_underlying_for_underlying(chain, router, caller, request)
        })?;
        tracing::info!(
            caller = %caller,
            hops = request.path.hop_count(),
            amount_in = summary.amount_in,
            amount_out = summary.amount_out,
            "Swapped exact input"
        );
        Ok(summary)
    }

    pub fn swap_underlying_for_exact_underlying<M, A>(
        &self,
        chain: &mut Chain<M, A>,
        caller: &Address,
        request: &ExactOutSwap,
    ) -> Result<SwapSummary, RouterError>
    where
        M: LendingMarket + Clone,
        A: Amm + Clone,
    {
        let summary = self.execute(chain, "swap_exact_out", request.path.as_slice(), |chain, router| {
            swap::swap_underlying_for_exact_underlying(chain, router, caller, request)
        })?;
        tracing::info!(
            caller = %caller,
            hops = request.path.hop_count(),
            amount_in = summary.amount_in,
            amount_out = summary.amount_out,
            "Swapped for exact output"
        );
        Ok(summary)
    }

    pub fn quote_exact_in<M: LendingMarket, A: Amm>(
        &self,
        chain: &Chain<M, A>,
        path: &SwapPath,
        amount_in: Amount,
    ) -> Result<SwapQuote, RouterError> {
        swap::quote_exact_in(chain, path, amount_in)
    }

    pub fn quote_exact_out<M: LendingMarket, A: Amm>(
        &self,
        chain: &Chain<M, A>,
        path: &SwapPath,
        amount_out: Amount,
    ) -> Result<SwapQuote, RouterError> {
        swap::quote_exact_out(chain, path, amount_out)
    }
}
