//! Lending Market Interface and Simulated Market Book
//!
//! `LendingMarket` is what the router sees of a cToken market. `MarketBook`
//! is an in-memory Compound-style implementation: minting pulls underlying
//! from the minter and issues shares at the current rate, redeeming burns
//! shares and pays out underlying from the market's cash.

use std::collections::BTreeMap;

use router_core::{Address, Amount, BlockContext, Ledger, Rounding};

use crate::calculator::{
    accrue_exchange_rate, supply_apr, underlying_to_wrapped, wrapped_to_underlying,
};
use crate::state::{ExchangeRate, LendingError, MarketSnapshot, MarketState};

/// Lending market entry points consumed by the router
pub trait LendingMarket {
    /// Underlying asset of `market`
    fn underlying(&self, market: &Address) -> Result<Address, LendingError>;

    /// Exchange rate `market` would apply to a mint or redeem in `block`.
    /// Read-only: no accrual is persisted.
    fn exchange_rate(&self, market: &Address, block: &BlockContext)
        -> Result<ExchangeRate, LendingError>;

    /// Supply `amount` underlying from `minter` (who must have approved the
    /// market) and return the shares minted to `minter`.
    fn mint(
        &mut self,
        ledger: &mut Ledger,
        block: &BlockContext,
        market: &Address,
        minter: &Address,
        amount: Amount,
    ) -> Result<Amount, LendingError>;

    /// Burn `shares` of `redeemer`'s wrapped balance and return the
    /// underlying paid to `redeemer`.
    fn redeem(
        &mut self,
        ledger: &mut Ledger,
        block: &BlockContext,
        market: &Address,
        redeemer: &Address,
        shares: Amount,
    ) -> Result<Amount, LendingError>;
}

/// Simulated cToken markets keyed by wrapped-token address
#[derive(Debug, Clone, Default)]
pub struct MarketBook {
    markets: BTreeMap<Address, MarketState>,
}

impl MarketBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a market, replacing any market with the same wrapped address
    pub fn add_market(&mut self, state: MarketState) {
        tracing::debug!(
            market = %state.wrapped,
            symbol = %state.symbol,
            rate = %state.exchange_rate,
            "Registered lending market"
        );
        self.markets.insert(state.wrapped, state);
    }

    pub fn with_market(mut self, state: MarketState) -> Self {
        self.add_market(state);
        self
    }

    pub fn state(&self, market: &Address) -> Option<&MarketState> {
        self.markets.get(market)
    }

    pub fn markets(&self) -> impl Iterator<Item = &MarketState> {
        self.markets.values()
    }

    /// Toggle the mint guardian on `market`
    pub fn set_mint_paused(&mut self, market: &Address, paused: bool) -> Result<(), LendingError> {
        let state = self.state_mut(market)?;
        state.mint_paused = paused;
        tracing::info!(market = %market, paused, "Mint guardian updated");
        Ok(())
    }

    /// Reporting view of `market` at `block`
    pub fn snapshot(
        &self,
        ledger: &Ledger,
        market: &Address,
        block: &BlockContext,
    ) -> Result<MarketSnapshot, LendingError> {
        let state = self.require(market)?;
        Ok(MarketSnapshot {
            symbol: state.symbol.clone(),
            wrapped: state.wrapped,
            underlying: state.underlying,
            exchange_rate: self.exchange_rate(market, block)?,
            cash: ledger.balance_of(&state.underlying, &state.wrapped),
            total_supply: ledger.total_supply(&state.wrapped),
            supply_apr: supply_apr(state.supply_rate_per_block),
        })
    }

    fn require(&self, market: &Address) -> Result<&MarketState, LendingError> {
        self.markets
            .get(market)
            .ok_or(LendingError::UnknownMarket(*market))
    }

    fn state_mut(&mut self, market: &Address) -> Result<&mut MarketState, LendingError> {
        self.markets
            .get_mut(market)
            .ok_or(LendingError::UnknownMarket(*market))
    }

    /// Persist accrual up to `block` and return the resulting rate
    fn accrue(&mut self, market: &Address, block: &BlockContext) -> Result<ExchangeRate, LendingError> {
        let state = self.state_mut(market)?;
        let elapsed = block.number.saturating_sub(state.accrual_block);
        if elapsed > 0 {
            state.exchange_rate =
                accrue_exchange_rate(&state.exchange_rate, state.supply_rate_per_block, elapsed)?;
            state.accrual_block = block.number;
        }
        Ok(state.exchange_rate)
    }
}

impl LendingMarket for MarketBook {
    fn underlying(&self, market: &Address) -> Result<Address, LendingError> {
        Ok(self.require(market)?.underlying)
    }

    fn exchange_rate(
        &self,
        market: &Address,
        block: &BlockContext,
    ) -> Result<ExchangeRate, LendingError> {
        let state = self.require(market)?;
        let elapsed = block.number.saturating_sub(state.accrual_block);
        accrue_exchange_rate(&state.exchange_rate, state.supply_rate_per_block, elapsed)
    }

    fn mint(
        &mut self,
        ledger: &mut Ledger,
        block: &BlockContext,
        market: &Address,
        minter: &Address,
        amount: Amount,
    ) -> Result<Amount, LendingError> {
        let rate = self.accrue(market, block)?;
        let state = self.require(market)?;
        if state.mint_paused {
            return Err(LendingError::MintPaused(*market));
        }
        let underlying = state.underlying;

        let shares = underlying_to_wrapped(amount, &rate, Rounding::Down)?;
        ledger.transfer_from(&underlying, market, minter, market, amount)?;
        ledger.issue(market, market, minter, shares)?;

        tracing::debug!(
            market = %market,
            minter = %minter,
            amount,
            shares,
            rate = %rate,
            "Minted wrapped shares"
        );
        Ok(shares)
    }

    fn redeem(
        &mut self,
        ledger: &mut Ledger,
        block: &BlockContext,
        market: &Address,
        redeemer: &Address,
        shares: Amount,
    ) -> Result<Amount, LendingError> {
        let rate = self.accrue(market, block)?;
        let underlying = self.require(market)?.underlying;

        let amount = wrapped_to_underlying(shares, &rate, Rounding::Down)?;
        let cash = ledger.balance_of(&underlying, market);
        if cash < amount {
            return Err(LendingError::InsufficientCash {
                market: *market,
                required: amount,
                available: cash,
            });
        }
        ledger.retire(market, redeemer, market, shares)?;
        ledger.transfer(&underlying, market, redeemer, amount)?;

        tracing::debug!(
            market = %market,
            redeemer = %redeemer,
            shares,
            amount,
            rate = %rate,
            "Redeemed wrapped shares"
        );
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EXP_SCALE;

    fn kusdc() -> Address {
        Address::from_low_u64(0xc1)
    }

    fn usdc() -> Address {
        Address::from_low_u64(0xa1)
    }

    fn user() -> Address {
        Address::from_low_u64(0x99)
    }

    fn setup(supply_rate: u128) -> (MarketBook, Ledger) {
        let book = MarketBook::new().with_market(
            MarketState::new(
                "kUSDC",
                kusdc(),
                usdc(),
                ExchangeRate::from_mantissa(203_448_030_196_818),
            )
            .with_supply_rate(supply_rate)
            .with_accrual_block(100),
        );
        let mut ledger = Ledger::new();
        ledger.mint(&usdc(), &user(), 1_000_000000).unwrap();
        ledger.approve(&usdc(), &user(), &kusdc(), u128::MAX);
        (book, ledger)
    }

    #[test]
    fn test_mint_reference_amount() {
        let (mut book, mut ledger) = setup(0);
        let block = BlockContext::new(100, 0);
        let shares = book
            .mint(&mut ledger, &block, &kusdc(), &user(), 10_000000)
            .unwrap();

        assert_eq!(shares, 49152601725);
        assert_eq!(ledger.balance_of(&kusdc(), &user()), shares);
        assert_eq!(ledger.balance_of(&usdc(), &kusdc()), 10_000000);
        assert_eq!(ledger.total_supply(&kusdc()), shares);

        // cToken mints are reported from the market itself
        let transfers = ledger.transfers_since(0);
        let last = transfers.last().unwrap();
        assert_eq!(last.from, kusdc());
        assert_eq!(last.to, user());
    }

    #[test]
    fn test_mint_requires_allowance() {
        let (mut book, mut ledger) = setup(0);
        ledger.approve(&usdc(), &user(), &kusdc(), 5);
        let err = book
            .mint(&mut ledger, &BlockContext::new(100, 0), &kusdc(), &user(), 6)
            .unwrap_err();
        assert_eq!(err.error_code(), "insufficient_allowance");
    }

    #[test]
    fn test_redeem_round_trip() {
        let (mut book, mut ledger) = setup(0);
        let block = BlockContext::new(100, 0);
        let shares = book
            .mint(&mut ledger, &block, &kusdc(), &user(), 10_000000)
            .unwrap();
        let out = book
            .redeem(&mut ledger, &block, &kusdc(), &user(), shares)
            .unwrap();

        assert!(out <= 10_000000);
        assert!(10_000000 - out <= 1);
        assert_eq!(ledger.balance_of(&kusdc(), &user()), 0);
        assert_eq!(ledger.total_supply(&kusdc()), 0);
    }

    #[test]
    fn test_redeem_insufficient_cash() {
        let (mut book, mut ledger) = setup(0);
        let block = BlockContext::new(100, 0);
        let shares = book
            .mint(&mut ledger, &block, &kusdc(), &user(), 10_000000)
            .unwrap();
        // Market lends its cash out
        ledger
            .transfer(&usdc(), &kusdc(), &Address::from_low_u64(0xbb), 9_000000)
            .unwrap();

        let err = book
            .redeem(&mut ledger, &block, &kusdc(), &user(), shares)
            .unwrap_err();
        assert!(matches!(err, LendingError::InsufficientCash { .. }));
        assert_eq!(ledger.balance_of(&kusdc(), &user()), shares);
    }

    #[test]
    fn test_mint_paused() {
        let (mut book, mut ledger) = setup(0);
        book.set_mint_paused(&kusdc(), true).unwrap();
        let err = book
            .mint(&mut ledger, &BlockContext::new(100, 0), &kusdc(), &user(), 1)
            .unwrap_err();
        assert_eq!(err, LendingError::MintPaused(kusdc()));
    }

    #[test]
    fn test_unknown_market() {
        let (book, _) = setup(0);
        let other = Address::from_low_u64(0xdead);
        assert_eq!(
            book.underlying(&other),
            Err(LendingError::UnknownMarket(other))
        );
    }

    #[test]
    fn test_rate_accrues_with_blocks() {
        let (mut book, mut ledger) = setup(EXP_SCALE / 1_000_000);
        let start = book
            .exchange_rate(&kusdc(), &BlockContext::new(100, 0))
            .unwrap();
        let later_block = BlockContext::new(200, 0);
        let later = book.exchange_rate(&kusdc(), &later_block).unwrap();
        assert!(later > start);

        // Reading does not persist accrual; minting does
        assert_eq!(book.state(&kusdc()).unwrap().accrual_block, 100);
        book.mint(&mut ledger, &later_block, &kusdc(), &user(), 1_000000)
            .unwrap();
        let state = book.state(&kusdc()).unwrap();
        assert_eq!(state.accrual_block, 200);
        assert_eq!(state.exchange_rate, later);
    }

    #[test]
    fn test_snapshot() {
        let (mut book, mut ledger) = setup(0);
        let block = BlockContext::new(100, 0);
        book.mint(&mut ledger, &block, &kusdc(), &user(), 10_000000)
            .unwrap();
        let snapshot = book.snapshot(&ledger, &kusdc(), &block).unwrap();
        assert_eq!(snapshot.cash, 10_000000);
        assert_eq!(snapshot.total_supply, 49152601725);
        assert_eq!(snapshot.symbol, "kUSDC");
        assert_eq!(snapshot.supply_apr, 0.0);
    }
}
