//! Execution environment
//!
//! `Chain` bundles the token ledger, the lending markets, and the AMM with
//! the current block. Router entry points run inside `Chain::atomically`,
//! which restores the whole environment if the call fails.

use amm::ConstantProductAmm;
use lending::MarketBook;
use router_core::{BlockContext, Ledger};

/// Chain state the router operates on
#[derive(Debug, Clone)]
pub struct Chain<M, A> {
    pub ledger: Ledger,
    pub markets: M,
    pub amm: A,
    pub block: BlockContext,
}

/// Chain backed by the in-memory market book and constant-product AMM
pub type SimulatedChain = Chain<MarketBook, ConstantProductAmm>;

impl<M, A> Chain<M, A> {
    pub fn new(ledger: Ledger, markets: M, amm: A, block: BlockContext) -> Self {
        Self {
            ledger,
            markets,
            amm,
            block,
        }
    }

    /// Move to a later block
    pub fn advance_blocks(&mut self, blocks: u64, block_time_secs: u64) {
        self.block = self.block.advanced(blocks, block_time_secs);
        tracing::debug!(block = self.block.number, "Advanced chain");
    }
}

impl<M: Clone, A: Clone> Chain<M, A> {
    /// Run `f` against the chain; on error, every change it made (ledger,
    /// event log, markets, AMM) is discarded.
    pub fn atomically<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::Address;

    fn chain() -> Chain<(), ()> {
        Chain::new(Ledger::new(), (), (), BlockContext::new(10, 1_000))
    }

    #[test]
    fn test_atomically_commits_on_success() {
        let mut chain = chain();
        let token = Address::from_low_u64(1);
        let result: Result<(), ()> = chain.atomically(|c| {
            c.ledger
                .mint(&token, &Address::from_low_u64(2), 5)
                .map_err(|_| ())
        });
        assert!(result.is_ok());
        assert_eq!(chain.ledger.total_supply(&token), 5);
    }

    #[test]
    fn test_atomically_reverts_on_error() {
        let mut chain = chain();
        let token = Address::from_low_u64(1);
        let result: Result<(), &str> = chain.atomically(|c| {
            c.ledger
                .mint(&token, &Address::from_low_u64(2), 5)
                .map_err(|_| "mint")?;
            c.advance_blocks(3, 2);
            Err("later step failed")
        });
        assert_eq!(result, Err("later step failed"));
        assert_eq!(chain.ledger.total_supply(&token), 0);
        assert_eq!(chain.ledger.event_count(), 0);
        assert_eq!(chain.block.number, 10);
    }

    #[test]
    fn test_advance_blocks() {
        let mut chain = chain();
        chain.advance_blocks(5, 4);
        assert_eq!(chain.block, BlockContext::new(15, 1_020));
    }
}
