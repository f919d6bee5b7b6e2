//! AMM Interface and Simulated V2 Router
//!
//! `Amm` is the router-facing surface of a Uniswap-V2-style exchange.
//! `ConstantProductAmm` implements it over the shared ledger: each pair holds
//! its reserves as ledger balances at the pair address, and its LP token is
//! the ledger token at that same address. Token pulls are `transfer_from`
//! with the AMM router as spender, so callers approve the AMM address.

use std::collections::BTreeMap;

use router_core::{Address, Amount, FeeConfig, Ledger};

use crate::calculator::{calculate_lp_reward, calculate_redeem_shares, optimal_deposit};
use crate::constants::lp::MINIMUM_LIQUIDITY;
use crate::router::{amounts_in, amounts_out, quote_route, resolve_path, PoolEdge};
use crate::state::{
    sort_tokens, AddLiquidityParams, AmmError, LiquidityReceipt, Pair, PathQuote,
    RemoveLiquidityParams,
};

/// Exchange entry points consumed by the router
pub trait Amm {
    /// Address callers approve before the AMM pulls their tokens
    fn address(&self) -> Address;

    /// Pair (and LP token) address for two tokens, in either order
    fn pair_for(&self, token_a: &Address, token_b: &Address) -> Result<Address, AmmError>;

    /// Reserves ordered as (reserve of `token_a`, reserve of `token_b`)
    fn get_reserves(&self, token_a: &Address, token_b: &Address)
        -> Result<(Amount, Amount), AmmError>;

    /// `[amount_in, out_hop_0, ...]` for an exact input along `path`
    fn get_amounts_out(&self, amount_in: Amount, path: &[Address]) -> Result<Vec<Amount>, AmmError>;

    /// `[required_in, ..., amount_out]` for an exact output along `path`
    fn get_amounts_in(&self, amount_out: Amount, path: &[Address]) -> Result<Vec<Amount>, AmmError>;

    /// Deposit both tokens from `sender` at the pair's ratio and mint LP to `params.to`
    fn add_liquidity(
        &mut self,
        ledger: &mut Ledger,
        sender: &Address,
        params: &AddLiquidityParams,
    ) -> Result<LiquidityReceipt, AmmError>;

    /// Burn `sender`'s LP and pay both tokens to `params.to`.
    /// Returns (amount of token_a, amount of token_b).
    fn remove_liquidity(
        &mut self,
        ledger: &mut Ledger,
        sender: &Address,
        params: &RemoveLiquidityParams,
    ) -> Result<(Amount, Amount), AmmError>;

    fn swap_exact_tokens_for_tokens(
        &mut self,
        ledger: &mut Ledger,
        sender: &Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: &Address,
    ) -> Result<Vec<Amount>, AmmError>;
}

/// In-memory constant-product exchange
#[derive(Debug, Clone)]
pub struct ConstantProductAmm {
    address: Address,
    fee: FeeConfig,
    /// Keyed by sorted (token0, token1)
    pairs: BTreeMap<(Address, Address), Pair>,
}

impl ConstantProductAmm {
    pub fn new(address: Address, fee: FeeConfig) -> Self {
        Self {
            address,
            fee,
            pairs: BTreeMap::new(),
        }
    }

    /// Register an empty pair for two tokens at `pair_address`
    pub fn create_pair(
        &mut self,
        token_a: Address,
        token_b: Address,
        pair_address: Address,
    ) -> Result<Address, AmmError> {
        if token_a == token_b {
            return Err(AmmError::InvalidPath(format!(
                "cannot pair {} with itself",
                token_a
            )));
        }
        let key = sort_tokens(token_a, token_b);
        if let Some(existing) = self.pairs.get(&key) {
            return Ok(existing.address);
        }
        self.pairs
            .insert(key, Pair::new(pair_address, token_a, token_b, self.fee));
        tracing::debug!(
            pair = %pair_address,
            token0 = %key.0,
            token1 = %key.1,
            "Created pair"
        );
        Ok(pair_address)
    }

    pub fn pair(&self, token_a: &Address, token_b: &Address) -> Option<&Pair> {
        self.pairs.get(&sort_tokens(*token_a, *token_b))
    }

    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.values()
    }

    /// Per-hop quote with price impact for an exact input along `path`
    pub fn quote_path(&self, amount_in: Amount, path: &[Address]) -> Result<PathQuote, AmmError> {
        quote_route(&self.edges(path)?, amount_in)
    }

    fn require_pair(&self, token_a: &Address, token_b: &Address) -> Result<&Pair, AmmError> {
        self.pair(token_a, token_b).ok_or(AmmError::PairNotFound {
            token_a: *token_a,
            token_b: *token_b,
        })
    }

    fn edges(&self, path: &[Address]) -> Result<Vec<PoolEdge>, AmmError> {
        resolve_path(path, |a, b| self.pair(a, b))
    }

    /// Set a pair's reserves to its ledger balances
    fn sync(&mut self, ledger: &Ledger, token_a: &Address, token_b: &Address) {
        if let Some(pair) = self.pairs.get_mut(&sort_tokens(*token_a, *token_b)) {
            pair.reserve0 = ledger.balance_of(&pair.token0, &pair.address);
            pair.reserve1 = ledger.balance_of(&pair.token1, &pair.address);
        }
    }

    /// Move precomputed `amounts` along `path`. The input must already sit
    /// in the first pair; each hop pays out to the next pair, the last to `to`.
    fn execute_swap(
        &mut self,
        ledger: &mut Ledger,
        amounts: &[Amount],
        path: &[Address],
        to: &Address,
    ) -> Result<(), AmmError> {
        let hop_count = path.len() - 1;
        for i in 0..hop_count {
            let (token_in, token_out) = (path[i], path[i + 1]);
            let pair = self.require_pair(&token_in, &token_out)?.address;
            let recipient = if i + 1 < hop_count {
                self.require_pair(&path[i + 1], &path[i + 2])?.address
            } else {
                *to
            };
            ledger.transfer(&token_out, &pair, &recipient, amounts[i + 1])?;
            self.sync(ledger, &token_in, &token_out);
            tracing::debug!(
                pair = %pair,
                token_in = %token_in,
                amount_in = amounts[i],
                amount_out = amounts[i + 1],
                "Swap hop"
            );
        }
        Ok(())
    }
}

impl Amm for ConstantProductAmm {
    fn address(&self) -> Address {
        self.address
    }

    fn pair_for(&self, token_a: &Address, token_b: &Address) -> Result<Address, AmmError> {
        Ok(self.require_pair(token_a, token_b)?.address)
    }

    fn get_reserves(
        &self,
        token_a: &Address,
        token_b: &Address,
    ) -> Result<(Amount, Amount), AmmError> {
        let pair = self.require_pair(token_a, token_b)?;
        pair.reserves_for(token_a).ok_or(AmmError::PairNotFound {
            token_a: *token_a,
            token_b: *token_b,
        })
    }

    fn get_amounts_out(&self, amount_in: Amount, path: &[Address]) -> Result<Vec<Amount>, AmmError> {
        amounts_out(&self.edges(path)?, amount_in)
    }

    fn get_amounts_in(&self, amount_out: Amount, path: &[Address]) -> Result<Vec<Amount>, AmmError> {
        amounts_in(&self.edges(path)?, amount_out)
    }

    fn add_liquidity(
        &mut self,
        ledger: &mut Ledger,
        sender: &Address,
        params: &AddLiquidityParams,
    ) -> Result<LiquidityReceipt, AmmError> {
        let (reserve_a, reserve_b) = self.get_reserves(&params.token_a, &params.token_b)?;
        let (amount_a, amount_b) = optimal_deposit(
            params.amount_a_desired,
            params.amount_b_desired,
            params.amount_a_min,
            params.amount_b_min,
            reserve_a,
            reserve_b,
        )?;

        let pair = self.require_pair(&params.token_a, &params.token_b)?.clone();
        let total_supply = ledger.total_supply(&pair.address);
        let (amount0, amount1, reserve0, reserve1) = if params.token_a == pair.token0 {
            (amount_a, amount_b, reserve_a, reserve_b)
        } else {
            (amount_b, amount_a, reserve_b, reserve_a)
        };
        let liquidity = calculate_lp_reward(amount0, amount1, reserve0, reserve1, total_supply)?;

        let amm = self.address;
        ledger.transfer_from(&params.token_a, &amm, sender, &pair.address, amount_a)?;
        ledger.transfer_from(&params.token_b, &amm, sender, &pair.address, amount_b)?;
        if total_supply == 0 {
            ledger.mint(&pair.address, &Address::ZERO, MINIMUM_LIQUIDITY)?;
        }
        ledger.mint(&pair.address, &params.to, liquidity)?;
        self.sync(ledger, &params.token_a, &params.token_b);

        tracing::debug!(
            pair = %pair.address,
            amount_a,
            amount_b,
            liquidity,
            "Added liquidity"
        );
        Ok(LiquidityReceipt {
            amount_a,
            amount_b,
            liquidity,
        })
    }

    fn remove_liquidity(
        &mut self,
        ledger: &mut Ledger,
        sender: &Address,
        params: &RemoveLiquidityParams,
    ) -> Result<(Amount, Amount), AmmError> {
        let pair = self.require_pair(&params.token_a, &params.token_b)?.clone();
        let balance0 = ledger.balance_of(&pair.token0, &pair.address);
        let balance1 = ledger.balance_of(&pair.token1, &pair.address);
        let (amount0, amount1) = calculate_redeem_shares(
            params.liquidity,
            balance0,
            balance1,
            ledger.total_supply(&pair.address),
        )?;
        let (amount_a, amount_b) = if params.token_a == pair.token0 {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < params.amount_a_min {
            return Err(AmmError::InsufficientAAmount {
                amount: amount_a,
                min: params.amount_a_min,
            });
        }
        if amount_b < params.amount_b_min {
            return Err(AmmError::InsufficientBAmount {
                amount: amount_b,
                min: params.amount_b_min,
            });
        }

        let amm = self.address;
        ledger.transfer_from(&pair.address, &amm, sender, &pair.address, params.liquidity)?;
        ledger.burn(&pair.address, &pair.address, params.liquidity)?;
        ledger.transfer(&params.token_a, &pair.address, &params.to, amount_a)?;
        ledger.transfer(&params.token_b, &pair.address, &params.to, amount_b)?;
        self.sync(ledger, &params.token_a, &params.token_b);

        tracing::debug!(
            pair = %pair.address,
            liquidity = params.liquidity,
            amount_a,
            amount_b,
            "Removed liquidity"
        );
        Ok((amount_a, amount_b))
    }

    fn swap_exact_tokens_for_tokens(
        &mut self,
        ledger: &mut Ledger,
        sender: &Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: &Address,
    ) -> Result<Vec<Amount>, AmmError> {
        let amounts = self.get_amounts_out(amount_in, path)?;
        let amount_out = amounts.last().copied().unwrap_or(0);
        if amount_out < amount_out_min {
            return Err(AmmError::InsufficientOutputAmount {
                amount: amount_out,
                min: amount_out_min,
            });
        }

        let first_pair = self.require_pair(&path[0], &path[1])?.address;
        let amm = self.address;
        ledger.transfer_from(&path[0], &amm, sender, &first_pair, amounts[0])?;
        self.execute_swap(ledger, &amounts, path, to)?;
        Ok(amounts)
    }
}
