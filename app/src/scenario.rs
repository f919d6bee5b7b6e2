//! Scenario files
//!
//! A scenario describes the chain to simulate (markets, rates, seeded pools,
//! user funding) and the router calls to replay against it. The reference
//! fork scenario is embedded; `ROUTER_SIM_SCENARIO` points at another file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use amm::{AddLiquidityParams, Amm, ConstantProductAmm};
use ctoken_router::{Chain, SimulatedChain};
use lending::{ExchangeRate, LendingMarket, MarketBook, MarketState};
use router_core::constants::MAX_ALLOWANCE;
use router_core::{Address, Amount, BlockContext, Ledger, MarketConfig, RouterConfig, SwapPath};

/// Embedded reference scenario
pub const DEFAULT_SCENARIO: &str = include_str!("../scenarios/metis-fork.json");

/// Environment variable naming a scenario file to load instead
pub const SCENARIO_ENV: &str = "ROUTER_SIM_SCENARIO";

/// Exchange rate for a configured market
#[derive(Debug, Clone, Deserialize)]
pub struct MarketSeed {
    pub symbol: String,
    pub exchange_rate: ExchangeRate,
    #[serde(default)]
    pub supply_rate_per_block: u128,
}

/// A pool funded by the liquidity provider before the steps run.
/// Amounts are underlying, wrapped through the markets at the start block.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSeed {
    pub market_a: String,
    pub market_b: String,
    pub pair: Address,
    pub underlying_a: Amount,
    pub underlying_b: Amount,
}

/// Underlying balance minted to the user, by underlying symbol
#[derive(Debug, Clone, Deserialize)]
pub struct Funding {
    pub symbol: String,
    pub amount: Amount,
}

/// One replayed call, keyed by action name. Market names are
/// wrapped-token symbols.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AddLiquidity {
        market_a: String,
        market_b: String,
        amount_a: Amount,
        amount_b: Amount,
        #[serde(default)]
        amount_a_min: Amount,
        #[serde(default)]
        amount_b_min: Amount,
    },
    SwapExactIn {
        path: Vec<String>,
        amount_in: Amount,
        #[serde(default)]
        amount_out_min: Amount,
    },
    /// Without `amount_in_max`, the router's own quote is the maximum
    SwapExactOut {
        path: Vec<String>,
        amount_out: Amount,
        #[serde(default)]
        amount_in_max: Option<Amount>,
    },
    /// Without `liquidity`, the user's full LP balance is removed
    RemoveLiquidity {
        market_a: String,
        market_b: String,
        #[serde(default)]
        liquidity: Option<Amount>,
        #[serde(default)]
        amount_a_min: Amount,
        #[serde(default)]
        amount_b_min: Amount,
    },
    AdvanceBlocks {
        blocks: u64,
    },
}

impl Step {
    pub fn label(&self) -> String {
        match self {
            Self::AddLiquidity {
                market_a, market_b, ..
            } => format!("add liquidity {}/{}", market_a, market_b),
            Self::SwapExactIn { path, .. } => format!("swap exact in {}", path.join(" -> ")),
            Self::SwapExactOut { path, .. } => format!("swap exact out {}", path.join(" -> ")),
            Self::RemoveLiquidity {
                market_a, market_b, ..
            } => format!("remove liquidity {}/{}", market_a, market_b),
            Self::AdvanceBlocks { blocks } => format!("advance {} blocks", blocks),
        }
    }
}

fn default_block_time() -> u64 {
    4
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub config: RouterConfig,
    pub block: BlockContext,
    #[serde(default = "default_block_time")]
    pub block_time_secs: u64,
    pub user: Address,
    pub liquidity_provider: Address,
    pub markets: Vec<MarketSeed>,
    #[serde(default)]
    pub pools: Vec<PoolSeed>,
    #[serde(default)]
    pub funding: Vec<Funding>,
    pub steps: Vec<Step>,
}

/// Load the scenario named by `ROUTER_SIM_SCENARIO`, or the embedded one
pub fn load() -> Result<Scenario> {
    match std::env::var(SCENARIO_ENV) {
        Ok(path) => Scenario::from_file(Path::new(&path)),
        Err(_) => Scenario::from_json(DEFAULT_SCENARIO).context("Failed to parse embedded scenario"),
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse scenario {}", path.display()))
    }

    pub fn market(&self, symbol: &str) -> Result<&MarketConfig> {
        Ok(self.config.market(symbol)?)
    }

    /// Path of wrapped markets from their symbols
    pub fn path(&self, symbols: &[String]) -> Result<SwapPath> {
        let markets = symbols
            .iter()
            .map(|s| self.market(s).map(|m| m.wrapped))
            .collect::<Result<Vec<_>>>()?;
        Ok(SwapPath::new(markets)?)
    }

    /// Underlying token by its symbol
    pub fn underlying(&self, symbol: &str) -> Result<Address> {
        self.config
            .markets
            .iter()
            .find(|m| m.underlying_symbol == symbol)
            .map(|m| m.underlying)
            .with_context(|| format!("Unknown underlying {}", symbol))
    }

    /// Build the simulated chain: markets, seeded pools, a funded user who
    /// has approved the router for every underlying and LP token.
    pub fn build_chain(&self) -> Result<SimulatedChain> {
        let mut markets = MarketBook::new();
        for seed in &self.markets {
            let config = self.market(&seed.symbol)?;
            markets.add_market(
                MarketState::new(&seed.symbol, config.wrapped, config.underlying, seed.exchange_rate)
                    .with_supply_rate(seed.supply_rate_per_block)
                    .with_accrual_block(self.block.number),
            );
        }

        let amm = ConstantProductAmm::new(self.config.amm_address, self.config.fee);
        let mut chain = Chain::new(Ledger::new(), markets, amm, self.block);

        for pool in &self.pools {
            self.seed_pool(&mut chain, pool)
                .with_context(|| format!("Failed to seed pool {}/{}", pool.market_a, pool.market_b))?;
        }

        for funding in &self.funding {
            let token = self.underlying(&funding.symbol)?;
            chain.ledger.mint(&token, &self.user, funding.amount)?;
        }

        let router = self.config.router_address;
        let approved = self
            .config
            .markets
            .iter()
            .map(|m| m.underlying)
            .chain(self.pools.iter().map(|p| p.pair));
        for token in approved {
            chain.ledger.approve(&token, &self.user, &router, MAX_ALLOWANCE);
        }

        tracing::info!(
            markets = self.markets.len(),
            pools = self.pools.len(),
            block = self.block.number,
            "Built simulated chain"
        );
        Ok(chain)
    }

    fn seed_pool(&self, chain: &mut SimulatedChain, pool: &PoolSeed) -> Result<()> {
        let provider = self.liquidity_provider;
        let market_a = self.market(&pool.market_a)?.wrapped;
        let market_b = self.market(&pool.market_b)?.wrapped;
        chain.amm.create_pair(market_a, market_b, pool.pair)?;

        let amm = chain.amm.address();
        let mut shares = [0; 2];
        for (slot, (market, amount)) in shares
            .iter_mut()
            .zip([(market_a, pool.underlying_a), (market_b, pool.underlying_b)])
        {
            let underlying = chain.markets.underlying(&market)?;
            chain.ledger.mint(&underlying, &provider, amount)?;
            chain.ledger.approve(&underlying, &provider, &market, amount);
            *slot = chain
                .markets
                .mint(&mut chain.ledger, &chain.block, &market, &provider, amount)?;
            chain.ledger.approve(&market, &provider, &amm, *slot);
        }

        let receipt = chain.amm.add_liquidity(
            &mut chain.ledger,
            &provider,
            &AddLiquidityParams {
                token_a: market_a,
                token_b: market_b,
                amount_a_desired: shares[0],
                amount_b_desired: shares[1],
                amount_a_min: 0,
                amount_b_min: 0,
                to: provider,
            },
        )?;
        tracing::debug!(
            pair = %pool.pair,
            wrapped_a = receipt.amount_a,
            wrapped_b = receipt.amount_b,
            liquidity = receipt.liquidity,
            "Seeded pool"
        );
        Ok(())
    }
}
