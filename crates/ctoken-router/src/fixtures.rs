//! Test chains shaped like the reference fork: kUSDC/kUSDT/kDAI markets,
//! a kUSDC/kUSDT pool and a kUSDT/kDAI pool, and a funded user who has
//! approved the router for everything.

use amm::{AddLiquidityParams, Amm, AmmError, ConstantProductAmm, LiquidityReceipt, RemoveLiquidityParams};
use lending::{ExchangeRate, LendingMarket, MarketBook, MarketState};
use router_core::constants::MAX_ALLOWANCE;
use router_core::{Address, Amount, BlockContext, FeeConfig, Ledger};

use crate::chain::{Chain, SimulatedChain};

pub const KUSDC_RATE: u128 = 203_448_030_196_818;
pub const KUSDT_RATE: u128 = 202_482_087_317_006;
/// 0.02 DAI per share, 18-decimal underlying
pub const KDAI_RATE: u128 = 200_000_000_000_000_000_000_000_000;

pub const BLOCK: u64 = 4_123_456;
pub const TIMESTAMP: u64 = 1_680_000_000;

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

pub fn kusdc() -> Address {
    addr("0x6D11F074131E3FC61C983cCe538F5D0ca3553c0F")
}

pub fn kusdt() -> Address {
    addr("0x4b45B1905Cd1dC18eDad134d2E43f5043e1E157c")
}

pub fn kdai() -> Address {
    Address::from_low_u64(0xda1)
}

pub fn usdc() -> Address {
    addr("0xEA32A96608495e54156Ae48931A7c20f0dcc1a21")
}

pub fn usdt() -> Address {
    addr("0xbB06DCA3AE6887fAbF931640f67cab3e3a16F4dC")
}

pub fn dai() -> Address {
    Address::from_low_u64(0xda1da1)
}

/// kUSDC/kUSDT pair (and LP token)
pub fn pair() -> Address {
    addr("0x9bAC88E258aE21C4ab0E3C0B80927FbCe6c8B1aA")
}

/// kUSDT/kDAI pair
pub fn dai_pair() -> Address {
    Address::from_low_u64(0x9a1)
}

pub fn amm() -> Address {
    addr("0x63b48547A3A00CA8CddE2B32acB9d0d89Ee2B01c")
}

pub fn user() -> Address {
    addr("0xE44dB4A31be18f97647585Bf70e69973556C3C91")
}

pub fn router() -> Address {
    Address::from_low_u64(0x7e57)
}

pub fn provider() -> Address {
    Address::from_low_u64(0x1001)
}

pub fn all_tokens() -> Vec<Address> {
    vec![usdc(), usdt(), dai(), kusdc(), kusdt(), kdai(), pair(), dai_pair()]
}

pub struct Fixture {
    pub chain: SimulatedChain,
    pub router: Address,
    pub user: Address,
}

/// Reference chain with fixed exchange rates
pub fn reference() -> Fixture {
    with_supply_rate(0)
}

/// Reference chain whose markets accrue `supply_rate_per_block`
pub fn with_supply_rate(supply_rate_per_block: u128) -> Fixture {
    let market = |symbol: &str, wrapped, underlying, mantissa| {
        MarketState::new(symbol, wrapped, underlying, ExchangeRate::from_mantissa(mantissa))
            .with_supply_rate(supply_rate_per_block)
            .with_accrual_block(BLOCK)
    };
    let markets = MarketBook::new()
        .with_market(market("kUSDC", kusdc(), usdc(), KUSDC_RATE))
        .with_market(market("kUSDT", kusdt(), usdt(), KUSDT_RATE))
        .with_market(market("kDAI", kdai(), dai(), KDAI_RATE));

    let mut exchange = ConstantProductAmm::new(amm(), FeeConfig::default());
    exchange.create_pair(kusdc(), kusdt(), pair()).unwrap();
    exchange.create_pair(kusdt(), kdai(), dai_pair()).unwrap();

    let mut chain = Chain::new(
        Ledger::new(),
        markets,
        exchange,
        BlockContext::new(BLOCK, TIMESTAMP),
    );

    const DAI: Amount = 1_000_000_000_000_000_000;
    seed_pool(&mut chain, kusdc(), 1_000_000_000000, kusdt(), 1_000_000_000000);
    seed_pool(&mut chain, kusdt(), 1_000_000_000000, kdai(), 1_000_000 * DAI);

    let user = user();
    let router = router();
    for (token, amount) in [(usdc(), 1_000_000000), (usdt(), 1_000_000000), (dai(), 1_000 * DAI)] {
        chain.ledger.mint(&token, &user, amount).unwrap();
    }
    for token in all_tokens() {
        chain.ledger.approve(&token, &user, &router, MAX_ALLOWANCE);
    }

    Fixture {
        chain,
        router,
        user,
    }
}

/// Mint both underlyings to the provider, wrap them through the markets,
/// and deposit the shares as the pool's first liquidity.
fn seed_pool(
    chain: &mut SimulatedChain,
    market_a: Address,
    amount_a: Amount,
    market_b: Address,
    amount_b: Amount,
) {
    let provider = provider();
    let amm = chain.amm.address();
    let mut shares = [0; 2];
    for (i, (market, amount)) in [(market_a, amount_a), (market_b, amount_b)].into_iter().enumerate() {
        let underlying = chain.markets.underlying(&market).unwrap();
        chain.ledger.mint(&underlying, &provider, amount).unwrap();
        chain.ledger.approve(&underlying, &provider, &market, amount);
        shares[i] = chain
            .markets
            .mint(&mut chain.ledger, &chain.block, &market, &provider, amount)
            .unwrap();
        chain.ledger.approve(&market, &provider, &amm, shares[i]);
    }
    chain
        .amm
        .add_liquidity(
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
        )
        .unwrap();
}

/// AMM that quotes fixed amounts and settles nothing, for bound checks
#[derive(Debug, Clone)]
pub struct StubAmm {
    pub amounts_out: Vec<Amount>,
    pub amounts_in: Vec<Amount>,
}

impl Amm for StubAmm {
    fn address(&self) -> Address {
        amm()
    }

    fn pair_for(&self, _token_a: &Address, _token_b: &Address) -> Result<Address, AmmError> {
        Ok(pair())
    }

    fn get_reserves(&self, _: &Address, _: &Address) -> Result<(Amount, Amount), AmmError> {
        Ok((0, 0))
    }

    fn get_amounts_out(&self, _: Amount, _: &[Address]) -> Result<Vec<Amount>, AmmError> {
        Ok(self.amounts_out.clone())
    }

    fn get_amounts_in(&self, _: Amount, _: &[Address]) -> Result<Vec<Amount>, AmmError> {
        Ok(self.amounts_in.clone())
    }

    fn add_liquidity(
        &mut self,
        _: &mut Ledger,
        _: &Address,
        _: &AddLiquidityParams,
    ) -> Result<LiquidityReceipt, AmmError> {
        Err(AmmError::InsufficientLiquidity)
    }

    fn remove_liquidity(
        &mut self,
        _: &mut Ledger,
        _: &Address,
        _: &RemoveLiquidityParams,
    ) -> Result<(Amount, Amount), AmmError> {
        Err(AmmError::InsufficientLiquidity)
    }

    fn swap_exact_tokens_for_tokens(
        &mut self,
        _: &mut Ledger,
        _: &Address,
        _: Amount,
        _: Amount,
        _: &[Address],
        _: &Address,
    ) -> Result<Vec<Amount>, AmmError> {
        Err(AmmError::InsufficientLiquidity)
    }
}

/// Reference markets in front of a stub AMM
pub fn stubbed(amounts_out: Vec<Amount>, amounts_in: Vec<Amount>) -> Chain<MarketBook, StubAmm> {
    let Fixture { chain, .. } = reference();
    Chain::new(
        chain.ledger,
        chain.markets,
        StubAmm {
            amounts_out,
            amounts_in,
        },
        chain.block,
    )
}
