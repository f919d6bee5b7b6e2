//! Replays scenario steps through the router

use anyhow::Result;
use serde_json::{json, Value};

use amm::Amm;
use ctoken_router::{
    AddLiquidityRequest, ExactInSwap, ExactOutSwap, RemoveLiquidityRequest, Router, SimulatedChain,
};

use crate::scenario::{Scenario, Step};

/// Execute one step as the scenario's user and return its result as JSON
pub fn execute(
    scenario: &Scenario,
    router: &Router,
    chain: &mut SimulatedChain,
    step: &Step,
) -> Result<Value> {
    let user = scenario.user;
    let value = match step {
        Step::AddLiquidity {
            market_a,
            market_b,
            amount_a,
            amount_b,
            amount_a_min,
            amount_b_min,
        } => {
            let request = AddLiquidityRequest::new(
                scenario.market(market_a)?.wrapped,
                scenario.market(market_b)?.wrapped,
                *amount_a,
                *amount_b,
                *amount_a_min,
                *amount_b_min,
            );
            serde_json::to_value(router.mint_wrapped_and_add_liquidity(chain, &user, &request)?)?
        }
        Step::SwapExactIn {
            path,
            amount_in,
            amount_out_min,
        } => {
            let path = scenario.path(path)?;
            let preview = router.quote_exact_in(chain, &path, *amount_in)?;
            let hops = chain.amm.quote_path(preview.wrapped_in(), path.as_slice())?;
            tracing::debug!(
                expected_out = preview.amount_out,
                price_impact = hops.total_price_impact(),
                "Swap preview"
            );
            let request = ExactInSwap {
                amount_in: *amount_in,
                amount_out_min: *amount_out_min,
                path,
            };
            serde_json::to_value(router.swap_exact_underlying_for_underlying(chain, &user, &request)?)?
        }
        Step::SwapExactOut {
            path,
            amount_out,
            amount_in_max,
        } => {
            let path = scenario.path(path)?;
            let amount_in_max = match amount_in_max {
                Some(max) => *max,
                None => router.quote_exact_out(chain, &path, *amount_out)?.amount_in,
            };
            let request = ExactOutSwap {
                amount_out: *amount_out,
                amount_in_max,
                path,
            };
            serde_json::to_value(router.swap_underlying_for_exact_underlying(chain, &user, &request)?)?
        }
        Step::RemoveLiquidity {
            market_a,
            market_b,
            liquidity,
            amount_a_min,
            amount_b_min,
        } => {
            let market_a = scenario.market(market_a)?.wrapped;
            let market_b = scenario.market(market_b)?.wrapped;
            let pool = chain.amm.pair_for(&market_a, &market_b)?;
            let liquidity = liquidity.unwrap_or_else(|| chain.ledger.balance_of(&pool, &user));
            let request = RemoveLiquidityRequest {
                market_a,
                market_b,
                pool,
                liquidity,
                amount_a_min: *amount_a_min,
                amount_b_min: *amount_b_min,
            };
            serde_json::to_value(router.remove_liquidity_and_redeem(chain, &user, &request)?)?
        }
        Step::AdvanceBlocks { blocks } => {
            chain.advance_blocks(*blocks, scenario.block_time_secs);
            json!({ "block": chain.block.number, "timestamp": chain.block.timestamp })
        }
    };
    Ok(value)
}
