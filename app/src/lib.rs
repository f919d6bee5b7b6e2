//! Router simulator
//!
//! Replays a scenario of router calls against an in-memory chain and prints
//! the Transfer log of each call.

pub mod replay;
pub mod report;
pub mod scenario;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use ctoken_router::Router;

use report::Labels;

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("router_sim=debug".parse()?)
        .add_directive("ctoken_router=debug".parse()?)
        .add_directive("info".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Run the simulator
pub fn run() -> Result<()> {
    init_tracing()?;

    let scenario = scenario::load()?;
    tracing::info!(
        scenario = %scenario.name,
        network = %scenario.config.network,
        block = scenario.block.number,
        "Starting router simulation"
    );

    let mut chain = scenario.build_chain()?;
    let router = Router::new(scenario.config.router_address);
    let labels = Labels::from_scenario(&scenario);

    for (i, step) in scenario.steps.iter().enumerate() {
        let cursor = chain.ledger.event_count();
        let result = replay::execute(&scenario, &router, &mut chain, step)
            .with_context(|| format!("Step {} ({}) failed", i + 1, step.label()))?;

        println!("== {}. {} ==", i + 1, step.label());
        println!("{}", serde_json::to_string_pretty(&result)?);
        println!(
            "{}",
            report::transfer_table(&labels, &chain.ledger.transfers_since(cursor))
        );
    }

    for market in &scenario.config.markets {
        let snapshot = chain
            .markets
            .snapshot(&chain.ledger, &market.wrapped, &chain.block)
            .with_context(|| format!("Failed to read market {}", market.symbol))?;
        tracing::info!(
            market = %snapshot.symbol,
            rate = %snapshot.exchange_rate,
            cash = %labels.amount(&snapshot.underlying, snapshot.cash),
            supply = %labels.amount(&snapshot.wrapped, snapshot.total_supply),
            apr = snapshot.supply_apr,
            "Final market state"
        );
    }

    tracing::info!(
        events = chain.ledger.event_count(),
        block = chain.block.number,
        "Simulation complete"
    );
    Ok(())
}
