//! Transfer log rendering

use std::collections::HashMap;

use amm::lp;
use router_core::{format_units, Address, Amount, Transfer};

use crate::scenario::Scenario;

/// Display names for the tokens and accounts of a scenario
#[derive(Debug, Clone, Default)]
pub struct Labels {
    tokens: HashMap<Address, (String, u8)>,
    accounts: HashMap<Address, String>,
}

impl Labels {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut labels = Self::default();
        for market in &scenario.config.markets {
            for token in [market.wrapped, market.underlying] {
                if let Some((symbol, decimals)) = scenario.config.token_metadata(&token) {
                    labels.tokens.insert(token, (symbol.to_string(), decimals));
                }
            }
        }
        for pool in &scenario.pools {
            let name = format!("{}-{} LP", pool.market_a, pool.market_b);
            labels.tokens.insert(pool.pair, (name, lp::DECIMALS));
        }
        labels.accounts.insert(scenario.user, "User".to_string());
        labels
            .accounts
            .insert(scenario.config.router_address, "Router".to_string());
        labels
            .accounts
            .insert(scenario.config.amm_address, "AMM".to_string());
        labels
            .accounts
            .insert(scenario.liquidity_provider, "Provider".to_string());
        labels.accounts.insert(Address::ZERO, "0x0".to_string());
        labels
    }

    pub fn token(&self, token: &Address) -> (String, u8) {
        self.tokens
            .get(token)
            .cloned()
            .unwrap_or_else(|| (token.short(), 18))
    }

    /// Account name, falling back to the token symbol for contracts that
    /// are themselves tokens (markets and pairs)
    pub fn account(&self, account: &Address) -> String {
        if let Some(name) = self.accounts.get(account) {
            return name.clone();
        }
        match self.tokens.get(account) {
            Some((symbol, _)) => symbol.clone(),
            None => account.short(),
        }
    }

    pub fn amount(&self, token: &Address, amount: Amount) -> String {
        let (_, decimals) = self.token(token);
        format_units(amount, decimals)
    }
}

/// Table of transfers: index, token, from, to, formatted amount
pub fn transfer_table(labels: &Labels, transfers: &[Transfer]) -> String {
    let mut out = format!(
        "{:>3}  {:<16} {:<16} {:<16} {:>24}\n",
        "#", "token", "from", "to", "amount"
    );
    for (i, transfer) in transfers.iter().enumerate() {
        let (symbol, _) = labels.token(&transfer.token);
        out.push_str(&format!(
            "{:>3}  {:<16} {:<16} {:<16} {:>24}\n",
            i,
            symbol,
            labels.account(&transfer.from),
            labels.account(&transfer.to),
            labels.amount(&transfer.token, transfer.amount),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::DEFAULT_SCENARIO;

    #[test]
    fn test_reference_mint_row() {
        let scenario = Scenario::from_json(DEFAULT_SCENARIO).unwrap();
        let labels = Labels::from_scenario(&scenario);
        let kusdc = scenario.market("kUSDC").unwrap().wrapped;
        let table = transfer_table(
            &labels,
            &[Transfer {
                token: kusdc,
                from: kusdc,
                to: scenario.config.router_address,
                amount: 49152601725,
            }],
        );
        let row = table.lines().nth(1).unwrap();
        assert!(row.contains("kUSDC"));
        assert!(row.contains("Router"));
        assert!(row.ends_with("491.52601725"));
    }

    #[test]
    fn test_unknown_token_falls_back_to_short_address() {
        let labels = Labels::default();
        let token = Address::from_low_u64(0xabcdef);
        assert_eq!(labels.token(&token), (token.short(), 18));
        assert_eq!(labels.account(&token), token.short());
    }

    #[test]
    fn test_lp_label() {
        let scenario = Scenario::from_json(DEFAULT_SCENARIO).unwrap();
        let labels = Labels::from_scenario(&scenario);
        let (name, decimals) = labels.token(&scenario.pools[0].pair);
        assert_eq!(name, "kUSDC-kUSDT LP");
        assert_eq!(decimals, 18);
    }
}
