//! Path Quoting
//!
//! Resolves a token path into oriented pool edges and quotes it. Exact-in
//! quoting is a left fold over the hops, exact-out quoting a right fold.

use router_core::{Address, Amount, FeeConfig};

use crate::calculator::{calculate_price_impact, get_amount_in, get_amount_out};
use crate::state::{AmmError, HopQuote, Pair, PathQuote};

/// A pair oriented for one hop of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEdge {
    pub pair: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub reserve_in: Amount,
    pub reserve_out: Amount,
    pub fee: FeeConfig,
}

impl PoolEdge {
    /// Orient `pair` for a trade from `token_in`
    pub fn from_pair(pair: &Pair, token_in: &Address) -> Option<Self> {
        let (reserve_in, reserve_out) = pair.reserves_for(token_in)?;
        Some(Self {
            pair: pair.address,
            token_in: *token_in,
            token_out: pair.other(token_in)?,
            reserve_in,
            reserve_out,
            fee: pair.fee,
        })
    }
}

/// Resolve every consecutive pair of `path` to an oriented edge.
///
/// `lookup` returns the pair for two tokens in either order. A pair may
/// appear only once: hops are quoted against reserves read up front.
pub fn resolve_path<'a, F>(path: &[Address], lookup: F) -> Result<Vec<PoolEdge>, AmmError>
where
    F: Fn(&Address, &Address) -> Option<&'a Pair>,
{
    if path.len() < 2 {
        return Err(AmmError::InvalidPath(format!(
            "path needs at least 2 tokens, got {}",
            path.len()
        )));
    }

    let edges = path
        .windows(2)
        .map(|hop| {
            let (token_in, token_out) = (&hop[0], &hop[1]);
            if token_in == token_out {
                return Err(AmmError::InvalidPath(format!(
                    "token {} repeats in adjacent hops",
                    token_in
                )));
            }
            lookup(token_in, token_out)
                .and_then(|pair| PoolEdge::from_pair(pair, token_in))
                .ok_or(AmmError::PairNotFound {
                    token_a: *token_in,
                    token_b: *token_out,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (i, edge) in edges.iter().enumerate() {
        if edges[..i].iter().any(|seen| seen.pair == edge.pair) {
            return Err(AmmError::InvalidPath(format!(
                "pair {} used twice",
                edge.pair
            )));
        }
    }
    Ok(edges)
}

/// Amounts along `edges` for an exact input.
///
/// Returns `[amount_in, out_hop_0, out_hop_1, ...]`.
pub fn amounts_out(edges: &[PoolEdge], amount_in: Amount) -> Result<Vec<Amount>, AmmError> {
    let mut amounts = Vec::with_capacity(edges.len() + 1);
    amounts.push(amount_in);
    edges.iter().try_fold(amount_in, |current, edge| {
        let output = get_amount_out(current, edge.reserve_in, edge.reserve_out, &edge.fee)?;
        amounts.push(output);
        Ok::<_, AmmError>(output)
    })?;
    Ok(amounts)
}

/// Amounts along `edges` for an exact output, worked backwards from the
/// last hop.
///
/// Returns `[required_in, ..., amount_out]`.
pub fn amounts_in(edges: &[PoolEdge], amount_out: Amount) -> Result<Vec<Amount>, AmmError> {
    let mut amounts = Vec::with_capacity(edges.len() + 1);
    amounts.push(amount_out);
    edges.iter().rev().try_fold(amount_out, |needed, edge| {
        let input = get_amount_in(needed, edge.reserve_in, edge.reserve_out, &edge.fee)?;
        amounts.push(input);
        Ok::<_, AmmError>(input)
    })?;
    amounts.reverse();
    Ok(amounts)
}

/// Per-hop detail for amounts produced by `amounts_out` or `amounts_in`
pub fn describe_route(edges: &[PoolEdge], amounts: Vec<Amount>) -> PathQuote {
    let hops = edges
        .iter()
        .zip(amounts.windows(2))
        .map(|(edge, pair_amounts)| HopQuote {
            pair: edge.pair,
            token_in: edge.token_in,
            token_out: edge.token_out,
            amount_in: pair_amounts[0],
            amount_out: pair_amounts[1],
            reserve_in: edge.reserve_in,
            reserve_out: edge.reserve_out,
            price_impact: calculate_price_impact(
                edge.reserve_in,
                edge.reserve_out,
                pair_amounts[0],
                pair_amounts[1],
            ),
        })
        .collect();
    PathQuote { hops, amounts }
}

/// Quote a route for an exact input
pub fn quote_route(edges: &[PoolEdge], amount_in: Amount) -> Result<PathQuote, AmmError> {
    Ok(describe_route(edges, amounts_out(edges, amount_in)?))
}

/// Quote a route for an exact output
pub fn quote_route_reverse(edges: &[PoolEdge], amount_out: Amount) -> Result<PathQuote, AmmError> {
    Ok(describe_route(edges, amounts_in(edges, amount_out)?))
}
