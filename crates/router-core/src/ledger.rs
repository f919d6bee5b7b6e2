//! Token Ledger
//!
//! In-memory ERC20 state shared by every token in the environment:
//! balances, allowances, total supplies, and the Transfer/Approval log.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_ALLOWANCE;
use crate::errors::LedgerError;
use crate::types::{Address, Amount};

/// Event emitted by a ledger mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approval {
        token: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    },
}

/// A Transfer event, flattened for assertions and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

/// ERC20 balances, allowances and supplies for all tokens
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<(Address, Address), Amount>,
    allowances: HashMap<(Address, Address, Address), Amount>,
    supplies: HashMap<Address, Amount>,
    events: Vec<LedgerEvent>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, token: &Address, holder: &Address) -> Amount {
        self.balances.get(&(*token, *holder)).copied().unwrap_or(0)
    }

    pub fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*token, *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self, token: &Address) -> Amount {
        self.supplies.get(token).copied().unwrap_or(0)
    }

    /// Set `spender`'s allowance over `owner`'s `token` (overwrites)
    pub fn approve(&mut self, token: &Address, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances.insert((*token, *owner, *spender), amount);
        self.events.push(LedgerEvent::Approval {
            token: *token,
            owner: *owner,
            spender: *spender,
            amount,
        });
    }

    /// Move `amount` of `token` from `from` to `to`
    pub fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token: *token,
                holder: *from,
                required: amount,
                available,
            });
        }
        if from != to {
            let to_balance = self
                .balance_of(token, to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow { token: *token })?;
            self.set_balance(token, from, available - amount);
            self.set_balance(token, to, to_balance);
        }
        self.events.push(LedgerEvent::Transfer {
            token: *token,
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Move `amount` of `token` from `from` to `to` on behalf of `spender`,
    /// consuming allowance. An unlimited allowance is left untouched.
    pub fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(token, from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                token: *token,
                owner: *from,
                spender: *spender,
                required: amount,
                available: allowed,
            });
        }
        self.transfer(token, from, to, amount)?;
        if allowed != MAX_ALLOWANCE {
            self.allowances
                .insert((*token, *from, *spender), allowed - amount);
        }
        Ok(())
    }

    /// Create `amount` of `token` for `to` (Transfer from the zero address)
    pub fn mint(&mut self, token: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.issue(token, &Address::ZERO, to, amount)
    }

    /// Create `amount` of `token` for `to`, logging the Transfer as coming
    /// from `issuer` (cToken markets report mints from their own address)
    pub fn issue(
        &mut self,
        token: &Address,
        issuer: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let supply = self
            .total_supply(token)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { token: *token })?;
        let balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { token: *token })?;
        self.supplies.insert(*token, supply);
        self.set_balance(token, to, balance);
        self.events.push(LedgerEvent::Transfer {
            token: *token,
            from: *issuer,
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Destroy `amount` of `from`'s `token` (Transfer to the zero address)
    pub fn burn(&mut self, token: &Address, from: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.retire(token, from, &Address::ZERO, amount)
    }

    /// Destroy `amount` of `from`'s `token`, logging the Transfer as going
    /// to `retirer`
    pub fn retire(
        &mut self,
        token: &Address,
        from: &Address,
        retirer: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token: *token,
                holder: *from,
                required: amount,
                available,
            });
        }
        self.set_balance(token, from, available - amount);
        let supply = self.total_supply(token).saturating_sub(amount);
        self.supplies.insert(*token, supply);
        self.events.push(LedgerEvent::Transfer {
            token: *token,
            from: *from,
            to: *retirer,
            amount,
        });
        Ok(())
    }

    /// Number of events logged so far; use as a cursor for `events_since`
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn events_since(&self, cursor: usize) -> &[LedgerEvent] {
        &self.events[cursor.min(self.events.len())..]
    }

    /// Transfer events logged after `cursor`, in order
    pub fn transfers_since(&self, cursor: usize) -> Vec<Transfer> {
        self.events_since(cursor)
            .iter()
            .filter_map(|event| match event {
                LedgerEvent::Transfer {
                    token,
                    from,
                    to,
                    amount,
                } => Some(Transfer {
                    token: *token,
                    from: *from,
                    to: *to,
                    amount: *amount,
                }),
                LedgerEvent::Approval { .. } => None,
            })
            .collect()
    }

    fn set_balance(&mut self, token: &Address, holder: &Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(&(*token, *holder));
        } else {
            self.balances.insert((*token, *holder), amount);
        }
    }
}
