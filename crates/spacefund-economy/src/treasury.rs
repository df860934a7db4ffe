//! The treasury: session balance and its journal.
//!
//! # Design
//!
//! - **Append-only**: journal entries are never modified or removed.
//! - **No overdraft**: a debit that exceeds the balance is refused and
//!   leaves the treasury untouched.
//! - **Precision**: all amounts are [`Decimal`].

use rust_decimal::Decimal;
use serde::Serialize;
use spacefund_types::MissionId;
use tracing::debug;

use crate::EconomyError;

/// Why money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Base cost paid when a mission is accepted as offered.
    Launch,
    /// Full investment cost paid when a modified mission is accepted.
    Investment,
    /// Payout for an acknowledged successful mission.
    Reward,
}

/// One journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreasuryEntry {
    /// Mission the movement belongs to.
    pub mission_id: MissionId,
    /// Category of the movement.
    pub kind: EntryKind,
    /// Signed amount: negative for debits, positive for credits.
    pub amount: Decimal,
    /// Balance immediately after this entry.
    pub balance_after: Decimal,
}

/// Session balance plus the history of how it got there.
#[derive(Debug, Clone)]
pub struct Treasury {
    balance: Decimal,
    entries: Vec<TreasuryEntry>,
}

impl Treasury {
    /// Open a treasury with a starting balance.
    pub const fn new(initial: Decimal) -> Self {
        Self {
            balance: initial,
            entries: Vec::new(),
        }
    }

    /// Current balance.
    pub const fn balance(&self) -> Decimal {
        self.balance
    }

    /// Whether `amount` can be debited right now.
    pub fn can_afford(&self, amount: Decimal) -> bool {
        amount <= self.balance
    }

    /// All journal entries, oldest first.
    pub fn entries(&self) -> &[TreasuryEntry] {
        &self.entries
    }

    /// Take `amount` out of the balance. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InsufficientFunds`] if the balance is too
    /// low, or [`EconomyError::NegativeAmount`] for a negative amount.
    pub fn debit(
        &mut self,
        mission_id: MissionId,
        kind: EntryKind,
        amount: Decimal,
    ) -> Result<Decimal, EconomyError> {
        if amount.is_sign_negative() {
            return Err(EconomyError::NegativeAmount { amount });
        }
        if !self.can_afford(amount) {
            return Err(EconomyError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(EconomyError::Overflow { context: "debit" })?;
        self.record(mission_id, kind, -amount, balance);
        Ok(balance)
    }

    /// Add `amount` to the balance. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::NegativeAmount`] for a negative amount or
    /// [`EconomyError::Overflow`] if the balance would leave the range.
    pub fn credit(
        &mut self,
        mission_id: MissionId,
        kind: EntryKind,
        amount: Decimal,
    ) -> Result<Decimal, EconomyError> {
        if amount.is_sign_negative() {
            return Err(EconomyError::NegativeAmount { amount });
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(EconomyError::Overflow { context: "credit" })?;
        self.record(mission_id, kind, amount, balance);
        Ok(balance)
    }

    fn record(
        &mut self,
        mission_id: MissionId,
        kind: EntryKind,
        amount: Decimal,
        balance: Decimal,
    ) {
        debug!(mission_id = %mission_id, ?kind, %amount, %balance, "Treasury entry");
        self.balance = balance;
        self.entries.push(TreasuryEntry {
            mission_id,
            kind,
            amount,
            balance_after: balance,
        });
    }
}
