//! Account-related types for the waste bank
//!
//! This module defines the Account structure holding a user's cash balance
//! and reward points.

use super::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// User account state
///
/// Cash and points are tracked independently: deposits credit both,
/// withdrawals debit cash and redemptions debit points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Owning user
    pub user_id: UserId,

    /// Cash balance available for withdrawal
    pub balance: Decimal,

    /// Reward points available for redemption
    ///
    /// Debited once per redemption at creation time and never re-credited.
    pub points: u64,

    /// Number of deposits credited to this account
    #[serde(default)]
    pub total_deposits: u32,

    /// Total weight of waste deposited, in kilograms
    #[serde(default)]
    pub total_weight_kg: Decimal,
}

impl Account {
    /// Create a new account with zero balances
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Account {
            user_id: user_id.into(),
            balance: Decimal::ZERO,
            points: 0,
            total_deposits: 0,
            total_weight_kg: Decimal::ZERO,
        }
    }
}
