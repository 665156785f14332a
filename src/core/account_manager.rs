//! Account management module
//!
//! This module provides the `AccountManager` struct which maintains the cash
//! and points balances of every user.
//!
//! # Design
//!
//! The `AccountManager` uses `DashMap` to provide per-account locking. Every
//! read-modify-write runs inside [`AccountManager::update`], which holds the
//! entry lock for the whole closure, so two redemptions for the same user
//! cannot both pass the balance check and overdraw the account.
//!
//! All balance arithmetic is checked; a failed operation leaves the account
//! exactly as it was.

use crate::types::{Account, UserId, WasteBankError};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Thread-safe ledger of user accounts
#[derive(Debug, Default)]
pub struct AccountManager {
    /// Map of user IDs to account states
    accounts: DashMap<UserId, Account>,
}

impl AccountManager {
    /// Create a new AccountManager with no accounts
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Rebuild the ledger from persisted accounts
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.user_id.clone(), account))
                .collect(),
        }
    }

    /// Get a snapshot of an existing account
    pub fn get(&self, user_id: &str) -> Option<Account> {
        self.accounts.get(user_id).map(|entry| entry.value().clone())
    }

    /// Update an account using a closure
    ///
    /// The account is created if it does not exist yet. The closure runs on a
    /// scratch copy while the entry lock is held; the copy is written back only
    /// if the closure succeeds, so an error never leaves a half-applied change.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user whose account is updated
    /// * `f` - Mutation applied to the account; anything it touches through
    ///   other stores also runs under the entry lock
    ///
    /// # Returns
    ///
    /// * `Ok(Account)` - The account state after the update
    /// * `Err(WasteBankError)` - Whatever the closure returned
    pub fn update<F>(&self, user_id: &str, f: F) -> Result<Account, WasteBankError>
    where
        F: FnOnce(&mut Account) -> Result<(), WasteBankError>,
    {
        let mut entry = self
            .accounts
            .entry(user_id.to_string())
            .or_insert_with(|| Account::new(user_id));

        let mut scratch = entry.value().clone();
        f(&mut scratch)?;
        *entry.value_mut() = scratch.clone();
        Ok(scratch)
    }

    /// Credit cash and points from a deposit
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if any counter would overflow.
    pub fn credit(
        &self,
        user_id: &str,
        amount: Decimal,
        points: u64,
        weight_kg: Decimal,
    ) -> Result<Account, WasteBankError> {
        self.update(user_id, |account| {
            let overflow = || WasteBankError::arithmetic_overflow("deposit", user_id);

            account.balance = account.balance.checked_add(amount).ok_or_else(overflow)?;
            account.points = account.points.checked_add(points).ok_or_else(overflow)?;
            account.total_deposits = account.total_deposits.checked_add(1).ok_or_else(overflow)?;
            account.total_weight_kg = account
                .total_weight_kg
                .checked_add(weight_kg)
                .ok_or_else(overflow)?;
            Ok(())
        })
    }

    /// Undo a deposit credit
    ///
    /// Subtracts exactly what [`credit`](Self::credit) added, so it stays
    /// correct when other operations touched the account in between.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticUnderflow` if the account no longer holds the credit.
    pub fn reverse_credit(
        &self,
        user_id: &str,
        amount: Decimal,
        points: u64,
        weight_kg: Decimal,
    ) -> Result<Account, WasteBankError> {
        self.update(user_id, |account| {
            let underflow = || WasteBankError::arithmetic_underflow("deposit reversal", user_id);

            account.balance = account.balance.checked_sub(amount).ok_or_else(underflow)?;
            if account.balance.is_sign_negative() {
                return Err(underflow());
            }
            account.points = account.points.checked_sub(points).ok_or_else(underflow)?;
            account.total_deposits = account.total_deposits.checked_sub(1).ok_or_else(underflow)?;
            account.total_weight_kg = account
                .total_weight_kg
                .checked_sub(weight_kg)
                .ok_or_else(underflow)?;
            Ok(())
        })
    }

    /// Withdraw cash from an account
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is zero or negative
    /// - The amount exceeds the cash balance
    pub fn withdraw(&self, user_id: &str, amount: Decimal) -> Result<Account, WasteBankError> {
        if amount <= Decimal::ZERO {
            return Err(WasteBankError::invalid_amount(amount, user_id));
        }

        self.update(user_id, |account| {
            if account.balance < amount {
                return Err(WasteBankError::insufficient_funds(
                    user_id,
                    account.balance,
                    amount,
                ));
            }

            account.balance = account
                .balance
                .checked_sub(amount)
                .ok_or_else(|| WasteBankError::arithmetic_underflow("withdrawal", user_id))?;
            Ok(())
        })
    }

    /// Take points out of an account
    ///
    /// Intended to be called from inside an [`update`](Self::update) closure so
    /// the check and the debit happen under the same lock.
    pub fn debit_points(account: &mut Account, points: u64) -> Result<(), WasteBankError> {
        if account.points < points {
            return Err(WasteBankError::insufficient_balance(
                &account.user_id,
                account.points,
                points,
            ));
        }
        account.points = account
            .points
            .checked_sub(points)
            .ok_or_else(|| WasteBankError::arithmetic_underflow("redeem", &account.user_id))?;
        Ok(())
    }

    /// Get all accounts sorted by user ID
    pub fn get_all_accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_update_creates_missing_account() {
        let manager = AccountManager::new();

        let account = manager.update("u1", |_| Ok(())).unwrap();

        assert_eq!(account.user_id, "u1");
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.points, 0);
        assert_eq!(manager.get_all_accounts().len(), 1);
    }

    #[test]
    fn test_reverse_credit_undoes_only_that_credit() {
        let manager = AccountManager::new();
        manager
            .credit("u1", Decimal::new(3000, 0), 10, Decimal::ONE)
            .unwrap();
        manager
            .credit("u1", Decimal::new(6000, 0), 40, Decimal::new(4, 0))
            .unwrap();

        let account = manager
            .reverse_credit("u1", Decimal::new(6000, 0), 40, Decimal::new(4, 0))
            .unwrap();

        assert_eq!(account.balance, Decimal::new(3000, 0));
        assert_eq!(account.points, 10);
        assert_eq!(account.total_deposits, 1);
        assert_eq!(account.total_weight_kg, Decimal::ONE);
    }

    #[test]
    fn test_reverse_credit_refuses_to_go_negative() {
        let manager = AccountManager::new();
        manager
            .credit("u1", Decimal::new(3000, 0), 10, Decimal::ONE)
            .unwrap();
        manager.withdraw("u1", Decimal::new(2500, 0)).unwrap();

        let err = manager
            .reverse_credit("u1", Decimal::new(3000, 0), 10, Decimal::ONE)
            .unwrap_err();

        assert!(matches!(err, WasteBankError::ArithmeticUnderflow { .. }));
        assert_eq!(manager.get("u1").unwrap().balance, Decimal::new(500, 0));
    }

    #[test]
    fn test_get_does_not_create() {
        let manager = AccountManager::new();
        assert!(manager.get("u1").is_none());
        assert!(manager.get_all_accounts().is_empty());
    }

    #[test]
    fn test_credit_accumulates() {
        let manager = AccountManager::new();

        manager
            .credit("u1", Decimal::new(750000, 2), 25, Decimal::new(25, 1))
            .unwrap();
        let account = manager
            .credit("u1", Decimal::new(250000, 2), 10, Decimal::new(1, 0))
            .unwrap();

        assert_eq!(account.balance, Decimal::new(10000, 0));
        assert_eq!(account.points, 35);
        assert_eq!(account.total_deposits, 2);
        assert_eq!(account.total_weight_kg, Decimal::new(35, 1));
    }

    #[test]
    fn test_credit_overflow_leaves_account_unchanged() {
        let manager = AccountManager::new();
        manager
            .update("u1", |account| {
                account.points = u64::MAX;
                Ok(())
            })
            .unwrap();

        let result = manager.credit("u1", Decimal::ONE, 1, Decimal::ONE);

        assert!(matches!(
            result,
            Err(WasteBankError::ArithmeticOverflow { .. })
        ));
        let account = manager.get("u1").unwrap();
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.points, u64::MAX);
        assert_eq!(account.total_deposits, 0);
    }

    #[test]
    fn test_withdraw_decreases_balance() {
        let manager = AccountManager::new();
        manager
            .credit("u1", Decimal::new(10000, 0), 0, Decimal::ONE)
            .unwrap();

        let account = manager.withdraw("u1", Decimal::new(4000, 0)).unwrap();
        assert_eq!(account.balance, Decimal::new(6000, 0));
    }

    #[test]
    fn test_withdraw_insufficient_funds() {
        let manager = AccountManager::new();
        manager
            .credit("u1", Decimal::new(500, 0), 0, Decimal::ONE)
            .unwrap();

        let result = manager.withdraw("u1", Decimal::new(1000, 0));
        assert_eq!(
            result.unwrap_err(),
            WasteBankError::insufficient_funds("u1", Decimal::new(500, 0), Decimal::new(1000, 0))
        );
        assert_eq!(manager.get("u1").unwrap().balance, Decimal::new(500, 0));
    }

    #[test]
    fn test_withdraw_rejects_non_positive_amount() {
        let manager = AccountManager::new();
        assert!(matches!(
            manager.withdraw("u1", Decimal::ZERO),
            Err(WasteBankError::InvalidAmount { .. })
        ));
        assert!(manager.get("u1").is_none());
    }

    #[test]
    fn test_debit_points() {
        let mut account = Account::new("u1");
        account.points = 5000;

        AccountManager::debit_points(&mut account, 2000).unwrap();
        assert_eq!(account.points, 3000);

        let err = AccountManager::debit_points(&mut account, 3001).unwrap_err();
        assert_eq!(err, WasteBankError::insufficient_balance("u1", 3000, 3001));
        assert_eq!(account.points, 3000);
    }

    #[test]
    fn test_from_accounts_restores_state() {
        let mut account = Account::new("u2");
        account.points = 42;
        let manager = AccountManager::from_accounts(vec![Account::new("u1"), account]);

        let all = manager.get_all_accounts();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].user_id, "u1");
        assert_eq!(all[1].points, 42);
    }

    #[test]
    fn test_concurrent_debits_never_overdraw() {
        let manager = Arc::new(AccountManager::new());
        manager
            .update("u1", |account| {
                account.points = 1000;
                Ok(())
            })
            .unwrap();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || {
                    manager
                        .update("u1", |account| AccountManager::debit_points(account, 100))
                        .is_ok()
                })
            })
            .collect();

        let succeeded = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(succeeded, 10);
        assert_eq!(manager.get("u1").unwrap().points, 0);
    }
}
