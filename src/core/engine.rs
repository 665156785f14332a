//! Waste bank engine
//!
//! This module provides the `WasteBank` that orchestrates every ledger
//! operation by coordinating the `AccountManager`, `RedemptionStore` and
//! `DepositLog`, the remote [`RedemptionGateway`] and the [`SnapshotStore`].
//!
//! # Redemption workflow
//!
//! 1. [`WasteBank::redeem`] debits points and appends a `pending` record.
//!    It never touches the network.
//! 2. [`WasteBank::reconcile`] asks the remote service to settle one record.
//!    A transport failure leaves the record pending.
//! 3. [`WasteBank::sync_pending`] sweeps every pending record with one batch
//!    call, falling back to one reconcile per record when the batch call fails.
//!
//! Points are debited once when the record is created and are never credited
//! back, whatever the remote decides.
//!
//! # Persistence
//!
//! Every successful mutation re-serialises the whole ledger. Saves are
//! serialised through `write_lock` and the snapshot is taken after the lock is
//! acquired, so the last save always carries the latest state.
//!
//! A mutation whose save fails is undone in memory before the storage error
//! is returned: a redemption is removed and its points credited back, a
//! settlement goes back to `pending`, a deposit is released and reversed, a
//! withdrawal is paid back in. Undo steps are relative adjustments, so changes
//! made by other operations in the meantime are kept.

use crate::core::{AccountManager, DepositLog, RedemptionStore};
use crate::gateway::{BatchRequest, RedemptionGateway, RedemptionRequest};
use crate::io::{Snapshot, SnapshotStore};
use crate::types::{
    Account, DepositPayload, DepositRecord, RedemptionRecord, RedemptionStatus, Reward,
    WasteBankError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Result of [`WasteBank::redeem_and_reconcile`]
#[derive(Debug, Clone, PartialEq)]
pub struct RedeemOutcome {
    /// Latest state of the new record
    pub record: RedemptionRecord,
    /// Why the immediate reconciliation did not resolve, if it did not
    pub unresolved: Option<WasteBankError>,
}

/// Summary of a [`WasteBank::sync_pending`] sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Pending records found at the start of the sweep
    pub attempted: usize,
    /// Records that left `pending` during the sweep
    pub resolved: usize,
    /// Whether the per-record fallback was used
    pub fallback: bool,
}

pub struct WasteBank {
    accounts: AccountManager,
    redemptions: RedemptionStore,
    deposits: DepositLog,
    gateway: Arc<dyn RedemptionGateway>,
    store: Arc<dyn SnapshotStore>,
    write_lock: Mutex<()>,
}

impl WasteBank {
    /// Load the ledger from `store`
    ///
    /// # Arguments
    ///
    /// * `gateway` - Client for the remote order-processing service
    /// * `store` - Where the ledger is loaded from and saved to
    ///
    /// # Returns
    ///
    /// * `Ok(WasteBank)` - The ledger as last saved (empty if never saved)
    /// * `Err(WasteBankError)` - If the store could not be read
    pub async fn open(
        gateway: Arc<dyn RedemptionGateway>,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<Self, WasteBankError> {
        let snapshot = store.load().await?;
        debug!(
            accounts = snapshot.accounts.len(),
            redemptions = snapshot.redemptions.len(),
            deposits = snapshot.deposits.len(),
            "ledger loaded"
        );
        Ok(Self::from_snapshot(snapshot, gateway, store))
    }

    /// Build a ledger from an already loaded snapshot
    pub fn from_snapshot(
        snapshot: Snapshot,
        gateway: Arc<dyn RedemptionGateway>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            accounts: AccountManager::from_accounts(snapshot.accounts),
            redemptions: RedemptionStore::from_records(snapshot.redemptions),
            deposits: DepositLog::from_records(snapshot.deposits),
            gateway,
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Exchange points for `reward`
    ///
    /// Debits `reward.points` and appends a pending record under the user's
    /// account lock, then persists. Does not contact the remote service.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user spending points
    /// * `reward` - The reward being redeemed
    ///
    /// # Returns
    ///
    /// The new `pending` record
    ///
    /// # Errors
    ///
    /// - `InvalidReward` if the reward costs zero points
    /// - `InsufficientBalance` if the user has fewer points than the cost
    /// - `Storage` if the ledger could not be saved
    ///
    /// No error leaves a debit or a record behind.
    pub async fn redeem(
        &self,
        user_id: &str,
        reward: &Reward,
    ) -> Result<RedemptionRecord, WasteBankError> {
        if reward.points == 0 {
            return Err(WasteBankError::invalid_reward(
                &reward.id,
                "point cost must be positive",
            ));
        }
        if self.accounts.get(user_id).is_none() {
            return Err(WasteBankError::insufficient_balance(
                user_id,
                0,
                reward.points,
            ));
        }

        let record = RedemptionRecord::pending(user_id, reward, Utc::now());
        let account = self.accounts.update(user_id, |account| {
            AccountManager::debit_points(account, reward.points)?;
            self.redemptions.insert(record.clone());
            Ok(())
        })?;

        self.commit(|| {
            self.redemptions.remove(&record.id);
            self.accounts
                .update(user_id, |account| {
                    account.points = account.points.checked_add(reward.points).ok_or_else(|| {
                        WasteBankError::arithmetic_overflow("redeem rollback", user_id)
                    })?;
                    Ok(())
                })
                .map(|_| ())
        })
        .await?;

        info!(
            id = %record.id,
            user = user_id,
            reward = %reward.id,
            points = reward.points,
            remaining = account.points,
            "redemption registered, pending processing"
        );
        Ok(record)
    }

    /// Ask the remote service to settle one record
    ///
    /// Terminal records are returned unchanged without a remote call. On a
    /// response the record becomes `completed` or `failed`, stamped with the
    /// server's `processedAt` or the local clock. If another path settled the
    /// record while the call was in flight, that first settlement is kept.
    ///
    /// # Arguments
    ///
    /// * `id` - The redemption to settle
    ///
    /// # Returns
    ///
    /// The record's latest state, terminal unless it was already settled
    ///
    /// # Errors
    ///
    /// - `RedemptionNotFound` for an unknown id
    /// - `Transport` if the call did not resolve; the record stays pending
    /// - `Storage` if the settlement could not be saved; the record goes back
    ///   to pending
    pub async fn reconcile(&self, id: &str) -> Result<RedemptionRecord, WasteBankError> {
        let record = self
            .redemptions
            .get(id)
            .ok_or_else(|| WasteBankError::redemption_not_found(id))?;

        if !record.is_pending() {
            debug!(id, status = %record.status, "already settled, skipping");
            return Ok(record);
        }

        let response = match self.gateway.submit(&RedemptionRequest::from(&record)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(id, error = %e, "reconciliation did not resolve, record stays pending");
                return Err(e);
            }
        };

        let status = if response.success {
            RedemptionStatus::Completed
        } else {
            RedemptionStatus::Failed
        };
        let at = response.processed_at().unwrap_or_else(Utc::now);
        let (settled, changed) = self.redemptions.settle(id, status, at)?;

        if changed {
            self.commit(|| {
                self.redemptions.reopen(&record);
                Ok(())
            })
            .await?;

            match settled.status {
                RedemptionStatus::Completed => info!(id, "redemption completed"),
                _ => warn!(id, points = settled.points, "redemption rejected by server"),
            }
        }

        Ok(settled)
    }

    /// Redeem and immediately try to reconcile
    ///
    /// A transport failure during reconciliation is reported in
    /// [`RedeemOutcome::unresolved`] rather than as an error.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user spending points
    /// * `reward` - The reward being redeemed
    ///
    /// # Returns
    ///
    /// The record after the settlement attempt, plus the transport error if
    /// it is still pending
    pub async fn redeem_and_reconcile(
        &self,
        user_id: &str,
        reward: &Reward,
    ) -> Result<RedeemOutcome, WasteBankError> {
        let record = self.redeem(user_id, reward).await?;

        match self.reconcile(&record.id).await {
            Ok(record) => Ok(RedeemOutcome {
                record,
                unresolved: None,
            }),
            Err(e) if e.is_transport() => Ok(RedeemOutcome {
                record,
                unresolved: Some(e),
            }),
            Err(e) => Err(e),
        }
    }

    /// Try to settle every pending record
    ///
    /// One batch call reports which ids the server has processed; those become
    /// `completed` now. If the batch call fails, each pending record is
    /// reconciled on its own, in creation order, and one failure does not stop
    /// the others. Records already terminal are never touched.
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReport)` - What the sweep attempted and resolved
    /// * `Err(WasteBankError)` - The first non-transport error, reported only
    ///   after every pending record was attempted
    pub async fn sync_pending(&self) -> Result<SyncReport, WasteBankError> {
        let pending = self.redemptions.pending();
        if pending.is_empty() {
            debug!("no pending redemptions");
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport {
            attempted: pending.len(),
            ..SyncReport::default()
        };

        let request = BatchRequest {
            ids: pending.iter().map(|record| record.id.clone()).collect(),
        };

        match self.gateway.submit_batch(&request).await {
            Ok(response) => {
                let processed: HashSet<&str> =
                    response.processed.iter().map(String::as_str).collect();
                let now = Utc::now();

                let mut settled = Vec::new();
                for record in pending.iter().filter(|r| processed.contains(r.id.as_str())) {
                    let (_, changed) =
                        self.redemptions
                            .settle(&record.id, RedemptionStatus::Completed, now)?;
                    if changed {
                        settled.push(record);
                    }
                }

                if !settled.is_empty() {
                    self.commit(|| {
                        for record in &settled {
                            self.redemptions.reopen(record);
                        }
                        Ok(())
                    })
                    .await?;
                }
                report.resolved = settled.len();
            }
            Err(e) => {
                warn!(error = %e, pending = pending.len(), "batch sync failed, retrying one by one");
                report.fallback = true;

                let mut first_error = None;
                for record in &pending {
                    match self.reconcile(&record.id).await {
                        Ok(settled) if settled.status.is_terminal() => report.resolved += 1,
                        Ok(_) => {}
                        Err(e) if e.is_transport() => {}
                        Err(e) => {
                            warn!(id = %record.id, error = %e, "reconciliation failed, continuing");
                            if first_error.is_none() {
                                first_error = Some(e);
                            }
                        }
                    }
                }

                if let Some(e) = first_error {
                    warn!(
                        attempted = report.attempted,
                        resolved = report.resolved,
                        "pending redemptions synced with errors"
                    );
                    return Err(e);
                }
            }
        }

        info!(
            attempted = report.attempted,
            resolved = report.resolved,
            fallback = report.fallback,
            "pending redemptions synced"
        );
        Ok(report)
    }

    /// Credit a scanned deposit QR payload
    ///
    /// # Arguments
    ///
    /// * `payload` - The validated QR payload
    ///
    /// # Returns
    ///
    /// The logged deposit and the account after the credit
    ///
    /// # Errors
    ///
    /// - `DuplicateDeposit` if the code was already credited
    /// - `ArithmeticOverflow` if a balance would overflow
    /// - `Storage` if the ledger could not be saved; the code stays unclaimed
    pub async fn deposit(
        &self,
        payload: &DepositPayload,
    ) -> Result<(DepositRecord, Account), WasteBankError> {
        let (amount, points) = payload.credit()?;
        let record = DepositRecord {
            code: payload.code.clone(),
            user_id: payload.user_id.clone(),
            waste_type: payload.waste_type.clone(),
            weight_kg: payload.weight_kg,
            amount,
            points,
            date: Utc::now(),
        };

        let account = self.deposits.claim(record.clone(), |deposit| {
            self.accounts.credit(
                &deposit.user_id,
                deposit.amount,
                deposit.points,
                deposit.weight_kg,
            )
        })?;

        self.commit(|| {
            self.deposits.release(&record.code);
            self.accounts
                .reverse_credit(&record.user_id, amount, points, record.weight_kg)
                .map(|_| ())
        })
        .await?;

        info!(
            code = %record.code,
            user = %record.user_id,
            waste = %record.waste_type,
            amount = %amount,
            points,
            "deposit credited"
        );
        Ok((record, account))
    }

    /// Pay out cash from a user's balance
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user being paid
    /// * `amount` - Cash to pay out, must be positive
    ///
    /// # Returns
    ///
    /// The account after the withdrawal
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is zero or negative
    /// - `InsufficientFunds` if the balance is below `amount`
    /// - `Storage` if the ledger could not be saved; the balance is restored
    pub async fn withdraw(&self, user_id: &str, amount: Decimal) -> Result<Account, WasteBankError> {
        if amount <= Decimal::ZERO {
            return Err(WasteBankError::invalid_amount(amount, user_id));
        }
        if self.accounts.get(user_id).is_none() {
            return Err(WasteBankError::insufficient_funds(
                user_id,
                Decimal::ZERO,
                amount,
            ));
        }

        let account = self.accounts.withdraw(user_id, amount)?;
        self.commit(|| {
            self.accounts
                .update(user_id, |account| {
                    account.balance = account.balance.checked_add(amount).ok_or_else(|| {
                        WasteBankError::arithmetic_overflow("withdrawal rollback", user_id)
                    })?;
                    Ok(())
                })
                .map(|_| ())
        })
        .await?;

        info!(user = user_id, amount = %amount, balance = %account.balance, "withdrawal paid out");
        Ok(account)
    }

    pub fn account(&self, user_id: &str) -> Option<Account> {
        self.accounts.get(user_id)
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.get_all_accounts()
    }

    pub fn redemption(&self, id: &str) -> Option<RedemptionRecord> {
        self.redemptions.get(id)
    }

    pub fn redemptions(&self) -> Vec<RedemptionRecord> {
        self.redemptions.all()
    }

    pub fn redemptions_for(&self, user_id: &str) -> Vec<RedemptionRecord> {
        self.redemptions.for_user(user_id)
    }

    pub fn pending(&self) -> Vec<RedemptionRecord> {
        self.redemptions.pending()
    }

    /// Credited deposits ordered by date
    pub fn deposits(&self) -> Vec<DepositRecord> {
        self.deposits.all()
    }

    /// Deposits credited to one user, ordered by date
    pub fn deposits_for(&self, user_id: &str) -> Vec<DepositRecord> {
        self.deposits
            .all()
            .into_iter()
            .filter(|deposit| deposit.user_id == user_id)
            .collect()
    }

    /// Current state of the whole ledger
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            accounts: self.accounts.get_all_accounts(),
            redemptions: self.redemptions.all(),
            deposits: self.deposits.all(),
        }
    }

    async fn persist(&self) -> Result<(), WasteBankError> {
        let _guard = self.write_lock.lock().await;
        self.store.save(&self.snapshot()).await
    }

    /// Save the ledger, running `undo` if the save fails
    async fn commit<U>(&self, undo: U) -> Result<(), WasteBankError>
    where
        U: FnOnce() -> Result<(), WasteBankError>,
    {
        if let Err(e) = self.persist().await {
            warn!(error = %e, "ledger save failed, rolling back");
            if let Err(undo_error) = undo() {
                error!(error = %undo_error, "rollback failed, ledger may diverge from disk");
            }
            return Err(e);
        }
        Ok(())
    }
}
