//! In-memory wallet ledger.
//!
//! Stands in for the external payment system. Every debit and credit is
//! appended to an entry log so a run can be reconciled afterwards. A credit
//! whose reference was already applied to the same user is a no-op.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use investa_application::ports::wallet::{Wallet, WalletError};
use investa_domain::UserId;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use tracing::debug;

/// One movement of funds; debits are negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub user_id: UserId,
    pub amount: Decimal,
    pub reference: String,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
struct Accounts {
    balances: HashMap<UserId, Decimal>,
    entries: Vec<LedgerEntry>,
    applied_credits: HashSet<(UserId, String)>,
}

/// Wallet holding balances in process memory.
///
/// Unknown users fail with [`WalletError::UnknownAccount`] unless an opening
/// balance is configured, in which case their account is opened on first use.
#[derive(Default)]
pub struct InMemoryWallet {
    accounts: Mutex<Accounts>,
    opening_balance: Option<Decimal>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open accounts for unknown users with `amount`.
    pub fn with_opening_balance(mut self, amount: Decimal) -> Self {
        self.opening_balance = Some(amount);
        self
    }

    /// Fund an account, opening it if needed.
    pub async fn deposit(&self, user: &UserId, amount: Decimal) {
        let mut accounts = self.accounts.lock().await;
        *accounts.balances.entry(user.clone()).or_default() += amount;
        accounts.entries.push(LedgerEntry {
            user_id: user.clone(),
            amount,
            reference: "deposit".to_string(),
            at: Utc::now(),
        });
    }

    pub async fn balance(&self, user: &UserId) -> Option<Decimal> {
        self.accounts.lock().await.balances.get(user).copied()
    }

    pub async fn entries(&self) -> Vec<LedgerEntry> {
        self.accounts.lock().await.entries.clone()
    }

    fn account<'a>(
        &self,
        accounts: &'a mut Accounts,
        user: &UserId,
    ) -> Result<&'a mut Decimal, WalletError> {
        if !accounts.balances.contains_key(user) {
            let opening = self
                .opening_balance
                .ok_or_else(|| WalletError::UnknownAccount(user.clone()))?;
            accounts.balances.insert(user.clone(), opening);
        }
        accounts
            .balances
            .get_mut(user)
            .ok_or_else(|| WalletError::UnknownAccount(user.clone()))
    }
}

#[async_trait]
impl Wallet for InMemoryWallet {
    async fn debit(&self, user: &UserId, amount: Decimal, reference: &str) -> Result<(), WalletError> {
        let mut accounts = self.accounts.lock().await;
        let balance = self.account(&mut accounts, user)?;
        if *balance < amount {
            return Err(WalletError::InsufficientFunds {
                user: user.clone(),
                requested: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        accounts.entries.push(LedgerEntry {
            user_id: user.clone(),
            amount: -amount,
            reference: reference.to_string(),
            at: Utc::now(),
        });
        debug!(member = %user, %amount, reference, "Wallet debit");
        Ok(())
    }

    async fn credit(&self, user: &UserId, amount: Decimal, reference: &str) -> Result<(), WalletError> {
        let mut accounts = self.accounts.lock().await;
        let key = (user.clone(), reference.to_string());
        if accounts.applied_credits.contains(&key) {
            debug!(member = %user, reference, "Credit already applied, skipping");
            return Ok(());
        }
        let balance = self.account(&mut accounts, user)?;
        *balance += amount;
        accounts.applied_credits.insert(key);
        accounts.entries.push(LedgerEntry {
            user_id: user.clone(),
            amount,
            reference: reference.to_string(),
            at: Utc::now(),
        });
        debug!(member = %user, %amount, reference, "Wallet credit");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_debit_and_credit() {
        let wallet = InMemoryWallet::new();
        let alice = UserId::new("alice");
        wallet.deposit(&alice, Decimal::from(100)).await;

        wallet.debit(&alice, Decimal::from(40), "contribution:r1").await.unwrap();
        wallet.credit(&alice, Decimal::from(5), "settlement:r1").await.unwrap();

        assert_eq!(wallet.balance(&alice).await, Some(Decimal::from(65)));
        let entries = wallet.entries().await;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].amount, Decimal::from(-40));
        assert_eq!(entries[2].reference, "settlement:r1");
    }

    #[tokio::test]
    async fn test_repeated_credit_is_applied_once() {
        let wallet = InMemoryWallet::new();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        wallet.deposit(&alice, Decimal::from(100)).await;
        wallet.deposit(&bob, Decimal::from(100)).await;

        wallet.credit(&alice, Decimal::from(25), "settlement:r1:alice").await.unwrap();
        wallet.credit(&alice, Decimal::from(25), "settlement:r1:alice").await.unwrap();
        // Same reference, different user
        wallet.credit(&bob, Decimal::from(25), "settlement:r1:alice").await.unwrap();

        assert_eq!(wallet.balance(&alice).await, Some(Decimal::from(125)));
        assert_eq!(wallet.balance(&bob).await, Some(Decimal::from(125)));
        assert_eq!(wallet.entries().await.len(), 4);
    }

    #[tokio::test]
    async fn test_insufficient_funds() {
        let wallet = InMemoryWallet::new();
        let bob = UserId::new("bob");
        wallet.deposit(&bob, Decimal::from(10)).await;

        let err = wallet.debit(&bob, Decimal::from(11), "x").await.unwrap_err();
        assert!(matches!(err, WalletError::InsufficientFunds { .. }));
        assert_eq!(wallet.balance(&bob).await, Some(Decimal::from(10)));
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let wallet = InMemoryWallet::new();
        let err = wallet
            .credit(&UserId::new("ghost"), Decimal::ONE, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::UnknownAccount(_)));
    }

    #[tokio::test]
    async fn test_opening_balance() {
        let wallet = InMemoryWallet::new().with_opening_balance(Decimal::from(500));
        let carol = UserId::new("carol");
        wallet.debit(&carol, Decimal::from(200), "x").await.unwrap();
        assert_eq!(wallet.balance(&carol).await, Some(Decimal::from(300)));
    }
}
