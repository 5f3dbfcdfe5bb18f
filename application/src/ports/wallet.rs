//! Wallet port
//!
//! The member-facing ledger that funds contributions and receives payouts.

use async_trait::async_trait;
use investa_domain::UserId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Insufficient funds for {user}: requested {requested}, available {available}")]
    InsufficientFunds {
        user: UserId,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Unknown wallet account: {0}")]
    UnknownAccount(UserId),

    #[error("Wallet unavailable: {0}")]
    Unavailable(String),
}

impl WalletError {
    pub fn is_transient(&self) -> bool {
        matches!(self, WalletError::Unavailable(_))
    }
}

/// Debit and credit member wallets.
///
/// `reference` identifies the business event (contribution id, a member's
/// settlement payout, a refund) so an adapter can reconcile.
///
/// Credits are idempotent per `(user, reference)`: crediting a reference that
/// was already applied to the same user succeeds without moving funds again.
/// Callers that may repeat a credit after an interrupted write rely on this.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn debit(&self, user: &UserId, amount: Decimal, reference: &str)
    -> Result<(), WalletError>;

    async fn credit(
        &self,
        user: &UserId,
        amount: Decimal,
        reference: &str,
    ) -> Result<(), WalletError>;
}
