//! Identity port
//!
//! Every mutating room operation takes an [`AccessToken`] and acts as the
//! identity the provider verifies. A user id supplied by the client is never
//! trusted.

use async_trait::async_trait;
use investa_domain::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity vouched for by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub user_id: UserId,
    pub display_name: String,
    pub email: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Invalid or unknown access token")]
    InvalidToken,

    #[error("Access token expired")]
    Expired,

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

impl IdentityError {
    pub fn is_transient(&self) -> bool {
        matches!(self, IdentityError::Unavailable(_))
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &AccessToken) -> Result<VerifiedIdentity, IdentityError>;
}
