//! Static token identity provider.
//!
//! Maps bearer tokens to identities registered up front. Used by the CLI
//! scenario runner, where each scripted member gets one token.

use async_trait::async_trait;
use investa_application::ports::identity::{
    AccessToken, IdentityError, IdentityProvider, VerifiedIdentity,
};
use investa_domain::UserId;
use std::collections::HashMap;

#[derive(Default)]
pub struct StaticTokenIdentity {
    identities: HashMap<AccessToken, VerifiedIdentity>,
}

impl StaticTokenIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: AccessToken, identity: VerifiedIdentity) -> Self {
        self.identities.insert(token, identity);
        self
    }

    /// Register `user_id` under a token equal to its own id.
    pub fn with_user(self, user_id: &str, display_name: &str) -> Self {
        self.with_identity(
            AccessToken::new(user_id),
            VerifiedIdentity {
                user_id: UserId::new(user_id),
                display_name: display_name.to_string(),
                email: None,
            },
        )
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentity {
    async fn verify(&self, token: &AccessToken) -> Result<VerifiedIdentity, IdentityError> {
        self.identities
            .get(token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }
}
