//! Identifiers shared across the room subdomains.
//!
//! - [`RoomId`] - unique identifier for an investment room
//! - [`RoomCode`] - short human-shareable join code (`ROOM-XXXXXX`)
//! - [`UserId`] - verified identity issued by the identity provider
//! - [`CandidateId`] - allocation candidate (and, after execution, asset) id

use rand::Rng;
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for an investment room.
    RoomId
);

string_id!(
    /// Identity of a user as issued by the identity provider.
    ///
    /// A member is the pair (room, user); votes and contributions are keyed by
    /// this identity, never by a client-supplied value.
    UserId
);

string_id!(
    /// Identifier of an allocation candidate.
    ///
    /// After execution the same id names the allocated asset, so stop votes
    /// reference the candidate that was executed.
    CandidateId
);

string_id!(
    /// Short join code shared out-of-band with prospective members.
    RoomCode
);

impl RoomId {
    /// Generates a fresh random room id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ROOM_CODE_LEN: usize = 6;

impl RoomCode {
    /// Generates a code of the form `ROOM-XXXXXX` (upper-case alphanumerics).
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_CHARSET[rng.gen_range(0..ROOM_CODE_CHARSET.len())] as char)
            .collect();
        Self(format!("ROOM-{}", suffix))
    }
}
