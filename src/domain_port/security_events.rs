use crate::domain_model::UserId;
use sha2::{Digest, Sha256};

/// Protocol-level incidents worth an audit trail. Emitting one never
/// replaces the associated failure; the engine records first, then fails,
/// so the two are observable independently.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SecurityEvent {
    /// A login presented a structurally plausible refresh cookie that is
    /// not in the account's set. Treated as a stolen-and-already-used
    /// token; every session of the account gets revoked.
    RefreshReuseAtLogin {
        user_id: UserId,
        token_fingerprint: String,
    },
    /// A refresh presented a signed token that is in no account's set.
    RefreshReuse {
        user_id: UserId,
        token_fingerprint: String,
    },
    /// A refresh presented a token that was still in the set but no longer
    /// verifies. The token is consumed anyway.
    ExpiredRefreshConsumed {
        user_id: UserId,
        token_fingerprint: String,
    },
}

pub trait SecurityEventSink: Send + Sync {
    fn record(&self, event: SecurityEvent);
}

/// Short stable identifier for a token, safe to log. Never log the token
/// itself.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..8])
}
