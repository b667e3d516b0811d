use serde::{Deserialize, Serialize};
use std::fmt;

/// Optimistic-concurrency counter on a credential record's refresh-token
/// set. Every committed update bumps it; a conditional write against a
/// stale version is rejected so concurrent rotations cannot silently drop
/// each other's tokens.
#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct SetVersion(pub u64);

impl SetVersion {
    pub fn next(self) -> SetVersion {
        SetVersion(self.0 + 1)
    }
}

impl fmt::Display for SetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The currently-valid refresh tokens of one account, one entry per live
/// device session. Order carries no meaning. A token is valid only while it
/// is a member here; signature validity alone is not enough once it has
/// been rotated out.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshTokenSet {
    tokens: Vec<String>,
}

impl RefreshTokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let mut set = Self::new();
        for token in tokens {
            set.insert(token);
        }
        set
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn insert(&mut self, token: String) {
        if !self.contains(&token) {
            self.tokens.push(token);
        }
    }

    /// Returns whether the token was a member.
    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        self.tokens.len() != before
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}
