use crate::domain_model::*;

/// Failure inside a storage backend. Detail stays server-side; the engine
/// folds these into its own error taxonomy before anything reaches the
/// HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result of a conditional refresh-token write.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WriteOutcome {
    Committed,
    /// The record's version moved since it was read; the caller must
    /// re-read and recompute before retrying.
    Conflict,
}

/// Full credential row projection. Only the credential validator may see
/// `password_digest`; everything downstream works on [`SessionRecord`].
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub user_id: UserId,
    pub email: String,
    pub password_digest: String,
    pub refresh_tokens: RefreshTokenSet,
    pub version: SetVersion,
}

impl CredentialRecord {
    /// Drop the password digest. This is the only way the record leaves
    /// the validator.
    pub fn into_session(self) -> SessionRecord {
        SessionRecord {
            user_id: self.user_id,
            refresh_tokens: self.refresh_tokens,
            version: self.version,
        }
    }
}

/// Digest-free projection used by the rotation paths.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub refresh_tokens: RefreshTokenSet,
    pub version: SetVersion,
}

/// Persistence contract over the per-user refresh-token set. The set is
/// the single shared mutable resource of the protocol; `version` makes the
/// read-modify-write cycle safe under concurrent logins/refreshes for the
/// same account.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the full credential row (for login).
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError>;

    /// Locate the account whose set currently contains `token`, if any.
    async fn find_by_refresh_token(&self, token: &str)
    -> Result<Option<SessionRecord>, StoreError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<SessionRecord>, StoreError>;

    /// Replace the account's refresh-token set iff the persisted version
    /// still equals `expected`. A committed write bumps the version.
    async fn update_refresh_tokens(
        &self,
        user_id: UserId,
        tokens: &RefreshTokenSet,
        expected: SetVersion,
    ) -> Result<WriteOutcome, StoreError>;
}
