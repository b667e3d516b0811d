use crate::domain_model::{RefreshTokenSet, SetVersion, UserId};
use crate::domain_port::{
    CredentialRecord, CredentialStore, SessionRecord, StoreError, WriteOutcome,
};
use dashmap::DashMap;

/// Process-local credential store. The map shard serializes writers per
/// account, and the version check gives the same conditional-update
/// semantics as the SQL adapter.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: DashMap<UserId, CredentialRecord>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Seed an account, replacing any record under the same id.
    pub fn insert_credential(&self, record: CredentialRecord) {
        self.records.insert(record.user_id, record);
    }

    /// Snapshot of an account's live refresh tokens.
    pub fn refresh_tokens(&self, user_id: UserId) -> Option<RefreshTokenSet> {
        self.records
            .get(&user_id)
            .map(|r| r.refresh_tokens.clone())
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .find(|r| r.email == email)
            .map(|r| r.value().clone()))
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .find(|r| r.refresh_tokens.contains(token))
            .map(|r| r.value().clone().into_session()))
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self
            .records
            .get(&user_id)
            .map(|r| r.value().clone().into_session()))
    }

    async fn update_refresh_tokens(
        &self,
        user_id: UserId,
        tokens: &RefreshTokenSet,
        expected: SetVersion,
    ) -> Result<WriteOutcome, StoreError> {
        let Some(mut entry) = self.records.get_mut(&user_id) else {
            return Err(StoreError::Backend(format!(
                "no credential record for {user_id}"
            )));
        };
        if entry.version != expected {
            return Ok(WriteOutcome::Conflict);
        }
        entry.refresh_tokens = tokens.clone();
        entry.version = expected.next();
        Ok(WriteOutcome::Committed)
    }
}
