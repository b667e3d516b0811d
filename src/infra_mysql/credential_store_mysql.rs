use crate::domain_model::{RefreshTokenSet, SetVersion, UserId};
use crate::domain_port::{
    CredentialRecord, CredentialStore, SessionRecord, StoreError, WriteOutcome,
};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

/// MySQL-backed credential store. The refresh-token set is stored as a
/// JSON array in a TEXT column; membership lookups go through
/// `JSON_CONTAINS` so the database scans, not the application.
pub struct MySqlCredentialStore {
    pool: MySqlPool,
}

impl MySqlCredentialStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlCredentialStore { pool }
    }

    #[inline]
    fn uid_as_bytes(id: &UserId) -> &[u8] {
        id.0.as_bytes()
    }

    #[inline]
    fn uid_from_bytes(id: &[u8]) -> Result<UserId, StoreError> {
        Ok(UserId(
            Uuid::from_slice(id).map_err(|e| StoreError::Backend(e.to_string()))?,
        ))
    }

    fn tokens_to_json(tokens: &RefreshTokenSet) -> Result<String, StoreError> {
        serde_json::to_string(tokens).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn row_to_record(row: MySqlRow) -> Result<CredentialRecord, StoreError> {
        let user_id_bytes: Vec<u8> = row
            .try_get("user_id")
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let user_id = Self::uid_from_bytes(&user_id_bytes)?;

        let email: String = row
            .try_get("email")
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let password_digest: String = row
            .try_get("password_digest")
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let refresh_tokens_raw: String = row
            .try_get("refresh_tokens")
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let refresh_tokens: RefreshTokenSet = serde_json::from_str(&refresh_tokens_raw)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let version: u64 = row
            .try_get("version")
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(CredentialRecord {
            user_id,
            email,
            password_digest,
            refresh_tokens,
            version: SetVersion(version),
        })
    }

    /// Provision an account row. Used by operational tooling, not by the
    /// rotation paths.
    pub async fn insert_credential(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
INSERT INTO user_credential (user_id, email, password_digest, refresh_tokens, version)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(Self::uid_as_bytes(&record.user_id))
        .bind(&record.email)
        .bind(&record.password_digest)
        .bind(Self::tokens_to_json(&record.refresh_tokens)?)
        .bind(record.version.0)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialStore for MySqlCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, email, password_digest, refresh_tokens, version
FROM user_credential
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, email, password_digest, refresh_tokens, version
FROM user_credential
WHERE JSON_CONTAINS(CAST(refresh_tokens AS JSON), JSON_QUOTE(?))
"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row_opt
            .map(Self::row_to_record)
            .transpose()
            .map(|r| r.map(CredentialRecord::into_session))
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<SessionRecord>, StoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, email, password_digest, refresh_tokens, version
FROM user_credential
WHERE user_id = ?
"#,
        )
        .bind(Self::uid_as_bytes(&user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row_opt
            .map(Self::row_to_record)
            .transpose()
            .map(|r| r.map(CredentialRecord::into_session))
    }

    async fn update_refresh_tokens(
        &self,
        user_id: UserId,
        tokens: &RefreshTokenSet,
        expected: SetVersion,
    ) -> Result<WriteOutcome, StoreError> {
        let result = sqlx::query(
            r#"
UPDATE user_credential
SET refresh_tokens = ?, version = version + 1
WHERE user_id = ? AND version = ?
"#,
        )
        .bind(Self::tokens_to_json(tokens)?)
        .bind(Self::uid_as_bytes(&user_id))
        .bind(expected.0)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Zero rows means the version moved or the row is gone; the
        // caller's re-read tells the two apart.
        if result.rows_affected() == 1 {
            Ok(WriteOutcome::Committed)
        } else {
            Ok(WriteOutcome::Conflict)
        }
    }
}
