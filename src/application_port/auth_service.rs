use crate::domain_model::UserId;
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Engine-boundary failure taxonomy. Everything the protocol can go wrong
/// with is recovered into one of these before it leaves the service; raw
/// storage or crypto errors never escape. The uniform `Forbidden` hides
/// whether a refresh token was unknown, expired, tampered with, or bound
/// to the wrong subject.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no token presented")]
    Unauthenticated,
    #[error("token rejected")]
    Forbidden,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Backend(e) => AuthError::Store(e),
        }
    }
}

/// Token codec failure. `Expired` and `Invalid` are deliberately the only
/// verification outcomes; finer detail would become an oracle.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("token encoding error: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    /// Refresh-token cookie riding along on the login request, if the
    /// client still had one.
    pub presented_refresh_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: UserId,
    pub tokens: AuthTokens,
    /// True whenever a cookie was presented: the boundary clears it before
    /// setting the replacement so stale cookies cannot accumulate.
    pub clear_presented_cookie: bool,
}

/// Signs and verifies the two token classes. Access and refresh tokens use
/// distinct secrets so one can never stand in for the other. Verification
/// is pure signature+expiry checking with no I/O.
#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access_token(
        &self,
        user: UserId,
    ) -> Result<(AccessToken, DateTime<Utc>), TokenError>;
    async fn issue_refresh_token(
        &self,
        user: UserId,
    ) -> Result<(RefreshToken, DateTime<Utc>), TokenError>;
    async fn verify_access_token(&self, token: &str) -> Result<UserId, TokenError>;
    async fn verify_refresh_token(&self, token: &str) -> Result<UserId, TokenError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_digest: &str)
    -> Result<bool, AuthError>;
}

/// The session protocol surface: one login/refresh/logout state machine
/// over the per-user refresh-token set, plus pure access-token
/// verification for bearer-authenticated routes.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<LoginOutcome, AuthError>;
    /// `None` means no cookie was presented at all; that fails
    /// `Unauthenticated` before any store lookup happens.
    async fn refresh(&self, presented: Option<&str>) -> Result<AuthTokens, AuthError>;
    /// Idempotent: unknown or already-removed tokens are a no-op.
    async fn logout(&self, presented: Option<&str>) -> Result<(), AuthError>;
    /// Access-token validity is signature + expiry only; nothing is looked
    /// up server-side.
    async fn authenticate(&self, access_token: &str) -> Result<UserId, AuthError>;
}
