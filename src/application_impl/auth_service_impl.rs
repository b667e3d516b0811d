use crate::application_port::{
    AccessToken, AuthError, AuthService, AuthTokens, CredentialHasher, LoginInput, LoginOutcome,
    RefreshToken, TokenCodec, TokenError,
};
use crate::domain_model::{RefreshTokenSet, UserId};
use crate::domain_port::{
    CredentialStore, SecurityEvent, SecurityEventSink, SessionRecord, WriteOutcome,
    token_fingerprint,
};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let digest = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .to_string();
        Ok(digest)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_digest: &str,
    ) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_digest)
            .map_err(|e| AuthError::Internal(format!("invalid PHC digest: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(format!("verify error: {e}"))),
        }
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// The two classes sign with distinct secrets so an access token can
    /// never pass for a refresh token or vice versa.
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    /// Random per mint; two tokens for the same subject issued within the
    /// same second must still be distinct strings for set membership.
    jti: String,
}

fn encode_claims(
    uid: UserId,
    ttl: Duration,
    secret: &[u8],
    cfg: &JwtConfig,
) -> Result<(String, DateTime<Utc>), TokenError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + ttl;
    let claims = Claims {
        sub: uid.to_string(),
        exp: exp_dt.timestamp(),
        iat: iat_dt.timestamp(),
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Encoding(e.to_string()))?;
    Ok((token, exp_dt))
}

fn decode_claims(token: &str, secret: &[u8], cfg: &JwtConfig) -> Result<Claims, TokenError> {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v.leeway = 0;
    v.set_audience(&[cfg.audience.clone()]);
    v.set_issuer(&[cfg.issuer.clone()]);
    let data =
        decode::<Claims>(token, &DecodingKey::from_secret(secret), &v).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
    Ok(data.claims)
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    #[inline]
    fn parse_user_id(sub: &str) -> Result<UserId, TokenError> {
        sub.parse::<UserId>().map_err(|_| TokenError::Invalid)
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue_access_token(
        &self,
        user: UserId,
    ) -> Result<(AccessToken, DateTime<Utc>), TokenError> {
        let (token, exp_dt) =
            encode_claims(user, self.cfg.access_ttl, &self.cfg.access_secret, &self.cfg)?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn issue_refresh_token(
        &self,
        user: UserId,
    ) -> Result<(RefreshToken, DateTime<Utc>), TokenError> {
        let (token, exp_dt) = encode_claims(
            user,
            self.cfg.refresh_ttl,
            &self.cfg.refresh_secret,
            &self.cfg,
        )?;
        Ok((RefreshToken(token), exp_dt))
    }

    async fn verify_access_token(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = decode_claims(token, &self.cfg.access_secret, &self.cfg)?;
        Self::parse_user_id(&claims.sub)
    }

    async fn verify_refresh_token(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = decode_claims(token, &self.cfg.refresh_secret, &self.cfg)?;
        Self::parse_user_id(&claims.sub)
    }
}

/// Bound on the optimistic read-modify-write cycle against the
/// refresh-token set. Conflicts re-read and recompute; exhaustion surfaces
/// as a persistence failure.
const SET_WRITE_RETRIES: usize = 3;

/// Hashed once at construction. Logins for unknown emails verify against
/// the resulting digest so account existence cannot be read off response
/// latency.
const DECOY_PASSWORD: &str = "wicket-decoy-credential";

pub struct RealAuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn CredentialHasher>,
    codec: Arc<dyn TokenCodec>,
    events: Arc<dyn SecurityEventSink>,
    decoy_digest: String,
}

impl RealAuthService {
    pub async fn try_new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn CredentialHasher>,
        codec: Arc<dyn TokenCodec>,
        events: Arc<dyn SecurityEventSink>,
    ) -> Result<Self, AuthError> {
        let decoy_digest = hasher.hash_password(DECOY_PASSWORD).await?;
        Ok(Self {
            store,
            hasher,
            codec,
            events,
            decoy_digest,
        })
    }

    /// Email+password check. Both failure causes collapse into the one
    /// `InvalidCredentials`, and the digest never leaves this method.
    async fn validate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionRecord, AuthError> {
        let Some(record) = self.store.find_by_email(email).await? else {
            let _ = self
                .hasher
                .verify_password(password, &self.decoy_digest)
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        let ok = self
            .hasher
            .verify_password(password, &record.password_digest)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(record.into_session())
    }

    async fn issue_pair(&self, user_id: UserId) -> Result<AuthTokens, AuthError> {
        let (access_token, access_exp) = self
            .codec
            .issue_access_token(user_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let (refresh_token, refresh_exp) = self
            .codec
            .issue_refresh_token(user_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(AuthTokens {
            access_token,
            refresh_token,
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh_exp,
        })
    }

    async fn reread(&self, user_id: UserId) -> Result<SessionRecord, AuthError> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::Store("credential record disappeared mid-update".into()))
    }

    /// Revoke every live session of the account. Used when a replayed
    /// token proves the set can no longer be trusted.
    async fn burn_all_sessions(&self, mut record: SessionRecord) -> Result<(), AuthError> {
        for _ in 0..SET_WRITE_RETRIES {
            match self
                .store
                .update_refresh_tokens(record.user_id, &RefreshTokenSet::new(), record.version)
                .await?
            {
                WriteOutcome::Committed => return Ok(()),
                WriteOutcome::Conflict => record = self.reread(record.user_id).await?,
            }
        }
        Err(AuthError::Store(
            "refresh-token set contention while revoking".into(),
        ))
    }

    /// The presented token is in no account's set. Attribute it via its
    /// signature if possible, burn the claimed subject's sessions, and
    /// reject uniformly.
    async fn reject_unrecognized(&self, token: &str) -> Result<AuthTokens, AuthError> {
        let Ok(subject) = self.codec.verify_refresh_token(token).await else {
            return Err(AuthError::Forbidden);
        };
        if let Some(record) = self.store.find_by_id(subject).await? {
            self.events.record(SecurityEvent::RefreshReuse {
                user_id: subject,
                token_fingerprint: token_fingerprint(token),
            });
            self.burn_all_sessions(record).await?;
        }
        Err(AuthError::Forbidden)
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<LoginOutcome, AuthError> {
        let LoginInput {
            email,
            password,
            presented_refresh_token,
        } = request;

        let mut record = self.validate_credentials(&email, &password).await?;
        let user_id = record.user_id;
        let tokens = self.issue_pair(user_id).await?;
        let clear_presented_cookie = presented_refresh_token.is_some();
        let mut reuse_recorded = false;

        for _ in 0..SET_WRITE_RETRIES {
            let mut next = record.refresh_tokens.clone();
            if let Some(old) = presented_refresh_token.as_deref() {
                if !next.remove(old) {
                    // A cookie this account was never holding: assume the
                    // real one was stolen and already spent, and revoke
                    // every other session along with it.
                    if !reuse_recorded {
                        self.events.record(SecurityEvent::RefreshReuseAtLogin {
                            user_id,
                            token_fingerprint: token_fingerprint(old),
                        });
                        reuse_recorded = true;
                    }
                    next.clear();
                }
            }
            next.insert(tokens.refresh_token.0.clone());

            match self
                .store
                .update_refresh_tokens(user_id, &next, record.version)
                .await?
            {
                WriteOutcome::Committed => {
                    return Ok(LoginOutcome {
                        user_id,
                        tokens,
                        clear_presented_cookie,
                    });
                }
                WriteOutcome::Conflict => record = self.reread(user_id).await?,
            }
        }
        Err(AuthError::Store(
            "refresh-token set contention at login".into(),
        ))
    }

    async fn refresh(&self, presented: Option<&str>) -> Result<AuthTokens, AuthError> {
        let Some(token) = presented else {
            return Err(AuthError::Unauthenticated);
        };
        let mut expiry_recorded = false;

        for _ in 0..SET_WRITE_RETRIES {
            let Some(record) = self.store.find_by_refresh_token(token).await? else {
                return self.reject_unrecognized(token).await;
            };

            // Consumed from here on, whatever happens next: a refresh
            // token handed to the server once can never be replayed.
            let mut next = record.refresh_tokens.clone();
            next.remove(token);

            let subject = match self.codec.verify_refresh_token(token).await {
                Ok(subject) => subject,
                Err(TokenError::Expired) | Err(TokenError::Invalid) => {
                    if !expiry_recorded {
                        self.events.record(SecurityEvent::ExpiredRefreshConsumed {
                            user_id: record.user_id,
                            token_fingerprint: token_fingerprint(token),
                        });
                        expiry_recorded = true;
                    }
                    match self
                        .store
                        .update_refresh_tokens(record.user_id, &next, record.version)
                        .await?
                    {
                        WriteOutcome::Committed => return Err(AuthError::Forbidden),
                        WriteOutcome::Conflict => continue,
                    }
                }
                Err(e @ TokenError::Encoding(_)) => {
                    return Err(AuthError::Internal(e.to_string()));
                }
            };

            if subject != record.user_id {
                // Cross-account confusion; should not occur under correct
                // issuance. Reject without touching the set.
                return Err(AuthError::Forbidden);
            }

            let tokens = self.issue_pair(subject).await?;
            next.insert(tokens.refresh_token.0.clone());
            match self
                .store
                .update_refresh_tokens(subject, &next, record.version)
                .await?
            {
                WriteOutcome::Committed => return Ok(tokens),
                WriteOutcome::Conflict => continue,
            }
        }
        Err(AuthError::Store(
            "refresh-token set contention while rotating".into(),
        ))
    }

    async fn logout(&self, presented: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = presented else {
            return Ok(());
        };

        for _ in 0..SET_WRITE_RETRIES {
            // Unknown token: already rotated out or never ours. Nothing to
            // do, and saying so would leak.
            let Some(record) = self.store.find_by_refresh_token(token).await? else {
                return Ok(());
            };

            let mut next = record.refresh_tokens.clone();
            next.remove(token);
            match self
                .store
                .update_refresh_tokens(record.user_id, &next, record.version)
                .await?
            {
                WriteOutcome::Committed => return Ok(()),
                WriteOutcome::Conflict => continue,
            }
        }
        Err(AuthError::Store(
            "refresh-token set contention at logout".into(),
        ))
    }

    async fn authenticate(&self, access_token: &str) -> Result<UserId, AuthError> {
        self.codec
            .verify_access_token(access_token)
            .await
            .map_err(|_| AuthError::Forbidden)
    }
}
