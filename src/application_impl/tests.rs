//! Rotation-engine tests over the in-memory store.

use super::*;
use crate::application_port::{
    AuthError, AuthService, CredentialHasher, LoginInput, LoginOutcome, TokenCodec, TokenError,
};
use crate::domain_model::{RefreshTokenSet, SetVersion, UserId};
use crate::domain_port::{
    CredentialRecord, CredentialStore, SecurityEvent, SecurityEventSink, SessionRecord, StoreError,
    WriteOutcome, token_fingerprint,
};
use crate::infra_memory::MemoryCredentialStore;
use anyhow::Result;
use chrono::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn jwt_config(access_ttl: Duration, refresh_ttl: Duration) -> JwtConfig {
    JwtConfig {
        issuer: "wicket-test".to_string(),
        audience: "wicket-client".to_string(),
        access_ttl,
        refresh_ttl,
        access_secret: b"access-secret-0123456789".to_vec(),
        refresh_secret: b"refresh-secret-9876543210".to_vec(),
    }
}

fn codec() -> Arc<JwtHs256Codec> {
    Arc::new(JwtHs256Codec::new(jwt_config(
        Duration::seconds(60),
        Duration::days(1),
    )))
}

/// Deterministic stand-in for argon2 so tests stay fast. Counts verify
/// calls so the decoy check is observable.
#[derive(Default)]
struct FakeHasher {
    verify_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl CredentialHasher for FakeHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("digest:{password}"))
    }

    async fn verify_password(
        &self,
        password: &str,
        password_digest: &str,
    ) -> Result<bool, AuthError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(password_digest == format!("digest:{password}"))
    }
}

#[derive(Default)]
struct RecordingEvents(Mutex<Vec<SecurityEvent>>);

impl RecordingEvents {
    fn take(&self) -> Vec<SecurityEvent> {
        std::mem::take(&mut *self.0.lock().expect("events lock"))
    }
}

impl SecurityEventSink for RecordingEvents {
    fn record(&self, event: SecurityEvent) {
        self.0.lock().expect("events lock").push(event);
    }
}

/// Store whose conditional writes can be made to fail on demand, standing
/// in for a concurrent writer bumping the version.
struct ContentiousStore {
    inner: MemoryCredentialStore,
    forced_conflicts: AtomicUsize,
}

impl ContentiousStore {
    fn new() -> Self {
        Self {
            inner: MemoryCredentialStore::new(),
            forced_conflicts: AtomicUsize::new(0),
        }
    }

    fn force_conflicts(&self, n: usize) {
        self.forced_conflicts.store(n, Ordering::SeqCst);
    }

    fn should_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait::async_trait]
impl CredentialStore for ContentiousStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        self.inner.find_by_refresh_token(token).await
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<SessionRecord>, StoreError> {
        self.inner.find_by_id(user_id).await
    }

    async fn update_refresh_tokens(
        &self,
        user_id: UserId,
        tokens: &RefreshTokenSet,
        expected: SetVersion,
    ) -> Result<WriteOutcome, StoreError> {
        if self.should_conflict() {
            return Ok(WriteOutcome::Conflict);
        }
        self.inner.update_refresh_tokens(user_id, tokens, expected).await
    }
}

/// Store that fails every call, for asserting which paths never reach
/// persistence.
struct FailingStore;

#[async_trait::async_trait]
impl CredentialStore for FailingStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        Err(StoreError::Backend("backend offline".into()))
    }

    async fn find_by_refresh_token(
        &self,
        _token: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        Err(StoreError::Backend("backend offline".into()))
    }

    async fn find_by_id(&self, _user_id: UserId) -> Result<Option<SessionRecord>, StoreError> {
        Err(StoreError::Backend("backend offline".into()))
    }

    async fn update_refresh_tokens(
        &self,
        _user_id: UserId,
        _tokens: &RefreshTokenSet,
        _expected: SetVersion,
    ) -> Result<WriteOutcome, StoreError> {
        Err(StoreError::Backend("backend offline".into()))
    }
}

struct Harness {
    store: Arc<MemoryCredentialStore>,
    hasher: Arc<FakeHasher>,
    events: Arc<RecordingEvents>,
    service: RealAuthService,
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryCredentialStore::new());
    let hasher = Arc::new(FakeHasher::default());
    let events = Arc::new(RecordingEvents::default());
    let service = RealAuthService::try_new(
        store.clone(),
        hasher.clone(),
        codec(),
        events.clone(),
    )
    .await
    .expect("service construction");
    Harness {
        store,
        hasher,
        events,
        service,
    }
}

async fn service_over(
    store: Arc<dyn CredentialStore>,
) -> (Arc<RecordingEvents>, RealAuthService) {
    let events = Arc::new(RecordingEvents::default());
    let service = RealAuthService::try_new(
        store,
        Arc::new(FakeHasher::default()),
        codec(),
        events.clone(),
    )
    .await
    .expect("service construction");
    (events, service)
}

fn seed_record(email: &str, password: &str, tokens: Vec<String>) -> CredentialRecord {
    CredentialRecord {
        user_id: UserId::random(),
        email: email.to_string(),
        password_digest: format!("digest:{password}"),
        refresh_tokens: RefreshTokenSet::from_tokens(tokens),
        version: SetVersion(0),
    }
}

fn seed_user(store: &MemoryCredentialStore, email: &str, password: &str) -> UserId {
    let record = seed_record(email, password, Vec::new());
    let user_id = record.user_id;
    store.insert_credential(record);
    user_id
}

async fn login(h: &Harness, email: &str, password: &str, cookie: Option<&str>) -> LoginOutcome {
    h.service
        .login(LoginInput {
            email: email.to_string(),
            password: password.to_string(),
            presented_refresh_token: cookie.map(str::to_string),
        })
        .await
        .expect("login")
}

fn live_tokens(h: &Harness, user_id: UserId) -> Vec<String> {
    h.store
        .refresh_tokens(user_id)
        .expect("credential record")
        .iter()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn login_issues_verifiable_token_pair() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");

    let outcome = login(&h, "alice@example.com", "hunter2", None).await;

    assert_eq!(outcome.user_id, uid);
    assert!(!outcome.clear_presented_cookie);
    assert!(outcome.tokens.access_token_expires_at < outcome.tokens.refresh_token_expires_at);

    let verified = h
        .service
        .authenticate(&outcome.tokens.access_token.0)
        .await
        .expect("access token verifies");
    assert_eq!(verified, uid);

    assert_eq!(live_tokens(&h, uid), vec![outcome.tokens.refresh_token.0]);
    assert!(h.events.take().is_empty());
}

#[tokio::test]
async fn login_unknown_email_burns_decoy_verification() {
    let h = harness().await;
    seed_user(&h.store, "alice@example.com", "hunter2");

    let err = h
        .service
        .login(LoginInput {
            email: "nobody@example.com".to_string(),
            password: "whatever".to_string(),
            presented_refresh_token: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials));
    // The miss still paid for one digest verification.
    assert_eq!(h.hasher.verify_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn login_wrong_password_rejected_and_set_untouched() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let first = login(&h, "alice@example.com", "hunter2", None).await;

    let err = h
        .service
        .login(LoginInput {
            email: "alice@example.com".to_string(),
            password: "wrong".to_string(),
            presented_refresh_token: Some(first.tokens.refresh_token.0.clone()),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(live_tokens(&h, uid), vec![first.tokens.refresh_token.0]);
    assert!(h.events.take().is_empty());
}

#[tokio::test]
async fn login_accumulates_one_token_per_device() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");

    let laptop = login(&h, "alice@example.com", "hunter2", None).await;
    let phone = login(&h, "alice@example.com", "hunter2", None).await;

    let tokens = live_tokens(&h, uid);
    assert_eq!(tokens.len(), 2);
    assert!(tokens.contains(&laptop.tokens.refresh_token.0));
    assert!(tokens.contains(&phone.tokens.refresh_token.0));
    assert_ne!(laptop.tokens.refresh_token.0, phone.tokens.refresh_token.0);
}

#[tokio::test]
async fn login_with_live_cookie_replaces_that_token() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let first = login(&h, "alice@example.com", "hunter2", None).await;

    let second = login(
        &h,
        "alice@example.com",
        "hunter2",
        Some(&first.tokens.refresh_token.0),
    )
    .await;

    assert!(second.clear_presented_cookie);
    assert_eq!(live_tokens(&h, uid), vec![second.tokens.refresh_token.0]);
    assert!(h.events.take().is_empty());
}

#[tokio::test]
async fn login_with_rotated_cookie_revokes_every_session() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let first = login(&h, "alice@example.com", "hunter2", None).await;
    let stale = first.tokens.refresh_token.0.clone();

    // Rotation consumes the cookie the browser still holds.
    h.service
        .refresh(Some(&stale))
        .await
        .expect("first refresh");

    let third = login(&h, "alice@example.com", "hunter2", Some(&stale)).await;

    // Only the token minted by this login survives.
    assert_eq!(live_tokens(&h, uid), vec![third.tokens.refresh_token.0]);
    assert_eq!(
        h.events.take(),
        vec![SecurityEvent::RefreshReuseAtLogin {
            user_id: uid,
            token_fingerprint: token_fingerprint(&stale),
        }]
    );
}

#[tokio::test]
async fn refresh_rotates_presented_token() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let outcome = login(&h, "alice@example.com", "hunter2", None).await;
    let old = outcome.tokens.refresh_token.0.clone();

    let rotated = h.service.refresh(Some(&old)).await.expect("refresh");

    assert_ne!(rotated.refresh_token.0, old);
    assert_eq!(live_tokens(&h, uid), vec![rotated.refresh_token.0.clone()]);

    let verified = h
        .service
        .authenticate(&rotated.access_token.0)
        .await
        .expect("rotated access token verifies");
    assert_eq!(verified, uid);
}

#[tokio::test]
async fn refresh_without_cookie_never_touches_store() {
    let (_events, service) = service_over(Arc::new(FailingStore)).await;

    let err = service.refresh(None).await.unwrap_err();

    // FailingStore would have surfaced as AuthError::Store.
    assert!(matches!(err, AuthError::Unauthenticated));
}

#[tokio::test]
async fn refresh_unverifiable_unknown_token_rejected_quietly() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let outcome = login(&h, "alice@example.com", "hunter2", None).await;

    let err = h.service.refresh(Some("not-a-jwt")).await.unwrap_err();

    assert!(matches!(err, AuthError::Forbidden));
    assert_eq!(live_tokens(&h, uid), vec![outcome.tokens.refresh_token.0]);
    assert!(h.events.take().is_empty());
}

#[tokio::test]
async fn refresh_replay_revokes_every_session() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    login(&h, "alice@example.com", "hunter2", None).await;
    let second = login(&h, "alice@example.com", "hunter2", None).await;
    let spent = second.tokens.refresh_token.0.clone();

    h.service
        .refresh(Some(&spent))
        .await
        .expect("legitimate rotation");

    // Replay of the consumed token: attacker and victim both lose.
    let err = h.service.refresh(Some(&spent)).await.unwrap_err();
    assert!(matches!(err, AuthError::Forbidden));
    assert!(live_tokens(&h, uid).is_empty());

    let events = h.events.take();
    assert_eq!(
        events,
        vec![SecurityEvent::RefreshReuse {
            user_id: uid,
            token_fingerprint: token_fingerprint(&spent),
        }]
    );
    // Fingerprints in the log never contain the raw token.
    assert_ne!(events_fingerprint(&events), Some(spent));
}

fn events_fingerprint(events: &[SecurityEvent]) -> Option<String> {
    events.first().map(|e| match e {
        SecurityEvent::RefreshReuseAtLogin {
            token_fingerprint, ..
        }
        | SecurityEvent::RefreshReuse {
            token_fingerprint, ..
        }
        | SecurityEvent::ExpiredRefreshConsumed {
            token_fingerprint, ..
        } => token_fingerprint.clone(),
    })
}

#[tokio::test]
async fn refresh_never_issued_token_burns_subject() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    login(&h, "alice@example.com", "hunter2", None).await;

    // Correctly signed for this account but never placed in its set, as an
    // exfiltrated-and-reminted token would be.
    let (rogue, _) = codec()
        .issue_refresh_token(uid)
        .await
        .expect("mint rogue token");

    let err = h.service.refresh(Some(&rogue.0)).await.unwrap_err();

    assert!(matches!(err, AuthError::Forbidden));
    assert!(live_tokens(&h, uid).is_empty());
    assert_eq!(
        h.events.take(),
        vec![SecurityEvent::RefreshReuse {
            user_id: uid,
            token_fingerprint: token_fingerprint(&rogue.0),
        }]
    );
}

#[tokio::test]
async fn refresh_expired_member_token_consumed_without_rotation() {
    let h = harness().await;

    let expired_codec = JwtHs256Codec::new(jwt_config(
        Duration::seconds(60),
        Duration::seconds(-120),
    ));
    let record = seed_record("carol@example.com", "pw", Vec::new());
    let uid = record.user_id;
    let (expired, _) = expired_codec
        .issue_refresh_token(uid)
        .await
        .expect("mint expired token");
    h.store.insert_credential(CredentialRecord {
        refresh_tokens: RefreshTokenSet::from_tokens(vec![expired.0.clone()]),
        ..record
    });

    let err = h.service.refresh(Some(&expired.0)).await.unwrap_err();

    assert!(matches!(err, AuthError::Forbidden));
    assert!(live_tokens(&h, uid).is_empty());
    assert_eq!(
        h.events.take(),
        vec![SecurityEvent::ExpiredRefreshConsumed {
            user_id: uid,
            token_fingerprint: token_fingerprint(&expired.0),
        }]
    );
}

#[tokio::test]
async fn refresh_foreign_subject_rejected_without_consuming() {
    let h = harness().await;

    // A token whose signature names some other account, planted in
    // alice's set.
    let foreign_uid = UserId::random();
    let (foreign, _) = codec()
        .issue_refresh_token(foreign_uid)
        .await
        .expect("mint foreign token");
    let record = seed_record("alice@example.com", "hunter2", vec![foreign.0.clone()]);
    let uid = record.user_id;
    h.store.insert_credential(record);

    let err = h.service.refresh(Some(&foreign.0)).await.unwrap_err();

    assert!(matches!(err, AuthError::Forbidden));
    // Kept for the audit trail rather than silently absorbed.
    assert_eq!(live_tokens(&h, uid), vec![foreign.0]);
    assert!(h.events.take().is_empty());
}

#[tokio::test]
async fn refresh_retries_past_version_conflicts() {
    let store = Arc::new(ContentiousStore::new());
    let (_events, service) = service_over(store.clone()).await;
    let uid = seed_user(&store.inner, "alice@example.com", "hunter2");

    let outcome = service
        .login(LoginInput {
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
            presented_refresh_token: None,
        })
        .await
        .expect("login");

    store.force_conflicts(2);
    let rotated = service
        .refresh(Some(&outcome.tokens.refresh_token.0))
        .await
        .expect("rotation survives two conflicts");

    let tokens = store
        .inner
        .refresh_tokens(uid)
        .expect("credential record");
    assert!(tokens.contains(&rotated.refresh_token.0));
    assert!(!tokens.contains(&outcome.tokens.refresh_token.0));
}

#[tokio::test]
async fn refresh_conflict_exhaustion_reports_store_error() {
    let store = Arc::new(ContentiousStore::new());
    let (_events, service) = service_over(store.clone()).await;
    seed_user(&store.inner, "alice@example.com", "hunter2");

    let outcome = service
        .login(LoginInput {
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
            presented_refresh_token: None,
        })
        .await
        .expect("login");

    store.force_conflicts(usize::MAX);
    let err = service
        .refresh(Some(&outcome.tokens.refresh_token.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Store(_)));
}

#[tokio::test]
async fn login_conflict_exhaustion_reports_store_error() {
    let store = Arc::new(ContentiousStore::new());
    let (_events, service) = service_over(store.clone()).await;
    seed_user(&store.inner, "alice@example.com", "hunter2");

    store.force_conflicts(usize::MAX);
    let err = service
        .login(LoginInput {
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
            presented_refresh_token: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Store(_)));
}

#[tokio::test]
async fn logout_removes_only_presented_session() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let laptop = login(&h, "alice@example.com", "hunter2", None).await;
    let phone = login(&h, "alice@example.com", "hunter2", None).await;

    h.service
        .logout(Some(&laptop.tokens.refresh_token.0))
        .await
        .expect("logout");

    assert_eq!(live_tokens(&h, uid), vec![phone.tokens.refresh_token.0]);
}

#[tokio::test]
async fn logout_unknown_token_succeeds_quietly() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let outcome = login(&h, "alice@example.com", "hunter2", None).await;

    h.service
        .logout(Some("not-a-jwt"))
        .await
        .expect("logout of unknown token");

    assert_eq!(live_tokens(&h, uid), vec![outcome.tokens.refresh_token.0]);
}

#[tokio::test]
async fn logout_without_cookie_never_touches_store() {
    let (_events, service) = service_over(Arc::new(FailingStore)).await;

    service.logout(None).await.expect("logout without cookie");
}

#[tokio::test]
async fn logout_is_idempotent() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let outcome = login(&h, "alice@example.com", "hunter2", None).await;
    let token = outcome.tokens.refresh_token.0;

    h.service.logout(Some(&token)).await.expect("first logout");
    h.service.logout(Some(&token)).await.expect("second logout");

    assert!(live_tokens(&h, uid).is_empty());
}

#[tokio::test]
async fn refresh_after_logout_is_rejected() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let outcome = login(&h, "alice@example.com", "hunter2", None).await;
    let token = outcome.tokens.refresh_token.0;

    h.service.logout(Some(&token)).await.expect("logout");

    // Consumed is consumed; a logged-out token replayed later reads as
    // reuse, same as a rotated one.
    let err = h.service.refresh(Some(&token)).await.unwrap_err();
    assert!(matches!(err, AuthError::Forbidden));
    assert!(live_tokens(&h, uid).is_empty());
    assert_eq!(
        h.events.take(),
        vec![SecurityEvent::RefreshReuse {
            user_id: uid,
            token_fingerprint: token_fingerprint(&token),
        }]
    );
}

#[tokio::test]
async fn token_classes_never_cross() {
    let h = harness().await;
    seed_user(&h.store, "alice@example.com", "hunter2");
    let outcome = login(&h, "alice@example.com", "hunter2", None).await;

    // A refresh token is not an access token.
    let err = h
        .service
        .authenticate(&outcome.tokens.refresh_token.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden));

    // An access token is not a refresh token, and trying it burns nothing.
    let err = h
        .service
        .refresh(Some(&outcome.tokens.access_token.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden));
    assert!(h.events.take().is_empty());
}

#[tokio::test]
async fn store_failure_maps_to_store_error() {
    let (_events, service) = service_over(Arc::new(FailingStore)).await;

    let err = service
        .login(LoginInput {
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
            presented_refresh_token: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Store(_)));
}

#[tokio::test]
async fn revoked_account_logs_back_in() {
    let h = harness().await;
    let uid = seed_user(&h.store, "alice@example.com", "hunter2");
    let first = login(&h, "alice@example.com", "hunter2", None).await;
    let spent = first.tokens.refresh_token.0.clone();

    h.service.refresh(Some(&spent)).await.expect("rotation");
    let _ = h.service.refresh(Some(&spent)).await.unwrap_err();
    assert!(live_tokens(&h, uid).is_empty());

    // Password knowledge restores access after the burn.
    let again = login(&h, "alice@example.com", "hunter2", None).await;
    assert_eq!(live_tokens(&h, uid), vec![again.tokens.refresh_token.0]);
}

#[tokio::test]
async fn argon2_digest_round_trips() -> Result<()> {
    let hasher = Argon2PasswordHasher;
    let digest = hasher.hash_password("hunter2").await?;

    assert!(hasher.verify_password("hunter2", &digest).await?);
    assert!(!hasher.verify_password("wrong", &digest).await?);
    Ok(())
}

#[tokio::test]
async fn jwt_round_trips_subject() -> Result<()> {
    let codec = codec();
    let uid = UserId::random();

    let (access, _) = codec.issue_access_token(uid).await?;
    assert_eq!(codec.verify_access_token(&access.0).await?, uid);

    let (refresh, _) = codec.issue_refresh_token(uid).await?;
    assert_eq!(codec.verify_refresh_token(&refresh.0).await?, uid);
    Ok(())
}

#[tokio::test]
async fn jwt_expired_token_reported_as_expired() -> Result<()> {
    let codec = JwtHs256Codec::new(jwt_config(
        Duration::seconds(-120),
        Duration::seconds(-120),
    ));
    let uid = UserId::random();

    let (access, _) = codec.issue_access_token(uid).await?;
    let err = codec.verify_access_token(&access.0).await.unwrap_err();
    assert!(matches!(err, TokenError::Expired));
    Ok(())
}

#[tokio::test]
async fn jwt_cross_class_verification_fails() -> Result<()> {
    let codec = codec();
    let uid = UserId::random();

    let (access, _) = codec.issue_access_token(uid).await?;
    let err = codec.verify_refresh_token(&access.0).await.unwrap_err();
    assert!(matches!(err, TokenError::Invalid));
    Ok(())
}

#[tokio::test]
async fn jwt_foreign_issuer_rejected() -> Result<()> {
    let mut foreign_cfg = jwt_config(Duration::seconds(60), Duration::days(1));
    foreign_cfg.issuer = "someone-else".to_string();
    let foreign = JwtHs256Codec::new(foreign_cfg);
    let uid = UserId::random();

    let (access, _) = foreign.issue_access_token(uid).await?;
    let err = codec().verify_access_token(&access.0).await.unwrap_err();
    assert!(matches!(err, TokenError::Invalid));
    Ok(())
}

#[tokio::test]
async fn same_second_mints_stay_distinct() -> Result<()> {
    let codec = codec();
    let uid = UserId::random();

    let (first, _) = codec.issue_refresh_token(uid).await?;
    let (second, _) = codec.issue_refresh_token(uid).await?;
    assert_ne!(first.0, second.0);
    Ok(())
}
