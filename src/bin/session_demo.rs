//! Walks the whole token lifecycle against the in-memory store: login,
//! rotation, replay of the spent token, and the resulting revocation.
//!
//! $ cargo run --bin session_demo

use chrono::Duration;
use std::sync::Arc;
use wicket::application_impl::*;
use wicket::application_port::*;
use wicket::domain_model::*;
use wicket::domain_port::*;
use wicket::infra_memory::MemoryCredentialStore;
use wicket::logger::Logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _logger = Logger::bootstrap();

    let store = Arc::new(MemoryCredentialStore::new());
    let hasher = Arc::new(Argon2PasswordHasher {});
    let codec = Arc::new(JwtHs256Codec::new(JwtConfig {
        issuer: "wicket-demo".to_string(),
        audience: "wicket-client".to_string(),
        access_ttl: Duration::seconds(60),
        refresh_ttl: Duration::days(1),
        access_secret: b"demo-access-secret".to_vec(),
        refresh_secret: b"demo-refresh-secret".to_vec(),
    }));
    let events = Arc::new(LogSecurityEvents::new());

    let digest = hasher.hash_password("hunter2").await?;
    let user_id = UserId::random();
    store.insert_credential(CredentialRecord {
        user_id,
        email: "demo@example.com".to_string(),
        password_digest: digest,
        refresh_tokens: RefreshTokenSet::new(),
        version: SetVersion(0),
    });

    let service = RealAuthService::try_new(store.clone(), hasher, codec, events).await?;

    let outcome = service
        .login(LoginInput {
            email: "demo@example.com".to_string(),
            password: "hunter2".to_string(),
            presented_refresh_token: None,
        })
        .await?;
    println!(
        "login: user={} access expires {}",
        outcome.user_id, outcome.tokens.access_token_expires_at
    );

    let spent = outcome.tokens.refresh_token.0.clone();
    let rotated = service.refresh(Some(&spent)).await?;
    println!(
        "refresh: rotated, new refresh expires {}",
        rotated.refresh_token_expires_at
    );

    // Replaying the consumed token burns every session of the account.
    let replay = service.refresh(Some(&spent)).await;
    println!("replay of spent token: {replay:?}");

    let remaining = store.refresh_tokens(user_id).map_or(0, |t| t.len());
    println!("live sessions after replay: {remaining}");

    Ok(())
}
