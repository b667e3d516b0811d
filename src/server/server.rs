use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::MemoryCredentialStore;
use crate::infra_mysql::MySqlCredentialStore;
use crate::logger::*;
use crate::settings::Settings;
use chrono::Duration;
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    /// Cookie attributes the router needs, kept as plain values so the
    /// boundary does not depend on the settings module.
    pub cookie_secure: bool,
    pub refresh_ttl_secs: i64,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        if settings.auth.access_ttl_secs <= 0 || settings.auth.refresh_ttl_secs <= 0 {
            return Err(anyhow::anyhow!("token TTLs must be positive"));
        }
        if settings.auth.access_secret == settings.auth.refresh_secret {
            // Identical secrets would let an access token pass the refresh
            // check and vice versa.
            return Err(anyhow::anyhow!("access and refresh secrets must differ"));
        }

        let store: Arc<dyn CredentialStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryCredentialStore::new()),
            "mysql" => {
                let dsn = settings.store.mysql_dsn.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("store.mysql_dsn is required for the mysql backend")
                })?;
                let pool = Pool::<MySql>::connect(dsn).await?;
                Arc::new(MySqlCredentialStore::new(pool))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher {});
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            access_ttl: Duration::seconds(settings.auth.access_ttl_secs),
            refresh_ttl: Duration::seconds(settings.auth.refresh_ttl_secs),
            access_secret: settings.auth.access_secret.clone().into_bytes(),
            refresh_secret: settings.auth.refresh_secret.clone().into_bytes(),
        }));
        let events: Arc<dyn SecurityEventSink> = Arc::new(LogSecurityEvents::new());

        let auth_service: Arc<dyn AuthService> =
            Arc::new(RealAuthService::try_new(store, hasher, codec, events).await?);

        info!("server started");

        Ok(Self {
            auth_service,
            cookie_secure: settings.http.cookie_secure,
            refresh_ttl_secs: settings.auth.refresh_ttl_secs,
        })
    }
}
