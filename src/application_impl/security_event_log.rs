use crate::domain_port::{SecurityEvent, SecurityEventSink};
use crate::logger::*;

/// Sink that writes security events to the process log. Token material is
/// already reduced to fingerprints by the time it reaches here.
#[derive(Debug, Default)]
pub struct LogSecurityEvents;

impl LogSecurityEvents {
    pub fn new() -> Self {
        Self
    }
}

impl SecurityEventSink for LogSecurityEvents {
    fn record(&self, event: SecurityEvent) {
        match event {
            SecurityEvent::RefreshReuseAtLogin {
                user_id,
                token_fingerprint,
            } => {
                warn!(%user_id, token = %token_fingerprint, "attempted refresh token reuse at login");
            }
            SecurityEvent::RefreshReuse {
                user_id,
                token_fingerprint,
            } => {
                warn!(%user_id, token = %token_fingerprint, "attempted refresh token reuse");
            }
            SecurityEvent::ExpiredRefreshConsumed {
                user_id,
                token_fingerprint,
            } => {
                warn!(%user_id, token = %token_fingerprint, "expired refresh token");
            }
        }
    }
}
