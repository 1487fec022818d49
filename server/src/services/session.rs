//! Session issue, validation and teardown.
//!
//! ARCHITECTURE
//! ============
//! Route handlers and the route gate only see the [`SessionStore`] trait.
//! [`MemorySessionStore`] is the shipped implementation; a persistent store
//! plugs in behind the same three operations.
//!
//! TRADE-OFFS
//! ==========
//! Sessions are keyed by the SHA-256 digest of the bearer token, so a dump of
//! the table cannot be replayed as cookies. Expired rows are pruned lazily on
//! validate and periodically by the sweeper task.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

pub(crate) fn token_digest(token: &str) -> String {
    bytes_to_hex(&Sha256::digest(token.as_bytes()))
}

/// Identity attached to an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionUser {
    /// Per-session identity id.
    pub id: Uuid,
    /// Username or provider login.
    pub name: String,
    /// Provider that established the session (`"credentials"`, `"github"`).
    pub provider: String,
}

impl SessionUser {
    #[must_use]
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), provider: provider.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("session lifetime {0:?} does not fit the clock")]
    TtlOverflow(Duration),
}

/// Capability interface over the session lifecycle.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for `user` and return its bearer token.
    async fn issue(&self, user: SessionUser) -> Result<String, SessionError>;

    /// Resolve a bearer token to its user, if the session is live.
    async fn validate(&self, token: &str) -> Result<Option<SessionUser>, SessionError>;

    /// Drop a session. Unknown tokens are not an error.
    async fn destroy(&self, token: &str) -> Result<(), SessionError>;
}

struct StoredSession {
    user: SessionUser,
    expires_at: Instant,
}

/// In-process session table with a fixed time-to-live.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, sessions: RwLock::new(HashMap::new()) }
    }

    /// Remove every expired session, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn issue(&self, user: SessionUser) -> Result<String, SessionError> {
        let expires_at = Instant::now()
            .checked_add(self.ttl)
            .ok_or(SessionError::TtlOverflow(self.ttl))?;
        let token = generate_token();
        let stored = StoredSession { user, expires_at };
        self.sessions
            .write()
            .await
            .insert(token_digest(&token), stored);
        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Option<SessionUser>, SessionError> {
        if token.is_empty() {
            return Ok(None);
        }
        let key = token_digest(token);
        let now = Instant::now();

        {
            let sessions = self.sessions.read().await;
            match sessions.get(&key) {
                None => return Ok(None),
                Some(s) if s.expires_at > now => return Ok(Some(s.user.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it so the table does not wait for the sweeper.
        self.sessions.write().await.remove(&key);
        Ok(None)
    }

    async fn destroy(&self, token: &str) -> Result<(), SessionError> {
        self.sessions.write().await.remove(&token_digest(token));
        Ok(())
    }
}

/// Spawn a task that purges expired sessions every `interval`.
pub fn spawn_session_sweeper(store: Arc<MemorySessionStore>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "expired sessions purged");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
