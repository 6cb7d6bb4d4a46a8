use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::MutexGuard;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;
use yojana_core::UserProfile;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One conversation: its profile behind an async mutex, held for a whole turn
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    profile: tokio::sync::Mutex<UserProfile>,
    last_active: Mutex<Instant>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            profile: tokio::sync::Mutex::new(UserProfile::new()),
            last_active: Mutex::new(Instant::now()),
        }
    }

    #[inline]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Wait for exclusive access to the profile; turns queue here in arrival order
    pub async fn lock(&self) -> MutexGuard<'_, UserProfile> {
        let guard = self.profile.lock().await;
        self.touch();
        guard
    }

    /// Copy of the profile, waiting for any turn in flight
    pub async fn profile(&self) -> UserProfile {
        self.lock().await.clone()
    }

    pub fn touch(&self) {
        *self.last_active.lock() = Instant::now();
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_active.lock())
    }

    /// A turn currently holds the profile
    pub fn is_busy(&self) -> bool {
        self.profile.try_lock().is_err()
    }
}

/// Live sessions keyed by id, evicted after an idle timeout
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    #[inline]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn get_or_create(&self, id: &SessionId) -> Arc<Session> {
        if let Some(session) = self.sessions.read().get(id) {
            session.touch();
            return session.clone();
        }
        let mut sessions = self.sessions.write();
        sessions
            .entry(id.clone())
            .or_insert_with(|| {
                debug!(session = %id, "session created");
                Arc::new(Session::new(id.clone()))
            })
            .clone()
    }

    /// Start a session under a fresh random id
    pub fn create(&self) -> Arc<Session> {
        self.get_or_create(&SessionId::generate())
    }

    #[inline]
    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().keys().cloned().collect()
    }

    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    /// Drop sessions idle for at least the timeout as of `now`.
    ///
    /// A session in use (a turn holds it, or a caller still has its handle)
    /// is kept regardless of age.
    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| {
            Arc::strong_count(session) > 1
                || session.is_busy()
                || session.idle_for(now) < self.idle_timeout
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "evicted idle sessions");
        }
        evicted
    }

    /// Run [`evict_idle`](Self::evict_idle) every `interval` until the store is dropped
    pub fn spawn_eviction(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store: Weak<SessionStore> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match store.upgrade() {
                    Some(store) => {
                        store.evict_idle();
                    }
                    None => break,
                }
            }
        })
    }
}
