use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use ai_llm_service::LlmService;
use contextor::{Contextor, Session};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One conversation, locked for the whole duration of an ask.
pub type SharedSession = Arc<Mutex<Session>>;

const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Limits on retained conversations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Idle time after which a session is discarded.
    pub ttl: Duration,
    /// Most sessions kept at once; the least recently used one goes first.
    pub max_sessions: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl SessionPolicy {
    /// Reads `SESSION_TTL_SECS` and `MAX_SESSIONS`.
    pub fn from_env() -> Self {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Same as [`SessionPolicy::from_env`] with an explicit lookup. Invalid or
    /// zero values keep the defaults.
    pub fn from_vars<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let d = Self::default();
        let num = |key: &str| -> Option<u64> {
            let raw = lookup(key)?;
            match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    warn!(key, value = %raw, "invalid session limit; using default");
                    None
                }
            }
        };

        Self {
            ttl: num("SESSION_TTL_SECS").map_or(d.ttl, Duration::from_secs),
            max_sessions: num("MAX_SESSIONS")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(d.max_sessions),
        }
    }
}

struct SessionEntry {
    session: SharedSession,
    last_used: Instant,
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Ranking + prompt + completion pipeline.
    pub contextor: Contextor,
    /// Backend probed by `/health`. `None` when the pipeline runs on a
    /// client that is not an [`LlmService`].
    pub llm: Option<Arc<LlmService>>,
    policy: SessionPolicy,
    /// Conversations by session id.
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl AppState {
    pub fn new(contextor: Contextor, llm: Option<Arc<LlmService>>) -> Self {
        Self {
            contextor,
            llm,
            policy: SessionPolicy::default(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_session_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Session for `id`, created empty on first use.
    pub async fn session(&self, id: &str) -> SharedSession {
        self.session_at(id, Instant::now()).await
    }

    async fn session_at(&self, id: &str, now: Instant) -> SharedSession {
        let mut map = self.sessions.lock().await;
        self.evict_idle(&mut map, now);

        if let Some(entry) = map.get_mut(id) {
            entry.last_used = now;
            return entry.session.clone();
        }

        if map.len() >= self.policy.max_sessions {
            let oldest = map
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                debug!(session_id = %k, "session limit reached; evicting least recently used");
                map.remove(&k);
            }
        }

        let session = SharedSession::default();
        map.insert(
            id.to_string(),
            SessionEntry {
                session: session.clone(),
                last_used: now,
            },
        );
        session
    }

    /// Existing session for `id`.
    pub async fn find_session(&self, id: &str) -> Option<SharedSession> {
        self.find_session_at(id, Instant::now()).await
    }

    async fn find_session_at(&self, id: &str, now: Instant) -> Option<SharedSession> {
        let mut map = self.sessions.lock().await;
        self.evict_idle(&mut map, now);
        map.get_mut(id).map(|entry| {
            entry.last_used = now;
            entry.session.clone()
        })
    }

    /// Ends the session; returns it if it existed.
    pub async fn end_session(&self, id: &str) -> Option<SharedSession> {
        self.sessions.lock().await.remove(id).map(|e| e.session)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn evict_idle(&self, map: &mut HashMap<String, SessionEntry>, now: Instant) {
        let before = map.len();
        map.retain(|_, e| now.saturating_duration_since(e.last_used) <= self.policy.ttl);
        let evicted = before - map.len();
        if evicted > 0 {
            debug!(evicted, "idle sessions discarded");
        }
    }
}
