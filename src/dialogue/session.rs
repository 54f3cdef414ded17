//! Per-visitor session state and the in-memory session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::lead::LeadDraft;

/// Session id used when the client does not supply one.
pub const DEFAULT_SESSION_ID: &str = "default_user";

/// One visitor's in-progress question-answer flow.
#[derive(Debug)]
pub struct Session {
    /// Cursor over the question sequence. 0 means nothing collected yet;
    /// k in 1..=7 means field k-1 was just recorded. Never decreases while
    /// the session is alive.
    pub step: usize,
    /// Answers collected so far.
    pub draft: LeadDraft,
    /// Language code, overwritten on every message.
    pub lang: String,
    /// The previous input for the current field failed validation; the same
    /// question is re-asked without advancing `step`.
    pub retry_pending: bool,
    /// Last message time, used for idle pruning.
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new(lang: &str) -> Self {
        Self {
            step: 0,
            draft: LeadDraft::default(),
            lang: lang.to_string(),
            retry_pending: false,
            last_seen: Utc::now(),
        }
    }
}

/// In-memory session store, keyed by opaque session id.
///
/// Sessions are fully independent; the per-session `Mutex` serializes
/// concurrent messages for the same id so two calls cannot race on
/// `step`/`draft`. Sessions are volatile: completed ones are removed and
/// idle ones are pruned by the sweep task.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the session for `id`, creating a fresh one on first contact.
    pub async fn resolve(&self, id: &str, lang: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(lang)))),
        )
    }

    /// Remove a session. Completed sessions are non-resumable.
    pub async fn remove(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle longer than `max_idle`. Sessions currently
    /// processing a message are left alone.
    pub async fn prune_idle(&self, max_idle: Duration) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => now
                .signed_duration_since(session.last_seen)
                .to_std()
                .map(|idle| idle <= max_idle)
                .unwrap_or(true),
            // Locked means a message is in flight right now.
            Err(_) => true,
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!(pruned, "Pruned idle sessions");
        }
    }
}

/// Spawn the idle-session sweep task (runs every 60s).
pub fn spawn_prune_task(
    store: Arc<SessionStore>,
    max_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            store.prune_idle(max_idle).await;
        }
    })
}
