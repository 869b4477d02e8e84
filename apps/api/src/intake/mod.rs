// Conversational profile intake: category model, conversation engine and the coordinator
// that maps raw UI events onto them. Sessions live in process memory.

pub mod category;
pub mod conversation;
pub mod coordinator;
pub mod handlers;
pub mod progress;
pub mod view;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::intake::coordinator::IntakeCoordinator;
use crate::intake::progress::ProgressSignal;
use crate::intake::view::IntakeView;

pub struct IntakeSession {
    pub created_at: DateTime<Utc>,
    pub last_touched: DateTime<Utc>,
    pub coordinator: IntakeCoordinator,
}

impl IntakeSession {
    fn is_idle(&self, now: DateTime<Utc>, idle_ttl: Duration) -> bool {
        now.signed_duration_since(self.last_touched)
            .to_std()
            .map_or(false, |idle| idle > idle_ttl)
    }
}

/// All live intake sessions. One lock serializes every event, so handlers run one at a time.
///
/// Sessions untouched for longer than `idle_ttl` are dropped: lazily when looked up,
/// and in bulk on every `create` and `sweep_idle`.
#[derive(Clone)]
pub struct IntakeSessions {
    sessions: Arc<Mutex<HashMap<Uuid, IntakeSession>>>,
    progress_signal: Arc<dyn ProgressSignal>,
    idle_ttl: Duration,
}

impl IntakeSessions {
    pub fn new(progress_signal: Arc<dyn ProgressSignal>, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            progress_signal,
            idle_ttl,
        }
    }

    pub async fn create(&self) -> IntakeView {
        let session_id = Uuid::new_v4();
        let now = Utc::now();
        let session = IntakeSession {
            created_at: now,
            last_touched: now,
            coordinator: IntakeCoordinator::new(self.progress_signal.clone()),
        };
        let view = IntakeView::render(session_id, session.created_at, &session.coordinator);

        let mut sessions = self.sessions.lock().await;
        evict_idle(&mut sessions, now, self.idle_ttl);
        sessions.insert(session_id, session);
        info!("Created intake session {session_id}");
        view
    }

    /// Runs `f` against the session and returns its result with the post-call view.
    /// `None` if the session does not exist or has gone idle.
    pub async fn with_session<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut IntakeCoordinator) -> R,
    ) -> Option<(R, IntakeView)> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        if sessions.get(&session_id)?.is_idle(now, self.idle_ttl) {
            sessions.remove(&session_id);
            info!("Intake session {session_id} expired");
            return None;
        }
        let session = sessions.get_mut(&session_id)?;
        session.last_touched = now;
        let result = f(&mut session.coordinator);
        let view = IntakeView::render(session_id, session.created_at, &session.coordinator);
        Some((result, view))
    }

    /// Drops every idle session and returns how many were removed.
    pub async fn sweep_idle(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        evict_idle(&mut sessions, Utc::now(), self.idle_ttl)
    }
}

fn evict_idle(
    sessions: &mut HashMap<Uuid, IntakeSession>,
    now: DateTime<Utc>,
    idle_ttl: Duration,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_idle(now, idle_ttl));
    let evicted = before - sessions.len();
    if evicted > 0 {
        debug!("Evicted {evicted} idle intake sessions");
    }
    evicted
}
