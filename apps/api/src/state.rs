use std::sync::Arc;

use crate::intake::IntakeSessions;
use crate::matching::MatchRunner;
use crate::records::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable record store. PostgreSQL when DATABASE_URL is set, in-memory otherwise.
    pub records: Arc<dyn RecordStore>,
    pub intake: IntakeSessions,
    /// Shared so the in-flight guard covers every request.
    pub matchmaking: Arc<MatchRunner>,
}
