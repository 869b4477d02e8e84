//! Match runner: one matchmaking run at a time, last good result kept for display.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::matching::client::Matchmaker;
use crate::matching::normalizer::{normalize, MatchGroup};
use crate::matching::request_builder::MatchRequest;
use crate::matching::MatchError;
use crate::models::records::{Collection, RawRecord};
use crate::records::RecordStore;

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub groups: Vec<MatchGroup>,
    pub mutual_match_count: usize,
    pub posting_count: usize,
    pub profile_count: usize,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed { report: MatchReport },
    /// Another run was already in flight; nothing was sent.
    InProgress,
}

/// Clears the in-flight flag when a run ends, including when its future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct MatchRunner {
    records: Arc<dyn RecordStore>,
    matchmaker: Arc<dyn Matchmaker>,
    in_flight: AtomicBool,
    last_report: RwLock<Option<MatchReport>>,
}

impl MatchRunner {
    pub fn new(records: Arc<dyn RecordStore>, matchmaker: Arc<dyn Matchmaker>) -> Self {
        Self {
            records,
            matchmaker,
            in_flight: AtomicBool::new(false),
            last_report: RwLock::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The report from the most recent successful run.
    pub async fn last_report(&self) -> Option<MatchReport> {
        self.last_report.read().await.clone()
    }

    /// Fetches both collections, calls the service and normalizes the answer.
    /// A failed run leaves the previous report in place.
    pub async fn run(&self) -> Result<RunOutcome, MatchError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Matchmaking run already in flight; trigger ignored");
            return Ok(RunOutcome::InProgress);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let report = match self.execute().await {
            Ok(report) => report,
            Err(e) => {
                warn!("Matchmaking run aborted: {e}");
                return Err(e);
            }
        };

        for group in &report.groups {
            debug!(
                posting = %group.source_posting_label,
                profiles = ?group.matched_profile_labels(),
                "match group"
            );
        }
        info!(
            "Matchmaking completed: {} mutual matches across {} postings",
            report.mutual_match_count,
            report.groups.len()
        );
        *self.last_report.write().await = Some(report.clone());
        Ok(RunOutcome::Completed { report })
    }

    async fn execute(&self) -> Result<MatchReport, MatchError> {
        let postings = self.fetch(Collection::Postings).await?;
        let profiles = self.fetch(Collection::Profiles).await?;

        let request = MatchRequest::build(&postings, &profiles);
        let body = self.matchmaker.submit(&request).await?;
        let groups = normalize(body)?;

        Ok(MatchReport {
            mutual_match_count: groups.iter().map(|g| g.matched_profiles.len()).sum(),
            posting_count: request.postings.len(),
            profile_count: request.profiles.len(),
            groups,
            completed_at: Utc::now(),
        })
    }

    async fn fetch(&self, collection: Collection) -> Result<Vec<RawRecord>, MatchError> {
        self.records
            .fetch_all(collection)
            .await
            .map_err(|source| MatchError::Fetch {
                collection: collection.table(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::Notify;

    use crate::records::MemoryRecordStore;

    /// Returns queued responses in order and records every request it sees.
    #[derive(Default)]
    struct ScriptedMatchmaker {
        responses: Mutex<Vec<Result<Value, MatchError>>>,
        requests: Mutex<Vec<MatchRequest>>,
    }

    impl ScriptedMatchmaker {
        fn with(responses: Vec<Result<Value, MatchError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Matchmaker for ScriptedMatchmaker {
        async fn submit(&self, request: &MatchRequest) -> Result<Value, MatchError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses.lock().unwrap().remove(0)
        }
    }

    /// Blocks inside `submit` until released.
    #[derive(Default)]
    struct GatedMatchmaker {
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Matchmaker for GatedMatchmaker {
        async fn submit(&self, _request: &MatchRequest) -> Result<Value, MatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(json!([]))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn insert(&self, _collection: Collection, _record: RawRecord) -> anyhow::Result<()> {
            anyhow::bail!("store offline")
        }

        async fn fetch_all(&self, _collection: Collection) -> anyhow::Result<Vec<RawRecord>> {
            anyhow::bail!("store offline")
        }
    }

    async fn seeded_store() -> Arc<MemoryRecordStore> {
        let store = Arc::new(MemoryRecordStore::new());
        for title in ["Eng", "PM"] {
            let record = json!({"title": title}).as_object().cloned().unwrap();
            store.insert(Collection::Postings, record).await.unwrap();
        }
        let record = json!({"name": "Ada"}).as_object().cloned().unwrap();
        store.insert(Collection::Profiles, record).await.unwrap();
        store
    }

    fn grouped_response() -> Value {
        json!([{"posting_file": "Eng_1.txt", "mutual_matches": ["Ada_1.txt"]}])
    }

    #[tokio::test]
    async fn test_run_builds_request_and_stores_report() {
        let matchmaker = Arc::new(ScriptedMatchmaker::with(vec![Ok(grouped_response())]));
        let runner = MatchRunner::new(seeded_store().await, matchmaker.clone());

        let outcome = runner.run().await.unwrap();

        let RunOutcome::Completed { report } = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!(report.mutual_match_count, 1);
        assert_eq!(report.posting_count, 2);
        assert_eq!(report.profile_count, 1);
        assert_eq!(report.groups[0].source_posting_label, "Eng");

        let sent = matchmaker.requests.lock().unwrap()[0].clone();
        assert_eq!(sent.postings[1].id, 2);
        assert_eq!(sent.postings[1].title, "PM");
        assert_eq!(sent.profiles[0].name, "Ada");

        assert!(runner.last_report().await.is_some());
        assert!(!runner.is_running());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_before_any_call() {
        let matchmaker = Arc::new(ScriptedMatchmaker::with(vec![Ok(grouped_response())]));
        let runner = MatchRunner::new(Arc::new(FailingStore), matchmaker.clone());

        let err = runner.run().await.unwrap_err();

        assert!(matches!(
            err,
            MatchError::Fetch {
                collection: "postings",
                ..
            }
        ));
        assert_eq!(matchmaker.call_count(), 0);
        assert!(runner.last_report().await.is_none());
        assert!(!runner.is_running());
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_previous_report() {
        let matchmaker = Arc::new(ScriptedMatchmaker::with(vec![
            Ok(grouped_response()),
            Err(MatchError::Status {
                status: 503,
                body: "down".to_string(),
            }),
        ]));
        let runner = MatchRunner::new(seeded_store().await, matchmaker);
        runner.run().await.unwrap();
        let before = runner.last_report().await.unwrap();

        let err = runner.run().await.unwrap_err();

        assert!(matches!(err, MatchError::Status { status: 503, .. }));
        let after = runner.last_report().await.unwrap();
        assert_eq!(after.completed_at, before.completed_at);
        assert_eq!(after.groups, before.groups);
    }

    #[tokio::test]
    async fn test_unrecognized_shape_fails_and_keeps_previous_report() {
        let matchmaker = Arc::new(ScriptedMatchmaker::with(vec![
            Ok(grouped_response()),
            Ok(json!({"status": "ok"})),
        ]));
        let runner = MatchRunner::new(seeded_store().await, matchmaker);
        runner.run().await.unwrap();

        let err = runner.run().await.unwrap_err();

        assert!(matches!(err, MatchError::UnsupportedShape(_)));
        assert_eq!(runner.last_report().await.unwrap().mutual_match_count, 1);
    }

    #[tokio::test]
    async fn test_second_trigger_while_pending_makes_no_second_call() {
        let matchmaker = Arc::new(GatedMatchmaker::default());
        let runner = Arc::new(MatchRunner::new(seeded_store().await, matchmaker.clone()));

        let first = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run().await }
        });
        matchmaker.entered.notified().await;
        assert!(runner.is_running());

        let second = runner.run().await.unwrap();

        assert!(matches!(second, RunOutcome::InProgress));
        assert_eq!(matchmaker.calls.load(Ordering::SeqCst), 1);

        matchmaker.release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, RunOutcome::Completed { .. }));
        assert!(!runner.is_running());

        // Once the first run is done a new trigger goes through again.
        let third = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run().await }
        });
        matchmaker.entered.notified().await;
        matchmaker.release.notify_one();
        third.await.unwrap().unwrap();
        assert_eq!(matchmaker.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timed_out_run_keeps_previous_report() {
        use crate::matching::MatchClient;
        use axum::{routing::post, Json, Router};
        use std::time::Duration;

        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new().route(
            "/run-live-matchmaking",
            post(move || {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) > 0 {
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                    Json(grouped_response())
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let client = MatchClient::new(
            format!("http://{addr}/run-live-matchmaking"),
            Duration::from_millis(50),
        )
        .unwrap();
        let runner = MatchRunner::new(seeded_store().await, Arc::new(client));
        runner.run().await.unwrap();
        let before = runner.last_report().await.unwrap();

        let err = runner.run().await.unwrap_err();

        assert!(matches!(err, MatchError::Http(ref e) if e.is_timeout()));
        let after = runner.last_report().await.unwrap();
        assert_eq!(after.completed_at, before.completed_at);
        assert!(!runner.is_running());
    }
}
