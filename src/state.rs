use crate::config::Config;
use crate::session::TrackingSession;
use crate::types::track::ActivityRecord;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    sessions: Arc<DashMap<String, LiveSession>>,
    activities: Arc<DashMap<String, StoredActivity>>,
}

struct LiveSession {
    session: TrackingSession,
    touched_at: Instant,
}

struct StoredActivity {
    record: ActivityRecord,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(DashMap::new()),
            activities: Arc::new(DashMap::new()),
        }
    }

    pub fn insert_session(&self, session_id: String, session: TrackingSession) {
        self.sessions.insert(
            session_id,
            LiveSession {
                session,
                touched_at: Instant::now(),
            },
        );
    }

    /// Runs `f` against a live session while holding its shard lock.
    pub fn with_session<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut TrackingSession) -> T,
    ) -> Option<T> {
        self.sessions.get_mut(session_id).map(|mut entry| {
            entry.touched_at = Instant::now();
            f(&mut entry.session)
        })
    }

    pub fn remove_session(&self, session_id: &str) -> Option<TrackingSession> {
        self.sessions
            .remove(session_id)
            .map(|(_, live)| live.session)
    }

    pub fn live_session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn insert_activity(&self, activity_id: String, record: ActivityRecord) {
        self.activities.insert(
            activity_id,
            StoredActivity {
                record,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn get_activity(&self, activity_id: &str) -> Option<ActivityRecord> {
        self.activities
            .get(activity_id)
            .map(|entry| entry.record.clone())
    }

    pub fn evict_expired(&self, activity_ttl: Duration, session_idle_ttl: Duration) {
        let now = Instant::now();
        self.activities
            .retain(|_, stored| now.duration_since(stored.inserted_at) < activity_ttl);
        self.sessions
            .retain(|_, live| now.duration_since(live.touched_at) < session_idle_ttl);
        tracing::info!(
            "Eviction complete. Activities: {}, live sessions: {}",
            self.activities.len(),
            self.sessions.len()
        );
    }
}
