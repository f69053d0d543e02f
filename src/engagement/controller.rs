use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Duration, Instant},
};
use uuid::Uuid;

use crate::{
    analytics::{AnalyticsEvent, CourseSectionTime, EventSink},
    classify::section_name,
    page::{ActivityKind, PageRoute},
    settings::EngagementSettings,
};

use super::state::{rounded_seconds, EngagementSession, EngagementState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementSnapshot {
    pub session_id: String,
    pub state: EngagementState,
    pub visible: bool,
    pub active_ms: u64,
    pub started_at: DateTime<Utc>,
    pub page_path: String,
    pub locale: String,
}

/// Drives one [`EngagementSession`] from browser events and owns its idle
/// watcher task. Clones share the same session.
#[derive(Clone)]
pub struct EngagementTimer {
    session: Arc<Mutex<EngagementSession>>,
    route: PageRoute,
    sink: EventSink,
    idle_watcher: Arc<Mutex<Option<JoinHandle<()>>>>,
    idle_timeout: Duration,
    min_report_ms: u64,
}

impl EngagementTimer {
    /// Begins a session in the active state and arms the first idle window.
    pub async fn start(route: PageRoute, sink: EventSink, settings: &EngagementSettings) -> Self {
        let session = EngagementSession::begin(
            Uuid::new_v4().to_string(),
            Utc::now(),
            Instant::now(),
        );

        log_info!(
            "engagement session {} started for {} ({})",
            session.session_id(),
            route.path,
            route.locale
        );

        let timer = Self {
            session: Arc::new(Mutex::new(session)),
            route,
            sink,
            idle_watcher: Arc::new(Mutex::new(None)),
            idle_timeout: settings.idle_timeout(),
            min_report_ms: settings.min_report_ms(),
        };

        {
            let mut session = timer.session.lock().await;
            if let Some(armed) = session.arm_idle(Instant::now(), timer.idle_timeout) {
                timer.replace_idle_watcher(armed).await;
            }
        }
        timer
    }

    pub fn route(&self) -> &PageRoute {
        &self.route
    }

    pub async fn is_flushed(&self) -> bool {
        self.session.lock().await.is_flushed()
    }

    pub async fn snapshot(&self) -> EngagementSnapshot {
        let session = self.session.lock().await;
        EngagementSnapshot {
            session_id: session.session_id().to_string(),
            state: session.state(),
            visible: session.is_visible(),
            active_ms: session.active_ms(Instant::now()),
            started_at: session.started_at(),
            page_path: self.route.path.clone(),
            locale: self.route.locale.clone(),
        }
    }

    pub async fn visibility_changed(&self, hidden: bool) {
        let now = Instant::now();
        let changed = {
            let mut session = self.session.lock().await;
            if hidden {
                session.hide(now)
            } else {
                // A returning tab starts a fresh idle window.
                let (resumed, armed) = session.reveal(now, self.idle_timeout);
                if let Some(armed) = armed {
                    self.replace_idle_watcher(armed).await;
                }
                resumed
            }
        };

        if changed {
            log_debug!(
                "{} became {}",
                self.route.path,
                if hidden { "hidden" } else { "visible" }
            );
        }
    }

    /// Any qualifying input re-arms the idle window, even while hidden.
    pub async fn record_activity(&self, kind: ActivityKind) {
        let resumed = {
            let mut session = self.session.lock().await;
            let (resumed, armed) = session.activity(Instant::now(), self.idle_timeout);
            if let Some(armed) = armed {
                self.replace_idle_watcher(armed).await;
            }
            resumed
        };

        if resumed {
            log_debug!("{:?} resumed {} from idle", kind, self.route.path);
        }
    }

    /// Ends the session and reports it if it reached the minimum duration.
    /// Only the first call has any effect.
    pub async fn flush(&self) -> Option<CourseSectionTime> {
        let report = {
            let mut session = self.session.lock().await;
            self.finish(&mut session, Instant::now())
        };
        self.cancel_idle_watcher().await;
        report
    }

    /// Synchronous flush for drop paths that cannot await. Gives up if the
    /// session is locked by a task that is still running.
    pub(crate) fn flush_now(&self) -> Option<CourseSectionTime> {
        let report = match self.session.try_lock() {
            Ok(mut session) => self.finish(&mut session, Instant::now()),
            Err(_) => {
                log_warn!(
                    "engagement session for {} busy during teardown; skipping flush",
                    self.route.path
                );
                None
            }
        };

        if let Ok(mut watcher) = self.idle_watcher.try_lock() {
            if let Some(handle) = watcher.take() {
                handle.abort();
            }
        }

        report
    }

    fn finish(&self, session: &mut EngagementSession, now: Instant) -> Option<CourseSectionTime> {
        let Some(total_ms) = session.flush(now) else {
            log_debug!(
                "engagement session {} already flushed",
                session.session_id()
            );
            return None;
        };

        if total_ms < self.min_report_ms {
            log_info!(
                "engagement session {} ended after {}ms on {}; below reporting minimum",
                session.session_id(),
                total_ms,
                self.route.path
            );
            return None;
        }

        let event = CourseSectionTime::new(
            section_name(&self.route.path),
            rounded_seconds(total_ms),
            self.route.locale.clone(),
            self.route.path.clone(),
        );

        log_info!(
            "engagement session {} ended: {}s on section {}",
            session.session_id(),
            event.time_spent_seconds,
            event.section_name
        );

        self.sink
            .track(&AnalyticsEvent::CourseSectionTime(event.clone()));
        Some(event)
    }

    /// Swaps in the watcher for a freshly armed window. Callers hold the
    /// session lock, so the new watcher cannot observe the session before the
    /// transition that armed it is complete.
    async fn replace_idle_watcher(&self, (generation, deadline): (u64, Instant)) {
        let mut watcher = self.idle_watcher.lock().await;
        if let Some(handle) = watcher.take() {
            handle.abort();
        }

        let session = self.session.clone();
        let path = self.route.path.clone();

        *watcher = Some(tokio::spawn(async move {
            time::sleep_until(deadline).await;
            if session.lock().await.idle_expired(generation, deadline) {
                log_debug!("{} idle; active time paused", path);
            }
        }));
    }

    async fn cancel_idle_watcher(&self) {
        if let Some(handle) = self.idle_watcher.lock().await.take() {
            handle.abort();
        }
    }
}
