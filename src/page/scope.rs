use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    analytics::{CourseSectionTime, EventSink},
    engagement::{EngagementSnapshot, EngagementTimer},
    settings::EngagementSettings,
};

use super::{listener::listen_loop, EventSurface, PageRoute};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_warn};

/// Everything one mounted page holds: its engagement timer, the idle watcher
/// the timer owns, and the event listener. `teardown` releases all of it and
/// consumes the scope, so it can only happen once.
pub struct PageScope {
    timer: EngagementTimer,
    cancel_token: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl PageScope {
    pub async fn attach(
        route: PageRoute,
        sink: EventSink,
        settings: &EngagementSettings,
        surface: &EventSurface,
    ) -> Self {
        // Subscribe before the timer starts so no event between the two is lost.
        let events = surface.subscribe();
        let timer = EngagementTimer::start(route, sink, settings).await;

        let cancel_token = CancellationToken::new();
        let listener = tokio::spawn(listen_loop(timer.clone(), events, cancel_token.clone()));

        Self {
            timer,
            cancel_token,
            listener: Some(listener),
        }
    }

    pub fn route(&self) -> &PageRoute {
        self.timer.route()
    }

    pub fn timer(&self) -> &EngagementTimer {
        &self.timer
    }

    pub async fn snapshot(&self) -> EngagementSnapshot {
        self.timer.snapshot().await
    }

    /// Detaches the listener, cancels the idle watcher and flushes. Returns the
    /// reported event, or `None` if the visit was too short or an unload
    /// already flushed it.
    pub async fn teardown(mut self) -> Option<CourseSectionTime> {
        self.cancel_token.cancel();

        if let Some(handle) = self.listener.take() {
            if let Err(err) = handle.await {
                log_error!(
                    "event listener for {} failed to join: {err}",
                    self.timer.route().path
                );
            }
        }

        self.timer.flush().await
    }
}

impl Drop for PageScope {
    fn drop(&mut self) {
        let Some(handle) = self.listener.take() else {
            return;
        };

        log_warn!(
            "page scope for {} dropped without teardown; releasing in place",
            self.timer.route().path
        );
        self.cancel_token.cancel();
        handle.abort();
        self.timer.flush_now();
    }
}
