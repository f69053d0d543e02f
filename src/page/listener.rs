use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use crate::engagement::EngagementTimer;

use super::BrowserEvent;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Feeds browser events into `timer` until cancelled, the surface closes,
/// or the page unloads. Returning drops `events`, which detaches the listener.
pub async fn listen_loop(
    timer: EngagementTimer,
    mut events: broadcast::Receiver<BrowserEvent>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                break;
            }
            received = events.recv() => {
                match received {
                    Ok(BrowserEvent::VisibilityChange { hidden }) => {
                        timer.visibility_changed(hidden).await;
                    }
                    Ok(BrowserEvent::Activity { kind }) => {
                        timer.record_activity(kind).await;
                    }
                    Ok(BrowserEvent::Unload) => {
                        log_info!("page unload on {}; flushing engagement", timer.route().path);
                        timer.flush().await;
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log_warn!(
                            "event listener for {} lagged; {} browser events dropped",
                            timer.route().path,
                            skipped
                        );
                    }
                    Err(RecvError::Closed) => {
                        log_info!("event surface closed for {}", timer.route().path);
                        break;
                    }
                }
            }
        }
    }
}
