#![allow(dead_code)]

use std::sync::Arc;

use page_engagement::{AnalyticsSettings, ChannelSdk, DeliveredEvent, EventSink, PageRoute};
use tokio::sync::mpsc::UnboundedReceiver;

pub const MEASUREMENT_ID: &str = "G-TEST0001";

pub fn recording_sink() -> (EventSink, UnboundedReceiver<DeliveredEvent>) {
    let (sdk, rx) = ChannelSdk::new();
    let settings = AnalyticsSettings {
        measurement_id: Some(MEASUREMENT_ID.to_string()),
        debug: false,
    };
    (EventSink::new(&settings, Some(Arc::new(sdk))), rx)
}

pub fn drain(rx: &mut UnboundedReceiver<DeliveredEvent>) -> Vec<DeliveredEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn intro(locale: &str) -> PageRoute {
    PageRoute::new(format!("/{locale}/introduction"), locale)
}

/// Lets spawned listener and idle-watcher tasks run without moving the
/// paused clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
