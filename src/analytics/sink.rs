use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::settings::AnalyticsSettings;

use super::{AnalyticsEvent, EventParams};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

/// Single-call entry point of the external analytics SDK.
///
/// Implementations are fire-and-forget: an `Ok` means the call was handed
/// off, not that the event reached the analytics backend.
pub trait AnalyticsSdk: Send + Sync {
    fn emit(&self, event_name: &str, params: &EventParams) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredEvent {
    pub name: String,
    pub params: EventParams,
}

/// Forwards events to the host bridge, which owns the actual network call.
pub struct ChannelSdk {
    tx: mpsc::UnboundedSender<DeliveredEvent>,
}

impl ChannelSdk {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeliveredEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AnalyticsSdk for ChannelSdk {
    fn emit(&self, event_name: &str, params: &EventParams) -> Result<()> {
        self.tx
            .send(DeliveredEvent {
                name: event_name.to_string(),
                params: params.clone(),
            })
            .map_err(|_| anyhow!("analytics bridge receiver is gone"))
    }
}

/// Best-effort relay in front of the SDK. `track` never fails outward.
#[derive(Clone)]
pub struct EventSink {
    measurement_id: Option<String>,
    sdk: Option<Arc<dyn AnalyticsSdk>>,
    debug: bool,
}

impl EventSink {
    pub fn new(settings: &AnalyticsSettings, sdk: Option<Arc<dyn AnalyticsSdk>>) -> Self {
        Self {
            measurement_id: settings
                .measurement_id
                .clone()
                .filter(|id| !id.trim().is_empty()),
            sdk,
            debug: settings.debug,
        }
    }

    pub fn disabled() -> Self {
        Self {
            measurement_id: None,
            sdk: None,
            debug: false,
        }
    }

    /// Delivery needs both a measurement id and a loaded SDK.
    pub fn is_enabled(&self) -> bool {
        self.measurement_id.is_some() && self.sdk.is_some()
    }

    pub fn track(&self, event: &AnalyticsEvent) {
        let name = event.name();
        let mut params = match event.params() {
            Ok(params) => params,
            Err(err) => {
                log_error!("dropping analytics event {name}: {err:?}");
                return;
            }
        };

        let (Some(measurement_id), Some(sdk)) = (&self.measurement_id, &self.sdk) else {
            let payload = Value::Object(params);
            if self.debug {
                log_info!("analytics disabled, not delivering {name}: {payload}");
            } else {
                log_debug!("analytics disabled, not delivering {name}: {payload}");
            }
            return;
        };

        params.insert("send_to".to_string(), Value::String(measurement_id.clone()));

        if let Err(err) = sdk.emit(name, &params) {
            log_error!("analytics delivery failed for {name}: {err:?}");
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("measurement_id", &self.measurement_id)
            .field("sdk_loaded", &self.sdk.is_some())
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{LanguageSwitch, LANGUAGE_SWITCH};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSdk {
        calls: AtomicUsize,
    }

    impl AnalyticsSdk for FailingSdk {
        fn emit(&self, _event_name: &str, _params: &EventParams) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("gtag is not a function"))
        }
    }

    fn configured(id: Option<&str>) -> AnalyticsSettings {
        AnalyticsSettings {
            measurement_id: id.map(str::to_string),
            debug: false,
        }
    }

    fn switch_event() -> AnalyticsEvent {
        LanguageSwitch::new("en", "fr", "/fr/introduction").into()
    }

    #[test]
    fn enabled_sink_adds_send_to() {
        let (sdk, mut rx) = ChannelSdk::new();
        let sink = EventSink::new(&configured(Some("G-ABC123")), Some(Arc::new(sdk)));
        assert!(sink.is_enabled());

        sink.track(&switch_event());

        let delivered = rx.try_recv().unwrap();
        assert_eq!(delivered.name, LANGUAGE_SWITCH);
        assert_eq!(delivered.params["send_to"], json!("G-ABC123"));
        assert_eq!(delivered.params["to_locale"], json!("fr"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn missing_measurement_id_is_a_no_op() {
        let (sdk, mut rx) = ChannelSdk::new();
        let sink = EventSink::new(&configured(None), Some(Arc::new(sdk)));
        assert!(!sink.is_enabled());

        sink.track(&switch_event());
        assert!(rx.try_recv().is_err());

        let blank = EventSink::new(&configured(Some("   ")), None);
        assert!(!blank.is_enabled());
    }

    #[test]
    fn missing_sdk_is_a_no_op() {
        let sink = EventSink::new(&configured(Some("G-ABC123")), None);
        assert!(!sink.is_enabled());
        sink.track(&switch_event());
        EventSink::disabled().track(&switch_event());
    }

    #[test]
    fn delivery_errors_are_swallowed() {
        let sdk = Arc::new(FailingSdk {
            calls: AtomicUsize::new(0),
        });
        let shared: Arc<dyn AnalyticsSdk> = sdk.clone();
        let sink = EventSink::new(&configured(Some("G-ABC123")), Some(shared));

        sink.track(&switch_event());
        sink.track(&switch_event());

        // Each call reaches the SDK exactly once; nothing is retried.
        assert_eq!(sdk.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropped_bridge_receiver_does_not_panic() {
        let (sdk, rx) = ChannelSdk::new();
        drop(rx);
        let sink = EventSink::new(&configured(Some("G-ABC123")), Some(Arc::new(sdk)));
        sink.track(&switch_event());
    }
}
