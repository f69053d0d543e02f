//! Active engagement-time tracking for localized course pages, relayed as
//! analytics events through a best-effort SDK bridge.

pub mod analytics;
pub mod classify;
pub mod engagement;
pub mod locale;
pub mod page;
pub mod settings;
mod utils;

pub use analytics::{AnalyticsEvent, AnalyticsSdk, ChannelSdk, DeliveredEvent, EventSink};
pub use engagement::{EngagementSnapshot, EngagementState, EngagementTimer, PauseReason};
pub use locale::{LocaleChangeObserver, LocaleSwitch};
pub use page::{
    ActivityKind, BrowserEvent, ClickOutcome, EventSurface, LinkClick, PageController, PageRoute,
    PageScope,
};
pub use settings::{AnalyticsSettings, EngagementSettings, Settings, SettingsStore};

/// Installs `env_logger` at `info`. Per-module directives from `RUST_LOG`
/// (e.g. `page_engagement=debug`) still apply. Calling it again is harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
