use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// Grace period before a same-tab outbound navigation, so the click event can
/// be handed to the SDK first.
pub const NAVIGATION_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkClick {
    pub href: String,
    /// Anchor `target`; `None` and `_self` open in the same tab.
    pub target: Option<String>,
    /// Overrides the host-derived resource name.
    pub resource_name: Option<String>,
}

impl LinkClick {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            target: None,
            resource_name: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }

    pub fn opens_in_same_tab(&self) -> bool {
        matches!(self.target.as_deref(), None | Some("_self"))
    }
}

/// What the host should do with the click after tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "action", content = "delayMs")]
pub enum ClickOutcome {
    /// Internal link; nothing was tracked.
    Untracked,
    /// Tracked; let the browser handle the click (new tab).
    FollowDefault,
    /// Tracked; suppress the default and navigate after the delay.
    #[serde(serialize_with = "serialize_delay_ms")]
    NavigateAfter(Duration),
}

fn serialize_delay_ms<S>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(delay.as_millis() as u64)
}
