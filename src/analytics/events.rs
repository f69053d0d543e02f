use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat key/value parameters handed to the analytics SDK.
pub type EventParams = Map<String, Value>;

pub const COURSE_SECTION_TIME: &str = "course_section_time";
pub const LEARNING_RESOURCE_CLICK: &str = "learning_resource_click";
pub const LANGUAGE_SWITCH: &str = "language_switch";

const LANGUAGE_SELECTOR_METHOD: &str = "language_selector";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSectionTime {
    pub section_name: String,
    pub time_spent_seconds: u64,
    pub locale: String,
    pub page_path: String,
    pub engagement_time_msec: u64,
    /// Whole minutes, rounded half-up.
    pub value: u64,
}

impl CourseSectionTime {
    pub fn new(
        section_name: impl Into<String>,
        time_spent_seconds: u64,
        locale: impl Into<String>,
        page_path: impl Into<String>,
    ) -> Self {
        Self {
            section_name: section_name.into(),
            time_spent_seconds,
            locale: locale.into(),
            page_path: page_path.into(),
            engagement_time_msec: time_spent_seconds.saturating_mul(1000),
            value: time_spent_seconds.saturating_add(30) / 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResourceClick {
    pub resource_url: String,
    pub resource_name: String,
    pub source_section: String,
    pub locale: String,
    /// Empty when the URL has no parsable host.
    pub link_domain: String,
    pub outbound: bool,
}

impl LearningResourceClick {
    pub fn new(
        resource_url: impl Into<String>,
        resource_name: impl Into<String>,
        source_section: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        let resource_url = resource_url.into();
        let link_domain = crate::classify::link_domain(&resource_url).unwrap_or_default();
        Self {
            resource_url,
            resource_name: resource_name.into(),
            source_section: source_section.into(),
            locale: locale.into(),
            link_domain,
            outbound: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSwitch {
    pub from_locale: String,
    pub to_locale: String,
    pub current_page: String,
    pub method: String,
}

impl LanguageSwitch {
    pub fn new(
        from_locale: impl Into<String>,
        to_locale: impl Into<String>,
        current_page: impl Into<String>,
    ) -> Self {
        Self {
            from_locale: from_locale.into(),
            to_locale: to_locale.into(),
            current_page: current_page.into(),
            method: LANGUAGE_SELECTOR_METHOD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    CourseSectionTime(CourseSectionTime),
    LearningResourceClick(LearningResourceClick),
    LanguageSwitch(LanguageSwitch),
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::CourseSectionTime(_) => COURSE_SECTION_TIME,
            AnalyticsEvent::LearningResourceClick(_) => LEARNING_RESOURCE_CLICK,
            AnalyticsEvent::LanguageSwitch(_) => LANGUAGE_SWITCH,
        }
    }

    pub fn params(&self) -> Result<EventParams> {
        let value = match self {
            AnalyticsEvent::CourseSectionTime(event) => serde_json::to_value(event),
            AnalyticsEvent::LearningResourceClick(event) => serde_json::to_value(event),
            AnalyticsEvent::LanguageSwitch(event) => serde_json::to_value(event),
        }
        .with_context(|| format!("failed to serialize {} parameters", self.name()))?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(anyhow!(
                "{} parameters serialized to {other} instead of an object",
                self.name()
            )),
        }
    }
}

impl From<CourseSectionTime> for AnalyticsEvent {
    fn from(event: CourseSectionTime) -> Self {
        AnalyticsEvent::CourseSectionTime(event)
    }
}

impl From<LearningResourceClick> for AnalyticsEvent {
    fn from(event: LearningResourceClick) -> Self {
        AnalyticsEvent::LearningResourceClick(event)
    }
}

impl From<LanguageSwitch> for AnalyticsEvent {
    fn from(event: LanguageSwitch) -> Self {
        AnalyticsEvent::LanguageSwitch(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn course_time_derives_msec_and_minutes() {
        let event = CourseSectionTime::new("introduction", 20, "en", "/en/introduction");
        assert_eq!(event.engagement_time_msec, 20_000);
        assert_eq!(event.value, 0);

        assert_eq!(CourseSectionTime::new("home", 90, "en", "/en").value, 2);
        assert_eq!(CourseSectionTime::new("home", 89, "en", "/en").value, 1);
    }

    #[test]
    fn course_time_params_use_wire_names() {
        let params = AnalyticsEvent::from(CourseSectionTime::new(
            "introduction",
            125,
            "fr",
            "/fr/introduction",
        ))
        .params()
        .unwrap();

        assert_eq!(
            Value::Object(params),
            json!({
                "section_name": "introduction",
                "time_spent_seconds": 125,
                "locale": "fr",
                "page_path": "/fr/introduction",
                "engagement_time_msec": 125000,
                "value": 2,
            })
        );
    }

    #[test]
    fn resource_click_carries_domain_and_outbound_flag() {
        let event = AnalyticsEvent::from(LearningResourceClick::new(
            "https://www.youtube.com/watch?v=1",
            "youtube",
            "introduction",
            "en",
        ));
        assert_eq!(event.name(), "learning_resource_click");

        let params = event.params().unwrap();
        assert_eq!(params["link_domain"], json!("www.youtube.com"));
        assert_eq!(params["outbound"], json!(true));
        assert_eq!(params["source_section"], json!("introduction"));
    }

    #[test]
    fn malformed_resource_url_leaves_domain_empty() {
        let event = LearningResourceClick::new("https://", "external", "home", "en");
        assert_eq!(event.link_domain, "");
    }

    #[test]
    fn language_switch_records_selector_method() {
        let params = AnalyticsEvent::from(LanguageSwitch::new("en", "fr", "/fr/introduction"))
            .params()
            .unwrap();
        assert_eq!(params["method"], json!("language_selector"));
        assert_eq!(params["from_locale"], json!("en"));
        assert_eq!(params["to_locale"], json!("fr"));
        assert_eq!(params["current_page"], json!("/fr/introduction"));
    }
}
