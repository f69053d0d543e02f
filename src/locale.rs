use serde::{Deserialize, Serialize};

use crate::analytics::LanguageSwitch;

/// A locale change seen between two consecutive observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleSwitch {
    pub from_locale: String,
    pub to_locale: String,
    pub page_path: String,
}

impl From<LocaleSwitch> for LanguageSwitch {
    fn from(switch: LocaleSwitch) -> Self {
        LanguageSwitch::new(switch.from_locale, switch.to_locale, switch.page_path)
    }
}

/// Remembers the last observed locale. The first observation only seeds the
/// stored value, so an initial page load never reads as a switch.
#[derive(Debug, Default)]
pub struct LocaleChangeObserver {
    previous: Option<String>,
}

impl LocaleChangeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn observe(&mut self, locale: &str, page_path: &str) -> Option<LocaleSwitch> {
        match self.previous.as_deref() {
            None => {
                self.previous = Some(locale.to_string());
                None
            }
            Some(previous) if previous == locale => None,
            Some(previous) => {
                let switch = LocaleSwitch {
                    from_locale: previous.to_string(),
                    to_locale: locale.to_string(),
                    page_path: page_path.to_string(),
                };
                self.previous = Some(locale.to_string());
                Some(switch)
            }
        }
    }
}
