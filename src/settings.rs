use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub const MEASUREMENT_ID_ENV: &str = "PAGE_ENGAGEMENT_MEASUREMENT_ID";
pub const DEBUG_ENV: &str = "PAGE_ENGAGEMENT_DEBUG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsSettings {
    /// Delivery is disabled while this is unset.
    pub measurement_id: Option<String>,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngagementSettings {
    pub idle_timeout_ms: u64,
    pub min_report_secs: u64,
}

impl Default for EngagementSettings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 30_000,
            min_report_secs: 5,
        }
    }
}

impl EngagementSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn min_report_ms(&self) -> u64 {
        self.min_report_secs.saturating_mul(1000)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub analytics: AnalyticsSettings,
    pub engagement: EngagementSettings,
}

impl Settings {
    /// Applies environment overrides through `lookup` so callers (and tests)
    /// decide where the values come from.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup(MEASUREMENT_ID_ENV) {
            let id = id.trim().to_string();
            self.analytics.measurement_id = if id.is_empty() { None } else { Some(id) };
        }

        if let Some(value) = lookup(DEBUG_ENV) {
            self.analytics.debug = value == "1" || value.eq_ignore_ascii_case("true");
        }

        self
    }
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// JSON-backed settings. Only what the file holds is written back;
/// environment overrides are layered on at read time.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
    lookup: Lookup,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        Self::with_lookup(path, |key| std::env::var(key).ok())
    }

    /// Same as [`SettingsStore::new`] with overrides resolved through `lookup`.
    pub fn with_lookup<F>(path: PathBuf, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let data = load_settings(&path)?;

        Ok(Self {
            path,
            data: RwLock::new(data),
            lookup: Box::new(lookup),
        })
    }

    pub fn settings(&self) -> Settings {
        self.read().clone().with_overrides(|key| (self.lookup)(key))
    }

    pub fn analytics(&self) -> AnalyticsSettings {
        self.settings().analytics
    }

    pub fn engagement(&self) -> EngagementSettings {
        self.settings().engagement
    }

    /// Contents of the settings file, without overrides.
    pub fn stored(&self) -> Settings {
        self.read().clone()
    }

    pub fn update_analytics(&self, analytics: AnalyticsSettings) -> Result<()> {
        let mut guard = self.write();
        let next = Settings {
            analytics,
            ..guard.clone()
        };
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    pub fn update_engagement(&self, engagement: EngagementSettings) -> Result<()> {
        let mut guard = self.write();
        let next = Settings {
            engagement,
            ..guard.clone()
        };
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let data = load_settings(&self.path)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, Settings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Settings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    Ok(match serde_json::from_str(&contents) {
        Ok(settings) => settings,
        Err(err) => {
            log_warn!(
                "Ignoring unparsable settings at {}: {err}; using defaults",
                path.display()
            );
            Settings::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"analytics":{"measurementId":"G-TEST"}}"#).unwrap();
        assert_eq!(settings.analytics.measurement_id.as_deref(), Some("G-TEST"));
        assert!(!settings.analytics.debug);
        assert_eq!(settings.engagement, EngagementSettings::default());
        assert_eq!(settings.engagement.idle_timeout(), Duration::from_secs(30));
        assert_eq!(settings.engagement.min_report_ms(), 5_000);
    }

    #[test]
    fn overrides_replace_and_clear_measurement_id() {
        let base = Settings {
            analytics: AnalyticsSettings {
                measurement_id: Some("G-FILE".into()),
                debug: false,
            },
            ..Settings::default()
        };

        let replaced = base
            .clone()
            .with_overrides(lookup_from(&[(MEASUREMENT_ID_ENV, "G-ENV"), (DEBUG_ENV, "TRUE")]));
        assert_eq!(replaced.analytics.measurement_id.as_deref(), Some("G-ENV"));
        assert!(replaced.analytics.debug);

        let cleared = base.with_overrides(lookup_from(&[(MEASUREMENT_ID_ENV, "  ")]));
        assert_eq!(cleared.analytics.measurement_id, None);
    }

    #[test]
    fn no_overrides_leaves_settings_untouched() {
        let base = Settings::default();
        assert_eq!(base.clone().with_overrides(|_| None), base);
    }
}
