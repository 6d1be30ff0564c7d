use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Page-wide tunables. Every field has a default so a page can override only
/// what it needs through `<body data-intellitutor-config='{...}'>`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub namespace: String,
    pub debug: bool,
    pub autosave_debounce_ms: u32,
    pub autosave_clear_delay_ms: u32,
    pub search_debounce_ms: u32,
    pub toast_duration_ms: u32,
    pub counter_duration_ms: u32,
    pub counter_tick_ms: u32,
    pub progress_delay_ms: u32,
    pub progress_transition_ms: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            namespace: "intellitutor".to_string(),
            debug: false,
            autosave_debounce_ms: 1000,
            autosave_clear_delay_ms: 100,
            search_debounce_ms: 300,
            toast_duration_ms: 5000,
            counter_duration_ms: 1000,
            counter_tick_ms: 16,
            progress_delay_ms: 300,
            progress_transition_ms: 1000,
        }
    }
}

impl PageConfig {
    /// Parses the JSON carried by the body attribute. A missing attribute or
    /// malformed JSON yields the defaults.
    pub fn from_attribute(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str::<PageConfig>(raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed page config: {err}");
                Self::default()
            }
        }
    }

    pub fn autosave_debounce(&self) -> Duration {
        ms(self.autosave_debounce_ms)
    }

    pub fn autosave_clear_delay(&self) -> Duration {
        ms(self.autosave_clear_delay_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        ms(self.search_debounce_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        ms(self.toast_duration_ms)
    }

    pub fn counter_tick(&self) -> Duration {
        ms(self.counter_tick_ms)
    }

    pub fn progress_delay(&self) -> Duration {
        ms(self.progress_delay_ms)
    }
}

fn ms(value: u32) -> Duration {
    Duration::from_millis(u64::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attribute_uses_defaults() {
        assert_eq!(PageConfig::from_attribute(None), PageConfig::default());
        assert_eq!(PageConfig::from_attribute(Some("  ")), PageConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = PageConfig::from_attribute(Some(r#"{"namespace":"ns","search_debounce_ms":50}"#));
        assert_eq!(config.namespace, "ns");
        assert_eq!(config.search_debounce(), Duration::from_millis(50));
        assert_eq!(config.autosave_debounce(), Duration::from_millis(1000));
    }

    #[test]
    fn malformed_json_falls_back() {
        assert_eq!(
            PageConfig::from_attribute(Some("{not json")),
            PageConfig::default()
        );
    }
}
