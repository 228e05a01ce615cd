use crate::submit::SubmitConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_BACKEND_URL: &str = "SKETCH_BACKEND_URL";
pub const ENV_REQUIRE_NAME: &str = "SKETCH_REQUIRE_NAME";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the queue backend; `/upload` and `/queue` are appended.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Whether a submission needs a non-blank author name.
    #[serde(default = "default_require_name")]
    pub require_name: bool,
    #[serde(default = "default_canvas_size")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_size")]
    pub canvas_height: u32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    /// Seconds between scheduled queue polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: f32,
    /// Seconds a status message stays on screen.
    #[serde(default = "default_status_clear")]
    pub status_clear_secs: f32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Write logs to this file instead of stdout.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_backend_url() -> String {
    "http://localhost:5000".into()
}

fn default_require_name() -> bool {
    true
}

fn default_canvas_size() -> u32 {
    300
}

fn default_stroke_width() -> u32 {
    2
}

fn default_poll_interval() -> f32 {
    5.0
}

fn default_status_clear() -> f32 {
    3.0
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            require_name: default_require_name(),
            canvas_width: default_canvas_size(),
            canvas_height: default_canvas_size(),
            stroke_width: default_stroke_width(),
            poll_interval_secs: default_poll_interval(),
            status_clear_secs: default_status_clear(),
            request_timeout_secs: default_request_timeout(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_REQUIRE_NAME) {
            match parse_flag(&raw) {
                Some(flag) => self.require_name = flag,
                None => tracing::warn!(
                    "ignoring {}='{}'; expected true/false",
                    ENV_REQUIRE_NAME,
                    raw
                ),
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        seconds(self.poll_interval_secs, default_poll_interval())
    }

    pub fn status_hold(&self) -> Duration {
        seconds(self.status_clear_secs, default_status_clear())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn submit_config(&self) -> SubmitConfig {
        SubmitConfig {
            require_name: self.require_name,
            status_hold: self.status_hold(),
        }
    }
}

fn seconds(value: f32, fallback: f32) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f32(value)
    } else {
        tracing::warn!("invalid interval {}; using {}s", value, fallback);
        Duration::from_secs_f32(fallback)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"require_name": false}"#).unwrap();
        assert!(!settings.require_name);
        assert_eq!(settings.backend_url, "http://localhost:5000");
        assert_eq!(settings.canvas_width, 300);
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert_eq!(settings.status_hold(), Duration::from_secs(3));
    }

    #[test]
    fn environment_overrides_backend_and_name_toggle() {
        let mut settings = Settings::default();
        settings.apply_overrides(env(&[
            (ENV_BACKEND_URL, " https://draw.example.com/ "),
            (ENV_REQUIRE_NAME, "0"),
        ]));
        assert_eq!(settings.backend_url, "https://draw.example.com/");
        assert!(!settings.require_name);
    }

    #[test]
    fn bad_flag_and_empty_url_are_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(env(&[(ENV_BACKEND_URL, "  "), (ENV_REQUIRE_NAME, "maybe")]));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn non_positive_intervals_use_defaults() {
        let settings = Settings {
            poll_interval_secs: 0.0,
            status_clear_secs: f32::NAN,
            ..Settings::default()
        };
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert_eq!(settings.status_hold(), Duration::from_secs(3));
        assert!(settings.submit_config().require_name);
    }
}
