use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

static DEFAULT_TITLE: Option<&str> = std::option_env!("WEBFORM_TITLE");

/// What to do with a submitted segment that has no `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPolicy {
    /// Ignore it; the next segment takes its field index.
    #[default]
    Skip,
    /// Ignore it but use up its field index, so later segments keep the
    /// position they were rendered at.
    ConsumeIndex,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Page title shown in the tab and the header.
    pub title: String,
    pub port: u16,
    /// SoftAP name on ESP-IDF builds.
    pub ap_ssid: String,
    /// Pause between the acknowledgement and the restart.
    pub restart_delay_ms: u64,
    /// Bound on each read of an accepted connection. Unset means a silent
    /// client blocks the poll loop.
    pub read_timeout_ms: Option<u64>,
    pub malformed_segment: SegmentPolicy,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.unwrap_or("Default Title").to_string(),
            port: 80,
            ap_ssid: "WebForm-Setup".to_string(),
            restart_delay_ms: 500,
            read_timeout_ms: None,
            malformed_segment: SegmentPolicy::Skip,
        }
    }
}

impl PortalConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Loads the file named by `WEBFORM_CONFIG`, defaults otherwise.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var("WEBFORM_CONFIG") {
            Ok(path) => {
                log::info!("Loading config from {}", path);
                Self::load(path)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

#[test]
fn test_partial_config() {
    let config = PortalConfig::from_json(r#"{"title":"Clock setup","malformed_segment":"consume_index"}"#)
        .unwrap();
    assert_eq!(config.title, "Clock setup");
    assert_eq!(config.malformed_segment, SegmentPolicy::ConsumeIndex);
    assert_eq!(config.port, 80);
    assert_eq!(config.restart_delay(), Duration::from_millis(500));
    assert_eq!(config.read_timeout(), None);
}

#[test]
fn test_read_timeout() {
    let config = PortalConfig::from_json(r#"{"read_timeout_ms":2000,"restart_delay_ms":0}"#).unwrap();
    assert_eq!(config.read_timeout(), Some(Duration::from_secs(2)));
    assert_eq!(config.restart_delay(), Duration::ZERO);
    assert_eq!(config.malformed_segment, SegmentPolicy::Skip);
}

#[test]
fn test_bad_config() {
    assert!(PortalConfig::from_json(r#"{"malformed_segment":"panic"}"#).is_err());
    assert!(PortalConfig::load("/nonexistent/webform.json").is_err());
}
