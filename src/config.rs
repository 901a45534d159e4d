//! Process configuration, loaded from the environment (and `.env`, via `dotenvy`).

use anyhow::Context;
use figment::{Figment, providers::Env};
use fundu::DurationParser;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Deserialize, custom_debug_derive::Debug)]
pub struct Config {
    /// Sender mailbox, also the SMTP username.
    pub email: String,
    #[debug(with = crate::fmt::redacted)]
    pub email_password: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,

    /// chromedriver (or any WebDriver server) endpoint.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Upper bound on waiting for the appointment list to render.
    #[serde(
        default = "default_list_page_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub list_page_timeout: Duration,
    /// Upper bound on waiting for any other page to render.
    #[serde(
        default = "default_page_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub page_timeout: Duration,
    #[serde(
        default = "default_poll_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub poll_interval: Duration,
}

impl Config {
    /// Extract the configuration from the process environment.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::from_figment(Figment::new().merge(Env::raw()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, anyhow::Error> {
        figment
            .extract()
            .context("Failed to load config (EMAIL and EMAIL_PASSWORD are required)")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_list_page_timeout() -> Duration {
    Duration::from_secs(35)
}

fn default_page_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

/// Parse a human-readable duration such as `35s`, `500ms` or `2m`.
///
/// A bare number is read as seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let parser = DurationParser::with_all_time_units();
    let parsed = parser
        .parse(raw.trim())
        .map_err(|e| format!("invalid duration {raw:?}: {e}"))?;
    Duration::try_from(parsed).map_err(|e| format!("invalid duration {raw:?}: {e}"))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}
