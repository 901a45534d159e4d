//! Error types for the browser session.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Failed to start a WebDriver session at {endpoint}")]
    Startup {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Failed to navigate to {url}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Timed out after {waited:.2?} waiting for {url} to render {readiness}")]
    Timeout {
        url: String,
        readiness: &'static str,
        waited: Duration,
    },
    #[error(transparent)]
    CommandFailed(#[from] anyhow::Error),
}

impl BrowserError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
