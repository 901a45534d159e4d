//! [`PageDriver`] backed by a WebDriver server (chromedriver) through `fantoccini`.

use anyhow::Context;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use tracing::info;
use url::Url;

use super::{BrowserError, PageDriver};

/// Chrome switches passed on every session.
const CHROME_ARGS: &[&str] = &["--disable-gpu", "--ignore-certificate-errors"];

/// W3C capabilities requesting Chrome with [`CHROME_ARGS`].
pub fn chrome_capabilities(headless: bool) -> Map<String, Value> {
    let mut args: Vec<&str> = CHROME_ARGS.to_vec();
    if headless {
        args.push("--headless=new");
    }

    let mut capabilities = Map::new();
    capabilities.insert("browserName".to_string(), json!("chrome"));
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    capabilities
}

pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Start a new browser session on the WebDriver server at `endpoint`.
    pub async fn connect(endpoint: &str, headless: bool) -> Result<Self, BrowserError> {
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(headless))
            .connect(endpoint)
            .await
            .map_err(|e| BrowserError::Startup {
                endpoint: endpoint.to_string(),
                source: anyhow::Error::new(e),
            })?;

        info!(endpoint, headless, "WebDriver session started");
        Ok(Self { client })
    }
}

#[async_trait]
impl PageDriver for WebDriverBrowser {
    async fn goto(&mut self, url: &Url) -> Result<(), BrowserError> {
        self.client
            .goto(url.as_str())
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                source: anyhow::Error::new(e),
            })
    }

    async fn source(&mut self) -> Result<String, BrowserError> {
        Ok(self
            .client
            .source()
            .await
            .context("Failed to read page source")?)
    }

    async fn current_url(&mut self) -> Result<Url, BrowserError> {
        Ok(self
            .client
            .current_url()
            .await
            .context("Failed to read current URL")?)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.client
            .clone()
            .close()
            .await
            .context("Failed to close WebDriver session")?;
        info!("WebDriver session closed");
        Ok(())
    }
}
