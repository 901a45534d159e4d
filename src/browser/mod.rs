//! Browser session: a page driver plus readiness polling.
//!
//! The portal renders client side, so a page is only worth reading once a
//! readiness selector shows up in its source. Waits are bounded; running out
//! of time yields [`BrowserError::Timeout`], which callers may treat as
//! non-fatal and read whatever has rendered.

pub mod errors;
pub mod webdriver;

pub use errors::BrowserError;
pub use webdriver::WebDriverBrowser;

use async_trait::async_trait;
use html_scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::Config;
use crate::utils::{fmt_duration, log_if_slow};

/// Page loads slower than this are logged.
const SLOW_PAGE_THRESHOLD: Duration = Duration::from_secs(15);

static APPOINTMENT_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/edu/appointments/"]"#).unwrap());
static FIELD_LABEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h4").unwrap());

/// One navigable browser context, driven strictly one command at a time.
#[async_trait]
pub trait PageDriver: Send {
    async fn goto(&mut self, url: &Url) -> Result<(), BrowserError>;
    /// Current rendered DOM serialized as HTML.
    async fn source(&mut self) -> Result<String, BrowserError>;
    async fn current_url(&mut self) -> Result<Url, BrowserError>;
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// A parsed snapshot of a rendered page.
pub struct Page {
    pub url: Url,
    pub document: Html,
}

impl Page {
    pub fn parse(url: Url, source: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(source),
        }
    }
}

/// The kinds of portal page the pipeline visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// The coach's filtered appointment list.
    AppointmentList,
    /// One student's appointment history.
    StudentHistory,
    /// A single appointment's detail view.
    AppointmentDetail,
}

impl PageKind {
    /// Description and selector that mark the page as rendered.
    fn readiness(self) -> (&'static str, &'static Selector) {
        match self {
            Self::AppointmentList | Self::StudentHistory => {
                ("appointment links", &*APPOINTMENT_ANCHOR)
            }
            Self::AppointmentDetail => ("field labels", &*FIELD_LABEL),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AppointmentList => "appointment_list",
            Self::StudentHistory => "student_history",
            Self::AppointmentDetail => "appointment_detail",
        }
    }
}

/// Upper bounds on how long to wait for each kind of page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub list_page: Duration,
    pub page: Duration,
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            list_page: config.list_page_timeout,
            page: config.page_timeout,
            poll_interval: config.poll_interval,
        }
    }

    pub fn timeout(&self, kind: PageKind) -> Duration {
        match kind {
            PageKind::AppointmentList => self.list_page,
            PageKind::StudentHistory | PageKind::AppointmentDetail => self.page,
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            list_page: Duration::from_secs(35),
            page: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
        }
    }
}

fn is_ready(source: &str, selector: &Selector) -> bool {
    Html::parse_document(source).select(selector).next().is_some()
}

/// A driver together with its wait policy.
pub struct Session<D> {
    driver: D,
    waits: WaitPolicy,
    pages_loaded: usize,
}

impl<D: PageDriver> Session<D> {
    pub fn new(driver: D, waits: WaitPolicy) -> Self {
        Self {
            driver,
            waits,
            pages_loaded: 0,
        }
    }

    /// Number of navigations performed so far.
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// Navigate to `url`, wait for it to render, and snapshot it.
    ///
    /// A readiness timeout is logged and the partially rendered page returned;
    /// any other driver failure is an error.
    pub async fn open(&mut self, url: &Url, kind: PageKind) -> Result<Page, BrowserError> {
        let start = Instant::now();
        debug!(url = url.as_str(), kind = kind.as_str(), "Navigating");
        self.driver.goto(url).await?;
        self.pages_loaded += 1;

        match self.wait_until_ready(url, kind).await {
            Ok(waited) => trace!(
                url = url.as_str(),
                waited = fmt_duration(waited),
                "Page ready"
            ),
            Err(e) if e.is_timeout() => {
                warn!(error = %e, kind = kind.as_str(), "Page never became ready, reading what rendered")
            }
            Err(e) => return Err(e),
        }

        let page = self.snapshot().await?;
        log_if_slow(start, SLOW_PAGE_THRESHOLD, kind.as_str());
        Ok(page)
    }

    /// Poll the page source until `kind`'s readiness selector matches.
    ///
    /// Returns how long it took, or [`BrowserError::Timeout`] once the
    /// policy's bound for `kind` is exceeded.
    pub async fn wait_until_ready(
        &mut self,
        url: &Url,
        kind: PageKind,
    ) -> Result<Duration, BrowserError> {
        let timeout = self.waits.timeout(kind);
        let (readiness, selector) = kind.readiness();
        let start = Instant::now();

        loop {
            let source = self.driver.source().await?;
            if is_ready(&source, selector) {
                return Ok(start.elapsed());
            }

            let waited = start.elapsed();
            if waited >= timeout {
                return Err(BrowserError::Timeout {
                    url: url.to_string(),
                    readiness,
                    waited,
                });
            }
            tokio::time::sleep(self.waits.poll_interval.min(timeout - waited)).await;
        }
    }

    /// Parse whatever the browser currently shows.
    pub async fn snapshot(&mut self) -> Result<Page, BrowserError> {
        let source = self.driver.source().await?;
        let url = self.driver.current_url().await?;
        Ok(Page::parse(url, &source))
    }

    /// End the browser session.
    pub async fn close(&mut self) -> Result<(), BrowserError> {
        self.driver.close().await
    }
}
