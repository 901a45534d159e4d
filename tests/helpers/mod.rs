//! In-memory stand-in for the Handshake portal.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use itinerary::browser::{BrowserError, PageDriver, Session, WaitPolicy};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub const ORIGIN: &str = "https://vanderbilt.joinhandshake.com";

/// Run moment shared by the integration tests: Monday 2026-10-19, 08:00.
pub fn run_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

pub fn appointment_url(id: u32) -> String {
    format!("{ORIGIN}/edu/appointments/{id}")
}

/// Short waits so pages that never render fail fast.
pub fn fast_waits() -> WaitPolicy {
    WaitPolicy {
        list_page: Duration::from_millis(50),
        page: Duration::from_millis(20),
        poll_interval: Duration::from_millis(5),
    }
}

/// Observations shared between a test and the driver it handed to the pipeline.
#[derive(Clone, Default)]
pub struct PortalLog {
    visits: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl PortalLog {
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Serves canned HTML by URL; unknown URLs render an empty body.
pub struct FakePortal {
    pages: HashMap<String, String>,
    failing: Option<String>,
    current: Option<Url>,
    log: PortalLog,
}

impl FakePortal {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            failing: None,
            current: None,
            log: PortalLog::default(),
        }
    }

    pub fn page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(
            url.into(),
            format!("<html><body>{}</body></html>", body.into()),
        );
        self
    }

    /// Make navigation to `url` fail like a dead browser would.
    pub fn failing_at(mut self, url: impl Into<String>) -> Self {
        self.failing = Some(url.into());
        self
    }

    pub fn log(&self) -> PortalLog {
        self.log.clone()
    }

    pub fn into_session(self) -> Session<Self> {
        Session::new(self, fast_waits())
    }
}

#[async_trait]
impl PageDriver for FakePortal {
    async fn goto(&mut self, url: &Url) -> Result<(), BrowserError> {
        self.log.visits.lock().unwrap().push(url.to_string());
        if self.failing.as_deref() == Some(url.as_str()) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                source: anyhow::anyhow!("chrome not reachable"),
            });
        }
        self.current = Some(url.clone());
        Ok(())
    }

    async fn source(&mut self) -> Result<String, BrowserError> {
        let page = self
            .current
            .as_ref()
            .and_then(|url| self.pages.get(url.as_str()))
            .cloned();
        Ok(page.unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }

    async fn current_url(&mut self) -> Result<Url, BrowserError> {
        self.current
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no page loaded").into())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Anchor tags for appointment detail pages.
pub fn appointment_anchors(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| format!(r#"<a href="/edu/appointments/{id}">Appointment {id}</a>"#))
        .collect()
}

/// A student's history page with their name and appointment links.
pub fn history_page(name: &str, appointment_ids: &[u32]) -> String {
    format!(
        r#"<header><div class="style__text___2ilXR style__small___1Nyai style__tight___RF4uH">{name}</div></header>
        <nav><a href="/edu/appointments?students[]=1">All</a></nav>
        <main>{}</main>"#,
        appointment_anchors(appointment_ids)
    )
}

/// An appointment detail page linking to `student_ids` plus the usual coach
/// and edit links.
pub fn detail_page(when: &str, student_ids: &[u32], year: &str, majors: &[&str], notes: &str) -> String {
    let students: String = student_ids
        .iter()
        .map(|id| {
            format!(
                r#"<a href="/edu/users/{id}">Student {id}</a><a href="/edu/users/{id}/edit">Edit</a>"#
            )
        })
        .collect();
    let details = std::iter::once(year)
        .chain(majors.iter().copied())
        .collect::<Vec<_>>()
        .join("<br>");
    format!(
        r#"{students}
        <div><h4>When</h4><p>{when}</p></div>
        <div><h4>Staff Member</h4><p><a href="/edu/users/41763197">Chris King</a></p></div>
        <div><h4>Student Details</h4><p class="text">{details}</p></div>
        <p class="respect-newlines margin-bottom" data-bind="html: safe_content_html">{notes}</p>"#
    )
}
