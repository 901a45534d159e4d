//! The harvest pipeline.
//!
//! List page → appointment pages → each referenced student's history page →
//! every appointment on that history page. Records are collected per history
//! path, so an appointment reachable through several paths appears once per path.

use chrono::NaiveDateTime;
use indexmap::IndexSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::browser::{BrowserError, PageDriver, PageKind, Session};
use crate::portal::extract::{self, Extracted};
use crate::portal::{COACH_USER_ID, links, urls};
use crate::records::AppointmentRecord;

/// Counters reported when a harvest finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HarvestStats {
    pub list_links: usize,
    pub students_visited: usize,
    pub appointments_extracted: usize,
    pub fields_defaulted: usize,
    pub pages_loaded: usize,
}

/// Owns the browser session and the records gathered so far.
pub struct Pipeline<D> {
    session: Session<D>,
    now: NaiveDateTime,
    records: Vec<AppointmentRecord>,
    stats: HarvestStats,
}

impl<D: PageDriver> Pipeline<D> {
    pub fn new(session: Session<D>, now: NaiveDateTime) -> Self {
        Self {
            session,
            now,
            records: Vec::new(),
            stats: HarvestStats::default(),
        }
    }

    /// Run every stage, then end the browser session whether or not the
    /// stages succeeded.
    pub async fn run(mut self) -> Result<(Vec<AppointmentRecord>, HarvestStats), BrowserError> {
        let outcome = self.collect().await;

        if let Err(e) = self.session.close().await {
            warn!(error = ?e, "Failed to close browser session");
        }

        outcome?;
        self.stats.pages_loaded = self.session.pages_loaded();
        info!(
            list_links = self.stats.list_links,
            students = self.stats.students_visited,
            appointments = self.stats.appointments_extracted,
            fields_defaulted = self.stats.fields_defaulted,
            pages = self.stats.pages_loaded,
            "Harvest complete"
        );
        Ok((self.records, self.stats))
    }

    async fn collect(&mut self) -> Result<(), BrowserError> {
        let appointments = self.harvest_list().await?;

        for appointment in &appointments {
            let students = self.resolve_students(appointment).await?;
            for student_id in &students {
                let (student_name, history) = self.harvest_student(student_id).await?;
                for link in &history {
                    let record = self.extract_appointment(&student_name, link).await?;
                    self.records.push(record);
                }
            }
        }

        Ok(())
    }

    /// Appointment links on the coach's list page.
    async fn harvest_list(&mut self) -> Result<IndexSet<Url>, BrowserError> {
        let url = urls::appointment_list_url(self.now.date());
        let page = self.session.open(&url, PageKind::AppointmentList).await?;
        let appointments = links::appointment_links(&page);

        self.stats.list_links = appointments.len();
        if appointments.is_empty() {
            warn!(url = url.as_str(), "No appointment links found on list page");
        } else {
            info!(count = appointments.len(), "Harvested appointment links");
        }
        Ok(appointments)
    }

    /// Student ids referenced from one appointment page.
    async fn resolve_students(&mut self, appointment: &Url) -> Result<IndexSet<String>, BrowserError> {
        let page = self
            .session
            .open(appointment, PageKind::AppointmentDetail)
            .await?;
        let students = links::student_ids(&page, COACH_USER_ID);
        debug!(
            appointment = appointment.as_str(),
            students = ?students,
            "Resolved students"
        );
        Ok(students)
    }

    /// A student's display name and every appointment on their history page.
    #[instrument(skip(self))]
    async fn harvest_student(
        &mut self,
        student_id: &str,
    ) -> Result<(String, IndexSet<Url>), BrowserError> {
        let url = urls::student_history_url(student_id);
        let page = self.session.open(&url, PageKind::StudentHistory).await?;

        let name = extract::student_name(&page.document);
        if let Extracted::Defaulted(miss) = &name {
            debug!(reason = %miss, "Student name fell back to default");
        }
        let history = links::appointment_links(&page);

        self.stats.students_visited += 1;
        debug!(appointments = history.len(), "Harvested student history");
        Ok((extract::student_name_or_default(&name), history))
    }

    /// Visit one appointment and build its record.
    #[instrument(skip(self, student_name), fields(link = %link))]
    async fn extract_appointment(
        &mut self,
        student_name: &str,
        link: &Url,
    ) -> Result<AppointmentRecord, BrowserError> {
        let page = self
            .session
            .open(link, PageKind::AppointmentDetail)
            .await?;
        let fields = extract::appointment_fields(&page.document, self.now);

        let mut record = AppointmentRecord::seeded(student_name, link.as_str());
        fields.apply_to(&mut record);

        let misses = fields.misses();
        for (field, miss) in &misses {
            debug!(field, reason = %miss, "Field fell back to default");
        }
        self.stats.appointments_extracted += 1;
        self.stats.fields_defaulted += misses.len();

        Ok(record)
    }
}
