//! The appointment record assembled from scraped pages.

use std::fmt;

pub const UNKNOWN_STUDENT: &str = "Unknown Student";
pub const FAILED_TO_EXTRACT: &str = "Failed to extract";
pub const NO_NOTES: &str = "No notes added.";
pub const UNKNOWN_COACH: &str = "Unknown Coach";
pub const UNKNOWN_YEAR: &str = "Unknown Year";
pub const UNKNOWN_MAJORS_MINORS: &str = "Unknown Majors/Minors";

/// Whether an appointment's meeting day lies after the moment of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Future,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Future => "Future",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scraped appointment.
///
/// Every field holds either scraped text or its documented default.
/// `appointment_status` is `None` exactly when the meeting date could not be
/// extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRecord {
    pub student_name: String,
    pub appointment_link: String,
    pub meeting_date: String,
    pub appointment_status: Option<AppointmentStatus>,
    pub coaching_notes: String,
    pub coach_name: String,
    pub student_year: String,
    pub majors_minors: String,
}

impl AppointmentRecord {
    /// A record with every scraped field at its default.
    pub fn seeded(student_name: impl Into<String>, appointment_link: impl Into<String>) -> Self {
        Self {
            student_name: student_name.into(),
            appointment_link: appointment_link.into(),
            meeting_date: FAILED_TO_EXTRACT.to_string(),
            appointment_status: None,
            coaching_notes: NO_NOTES.to_string(),
            coach_name: UNKNOWN_COACH.to_string(),
            student_year: UNKNOWN_YEAR.to_string(),
            majors_minors: UNKNOWN_MAJORS_MINORS.to_string(),
        }
    }
}
