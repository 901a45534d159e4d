//! Daily digest: partition records by meeting day and render the email body.

use chrono::NaiveDate;
use thiserror::Error;

use crate::dates::parse_meeting_day;
use crate::records::AppointmentRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    #[error("Unreadable meeting date {meeting_date:?} on {link}")]
    UnreadableDate { link: String, meeting_date: String },
}

/// Records split by meeting day relative to the run date.
#[derive(Debug)]
pub struct Digest<'a> {
    pub date: NaiveDate,
    pub today: Vec<&'a AppointmentRecord>,
    pub history: Vec<&'a AppointmentRecord>,
    /// Records dated after `date`.
    pub upcoming: usize,
}

/// Place every record under "today" (same day) or "history" (earlier day).
///
/// Later records are counted but left out of both lists. The first record
/// whose meeting date cannot be read as a calendar day fails the whole
/// digest, including the `"Failed to extract"` placeholder.
pub fn classify(
    records: &[AppointmentRecord],
    today: NaiveDate,
) -> Result<Digest<'_>, DigestError> {
    let mut digest = Digest {
        date: today,
        today: Vec::new(),
        history: Vec::new(),
        upcoming: 0,
    };

    for record in records {
        let day = parse_meeting_day(&record.meeting_date).ok_or_else(|| {
            DigestError::UnreadableDate {
                link: record.appointment_link.clone(),
                meeting_date: record.meeting_date.clone(),
            }
        })?;
        if day == today {
            digest.today.push(record);
        } else if day < today {
            digest.history.push(record);
        } else {
            digest.upcoming += 1;
        }
    }

    Ok(digest)
}

/// One `<li>` with every display field labeled. Content is not escaped.
pub fn format_appointment(record: &AppointmentRecord) -> String {
    format!(
        "<li><strong>Student Name:</strong> {}<br>\
         <strong>Appointment Link:</strong> {}<br>\
         <strong>Meeting Date:</strong> {}<br>\
         <strong>Coach Name:</strong> {}<br>\
         <strong>Student Year:</strong> {}<br>\
         <strong>Majors/Minors:</strong> {}<br>\
         <strong>Coaching Notes:</strong> {}</li>",
        record.student_name,
        record.appointment_link,
        record.meeting_date,
        record.coach_name,
        record.student_year,
        record.majors_minors,
        record.coaching_notes,
    )
}

/// The full HTML document: today's appointments first, then history.
pub fn render(digest: &Digest<'_>) -> String {
    let mut html = String::from("<html><head></head><body>");
    html.push_str(&format!(
        "<h1>Today's appointments for {}:</h1><ul>",
        digest.date.format("%Y-%m-%d")
    ));
    for record in &digest.today {
        html.push_str(&format_appointment(record));
    }
    html.push_str("</ul><h1>History of coaching appointments:</h1><ul>");
    for record in &digest.history {
        html.push_str(&format_appointment(record));
    }
    html.push_str("</ul></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn record(id: u32, meeting_date: &str) -> AppointmentRecord {
        let mut record = AppointmentRecord::seeded(
            format!("Student {id}"),
            format!("https://vanderbilt.joinhandshake.com/edu/appointments/{id}"),
        );
        record.meeting_date = meeting_date.to_string();
        record
    }

    #[test]
    fn test_classify_today_and_yesterday() {
        let records = vec![
            record(1, "Monday, October 19th 2026 at 2:00pm"),
            record(2, "Sunday, October 18th 2026 at 9:00am"),
        ];
        let digest = classify(&records, run_date()).unwrap();

        assert_eq!(digest.today, vec![&records[0]]);
        assert_eq!(digest.history, vec![&records[1]]);
        assert_eq!(digest.upcoming, 0);
    }

    #[test]
    fn test_classify_counts_future_and_ignores_weekday() {
        let records = vec![
            record(1, "Wednesday, October 21st 2026 at 2:00pm"),
            // Wrong weekday for the date; only the calendar day counts.
            record(2, "Friday, March 3rd 2026 at 10:00am"),
        ];
        let digest = classify(&records, run_date()).unwrap();

        assert!(digest.today.is_empty());
        assert_eq!(digest.history, vec![&records[1]]);
        assert_eq!(digest.upcoming, 1);
    }

    #[test]
    fn test_classify_fails_on_unreadable_date() {
        let records = vec![
            record(1, "Monday, October 19th 2026 at 2:00pm"),
            record(2, "Failed to extract"),
            record(3, "Monday, March 3rd at 2:00pm"),
        ];
        let err = classify(&records, run_date()).unwrap_err();

        assert_eq!(
            err,
            DigestError::UnreadableDate {
                link: "https://vanderbilt.joinhandshake.com/edu/appointments/2".to_string(),
                meeting_date: "Failed to extract".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_fails_on_yearless_date() {
        let records = vec![record(3, "Monday, March 3rd at 2:00pm")];
        assert!(matches!(
            classify(&records, run_date()),
            Err(DigestError::UnreadableDate { .. })
        ));
    }

    #[test]
    fn test_format_appointment_labels_every_field() {
        let mut appt = record(7, "Monday, October 19th 2026 at 2:00pm");
        appt.coach_name = "Chris King".to_string();
        appt.coaching_notes = "<b>bring resume</b>".to_string();

        let item = format_appointment(&appt);
        assert!(item.starts_with("<li><strong>Student Name:</strong> Student 7<br>"));
        for label in [
            "Appointment Link:",
            "Meeting Date:",
            "Coach Name:",
            "Student Year:",
            "Majors/Minors:",
            "Coaching Notes:",
        ] {
            assert!(item.contains(&format!("<strong>{label}</strong>")), "{label}");
        }
        // Interpolated verbatim.
        assert!(item.ends_with("<strong>Coaching Notes:</strong> <b>bring resume</b></li>"));
    }

    #[test]
    fn test_render_places_sections_in_order() {
        let records = vec![
            record(1, "Monday, October 19th 2026 at 2:00pm"),
            record(2, "Sunday, October 18th 2026 at 9:00am"),
        ];
        let html = render(&classify(&records, run_date()).unwrap());

        assert!(html.starts_with(
            "<html><head></head><body><h1>Today's appointments for 2026-10-19:</h1><ul>"
        ));
        assert!(html.ends_with("</ul></body></html>"));

        let history_heading = html.find("History of coaching appointments").unwrap();
        let today_item = html.find("appointments/1<br>").unwrap();
        let history_item = html.find("appointments/2<br>").unwrap();
        assert!(today_item < history_heading);
        assert!(history_item > history_heading);
        assert_eq!(html.matches("<li>").count(), 2);
    }

    #[test]
    fn test_render_empty_digest() {
        let html = render(&classify(&[], run_date()).unwrap());
        assert_eq!(
            html,
            "<html><head></head><body><h1>Today's appointments for 2026-10-19:</h1><ul></ul>\
             <h1>History of coaching appointments:</h1><ul></ul></body></html>"
        );
    }
}
