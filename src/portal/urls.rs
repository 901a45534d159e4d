//! URL construction for the appointment list and student history pages.

use chrono::{Days, NaiveDate};
use std::sync::LazyLock;
use url::Url;

use super::{COACH_USER_ID, PORTAL_ORIGIN};

/// Appointment list endpoint, without query.
static APPOINTMENTS_ENDPOINT: LazyLock<Url> =
    LazyLock::new(|| Url::parse(&format!("{PORTAL_ORIGIN}/edu/appointments")).unwrap());

/// The `[start, end]` window for the list query.
///
/// The window covers the day after tomorrow, expressed in UTC with a fixed
/// five hour offset (Central daylight time). Standard time shifts it by an hour.
pub fn query_window(today: NaiveDate) -> (String, String) {
    let start = today + Days::new(2);
    let end = start + Days::new(1);
    (
        start.format("%Y-%m-%dT05:00:00.000Z").to_string(),
        end.format("%Y-%m-%dT04:59:59.999Z").to_string(),
    )
}

/// URL of the coach's approved appointments starting inside [`query_window`].
pub fn appointment_list_url(today: NaiveDate) -> Url {
    let (start, end) = query_window(today);
    let mut url = APPOINTMENTS_ENDPOINT.clone();
    url.query_pairs_mut()
        .append_pair("page", "1")
        .append_pair("per_page", "25")
        .append_pair("sort_direction", "desc")
        .append_pair("sort_column", "default")
        .append_pair("staff_members[]", COACH_USER_ID)
        .append_pair("include_past_appointments", "true")
        .append_pair("status[]", "approved")
        .append_pair("start_date_start", &start)
        .append_pair("start_date_end", &end);
    url
}

/// URL of every appointment (past included) booked by one student.
pub fn student_history_url(student_id: &str) -> Url {
    let mut url = APPOINTMENTS_ENDPOINT.clone();
    url.query_pairs_mut()
        .append_pair("students[]", student_id)
        .append_pair("include_past_appointments", "true");
    url
}
