//! Field extraction from rendered appointment and history pages.
//!
//! Each field is located independently. A miss never aborts the other fields;
//! it leaves the record's default in place and is reported as a [`FieldMiss`].

use chrono::NaiveDateTime;
use html_scraper::node::Node;
use html_scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::dates::parse_meeting_timestamp_at;
use crate::records::{AppointmentRecord, AppointmentStatus, NO_NOTES, UNKNOWN_STUDENT};

static LABEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h4").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static NOTES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"p[class="respect-newlines margin-bottom"][data-bind="html: safe_content_html"]"#,
    )
    .unwrap()
});
static STUDENT_NAME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.style__text___2ilXR.style__small___1Nyai.style__tight___RF4uH").unwrap()
});

/// Why a field fell back to its default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldMiss {
    #[error("no element matched {0}")]
    NotFound(&'static str),
    #[error("{count} elements matched {locator}")]
    Ambiguous { locator: &'static str, count: usize },
    #[error("element matched {0} but had no text")]
    Empty(&'static str),
    #[error("could not parse {0:?} as a date")]
    Unparseable(String),
}

/// Outcome of one field extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    Found(T),
    Defaulted(FieldMiss),
}

impl<T> Extracted<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Defaulted(_) => None,
        }
    }

    pub fn miss(&self) -> Option<&FieldMiss> {
        match self {
            Self::Found(_) => None,
            Self::Defaulted(miss) => Some(miss),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// A successfully parsed "When" value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    pub text: String,
    pub status: AppointmentStatus,
}

/// Year line plus the remaining major/minor lines of the details block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDetails {
    pub year: String,
    pub majors_minors: String,
}

/// Per-field results for one appointment detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentFields {
    pub meeting: Extracted<Meeting>,
    pub coaching_notes: Extracted<String>,
    pub coach_name: Extracted<String>,
    pub student_details: Extracted<StudentDetails>,
}

impl AppointmentFields {
    /// Overwrite the record's defaults with whatever was found.
    ///
    /// Notes present but blank are the one miss that still writes: the
    /// record gets the explicit "no notes" text.
    pub fn apply_to(&self, record: &mut AppointmentRecord) {
        if let Extracted::Found(meeting) = &self.meeting {
            record.meeting_date = meeting.text.clone();
            record.appointment_status = Some(meeting.status);
        }
        match &self.coaching_notes {
            Extracted::Found(notes) => record.coaching_notes = notes.clone(),
            Extracted::Defaulted(FieldMiss::Empty(_)) => {
                record.coaching_notes = NO_NOTES.to_string()
            }
            Extracted::Defaulted(_) => {}
        }
        if let Extracted::Found(coach) = &self.coach_name {
            record.coach_name = coach.clone();
        }
        if let Extracted::Found(details) = &self.student_details {
            record.student_year = details.year.clone();
            record.majors_minors = details.majors_minors.clone();
        }
    }

    /// `(field, miss)` pairs for every field that fell back to its default.
    pub fn misses(&self) -> Vec<(&'static str, &FieldMiss)> {
        [
            ("meeting_date", self.meeting.miss()),
            ("coaching_notes", self.coaching_notes.miss()),
            ("coach_name", self.coach_name.miss()),
            ("student_details", self.student_details.miss()),
        ]
        .into_iter()
        .filter_map(|(field, miss)| miss.map(|m| (field, m)))
        .collect()
    }
}

/// Text as a browser would show it: whitespace collapsed, `<br>` and block
/// boundaries turned into line breaks, blank lines dropped.
pub fn rendered_text(element: ElementRef<'_>) -> String {
    fn walk(element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let mut words = text.split_whitespace().peekable();
                    if words.peek().is_none() {
                        if !text.is_empty() {
                            out.push(' ');
                        }
                        continue;
                    }
                    if text.starts_with(char::is_whitespace) {
                        out.push(' ');
                    }
                    out.push_str(&words.collect::<Vec<_>>().join(" "));
                    if text.ends_with(char::is_whitespace) {
                        out.push(' ');
                    }
                }
                Node::Element(el) if el.name() == "br" => out.push('\n'),
                Node::Element(el) => {
                    let block = matches!(
                        el.name(),
                        "p" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "tr"
                    );
                    if block {
                        out.push('\n');
                    }
                    if let Some(child_el) = ElementRef::wrap(child) {
                        walk(child_el, out);
                    }
                    if block {
                        out.push('\n');
                    }
                }
                _ => {}
            }
        }
    }

    let mut raw = String::new();
    walk(element, &mut raw);
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Following siblings named `tag` of every `h4` whose text equals `label`,
/// in document order.
fn siblings_after_label<'a>(document: &'a Html, label: &str, tag: &str) -> Vec<ElementRef<'a>> {
    document
        .select(&LABEL)
        .filter(|heading| heading.text().collect::<String>().trim() == label)
        .flat_map(|heading| {
            heading
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .filter(|sibling| sibling.value().name() == tag)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Locate the meeting date and classify it against `now`.
pub fn meeting(document: &Html, now: NaiveDateTime) -> Extracted<Meeting> {
    const LOCATOR: &str = "h4 'When' + p";
    let Some(value) = siblings_after_label(document, "When", "p").into_iter().next() else {
        return Extracted::Defaulted(FieldMiss::NotFound(LOCATOR));
    };
    let text = rendered_text(value);
    if text.is_empty() {
        return Extracted::Defaulted(FieldMiss::Empty(LOCATOR));
    }
    match parse_meeting_timestamp_at(&text, now) {
        Some(when) => {
            let status = if when > now {
                AppointmentStatus::Future
            } else {
                AppointmentStatus::Completed
            };
            Extracted::Found(Meeting { text, status })
        }
        None => Extracted::Defaulted(FieldMiss::Unparseable(text)),
    }
}

/// Locate the coaching notes paragraph.
pub fn coaching_notes(document: &Html) -> Extracted<String> {
    const LOCATOR: &str = "p.respect-newlines.margin-bottom[data-bind]";
    let Some(paragraph) = document.select(&NOTES).next() else {
        return Extracted::Defaulted(FieldMiss::NotFound(LOCATOR));
    };
    let text = rendered_text(paragraph);
    if text.trim().is_empty() {
        Extracted::Defaulted(FieldMiss::Empty(LOCATOR))
    } else {
        Extracted::Found(text)
    }
}

/// Locate the staff member's name, the first link under the "Staff Member" label.
pub fn coach_name(document: &Html) -> Extracted<String> {
    const LOCATOR: &str = "h4 'Staff Member' + p a";
    let name = siblings_after_label(document, "Staff Member", "p")
        .into_iter()
        .find_map(|paragraph| paragraph.select(&LINK).next());
    match name {
        Some(link) => Extracted::Found(rendered_text(link)),
        None => Extracted::Defaulted(FieldMiss::NotFound(LOCATOR)),
    }
}

/// Locate the "Student Details" block and split it into year and majors/minors.
///
/// A block that is present but blank yields an empty year and empty
/// majors/minors; only a missing block keeps the defaults.
pub fn student_details(document: &Html) -> Extracted<StudentDetails> {
    const LOCATOR: &str = "h4 'Student Details' + p.text";
    let block = siblings_after_label(document, "Student Details", "p")
        .into_iter()
        .find(|paragraph| paragraph.value().attr("class") == Some("text"));
    let Some(block) = block else {
        return Extracted::Defaulted(FieldMiss::NotFound(LOCATOR));
    };

    let text = rendered_text(block);
    let mut lines = text.split('\n');
    let year = lines.next().unwrap_or_default().trim().to_string();
    Extracted::Found(StudentDetails {
        year,
        majors_minors: lines.collect::<Vec<_>>().join("; "),
    })
}

/// All detail-page fields, each attempted independently.
pub fn appointment_fields(document: &Html, now: NaiveDateTime) -> AppointmentFields {
    AppointmentFields {
        meeting: meeting(document, now),
        coaching_notes: coaching_notes(document),
        coach_name: coach_name(document),
        student_details: student_details(document),
    }
}

/// The student's display name on their appointment history page.
///
/// Exactly one element must match; several matches are ambiguous and fall back.
pub fn student_name(document: &Html) -> Extracted<String> {
    const LOCATOR: &str = "div.style__text.style__small.style__tight";
    let names: Vec<String> = document.select(&STUDENT_NAME).map(rendered_text).collect();
    match names.as_slice() {
        [] => Extracted::Defaulted(FieldMiss::NotFound(LOCATOR)),
        [name] if name.is_empty() => Extracted::Defaulted(FieldMiss::Empty(LOCATOR)),
        [name] => Extracted::Found(name.clone()),
        many => Extracted::Defaulted(FieldMiss::Ambiguous {
            locator: LOCATOR,
            count: many.len(),
        }),
    }
}

/// Resolved display name, or [`UNKNOWN_STUDENT`].
pub fn student_name_or_default(name: &Extracted<String>) -> String {
    name.found()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_STUDENT.to_string())
}
