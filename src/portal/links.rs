//! Hyperlink harvesting: appointment detail links and student user ids.
//!
//! Matching is string based, mirroring what the rendered portal exposes:
//! a prefix check plus an all-digits trailing path segment.

use html_scraper::Selector;
use indexmap::IndexSet;
use std::sync::LazyLock;
use tracing::trace;
use url::Url;

use super::{APPOINTMENT_LINK_PREFIX, USER_LINK_PREFIX};
use crate::browser::Page;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Trailing `/`-separated segment of a link.
fn last_segment(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or_default()
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Whether `link` points at an appointment detail page (`.../appointments/<digits>`).
pub fn is_appointment_link(link: &str) -> bool {
    link.contains(APPOINTMENT_LINK_PREFIX) && is_numeric(last_segment(link))
}

/// The user id referenced by `link`, unless it is the coach, an edit link or a
/// `null` placeholder.
pub fn student_id_from_link<'a>(link: &'a str, coach_id: &str) -> Option<&'a str> {
    if !link.contains(USER_LINK_PREFIX) || link.contains("edit") || link.contains("null") {
        return None;
    }
    let id = last_segment(link);
    (is_numeric(id) && id != coach_id).then_some(id)
}

/// Every `href` on the page, resolved against the page URL.
///
/// Unresolvable values (`javascript:` handlers and the like still resolve, but
/// malformed ones do not) are skipped.
pub fn resolved_links(page: &Page) -> impl Iterator<Item = String> + '_ {
    page.document.select(&ANCHOR).filter_map(|anchor| {
        let href = anchor.value().attr("href")?.trim();
        match page.url.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                trace!(href, error = %e, "skipping unresolvable link");
                None
            }
        }
    })
}

/// Distinct appointment detail links on the page, in document order.
pub fn appointment_links(page: &Page) -> IndexSet<Url> {
    resolved_links(page)
        .filter(|link| is_appointment_link(link))
        .filter_map(|link| Url::parse(&link).ok())
        .collect()
}

/// Distinct student ids linked from an appointment page, in document order.
pub fn student_ids(page: &Page, coach_id: &str) -> IndexSet<String> {
    resolved_links(page)
        .filter_map(|link| student_id_from_link(&link, coach_id).map(str::to_owned))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::COACH_USER_ID;

    fn page(url: &str, body: &str) -> Page {
        Page::parse(Url::parse(url).unwrap(), &format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn test_is_appointment_link_accepts_numeric_ids() {
        assert!(is_appointment_link(
            "https://vanderbilt.joinhandshake.com/edu/appointments/123"
        ));
        assert!(is_appointment_link(
            "https://vanderbilt.joinhandshake.com/edu/appointments/9"
        ));
    }

    #[test]
    fn test_is_appointment_link_rejects_non_numeric_or_foreign() {
        let rejected = [
            "https://vanderbilt.joinhandshake.com/edu/appointments/",
            "https://vanderbilt.joinhandshake.com/edu/appointments/new",
            "https://vanderbilt.joinhandshake.com/edu/appointments/123/edit",
            "https://vanderbilt.joinhandshake.com/edu/appointments/12a",
            "https://vanderbilt.joinhandshake.com/edu/appointments?page=2",
            "https://other.joinhandshake.com/edu/appointments/123",
            "https://vanderbilt.joinhandshake.com/edu/users/123",
        ];
        for link in rejected {
            assert!(!is_appointment_link(link), "should reject {link}");
        }
    }

    #[test]
    fn test_student_id_from_link_filters() {
        let user = |id: &str| format!("https://vanderbilt.joinhandshake.com/edu/users/{id}");
        assert_eq!(student_id_from_link(&user("555"), COACH_USER_ID), Some("555"));
        assert_eq!(student_id_from_link(&user(COACH_USER_ID), COACH_USER_ID), None);
        assert_eq!(student_id_from_link(&user("null"), COACH_USER_ID), None);
        assert_eq!(student_id_from_link(&user("555/edit"), COACH_USER_ID), None);
        assert_eq!(student_id_from_link(&user("abc"), COACH_USER_ID), None);
    }

    #[test]
    fn test_student_id_excluded_when_link_mentions_edit_or_null() {
        // Digit suffix is valid, but the link text is disqualifying.
        let links = [
            "https://vanderbilt.joinhandshake.com/edu/users/edit/555",
            "https://vanderbilt.joinhandshake.com/edu/users/null/555",
        ];
        for link in links {
            assert_eq!(student_id_from_link(link, COACH_USER_ID), None, "{link}");
        }
    }

    #[test]
    fn test_appointment_links_resolves_relative_and_dedupes() {
        let page = page(
            "https://vanderbilt.joinhandshake.com/edu/appointments?page=1",
            r#"
            <a href="/edu/appointments/1">one</a>
            <a href="https://vanderbilt.joinhandshake.com/edu/appointments/2">two</a>
            <a href="/edu/appointments/1">one again</a>
            <a href="/edu/appointments/new">new</a>
            <a href="/edu/users/77">student</a>
            <a>no href</a>
            "#,
        );

        let links: Vec<String> = appointment_links(&page)
            .into_iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(
            links,
            vec![
                "https://vanderbilt.joinhandshake.com/edu/appointments/1",
                "https://vanderbilt.joinhandshake.com/edu/appointments/2",
            ]
        );
    }

    #[test]
    fn test_student_ids_skip_coach_and_edit_links() {
        let page = page(
            "https://vanderbilt.joinhandshake.com/edu/appointments/1",
            r#"
            <a href="/edu/users/77">Student</a>
            <a href="/edu/users/77/edit">Edit student</a>
            <a href="/edu/users/41763197">Coach</a>
            <a href="/edu/users/null">Nobody</a>
            <a href="/edu/users/88">Second student</a>
            <a href="/edu/users/77">Student again</a>
            "#,
        );

        let ids: Vec<String> = student_ids(&page, COACH_USER_ID).into_iter().collect();
        assert_eq!(ids, vec!["77".to_string(), "88".to_string()]);
    }

    #[test]
    fn test_empty_page_yields_no_links() {
        let page = page("https://vanderbilt.joinhandshake.com/edu/appointments", "");
        assert!(appointment_links(&page).is_empty());
        assert!(student_ids(&page, COACH_USER_ID).is_empty());
    }
}
