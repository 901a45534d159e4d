//! Handshake portal knowledge: URLs, link patterns and page locators.
//!
//! The portal is a client-rendered single-page app; everything here works on
//! the rendered page source captured by [`crate::browser`].

pub mod extract;
pub mod links;
pub mod urls;

/// Origin of the scheduling portal.
pub const PORTAL_ORIGIN: &str = "https://vanderbilt.joinhandshake.com";

/// Handshake user id of the coach whose calendar is harvested.
pub const COACH_USER_ID: &str = "41763197";

/// Every appointment detail link starts with this prefix.
pub const APPOINTMENT_LINK_PREFIX: &str = "https://vanderbilt.joinhandshake.com/edu/appointments/";

/// Every user profile link starts with this prefix.
pub const USER_LINK_PREFIX: &str = "https://vanderbilt.joinhandshake.com/edu/users/";
