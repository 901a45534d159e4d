//! Debug formatting helpers for [`custom_debug_derive`].

use std::fmt;

/// Formats a secret as a fixed placeholder so it never reaches logs.
///
/// Use with `#[debug(with = crate::fmt::redacted)]`.
pub fn redacted<T>(_value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("\"<redacted>\"")
}
