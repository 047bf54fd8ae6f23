//! Cookie string codec for the persisted session slot.
//!
//! Reads follow the `document.cookie` shape (`"a=1; b=2"`), writes produce
//! the assignment string a browser accepts
//! (`"session=<value>; expires=<HTTP-date>; path=/"`).

use chrono::{DateTime, Utc};

/// Name of the cookie holding the encoded session descriptor.
pub const SESSION_COOKIE: &str = "session";

/// Path every session cookie is scoped to.
pub const COOKIE_PATH: &str = "/";

/// Looks up `name` in a `"; "`-separated cookie header.
///
/// Returns `None` when the name is missing or occurs more than once; an
/// ambiguous slot is never guessed at.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    let haystack = format!("; {header}");
    let needle = format!("; {name}=");

    let mut parts = haystack.split(needle.as_str());
    parts.next()?;
    let tail = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    Some(tail.split(';').next().unwrap_or(tail).to_string())
}

/// Formats `expires` the way `Date.prototype.toUTCString` does.
pub fn http_date(expires: DateTime<Utc>) -> String {
    expires.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Builds the assignment string for a cookie with an absolute expiry.
pub fn set_cookie_string(name: &str, value: &str, expires: DateTime<Utc>) -> String {
    format!(
        "{name}={value}; expires={}; path={COOKIE_PATH}",
        http_date(expires)
    )
}

/// Builds an assignment string that deletes `name` by expiring it at the epoch.
pub fn expire_cookie_string(name: &str) -> String {
    set_cookie_string(name, "", DateTime::<Utc>::UNIX_EPOCH)
}
