//! Session grant returned by the site's login endpoint.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Login payload issued by the server.
///
/// ```json
/// { "id": 12, "user_id": 3, "auth": "4b0c...", "expires": "2030-01-01T00:00:00+00:00" }
/// ```
///
/// Identifiers are opaque: numeric ids are accepted and kept as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionGrant {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(deserialize_with = "opaque_id")]
    pub user_id: String,
    /// Session token.
    pub auth: String,
    pub expires: GrantExpiry,
}

/// Absolute expiry as emitted by the server.
///
/// Older servers send unix seconds (possibly fractional), newer ones an
/// ISO-8601 timestamp. Timestamps without an offset are read as UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GrantExpiry {
    UnixSeconds(f64),
    Timestamp(DateTime<Utc>),
    Naive(NaiveDateTime),
}

impl GrantExpiry {
    /// Resolves the expiry to a UTC instant, `None` when out of range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::UnixSeconds(secs) => {
                if !secs.is_finite() {
                    return None;
                }
                let whole = secs.trunc() as i64;
                let nanos = ((secs - secs.trunc()) * 1e9).round() as u32;
                DateTime::from_timestamp(whole, nanos.min(999_999_999))
            }
            Self::Timestamp(ts) => Some(*ts),
            Self::Naive(naive) => Some(naive.and_utc()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(text) => text,
        IdRepr::Signed(n) => n.to_string(),
        IdRepr::Unsigned(n) => n.to_string(),
        // JavaScript hands every number over as a double.
        IdRepr::Float(n) if n.is_finite() && n.fract() == 0.0 => (n as i64).to_string(),
        IdRepr::Float(n) => n.to_string(),
    })
}
