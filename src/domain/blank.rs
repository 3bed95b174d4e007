//! Optional text fields as written by hand or by web forms: an empty input
//! arrives as `""` rather than `null`. Both mean "no value".

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// `None` for an empty or whitespace-only string.
pub fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(non_blank))
}

/// Accepts `null`, `""`, `YYYY-MM-DD`, or a full ISO timestamp (its date part is kept).
pub(crate) fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)?.and_then(non_blank) else {
        return Ok(None);
    };
    let raw = raw.trim();

    raw.parse::<NaiveDate>()
        .or_else(|_| raw.parse::<NaiveDateTime>().map(|dt| dt.date()))
        .map(Some)
        .map_err(|_| D::Error::custom(format!("invalid date '{}'", raw)))
}
