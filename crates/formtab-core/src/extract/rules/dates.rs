//! Test date parsing.
//!
//! Values look like `12/5/2023 3:30 p.m` (day first). The meridiem marker is
//! inconsistently localized upstream, so a marker-qualified value gets one
//! retry with the marker stripped and the hour read as-is.

use chrono::NaiveDateTime;
use tracing::debug;

use super::patterns::{DATE_TIME_FRAGMENT, MERIDIEM_MARKER};
use crate::error::ExtractionError;

const QUALIFIED_FORMAT: &str = "%d/%m/%Y %I:%M %p";
const UNQUALIFIED_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Parse the test date found on `page` from a raw date-time value.
///
/// Fails when the value does not start with a date-time fragment, or when
/// the fragment is unparseable after the single marker-stripping retry.
pub fn parse_test_date(page: u32, raw: &str) -> Result<NaiveDateTime, ExtractionError> {
    let caps = DATE_TIME_FRAGMENT
        .captures(raw)
        .ok_or_else(|| ExtractionError::DateFragmentMissing {
            page,
            value: raw.to_string(),
        })?;
    let fragment = &caps[0];

    let Some(meridiem) = caps.name("meridiem") else {
        return parse_unqualified(page, fragment);
    };

    let marker = if meridiem.as_str().eq_ignore_ascii_case("a") { "AM" } else { "PM" };
    let qualified = format!("{} {}", strip_meridiem(fragment), marker);

    match NaiveDateTime::parse_from_str(&qualified, QUALIFIED_FORMAT) {
        Ok(date) => Ok(date),
        Err(e) => {
            debug!("page {}: {:?} rejected with meridiem ({}), retrying without", page, fragment, e);
            parse_unqualified(page, &strip_meridiem(fragment))
        }
    }
}

fn parse_unqualified(page: u32, fragment: &str) -> Result<NaiveDateTime, ExtractionError> {
    NaiveDateTime::parse_from_str(fragment.trim(), UNQUALIFIED_FORMAT).map_err(|e| {
        ExtractionError::DateParse {
            page,
            fragment: fragment.to_string(),
            reason: e.to_string(),
        }
    })
}

fn strip_meridiem(fragment: &str) -> String {
    MERIDIEM_MARKER.replace_all(fragment, "").trim().to_string()
}
