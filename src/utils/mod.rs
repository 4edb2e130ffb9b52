//! Utility functions and helpers.

pub mod http;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a board timestamp into epoch seconds.
///
/// Boards disagree on formats: RFC 3339, `2024-05-29T10:11:32`,
/// `2024-05-29 10:11:32`, or a bare date.
pub fn parse_timestamp(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp())
}

/// Convert epoch seconds to an ISO `YYYY-MM-DD` date.
pub fn epoch_to_date(epoch: i64) -> Option<String> {
    DateTime::from_timestamp(epoch, 0).map(|dt| dt.date_naive().to_string())
}

/// Take the `YYYY-MM-DD` prefix of an ISO datetime string.
pub fn date_prefix(s: &str) -> Option<String> {
    if s.len() >= 10 && s.is_char_boundary(10) {
        Some(s[..10].to_string())
    } else {
        None
    }
}

/// Decode the HTML entities boards leave in text fields.
///
/// Covers named entities seen in board payloads plus decimal/hex numeric
/// references. Unknown entities pass through unchanged.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';') {
            // Entities longer than ~10 chars are not entities
            Some(end) if end <= 10 => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(decoded) => out.push_str(&decoded),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    match entity {
        "amp" => return Some("&".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "quot" => return Some("\"".to_string()),
        "apos" => return Some("'".to_string()),
        "nbsp" => return Some(" ".to_string()),
        _ => {}
    }
    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse().ok()?
    } else {
        return None;
    };
    char::from_u32(code).map(String::from)
}
