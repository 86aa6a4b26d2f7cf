//! Parsing of user-entered alarm time tokens.
//!
//! Users type times as `H:M` or `H:M:S`, optionally several of them separated
//! by commas. Everything stored on an alarm goes through here first, so the
//! rest of the system only ever sees canonical 8-character `HH:MM:SS` strings
//! and the evaluator's time-of-day comparison stays an exact match.

use thiserror::Error;

/// A time token that could not be normalized.
///
/// Surfaced to the caller instead of letting the raw token through, so a typo
/// can never end up stored on an alarm where it would silently never match.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid time format: {0:?}")]
pub struct InvalidTimeFormat(pub String);

/// Normalize a single time token into canonical `HH:MM:SS` form.
///
/// Accepts exactly 2 fields (`H:M`, seconds default to `00`) or 3 fields
/// (`H:M:S`), each numeric and in range. Anything else fails.
pub fn parse_time_token(token: &str) -> Result<String, InvalidTimeFormat> {
    let token = token.trim();
    let parts: Vec<&str> = token.split(':').collect();

    let (hour, minute, second) = match parts.as_slice() {
        [h, m] => (parse_field(h, token, 23)?, parse_field(m, token, 59)?, 0),
        [h, m, s] => (
            parse_field(h, token, 23)?,
            parse_field(m, token, 59)?,
            parse_field(s, token, 59)?,
        ),
        _ => return Err(InvalidTimeFormat(token.to_string())),
    };

    Ok(format!("{:02}:{:02}:{:02}", hour, minute, second))
}

/// Split a comma-separated list of time tokens and normalize each one.
///
/// Empty tokens are discarded; duplicates are dropped while keeping the
/// first-seen order.
pub fn parse_time_list(input: &str) -> Result<Vec<String>, InvalidTimeFormat> {
    let mut times = Vec::new();
    for token in input.split(',') {
        if token.trim().is_empty() {
            continue;
        }
        let canonical = parse_time_token(token)?;
        if !times.contains(&canonical) {
            times.push(canonical);
        }
    }
    Ok(times)
}

fn parse_field(raw: &str, token: &str, max: u32) -> Result<u32, InvalidTimeFormat> {
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| InvalidTimeFormat(token.to_string()))?;
    if value > max {
        return Err(InvalidTimeFormat(token.to_string()));
    }
    Ok(value)
}
