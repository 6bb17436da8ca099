use super::error::FilterParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Coerce a string operand to a finite number
pub fn parse_number(s: &str) -> Result<f64, FilterParseError> {
    let trimmed = s.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FilterParseError::NotANumber(s.to_string()))
}

/// Parse a date operand.
///
/// Offsets are normalized to UTC; a bare date means midnight UTC.
pub fn parse_date(s: &str) -> Result<NaiveDateTime, FilterParseError> {
    let trimmed = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| FilterParseError::InvalidDate(s.to_string()))
}

/// Split a `between` operand of the form `low,high`
pub fn parse_range(s: &str) -> Result<(&str, &str), FilterParseError> {
    let mut parts = s.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(low), Some(high), None) if !low.trim().is_empty() && !high.trim().is_empty() => {
            Ok((low.trim(), high.trim()))
        }
        _ => Err(FilterParseError::InvalidRange(s.to_string())),
    }
}

/// Parse a `between` operand into numeric bounds
pub fn parse_number_range(s: &str) -> Result<(f64, f64), FilterParseError> {
    let (low, high) = parse_range(s)?;
    Ok((parse_number(low)?, parse_number(high)?))
}

/// Parse a `between` operand into date bounds
pub fn parse_date_range(s: &str) -> Result<(NaiveDateTime, NaiveDateTime), FilterParseError> {
    let (low, high) = parse_range(s)?;
    Ok((parse_date(low)?, parse_date(high)?))
}
