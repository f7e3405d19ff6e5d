//! Time related utils.

use crate::Error;
use chrono::SecondsFormat;
use chrono::Utc;

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Create a new DateTime with current time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Format time into ISO 8601 with separators and without fractional
/// seconds: `2022-03-13T07:20:04Z`
///
/// This is the only shape shared access signature times are signed in.
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format time into RFC3339: `2022-03-13T07:20:04Z`
pub fn format_rfc3339(t: DateTime) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse time from RFC3339.
///
/// All of the following are valid:
///
/// - `2022-03-13T07:20:04Z`
/// - `2022-03-01T08:12:34+00:00`
/// - `2022-03-01T08:12:34.123+00:00`
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    Ok(chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::signature_input(format!("invalid rfc3339 time: {s}")).with_source(e))?
        .with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_time() -> DateTime {
        parse_rfc3339("2022-03-01T08:12:34.567Z").unwrap()
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(format_http_date(test_time()), "Tue, 01 Mar 2022 08:12:34 GMT");
    }

    #[test]
    fn test_format_iso8601_drops_fraction() {
        assert_eq!(format_iso8601(test_time()), "2022-03-01T08:12:34Z");
        assert_eq!(format_rfc3339(test_time()), "2022-03-01T08:12:34Z");
    }

    #[test]
    fn test_parse_rfc3339_offset() {
        let t = parse_rfc3339("2022-03-01T10:12:34+02:00").unwrap();
        assert_eq!(format_iso8601(t), "2022-03-01T08:12:34Z");
        assert!(parse_rfc3339("2022-03-01").is_err());
    }
}
