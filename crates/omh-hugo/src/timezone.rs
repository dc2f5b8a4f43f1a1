//! Output time zone for dates written to Hugo front matter.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use omh_core::OmhError;

/// Naive timestamp layouts accepted besides RFC 3339.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Time zone all output dates are rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputTimeZone {
    /// The zone of the machine running the conversion.
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
    /// IANA zone such as `Europe/Berlin`, with daylight saving rules.
    Named(Tz),
}

impl OutputTimeZone {
    /// Re-render a timestamp in this zone as RFC 3339.
    ///
    /// Timestamps with an offset keep their instant; naive timestamps are
    /// read as wall-clock time in this zone. Returns `None` for anything
    /// that is not a full timestamp, including plain dates.
    #[must_use]
    pub fn normalize(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(self.render(parsed.with_timezone(&Utc)));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .and_then(|naive| self.from_naive(naive))
            .map(|instant| self.render(instant))
    }

    fn from_naive(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::Utc => Some(naive.and_utc()),
            Self::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            // Ambiguous wall-clock times take the earlier instant; skipped ones fail.
            Self::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    fn render(&self, instant: DateTime<Utc>) -> String {
        match self {
            Self::Utc => instant.to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::Local => instant
                .with_timezone(&Local)
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            Self::Fixed(offset) => instant
                .with_timezone(offset)
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            Self::Named(tz) => instant
                .with_timezone(tz)
                .fixed_offset()
                .to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}

impl FromStr for OutputTimeZone {
    type Err = OmhError;

    /// Accepts `UTC`/`Z`, `Local`, an IANA name such as `Europe/Berlin`, or
    /// an offset such as `+02:00` or `-0800`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if ["utc", "z", "gmt"].iter().any(|name| trimmed.eq_ignore_ascii_case(name)) {
            return Ok(Self::Utc);
        }
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if let Some(offset) = parse_offset(trimmed) {
            return Ok(Self::Fixed(offset));
        }
        trimmed.parse::<Tz>().map(Self::Named).map_err(|_| {
            OmhError::Config(format!(
                "unsupported time zone '{s}': expected UTC, Local, an IANA name like \
                 Europe/Berlin or an offset like +02:00"
            ))
        })
    }
}

impl fmt::Display for OutputTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("Local"),
            Self::Utc => f.write_str("UTC"),
            Self::Fixed(offset) => write!(f, "{offset}"),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    let sign = match text.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = text[1..].chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
