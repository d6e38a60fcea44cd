//! Conversion between an author's local wall-clock time and the stored UTC
//! instant, plus assembly of the time fields on entry writes.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Wire format of `localTime`, e.g. `2021-05-13 00:18`.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("localTime must be formatted as YYYY-MM-DD HH:MM, got '{0}'")]
    InvalidLocalTime(String),

    #[error("timezone must be formatted as +HH:MM or -HH:MM, got '{0}'")]
    InvalidOffset(String),

    #[error("localTime and timezone must be supplied together")]
    Unpaired,

    #[error("localTime and timezone are required")]
    Missing,
}

/// Parses a `±HH:MM` offset string.
pub fn parse_offset(raw: &str) -> Result<FixedOffset, TimestampError> {
    let invalid = || TimestampError::InvalidOffset(raw.to_string());

    let bytes = raw.as_bytes();
    if bytes.len() != 6 || bytes[3] != b':' {
        return Err(invalid());
    }

    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(invalid()),
    };

    let field = |range: std::ops::Range<usize>| -> Result<i32, TimestampError> {
        let part = raw.get(range).ok_or_else(invalid)?;
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        part.parse().map_err(|_| invalid())
    };

    let hours = field(1..3)?;
    let minutes = field(4..6)?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Interprets `local_time` as wall-clock time at `offset` and returns the
/// matching UTC instant.
pub fn to_utc(local_time: &str, offset: &str) -> Result<DateTime<Utc>, TimestampError> {
    let naive = NaiveDateTime::parse_from_str(local_time, LOCAL_TIME_FORMAT)
        .map_err(|_| TimestampError::InvalidLocalTime(local_time.to_string()))?;
    let offset = parse_offset(offset)?;

    // Fixed offsets have no gaps or folds, so this is always unambiguous.
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TimestampError::InvalidLocalTime(local_time.to_string()))
}

/// Renders `instant` as wall-clock time at `offset`.
pub fn from_utc(instant: DateTime<Utc>, offset: &str) -> Result<String, TimestampError> {
    let offset = parse_offset(offset)?;
    Ok(instant
        .with_timezone(&offset)
        .format(LOCAL_TIME_FORMAT)
        .to_string())
}

/// The time fields persisted on an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTimestamp {
    pub timestamp_utc: DateTime<Utc>,
    pub utc_offset: String,
}

impl EntryTimestamp {
    /// Time fields for a new entry; both halves are mandatory.
    pub fn assemble_new(
        local_time: Option<&str>,
        timezone: Option<&str>,
    ) -> Result<Self, TimestampError> {
        Self::assemble_edit(local_time, timezone)?.ok_or(TimestampError::Missing)
    }

    /// Time fields for an edit. Supplying neither half leaves the stored
    /// values alone (`Ok(None)`); supplying only one is rejected.
    pub fn assemble_edit(
        local_time: Option<&str>,
        timezone: Option<&str>,
    ) -> Result<Option<Self>, TimestampError> {
        match (local_time, timezone) {
            (None, None) => Ok(None),
            (Some(local_time), Some(timezone)) => Ok(Some(Self {
                timestamp_utc: to_utc(local_time, timezone)?,
                utc_offset: timezone.to_string(),
            })),
            _ => Err(TimestampError::Unpaired),
        }
    }

    /// The author's original wall-clock time.
    pub fn local_time(&self) -> Result<String, TimestampError> {
        from_utc(self.timestamp_utc, &self.utc_offset)
    }
}
