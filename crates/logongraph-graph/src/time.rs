use chrono::{
    DateTime, Local, MappedLocalTime, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone,
};
use std::sync::LazyLock;

/// Date prefixes with the separator that follows them, extended and basic.
const DATE_PARTS: &[(&str, bool)] = &[
    ("%Y-%m-%dT", true),
    ("%Y-%m-%d ", true),
    ("%Y%m%dT", false),
];

const EXTENDED_TIMES: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
const BASIC_TIMES: &[&str] = &["%H%M%S%.f", "%H%M"];

/// `%#z` also takes hour-only offsets such as `+01`.
const OFFSETS: &[&str] = &["%:z", "%z", "%#z"];

static NAIVE_FORMATS: LazyLock<Vec<String>> = LazyLock::new(|| {
    DATE_PARTS
        .iter()
        .flat_map(|&(date, extended)| {
            let times = if extended { EXTENDED_TIMES } else { BASIC_TIMES };
            times.iter().map(move |time| format!("{date}{time}"))
        })
        .collect()
});

static OFFSET_FORMATS: LazyLock<Vec<String>> = LazyLock::new(|| {
    NAIVE_FORMATS
        .iter()
        .flat_map(|naive| OFFSETS.iter().map(move |offset| format!("{naive}{offset}")))
        .collect()
});

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

fn to_seconds<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9
}

/// Seconds since the epoch for a wall-clock time in the local zone.
pub fn local_timestamp(naive: &NaiveDateTime) -> Option<f64> {
    timestamp_in(&Local, naive)
}

/// Ambiguous times take the earlier instant. Times skipped by a
/// spring-forward gap are read with the offset in force before the gap.
fn timestamp_in<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<f64> {
    match tz.from_local_datetime(naive) {
        MappedLocalTime::Single(dt) | MappedLocalTime::Ambiguous(dt, _) => Some(to_seconds(&dt)),
        MappedLocalTime::None => {
            let before = naive.checked_sub_signed(TimeDelta::days(1))?;
            let offset = tz.offset_from_local_datetime(&before).earliest()?;
            let utc = naive.and_utc();
            let seconds = utc.timestamp() - i64::from(offset.fix().local_minus_utc());
            Some(seconds as f64 + f64::from(utc.timestamp_subsec_nanos()) / 1e9)
        }
    }
}

/// Parse an ISO 8601 `EventTime` cell into seconds since the epoch.
///
/// Extended and basic forms are accepted, with or without seconds and
/// fractions. A trailing `Z` means UTC; no offset at all means server-local
/// time.
pub fn parse_event_time(raw: &str) -> Result<f64, String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(to_seconds(&dt));
    }

    let zoned = raw
        .strip_suffix(['Z', 'z'])
        .map(|stem| format!("{stem}+00:00"));
    let candidate = zoned.as_deref().unwrap_or(raw);
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(candidate, fmt).ok())
    {
        return Ok(to_seconds(&dt));
    }
    if zoned.is_some() {
        return Err(format!("invalid event time '{raw}'"));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });

    match naive {
        Some(naive) => local_timestamp(&naive)
            .ok_or_else(|| format!("event time '{raw}' does not exist in the local time zone")),
        None => Err(format!("invalid event time '{raw}'")),
    }
}
