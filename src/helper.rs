use std::{
    convert::TryFrom,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Nanoseconds in `d`, saturating at `u64::MAX`.
pub(crate) fn duration_as_nanos(d: Duration) -> u64 { u64::try_from(d.as_nanos()).unwrap_or(u64::MAX) }

/// Nanoseconds in `d` as a sample value, saturating at `i64::MAX`.
pub(crate) fn duration_as_sample(d: Duration) -> i64 { i64::try_from(duration_as_nanos(d)).unwrap_or(i64::MAX) }

/// Seconds since the unix epoch, as stamped on proxy-bound lines.
pub(crate) fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Appends the `.` separator to a non-empty prefix that lacks one.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('.') {
        prefix.to_owned()
    } else {
        format!("{}.", prefix)
    }
}
