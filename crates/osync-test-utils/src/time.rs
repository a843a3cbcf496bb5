//! Fixed points in time for tests.

use chrono::{DateTime, TimeZone, Utc};

/// `2024-03-01T<hour>:<minute>:00Z`.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid test time {hour}:{minute}"))
}

/// A time the given number of seconds after [`at`]`(9, 0)`.
pub fn base_plus(seconds: i64) -> DateTime<Utc> {
    at(9, 0) + chrono::Duration::seconds(seconds)
}
