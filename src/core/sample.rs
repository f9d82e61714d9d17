use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Ticks per second (one tick is 100ns)
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks between 0001-01-01T00:00:00 and the Unix epoch
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// Wall-clock instant as a count of 100ns ticks since 0001-01-01T00:00:00
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Current local wall-clock time
    pub fn now() -> Self {
        Self::from_datetime(&Local::now().naive_local())
    }

    /// Sub-tick precision is truncated. Dates beyond the i64 tick range
    /// saturate to `i64::MIN` / `i64::MAX`.
    pub fn from_datetime(datetime: &NaiveDateTime) -> Self {
        let utc = datetime.and_utc();
        let seconds = utc.timestamp();
        let sub_ticks = i64::from(utc.timestamp_subsec_nanos()) / 100;
        let ticks = seconds
            .checked_mul(TICKS_PER_SECOND)
            .and_then(|t| t.checked_add(UNIX_EPOCH_TICKS))
            .and_then(|t| t.checked_add(sub_ticks))
            .unwrap_or(if seconds < 0 { i64::MIN } else { i64::MAX });
        Self(ticks)
    }

    pub fn ticks(&self) -> i64 {
        self.0
    }

    /// None when the tick count lies outside chrono's representable range
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let relative = self.0.checked_sub(UNIX_EPOCH_TICKS)?;
        let seconds = relative.div_euclid(TICKS_PER_SECOND);
        let nanos = (relative.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
        DateTime::from_timestamp(seconds, nanos).map(|dt| dt.naive_utc())
    }
}

/// One 3-axis accelerometer reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, x: f64, y: f64, z: f64) -> Self {
        Self { timestamp, x, y, z }
    }
}
