use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECS_PER_HOUR: u32 = 3600;
const MORNING_START: u32 = 6 * SECS_PER_HOUR;
const AFTERNOON_START: u32 = 12 * SECS_PER_HOUR;
const EVENING_START: u32 = 18 * SECS_PER_HOUR;
// 23:59:59, inclusive
const EVENING_END: u32 = 24 * SECS_PER_HOUR - 1;

/// Coarse time-of-day bucket derived from the hour an order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfDay {
    Night,
    Morning,
    Afternoon,
    Evening,
    Unknown,
}

impl PartOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfDay::Night => "Night",
            PartOfDay::Morning => "Morning",
            PartOfDay::Afternoon => "Afternoon",
            PartOfDay::Evening => "Evening",
            PartOfDay::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PartOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets an integer hour by mapping it to `hour:00:00`.
///
/// Hours outside 0..=23 have no time point and land in `Unknown`.
pub fn classify(hour: i64) -> PartOfDay {
    u32::try_from(hour)
        .ok()
        .and_then(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .map_or(PartOfDay::Unknown, classify_time)
}

/// Buckets an arbitrary time of day.
///
/// Ranges are half-open except Evening, which ends at 23:59:59 inclusive; any
/// instant after that (sub-second or leap second) is `Unknown`.
pub fn classify_time(t: NaiveTime) -> PartOfDay {
    let secs = t.num_seconds_from_midnight();
    let whole_second = t.nanosecond() == 0;

    if secs < MORNING_START {
        PartOfDay::Night
    } else if secs < AFTERNOON_START {
        PartOfDay::Morning
    } else if secs < EVENING_START {
        PartOfDay::Afternoon
    } else if secs < EVENING_END || (secs == EVENING_END && whole_second) {
        PartOfDay::Evening
    } else {
        PartOfDay::Unknown
    }
}
