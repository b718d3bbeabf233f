use jiff::civil::Time;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Routes must be back at the depot before the end of the day.
pub const SECONDS_PER_DAY: i64 = 24 * 3600;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindowError {
    #[error("Time window [{start}, {end}] has a negative bound")]
    Negative { start: i64, end: i64 },

    #[error("Time window starts at {start} after it ends at {end}")]
    StartAfterEnd { start: i64, end: i64 },

    #[error("Time window ends at {end}, beyond the 24h horizon")]
    BeyondHorizon { end: i64 },
}

/// Interval during which a stop must be visited, in seconds since local midnight.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// Window of the depot: routes leave at time 0.
    pub const DEPOT: TimeWindow = TimeWindow { start: 0, end: 0 };

    pub fn new(start: i64, end: i64) -> Result<Self, TimeWindowError> {
        if start < 0 || end < 0 {
            return Err(TimeWindowError::Negative { start, end });
        }

        if start > end {
            return Err(TimeWindowError::StartAfterEnd { start, end });
        }

        if end > SECONDS_PER_DAY {
            return Err(TimeWindowError::BeyondHorizon { end });
        }

        Ok(TimeWindow { start, end })
    }

    /// Window between two wall-clock times of the same day.
    pub fn from_civil(start: Time, end: Time) -> Result<Self, TimeWindowError> {
        TimeWindow::new(seconds_since_midnight(start), seconds_since_midnight(end))
    }

    /// The whole day.
    pub fn full_day() -> Self {
        TimeWindow {
            start: 0,
            end: SECONDS_PER_DAY,
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn contains(&self, time: i64) -> bool {
        time >= self.start && time <= self.end
    }
}

fn seconds_since_midnight(time: Time) -> i64 {
    i64::from(time.hour()) * 3600 + i64::from(time.minute()) * 60 + i64::from(time.second())
}
