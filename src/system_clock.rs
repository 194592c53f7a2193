use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use kakeibo_core::Clock;

const SECONDS_PER_HOUR: i32 = 3600;

/// Real-time clock whose calendar day follows a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Falls back to UTC when `hours` is out of range.
    pub fn with_offset_hours(hours: i32) -> Self {
        let offset = hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_offset_hours(0)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        local_date(self.now(), self.offset)
    }
}

fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}
