use chrono::{NaiveTime, Timelike};

use crate::models::ResolvedPrayer;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Time left until the next prayer, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Countdown {
    pub fn from_seconds(total: u32) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    #[cfg(test)]
    pub fn total_seconds(&self) -> u32 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hours > 0 {
            write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
        } else {
            write!(f, "{}m {}s", self.minutes, self.seconds)
        }
    }
}

/// Remaining time from `now` to `next`, wrapping past midnight when `next`
/// is already behind us. Sub-second precision in `now` is floored away.
pub fn time_until(next: Option<&ResolvedPrayer>, now: NaiveTime) -> Option<Countdown> {
    let next = next?;
    let target = i64::from(next.time.minutes_since_midnight()) * 60;
    let elapsed = i64::from(now.num_seconds_from_midnight());

    let mut remaining = target - elapsed;
    if remaining < 0 {
        remaining += SECONDS_PER_DAY;
    }
    Some(Countdown::from_seconds(remaining as u32))
}
