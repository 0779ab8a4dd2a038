use chrono::{Duration, NaiveDateTime, Timelike};

use crate::config::settings::RefreshConfig;

/// Cadence of the display tick (clock, countdown, adhan wakes).
pub const CLOCK_TICK: std::time::Duration = std::time::Duration::from_secs(1);

/// Cadence of the refresh check.
pub const REFRESH_TICK: std::time::Duration = std::time::Duration::from_secs(60);

/// Decides when upstream data is stale. Pure; the caller supplies the last
/// successful fetch instant and the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub prayer_max_age: Duration,
    pub weather_max_age: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            prayer_max_age: Duration::minutes(60),
            weather_max_age: Duration::minutes(30),
        }
    }
}

impl From<&RefreshConfig> for RefreshPolicy {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            prayer_max_age: Duration::minutes(i64::from(config.prayer_minutes.max(1))),
            weather_max_age: Duration::minutes(i64::from(config.weather_minutes.max(1))),
        }
    }
}

impl RefreshPolicy {
    /// Prayer times are refetched on the first run, at each date change, at
    /// the top of every hour, and once they are older than the max age.
    pub fn prayer_due(&self, last: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
        let Some(last) = last else {
            return true;
        };
        if last.date() != now.date() {
            return true;
        }
        if now.minute() == 0 && last < minute_start(now) {
            return true;
        }
        now - last > self.prayer_max_age
    }

    pub fn weather_due(&self, last: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
        match last {
            None => true,
            Some(last) => now - last > self.weather_max_age,
        }
    }
}

/// `now` with seconds and below cleared. The top-of-hour rule fires once,
/// not on every check during minute zero.
fn minute_start(now: NaiveDateTime) -> NaiveDateTime {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn first_run_fetches_everything() {
        let policy = RefreshPolicy::default();
        assert!(policy.prayer_due(None, at(14, 10, 0, 0)));
        assert!(policy.weather_due(None, at(14, 10, 0, 0)));
    }

    #[test]
    fn date_change_forces_prayer_refetch() {
        let policy = RefreshPolicy::default();
        assert!(policy.prayer_due(Some(at(14, 23, 59, 0)), at(15, 0, 0, 30)));
        assert!(policy.prayer_due(Some(at(14, 23, 58, 0)), at(15, 0, 1, 0)));
    }

    #[test]
    fn top_of_the_hour_fires_once() {
        let policy = RefreshPolicy::default();
        assert!(policy.prayer_due(Some(at(14, 9, 40, 0)), at(14, 10, 0, 3)));
        // the fetch made during minute zero satisfies the rest of that minute
        assert!(!policy.prayer_due(Some(at(14, 10, 0, 4)), at(14, 10, 0, 59)));
        assert!(!policy.prayer_due(Some(at(14, 10, 0, 4)), at(14, 10, 1, 0)));
    }

    #[test]
    fn prayer_staleness_is_strictly_more_than_an_hour() {
        let policy = RefreshPolicy::default();
        let last = at(14, 9, 30, 0);
        assert!(!policy.prayer_due(Some(last), at(14, 9, 59, 0)));
        assert!(!policy.prayer_due(Some(last), at(14, 10, 30, 0)));
        assert!(policy.prayer_due(Some(last), at(14, 10, 30, 1)));
    }

    #[test]
    fn weather_staleness() {
        let policy = RefreshPolicy::default();
        let last = at(14, 9, 0, 0);
        assert!(!policy.weather_due(Some(last), at(14, 9, 30, 0)));
        assert!(policy.weather_due(Some(last), at(14, 9, 31, 0)));
        // no date or hour rules for weather
        assert!(!policy.weather_due(Some(at(14, 23, 50, 0)), at(15, 0, 0, 0)));
    }

    #[test]
    fn intervals_come_from_config() {
        let config = RefreshConfig {
            prayer_minutes: 15,
            weather_minutes: 0,
            cache_days: 7,
        };
        let policy = RefreshPolicy::from(&config);
        assert_eq!(policy.prayer_max_age, Duration::minutes(15));
        assert_eq!(policy.weather_max_age, Duration::minutes(1));
    }
}
