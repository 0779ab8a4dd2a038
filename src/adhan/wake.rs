//! One wake per prayer for the rest of the day.
//!
//! The queue is the only thing that triggers an automatic adhan. It is rebuilt
//! whenever the schedule changes and at each date rollover, so at most one
//! pending wake exists per prayer.

use chrono::{Duration, NaiveDateTime};

use crate::models::{Prayer, PrayerSchedule};

/// How late a wake may still fire after its scheduled instant.
pub const WAKE_GRACE_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    pub prayer: Prayer,
    pub at: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct WakeQueue {
    pending: Vec<Wake>,
}

impl WakeQueue {
    /// Replace every pending wake with today's remaining prayer instants.
    ///
    /// Times are applied to `now`'s calendar date, so a schedule loaded from
    /// an older cache still rings at today's clock times.
    pub fn rearm(&mut self, schedule: &PrayerSchedule, now: NaiveDateTime) {
        let grace = Duration::seconds(WAKE_GRACE_SECS);
        let today = now.date();
        self.pending = schedule
            .timed()
            .map(|(prayer, time)| Wake {
                prayer,
                at: today.and_time(time.to_naive_time()),
            })
            .filter(|wake| wake.at + grace >= now)
            .collect();
        self.pending.sort_by_key(|wake| wake.at);
        log::debug!(
            "Armed {} adhan wake(s) for {}",
            self.pending.len(),
            today.format("%Y-%m-%d")
        );
    }

    /// Remove and return the wakes whose instant has arrived.
    ///
    /// Wakes missed by more than the grace window (e.g. the machine was
    /// asleep) are dropped without firing.
    pub fn due(&mut self, now: NaiveDateTime) -> Vec<Prayer> {
        let grace = Duration::seconds(WAKE_GRACE_SECS);
        let (ready, pending): (Vec<Wake>, Vec<Wake>) =
            self.pending.drain(..).partition(|wake| wake.at <= now);
        self.pending = pending;

        ready
            .into_iter()
            .filter_map(|wake| {
                if now - wake.at <= grace {
                    Some(wake.prayer)
                } else {
                    log::info!(
                        "Skipping adhan for {}: missed by {}s",
                        wake.prayer,
                        (now - wake.at).num_seconds()
                    );
                    None
                }
            })
            .collect()
    }

    /// Schedule another attempt for `prayer`, replacing any pending wake.
    pub fn retry_at(&mut self, prayer: Prayer, at: NaiveDateTime) {
        self.cancel(prayer);
        self.pending.push(Wake { prayer, at });
        self.pending.sort_by_key(|wake| wake.at);
    }

    pub fn cancel(&mut self, prayer: Prayer) {
        self.pending.retain(|wake| wake.prayer != prayer);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub fn next_wake(&self) -> Option<&Wake> {
        self.pending.first()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer_times::build_schedule;
    use crate::prayer_times::fixtures::sample_raw;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn arms_only_the_rest_of_the_day() {
        let schedule = build_schedule(&sample_raw());
        let mut queue = WakeQueue::default();
        queue.rearm(&schedule, at(14, 0, 0));
        assert_eq!(queue.len(), 3);
        let next = queue.next_wake().unwrap();
        assert_eq!(next.prayer, Prayer::Asr);
        assert_eq!(next.at, at(15, 45, 0));
    }

    #[test]
    fn rearming_replaces_rather_than_duplicates() {
        let schedule = build_schedule(&sample_raw());
        let mut queue = WakeQueue::default();
        queue.rearm(&schedule, at(4, 0, 0));
        queue.rearm(&schedule, at(4, 0, 0));
        assert_eq!(queue.len(), 6);
    }

    #[test]
    fn fires_once_when_the_instant_arrives() {
        let schedule = build_schedule(&sample_raw());
        let mut queue = WakeQueue::default();
        queue.rearm(&schedule, at(19, 0, 0));

        assert!(queue.due(at(19, 49, 59)).is_empty());
        assert_eq!(queue.due(at(19, 50, 0)), vec![Prayer::Maghrib]);
        assert!(queue.due(at(19, 50, 1)).is_empty());
        assert_eq!(queue.next_wake().map(|w| w.prayer), Some(Prayer::Isha));
    }

    #[test]
    fn a_just_passed_prayer_still_fires_within_grace() {
        let schedule = build_schedule(&sample_raw());
        let mut queue = WakeQueue::default();
        queue.rearm(&schedule, at(12, 30, 30));
        assert_eq!(queue.due(at(12, 30, 31)), vec![Prayer::Dhuhr]);
    }

    #[test]
    fn long_missed_wakes_are_dropped() {
        let schedule = build_schedule(&sample_raw());
        let mut queue = WakeQueue::default();
        queue.rearm(&schedule, at(15, 0, 0));
        // woke from suspend well after Asr
        assert!(queue.due(at(16, 30, 0)).is_empty());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn retry_fires_again_later() {
        let schedule = build_schedule(&sample_raw());
        let mut queue = WakeQueue::default();
        queue.rearm(&schedule, at(5, 0, 0));
        assert_eq!(queue.due(at(5, 12, 0)), vec![Prayer::Fajr]);
        queue.retry_at(Prayer::Fajr, at(5, 13, 0));
        assert_eq!(queue.next_wake().map(|w| w.prayer), Some(Prayer::Fajr));
        assert!(queue.due(at(5, 12, 30)).is_empty());
        assert_eq!(queue.due(at(5, 13, 1)), vec![Prayer::Fajr]);
    }

    #[test]
    fn cancel_and_clear() {
        let schedule = build_schedule(&sample_raw());
        let mut queue = WakeQueue::default();
        queue.rearm(&schedule, at(0, 0, 0));
        queue.cancel(Prayer::Sunrise);
        assert_eq!(queue.len(), 5);
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.due(at(23, 59, 0)).is_empty());
    }
}
