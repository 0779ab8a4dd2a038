use chrono::{NaiveTime, Timelike};

use crate::models::{
    CurrentNext, DayTag, Prayer, PrayerEntry, PrayerSchedule, RawPrayerTimes, ResolvedPrayer,
};
use crate::prayer_times::normalize::normalize;

/// Normalize every field of `raw` under its own prayer identity.
pub fn build_schedule(raw: &RawPrayerTimes) -> PrayerSchedule {
    let entries = Prayer::ALL
        .iter()
        .map(|&prayer| {
            let text = raw.text_for(prayer);
            let time = match normalize(text, prayer) {
                Ok(t) => Some(t),
                Err(e) => {
                    log::debug!("{}: {}", prayer, e);
                    None
                }
            };
            PrayerEntry {
                prayer,
                time,
                source_text: text.to_string(),
            }
        })
        .collect();

    PrayerSchedule::new(raw.date, raw.hijri_date.clone(), entries)
}

/// Which prayer window `now` falls in and which one comes next.
///
/// Before the first timed entry the current window is yesterday's last
/// prayer; at or after the last timed entry the next one is tomorrow's first.
/// Returns `None` when the schedule has no usable times.
pub fn resolve_current_next(schedule: &PrayerSchedule, now: NaiveTime) -> Option<CurrentNext> {
    let timed: Vec<_> = schedule.timed().collect();
    let (first_prayer, first_time) = *timed.first()?;
    let (last_prayer, last_time) = *timed.last()?;
    let now_minutes = now.hour() * 60 + now.minute();

    if now_minutes < first_time.minutes_since_midnight() {
        return Some(CurrentNext {
            current: ResolvedPrayer {
                prayer: last_prayer,
                time: last_time,
                day: DayTag::Yesterday,
            },
            next: ResolvedPrayer::today(first_prayer, first_time),
        });
    }

    if now_minutes >= last_time.minutes_since_midnight() {
        return Some(CurrentNext {
            current: ResolvedPrayer::today(last_prayer, last_time),
            next: ResolvedPrayer {
                prayer: first_prayer,
                time: first_time,
                day: DayTag::Tomorrow,
            },
        });
    }

    let found = timed.windows(2).find_map(|pair| {
        let (cur_prayer, cur_time) = pair[0];
        let (next_prayer, next_time) = pair[1];
        let in_window = cur_time.minutes_since_midnight() <= now_minutes
            && now_minutes < next_time.minutes_since_midnight();
        in_window.then(|| CurrentNext {
            current: ResolvedPrayer::today(cur_prayer, cur_time),
            next: ResolvedPrayer::today(next_prayer, next_time),
        })
    });

    if found.is_none() {
        log::warn!("Timetable for {} is not in chronological order", schedule.date());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer_times::fixtures::sample_raw;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn builds_six_entries_in_canonical_order() {
        let schedule = build_schedule(&sample_raw());
        let prayers: Vec<Prayer> = schedule.entries().iter().map(|e| e.prayer).collect();
        assert_eq!(prayers, Prayer::ALL.to_vec());
        let minutes: Vec<u32> = schedule
            .entries()
            .iter()
            .map(|e| e.minutes().unwrap())
            .collect();
        assert_eq!(minutes, vec![312, 405, 750, 945, 1190, 1270]);
        assert_eq!(schedule.hijri_date(), Some("25 Ramadan 1447"));
    }

    #[test]
    fn unparsable_entries_are_kept_but_not_timed() {
        let mut raw = sample_raw();
        raw.sunrise = "N/A".to_string();
        let schedule = build_schedule(&raw);
        assert_eq!(schedule.entries().len(), 6);
        let sunrise = schedule.entry(Prayer::Sunrise).unwrap();
        assert_eq!(sunrise.time, None);
        assert_eq!(sunrise.source_text, "N/A");
        assert_eq!(schedule.timed().count(), 5);
    }

    #[test]
    fn afternoon_scenario() {
        let schedule = build_schedule(&sample_raw());
        let cn = resolve_current_next(&schedule, at(14, 0)).unwrap();
        assert_eq!(cn.current.prayer, Prayer::Dhuhr);
        assert_eq!(cn.current.time.minutes_since_midnight(), 750);
        assert_eq!(cn.next.prayer, Prayer::Asr);
        assert_eq!(cn.next.time.minutes_since_midnight(), 945);
        assert_eq!(cn.next.day, DayTag::Today);
    }

    #[test]
    fn each_prayer_is_current_at_its_own_start() {
        let schedule = build_schedule(&sample_raw());
        let timed: Vec<_> = schedule.timed().collect();
        for (i, (prayer, time)) in timed.iter().enumerate() {
            let cn = resolve_current_next(&schedule, time.to_naive_time()).unwrap();
            assert_eq!(cn.current.prayer, *prayer);
            assert_eq!(cn.current.day, DayTag::Today);
            match timed.get(i + 1) {
                Some((following, _)) => {
                    assert_eq!(cn.next.prayer, *following);
                    assert_eq!(cn.next.day, DayTag::Today);
                }
                None => {
                    assert_eq!(cn.next.prayer, Prayer::Fajr);
                    assert_eq!(cn.next.day, DayTag::Tomorrow);
                }
            }
        }
    }

    #[test]
    fn one_minute_before_fajr_is_still_yesterdays_isha() {
        let schedule = build_schedule(&sample_raw());
        let cn = resolve_current_next(&schedule, at(5, 11)).unwrap();
        assert_eq!(cn.current.prayer, Prayer::Isha);
        assert_eq!(cn.current.day, DayTag::Yesterday);
        assert_eq!(cn.current.label(), "Isha (Yesterday)");
        assert_eq!(cn.next.prayer, Prayer::Fajr);
        assert_eq!(cn.next.day, DayTag::Today);
    }

    #[test]
    fn after_isha_next_is_tomorrows_fajr() {
        let schedule = build_schedule(&sample_raw());
        for now in [at(21, 10), at(23, 59)] {
            let cn = resolve_current_next(&schedule, now).unwrap();
            assert_eq!(cn.current.prayer, Prayer::Isha);
            assert_eq!(cn.current.day, DayTag::Today);
            assert_eq!(cn.next.label(), "Fajr (Tomorrow)");
        }
    }

    #[test]
    fn invalid_entries_are_skipped_when_resolving() {
        let mut raw = sample_raw();
        raw.asr = "N/A".to_string();
        let schedule = build_schedule(&raw);
        let cn = resolve_current_next(&schedule, at(16, 0)).unwrap();
        assert_eq!(cn.current.prayer, Prayer::Dhuhr);
        assert_eq!(cn.next.prayer, Prayer::Maghrib);
    }

    #[test]
    fn no_times_means_no_schedule() {
        let raw = RawPrayerTimes {
            fajr: "N/A".into(),
            sunrise: "N/A".into(),
            zuhr: "".into(),
            asr: "--".into(),
            maghrib: "N/A".into(),
            isha: "N/A".into(),
            ..sample_raw()
        };
        let schedule = build_schedule(&raw);
        assert!(!schedule.has_times());
        assert_eq!(resolve_current_next(&schedule, at(12, 0)), None);
    }
}
