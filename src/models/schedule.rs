use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::Prayer;

/// A wall-clock time of day on the 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// "5:12 AM", "3:45 PM"
    pub fn format_12h(&self) -> String {
        let meridiem = if self.hour >= 12 { "PM" } else { "AM" };
        let hour12 = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", hour12, self.minute, meridiem)
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Unprocessed timetable exactly as an upstream provider reported it.
///
/// Replaced wholesale by the next successful fetch, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPrayerTimes {
    pub date: NaiveDate,
    pub hijri_date: Option<String>,
    pub fajr: String,
    pub sunrise: String,
    pub zuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl RawPrayerTimes {
    pub fn text_for(&self, prayer: Prayer) -> &str {
        match prayer {
            Prayer::Fajr => &self.fajr,
            Prayer::Sunrise => &self.sunrise,
            Prayer::Dhuhr => &self.zuhr,
            Prayer::Asr => &self.asr,
            Prayer::Maghrib => &self.maghrib,
            Prayer::Isha => &self.isha,
        }
    }
}

/// One row of a [`PrayerSchedule`]. `time` is `None` when the provider text
/// could not be understood; such rows are displayed as "N/A" but never take
/// part in current/next resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerEntry {
    pub prayer: Prayer,
    pub time: Option<ClockTime>,
    pub source_text: String,
}

impl PrayerEntry {
    pub fn minutes(&self) -> Option<u32> {
        self.time.map(|t| t.minutes_since_midnight())
    }
}

/// Today's six entries in canonical order. Rebuilt in full from
/// [`RawPrayerTimes`], never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerSchedule {
    date: NaiveDate,
    hijri_date: Option<String>,
    entries: Vec<PrayerEntry>,
}

impl PrayerSchedule {
    pub(crate) fn new(
        date: NaiveDate,
        hijri_date: Option<String>,
        entries: Vec<PrayerEntry>,
    ) -> Self {
        Self {
            date,
            hijri_date,
            entries,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hijri_date(&self) -> Option<&str> {
        self.hijri_date.as_deref()
    }

    pub fn entries(&self) -> &[PrayerEntry] {
        &self.entries
    }

    pub fn entry(&self, prayer: Prayer) -> Option<&PrayerEntry> {
        self.entries.iter().find(|e| e.prayer == prayer)
    }

    /// Entries with a usable time, in schedule order.
    pub fn timed(&self) -> impl Iterator<Item = (Prayer, ClockTime)> + '_ {
        self.entries
            .iter()
            .filter_map(|e| e.time.map(|t| (e.prayer, t)))
    }

    pub fn has_times(&self) -> bool {
        self.timed().next().is_some()
    }
}

/// Which day a resolved prayer belongs to, relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayTag {
    Today,
    Yesterday,
    Tomorrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrayer {
    pub prayer: Prayer,
    pub time: ClockTime,
    pub day: DayTag,
}

impl ResolvedPrayer {
    pub fn today(prayer: Prayer, time: ClockTime) -> Self {
        Self {
            prayer,
            time,
            day: DayTag::Today,
        }
    }

    /// "Isha (Yesterday)", "Fajr (Tomorrow)", "Asr"
    pub fn label(&self) -> String {
        match self.day {
            DayTag::Today => self.prayer.display_name().to_string(),
            DayTag::Yesterday => format!("{} (Yesterday)", self.prayer.display_name()),
            DayTag::Tomorrow => format!("{} (Tomorrow)", self.prayer.display_name()),
        }
    }
}

/// The prayer window we are in, and the one that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentNext {
    pub current: ResolvedPrayer,
    pub next: ResolvedPrayer,
}
