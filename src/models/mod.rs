pub mod prayer;
pub mod schedule;
pub mod weather;

pub use prayer::Prayer;
pub use schedule::{
    ClockTime, CurrentNext, DayTag, PrayerEntry, PrayerSchedule, RawPrayerTimes, ResolvedPrayer,
};
pub use weather::WeatherReport;
