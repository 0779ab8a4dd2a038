//! What the board currently knows: the schedule, the weather, and when each
//! was last fetched. Fetch outcomes are applied here, on the UI thread,
//! together with the cache fallback.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::db::repository::{CacheRepo, Feed, FetchLog, WeatherRepo};
use crate::models::{PrayerSchedule, WeatherReport};
use crate::prayer_times::build_schedule;
use crate::refresh::fetcher::{FetchKind, FetchOutcome};
use crate::refresh::policy::RefreshPolicy;

pub const LOAD_ERROR: &str =
    "Could not load prayer times. Please check your connection and try again.";

#[derive(Debug, Default)]
pub struct FeedState {
    schedule: Option<PrayerSchedule>,
    weather: Option<WeatherReport>,
    error: Option<String>,
    last_prayer_fetch: Option<NaiveDateTime>,
    last_weather_fetch: Option<NaiveDateTime>,
}

impl FeedState {
    /// Start from whatever was cached. Only a timetable for `today` is used
    /// up front; older ones wait until a fetch has failed. Unreadable cache
    /// entries are logged and treated as missing.
    pub fn load(conn: &Connection, today: NaiveDate) -> Self {
        let schedule = read_or_none("cached prayer times", CacheRepo::get_for_date(conn, today))
            .map(|raw| build_schedule(&raw));
        let weather = read_or_none("cached weather", WeatherRepo::get(conn));
        // without today's timetable on disk a recent fetch time means nothing
        let last_prayer_fetch = match schedule {
            Some(_) => read_or_none(
                "prayer fetch time",
                FetchLog::last_success(conn, Feed::PrayerTimes),
            ),
            None => None,
        };
        let last_weather_fetch =
            read_or_none("weather fetch time", FetchLog::last_success(conn, Feed::Weather));

        Self {
            schedule,
            weather,
            error: None,
            last_prayer_fetch,
            last_weather_fetch,
        }
    }

    pub fn schedule(&self) -> Option<&PrayerSchedule> {
        self.schedule.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherReport> {
        self.weather.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_updated(&self) -> Option<NaiveDateTime> {
        self.last_prayer_fetch
    }

    /// Which feeds the policy wants refreshed at `now`.
    pub fn due(&self, policy: &RefreshPolicy, now: NaiveDateTime) -> Vec<FetchKind> {
        let mut kinds = Vec::new();
        if policy.prayer_due(self.last_prayer_fetch, now) {
            kinds.push(FetchKind::PrayerTimes);
        }
        if policy.weather_due(self.last_weather_fetch, now) {
            kinds.push(FetchKind::Weather);
        }
        kinds
    }

    /// Fold a fetch result in. Returns `true` when the schedule was replaced.
    pub fn apply(
        &mut self,
        conn: &Connection,
        outcome: FetchOutcome,
        now: NaiveDateTime,
        cache_days: u32,
    ) -> bool {
        match outcome {
            FetchOutcome::PrayerTimes(Some(raw)) => {
                persist("prayer times", CacheRepo::store(conn, &raw));
                persist(
                    "fetch time",
                    FetchLog::record_success(conn, Feed::PrayerTimes, now),
                );
                persist(
                    "cache pruning",
                    CacheRepo::prune(conn, cache_days.max(1)).map(|_| ()),
                );
                self.schedule = Some(build_schedule(&raw));
                self.last_prayer_fetch = Some(now);
                self.error = None;
                true
            }
            FetchOutcome::PrayerTimes(None) => {
                self.error = Some(LOAD_ERROR.to_string());
                if self.schedule.is_some() {
                    return false;
                }
                match CacheRepo::get_latest(conn) {
                    Ok(Some(raw)) => {
                        log::info!("Using cached prayer times from {}", raw.date);
                        self.schedule = Some(build_schedule(&raw));
                        true
                    }
                    Ok(None) => false,
                    Err(e) => {
                        log::warn!("Could not read cached prayer times: {:#}", e);
                        false
                    }
                }
            }
            FetchOutcome::Weather(Some(report)) => {
                persist("weather", WeatherRepo::store(conn, &report));
                persist(
                    "fetch time",
                    FetchLog::record_success(conn, Feed::Weather, now),
                );
                self.weather = Some(report);
                self.last_weather_fetch = Some(now);
                false
            }
            FetchOutcome::Weather(None) => {
                self.weather = None;
                false
            }
        }
    }
}

fn read_or_none<T>(what: &str, result: Result<Option<T>>) -> Option<T> {
    result.unwrap_or_else(|e| {
        log::warn!("Ignoring {}: {:#}", what, e);
        None
    })
}

fn persist(what: &str, result: Result<()>) {
    if let Err(e) = result {
        log::warn!("Could not save {}: {:#}", what, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::repository::MetaRepo;
    use crate::models::Prayer;
    use crate::prayer_times::fixtures::sample_raw;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn report() -> WeatherReport {
        WeatherReport {
            temperature: 9,
            feels_like: 7,
            condition: "Clouds".to_string(),
            icon: "04d".to_string(),
            rain_chance: 10,
            humidity: 80,
            wind: 4,
            location: "Birmingham, UK".to_string(),
        }
    }

    #[test]
    fn fresh_install_wants_everything() {
        let conn = open();
        let feed = FeedState::load(&conn, at(14, 9, 0).date());
        assert!(feed.schedule().is_none());
        assert_eq!(
            feed.due(&RefreshPolicy::default(), at(14, 9, 0)),
            vec![FetchKind::PrayerTimes, FetchKind::Weather]
        );
    }

    #[test]
    fn successful_fetch_replaces_schedule_and_is_cached() {
        let conn = open();
        let mut feed = FeedState::load(&conn, at(14, 9, 0).date());
        let changed = feed.apply(&conn, FetchOutcome::PrayerTimes(Some(sample_raw())), at(14, 9, 0), 14);
        assert!(changed);
        assert!(feed.error().is_none());
        assert_eq!(feed.last_updated(), Some(at(14, 9, 0)));
        assert!(feed.schedule().unwrap().has_times());

        // a restart the same day picks up the cache and does not refetch
        let reloaded = FeedState::load(&conn, at(14, 9, 5).date());
        assert!(reloaded.schedule().is_some());
        assert!(!reloaded
            .due(&RefreshPolicy::default(), at(14, 9, 5))
            .contains(&FetchKind::PrayerTimes));
    }

    #[test]
    fn unreadable_cache_entries_are_treated_as_missing() {
        let conn = open();
        CacheRepo::store(&conn, &sample_raw()).unwrap();
        MetaRepo::set(&conn, "prayer_times_last_fetch", "garbage").unwrap();
        MetaRepo::set(&conn, "weather_cache", "{not json").unwrap();

        let feed = FeedState::load(&conn, at(14, 9, 0).date());
        assert!(feed.schedule().is_some());
        assert!(feed.weather().is_none());
        assert_eq!(feed.last_updated(), None);
        assert!(feed
            .due(&RefreshPolicy::default(), at(14, 9, 0))
            .contains(&FetchKind::PrayerTimes));
    }

    #[test]
    fn failure_falls_back_to_the_latest_cache_with_a_banner() {
        let conn = open();
        CacheRepo::store(&conn, &sample_raw()).unwrap();
        // next day, nothing for today yet
        let mut feed = FeedState::load(&conn, at(15, 6, 0).date());
        assert!(feed.schedule().is_none());

        assert!(feed.apply(&conn, FetchOutcome::PrayerTimes(None), at(15, 6, 0), 14));
        assert_eq!(feed.error(), Some(LOAD_ERROR));
        let schedule = feed.schedule().unwrap();
        assert_eq!(
            schedule.entry(Prayer::Asr).and_then(|e| e.time).map(|t| t.to_string()),
            Some("15:45".to_string())
        );
        // still due, so the next refresh tick tries again
        assert!(feed
            .due(&RefreshPolicy::default(), at(15, 6, 1))
            .contains(&FetchKind::PrayerTimes));
    }

    #[test]
    fn failure_keeps_a_schedule_already_shown() {
        let conn = open();
        let mut feed = FeedState::default();
        feed.apply(&conn, FetchOutcome::PrayerTimes(Some(sample_raw())), at(14, 9, 0), 14);
        assert!(!feed.apply(&conn, FetchOutcome::PrayerTimes(None), at(14, 10, 0), 14));
        assert!(feed.schedule().is_some());
        assert!(feed.error().is_some());

        // recovery clears the banner
        feed.apply(&conn, FetchOutcome::PrayerTimes(Some(sample_raw())), at(14, 11, 0), 14);
        assert!(feed.error().is_none());
    }

    #[test]
    fn nothing_cached_and_nothing_fetched() {
        let conn = open();
        let mut feed = FeedState::default();
        assert!(!feed.apply(&conn, FetchOutcome::PrayerTimes(None), at(14, 9, 0), 14));
        assert!(feed.schedule().is_none());
        assert!(feed.error().is_some());
    }

    #[test]
    fn weather_is_cached_and_cleared_when_unavailable() {
        let conn = open();
        let mut feed = FeedState::default();
        feed.apply(&conn, FetchOutcome::Weather(Some(report())), at(14, 9, 0), 14);
        assert_eq!(feed.weather().map(|w| w.temperature), Some(9));
        assert_eq!(
            feed.due(&RefreshPolicy::default(), at(14, 9, 20)),
            vec![FetchKind::PrayerTimes]
        );

        let reloaded = FeedState::load(&conn, at(14, 9, 1).date());
        assert_eq!(reloaded.weather(), Some(&report()));

        feed.apply(&conn, FetchOutcome::Weather(None), at(14, 9, 40), 14);
        assert!(feed.weather().is_none());
    }
}
