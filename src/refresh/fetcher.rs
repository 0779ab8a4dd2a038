//! Background fetch thread.
//!
//! Network calls are the only blocking work in the program. They run here so
//! the board keeps ticking while a fetch is outstanding; results come back to
//! the UI thread through the `deliver` callback and are applied there.

use chrono::NaiveDate;
use std::sync::mpsc;
use std::thread;

use crate::config::AppConfig;
use crate::models::{RawPrayerTimes, WeatherReport};
use crate::providers::{
    fetch_with_fallback, MosqueApiProvider, PrayerTimesProvider, ScrapeProvider, WeatherProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    PrayerTimes,
    Weather,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// `None` when every prayer provider failed.
    PrayerTimes(Option<RawPrayerTimes>),
    /// `None` when weather is unavailable or not configured.
    Weather(Option<WeatherReport>),
}

impl FetchOutcome {
    pub fn kind(&self) -> FetchKind {
        match self {
            FetchOutcome::PrayerTimes(_) => FetchKind::PrayerTimes,
            FetchOutcome::Weather(_) => FetchKind::Weather,
        }
    }
}

/// Every upstream the board reads from, in fallback order.
pub struct Sources {
    pub prayer: Vec<Box<dyn PrayerTimesProvider>>,
    pub weather: Option<WeatherProvider>,
}

impl Sources {
    pub fn from_config(config: &AppConfig) -> Self {
        let mut prayer: Vec<Box<dyn PrayerTimesProvider>> = Vec::new();
        if let Some(url) = &config.mosque.api_url {
            prayer.push(Box::new(MosqueApiProvider::new(url.clone())));
        }
        if let Some(url) = &config.mosque.page_url {
            prayer.push(Box::new(ScrapeProvider::new(url.clone())));
        }

        let weather = match (&config.weather.api_key, config.weather.enabled) {
            (Some(key), true) => Some(WeatherProvider::new(
                config.weather.url.clone(),
                key.clone(),
                config.weather.city.clone(),
                config.weather.location_label.clone(),
            )),
            _ => None,
        };

        Self { prayer, weather }
    }

    /// Run one fetch on the calling thread.
    pub fn fetch(&self, kind: FetchKind, today: NaiveDate) -> FetchOutcome {
        match kind {
            FetchKind::PrayerTimes => {
                FetchOutcome::PrayerTimes(fetch_with_fallback(&self.prayer, today))
            }
            FetchKind::Weather => FetchOutcome::Weather(self.weather.as_ref().and_then(|w| {
                w.fetch()
                    .map_err(|e| log::warn!("Weather unavailable: {}", e))
                    .ok()
            })),
        }
    }
}

/// Handle to the fetch thread. Requests for a kind already in flight are
/// dropped rather than queued.
pub struct Fetcher {
    tx: mpsc::Sender<(FetchKind, NaiveDate)>,
    prayer_in_flight: bool,
    weather_in_flight: bool,
}

impl Fetcher {
    /// `deliver` returns `false` once the receiving side is gone, which ends
    /// the thread.
    pub fn spawn<F>(sources: Sources, deliver: F) -> Self
    where
        F: Fn(FetchOutcome) -> bool + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<(FetchKind, NaiveDate)>();

        thread::spawn(move || {
            for (kind, today) in rx {
                log::debug!("Fetching {:?}", kind);
                let outcome = sources.fetch(kind, today);
                if !deliver(outcome) {
                    break;
                }
            }
        });

        Self {
            tx,
            prayer_in_flight: false,
            weather_in_flight: false,
        }
    }

    fn in_flight(&mut self, kind: FetchKind) -> &mut bool {
        match kind {
            FetchKind::PrayerTimes => &mut self.prayer_in_flight,
            FetchKind::Weather => &mut self.weather_in_flight,
        }
    }

    /// Returns `true` if a new fetch was started.
    pub fn request(&mut self, kind: FetchKind, today: NaiveDate) -> bool {
        if *self.in_flight(kind) {
            return false;
        }
        if self.tx.send((kind, today)).is_err() {
            log::error!("Fetch thread has stopped");
            return false;
        }
        *self.in_flight(kind) = true;
        true
    }

    /// Mark the fetch for `outcome`'s kind as finished.
    pub fn complete(&mut self, outcome: &FetchOutcome) {
        *self.in_flight(outcome.kind()) = false;
    }

    pub fn is_busy(&self) -> bool {
        self.prayer_in_flight || self.weather_in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer_times::fixtures::sample_raw;
    use crate::providers::ProviderError;
    use std::time::Duration;

    struct Canned;

    impl PrayerTimesProvider for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn fetch(&self, today: NaiveDate) -> Result<RawPrayerTimes, ProviderError> {
            let mut raw = sample_raw();
            raw.date = today;
            Ok(raw)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn results_arrive_through_the_callback() {
        let (tx, rx) = mpsc::channel();
        let sources = Sources {
            prayer: vec![Box::new(Canned)],
            weather: None,
        };
        let mut fetcher = Fetcher::spawn(sources, move |outcome| tx.send(outcome).is_ok());

        assert!(fetcher.request(FetchKind::PrayerTimes, today()));
        assert!(!fetcher.request(FetchKind::PrayerTimes, today()));
        assert!(fetcher.request(FetchKind::Weather, today()));
        assert!(fetcher.is_busy());

        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            fetcher.complete(&outcome);
            outcomes.push(outcome);
        }
        assert!(!fetcher.is_busy());
        assert!(outcomes.contains(&FetchOutcome::Weather(None)));
        let prayer = outcomes.iter().find_map(|o| match o {
            FetchOutcome::PrayerTimes(raw) => raw.clone(),
            FetchOutcome::Weather(_) => None,
        });
        assert_eq!(prayer.map(|raw| raw.date), Some(today()));

        assert!(fetcher.request(FetchKind::PrayerTimes, today()));
    }

    #[test]
    fn sources_follow_config() {
        let mut config = AppConfig::default();
        config.mosque.api_url = None;
        let sources = Sources::from_config(&config);
        assert_eq!(sources.prayer.len(), 1);
        assert_eq!(sources.prayer[0].name(), "mosque page");
        assert!(sources.weather.is_none());

        config.weather.api_key = Some("k3y".to_string());
        assert!(Sources::from_config(&config).weather.is_some());
        config.weather.enabled = false;
        assert!(Sources::from_config(&config).weather.is_none());
    }
}
