//! Upstream data sources: the mosque's own API, its web page, and the weather.
//!
//! Every fetch is blocking and runs on the background fetch thread. Failures
//! are reported as [`ProviderError`] to the caller, which logs them and treats
//! them as "no data".

pub mod mosque_api;
pub mod scrape;
pub mod weather;

use chrono::NaiveDate;
use std::time::Duration;

use crate::models::RawPrayerTimes;

pub use mosque_api::MosqueApiProvider;
pub use scrape::ScrapeProvider;
pub use weather::WeatherProvider;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error("no prayer times found")]
    NoTimes,
}

/// A source of today's raw mosque timetable.
pub trait PrayerTimesProvider: Send + Sync {
    fn name(&self) -> &str;
    fn fetch(&self, today: NaiveDate) -> Result<RawPrayerTimes, ProviderError>;
}

pub fn http_client() -> Result<reqwest::blocking::Client, ProviderError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("minaret/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()?;
    Ok(client)
}

/// GET `url` and return the body, treating non-2xx as an error.
pub(crate) fn get_text(client: &reqwest::blocking::Client, url: &str) -> Result<String, ProviderError> {
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status));
    }
    Ok(response.text()?)
}

/// Ask each provider in order and return the first timetable. `None` when
/// every provider failed.
pub fn fetch_with_fallback(
    providers: &[Box<dyn PrayerTimesProvider>],
    today: NaiveDate,
) -> Option<RawPrayerTimes> {
    for provider in providers {
        match provider.fetch(today) {
            Ok(raw) => {
                log::info!("Prayer times loaded from {}", provider.name());
                return Some(raw);
            }
            Err(e) => log::warn!("{} failed: {}", provider.name(), e),
        }
    }
    None
}
