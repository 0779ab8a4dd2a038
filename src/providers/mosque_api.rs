use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::RawPrayerTimes;
use crate::providers::{get_text, http_client, PrayerTimesProvider, ProviderError};

/// The mosque's JSON timetable endpoint.
pub struct MosqueApiProvider {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTimes {
    #[serde(default)]
    hijri_date: Option<String>,
    #[serde(default)]
    fajr: Option<String>,
    #[serde(default)]
    sunrise: Option<String>,
    #[serde(default, alias = "dhuhr")]
    zuhr: Option<String>,
    #[serde(default)]
    asr: Option<String>,
    #[serde(default)]
    maghrib: Option<String>,
    #[serde(default)]
    isha: Option<String>,
}

impl MosqueApiProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl PrayerTimesProvider for MosqueApiProvider {
    fn name(&self) -> &str {
        "mosque API"
    }

    fn fetch(&self, today: NaiveDate) -> Result<RawPrayerTimes, ProviderError> {
        let client = http_client()?;
        let body = get_text(&client, &self.url)?;
        parse_api_response(&body, today)
    }
}

/// Map the endpoint's JSON onto a raw timetable for `today`.
///
/// Absent fields become empty strings, which later resolve to "N/A".
pub fn parse_api_response(body: &str, today: NaiveDate) -> Result<RawPrayerTimes, ProviderError> {
    let api: ApiTimes =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let text = |field: Option<String>| field.map(|s| s.trim().to_string()).unwrap_or_default();
    let raw = RawPrayerTimes {
        date: today,
        hijri_date: api
            .hijri_date
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        fajr: text(api.fajr),
        sunrise: text(api.sunrise),
        zuhr: text(api.zuhr),
        asr: text(api.asr),
        maghrib: text(api.maghrib),
        isha: text(api.isha),
    };

    let any_time = [&raw.fajr, &raw.zuhr, &raw.asr, &raw.maghrib, &raw.isha]
        .iter()
        .any(|s| !s.is_empty());
    if !any_time {
        return Err(ProviderError::NoTimes);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn parses_the_endpoint_shape() {
        let body = r#"{
            "hijriDate": " 25 Ramadan 1447 ",
            "fajr": "05:12",
            "sunrise": "06:45",
            "zuhr": "12:30",
            "asr": "3:45 pm",
            "maghrib": "19:50",
            "isha": "21:10"
        }"#;
        let raw = parse_api_response(body, today()).unwrap();
        assert_eq!(raw.date, today());
        assert_eq!(raw.hijri_date.as_deref(), Some("25 Ramadan 1447"));
        assert_eq!(raw.zuhr, "12:30");
        assert_eq!(raw.asr, "3:45 pm");
    }

    #[test]
    fn accepts_dhuhr_spelling_and_missing_fields() {
        let body = r#"{"dhuhr": "1:05", "isha": "20:00"}"#;
        let raw = parse_api_response(body, today()).unwrap();
        assert_eq!(raw.zuhr, "1:05");
        assert_eq!(raw.fajr, "");
        assert_eq!(raw.hijri_date, None);
    }

    #[test]
    fn rejects_bodies_without_times() {
        assert!(matches!(
            parse_api_response(r#"{"hijriDate": "1 Shawwal"}"#, today()),
            Err(ProviderError::NoTimes)
        ));
        assert!(matches!(
            parse_api_response("<html>maintenance</html>", today()),
            Err(ProviderError::Parse(_))
        ));
    }
}
