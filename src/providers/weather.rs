use serde::Deserialize;

use crate::models::WeatherReport;
use crate::providers::{get_text, http_client, ProviderError};

/// Current conditions from an OpenWeatherMap-compatible endpoint.
pub struct WeatherProvider {
    base_url: String,
    api_key: String,
    city: String,
    location_label: String,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: Option<OwmWind>,
    #[serde(default)]
    rain: Option<OwmRain>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h", default)]
    one_hour: Option<f64>,
}

impl WeatherProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        city: impl Into<String>,
        location_label: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            city: city.into(),
            location_label: location_label.into(),
        }
    }

    fn url(&self) -> Result<reqwest::Url, ProviderError> {
        reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("q", self.city.as_str()),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ],
        )
        .map_err(|e| ProviderError::Parse(format!("weather URL: {}", e)))
    }

    pub fn fetch(&self) -> Result<WeatherReport, ProviderError> {
        let client = http_client()?;
        let body = get_text(&client, self.url()?.as_str())?;
        parse_openweather(&body, &self.location_label)
    }
}

/// Map an OpenWeatherMap "current weather" body onto a report.
///
/// Rain chance is estimated from the last hour's rainfall: 1 mm ≈ 20 %,
/// capped at 100. No rain block means 0.
pub fn parse_openweather(body: &str, location_label: &str) -> Result<WeatherReport, ProviderError> {
    let owm: OwmResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let condition = owm
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("no weather condition".to_string()))?;

    let rain_mm = owm.rain.and_then(|r| r.one_hour).unwrap_or(0.0);
    let rain_chance = (rain_mm * 20.0).round().clamp(0.0, 100.0) as u8;
    let location = if location_label.is_empty() {
        owm.name.unwrap_or_default()
    } else {
        location_label.to_string()
    };

    Ok(WeatherReport {
        temperature: owm.main.temp.round() as i32,
        feels_like: owm.main.feels_like.round() as i32,
        condition: condition.main,
        icon: condition.icon,
        rain_chance,
        humidity: owm.main.humidity.round().clamp(0.0, 100.0) as u8,
        wind: owm.wind.map(|w| w.speed.round() as i32).unwrap_or(0),
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAINY: &str = r#"{
        "weather": [{"id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d"}],
        "main": {"temp": 11.6, "feels_like": 9.4, "humidity": 87},
        "wind": {"speed": 5.7},
        "rain": {"1h": 2.3},
        "name": "Birmingham"
    }"#;

    #[test]
    fn parses_current_conditions() {
        let report = parse_openweather(RAINY, "Birmingham, UK").unwrap();
        assert_eq!(report.temperature, 12);
        assert_eq!(report.feels_like, 9);
        assert_eq!(report.condition, "Rain");
        assert_eq!(report.icon, "10d");
        assert_eq!(report.rain_chance, 46);
        assert_eq!(report.humidity, 87);
        assert_eq!(report.wind, 6);
        assert_eq!(report.location, "Birmingham, UK");
    }

    #[test]
    fn city_is_query_encoded() {
        let provider = WeatherProvider::new(
            "https://api.openweathermap.org/data/2.5/weather",
            "k3y",
            "Birmingham,uk",
            "",
        );
        let url = provider.url().unwrap();
        assert_eq!(url.path(), "/data/2.5/weather");
        assert!(url.query().unwrap().contains("units=metric"));
        assert!(url.query().unwrap().contains("appid=k3y"));
    }

    #[test]
    fn heavy_rain_caps_at_one_hundred() {
        let body = RAINY.replace("2.3", "9.0");
        assert_eq!(parse_openweather(&body, "").unwrap().rain_chance, 100);
    }

    #[test]
    fn dry_weather_and_city_name_fallback() {
        let body = r#"{
            "weather": [{"main": "Clear", "icon": "01n"}],
            "main": {"temp": -0.4, "feels_like": -3.2, "humidity": 60},
            "name": "Leeds"
        }"#;
        let report = parse_openweather(body, "").unwrap();
        assert_eq!(report.rain_chance, 0);
        assert_eq!(report.temperature, 0);
        assert_eq!(report.wind, 0);
        assert_eq!(report.location, "Leeds");
    }

    #[test]
    fn malformed_bodies_are_errors() {
        assert!(parse_openweather(r#"{"cod": 401, "message": "Invalid API key"}"#, "").is_err());
        assert!(parse_openweather(
            r#"{"weather": [], "main": {"temp": 1, "feels_like": 1, "humidity": 1}}"#,
            ""
        )
        .is_err());
    }
}
