use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_mosque_name() -> String {
    "Birmingham Central Mosque".to_string()
}
fn default_api_url() -> Option<String> {
    Some("https://centralmosque.org.uk/api/prayer-times".to_string())
}
fn default_page_url() -> Option<String> {
    Some("https://centralmosque.org.uk/".to_string())
}
fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}
fn default_city() -> String {
    "Birmingham,uk".to_string()
}
fn default_location_label() -> String {
    "Birmingham, UK".to_string()
}
fn default_player_command() -> String {
    "mpv".to_string()
}
fn default_player_args() -> Vec<String> {
    vec!["--no-video".to_string(), "--really-quiet".to_string()]
}
fn default_prayer_minutes() -> u32 {
    60
}
fn default_weather_minutes() -> u32 {
    30
}
fn default_cache_days() -> u32 {
    14
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosqueConfig {
    #[serde(default = "default_mosque_name")]
    pub name: String,
    /// JSON timetable endpoint, tried first.
    #[serde(default = "default_api_url")]
    pub api_url: Option<String>,
    /// Public page scraped when the API fails.
    #[serde(default = "default_page_url")]
    pub page_url: Option<String>,
}

impl Default for MosqueConfig {
    fn default() -> Self {
        Self {
            name: default_mosque_name(),
            api_url: default_api_url(),
            page_url: default_page_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// OpenWeatherMap key. Without one the weather card stays empty.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_weather_url")]
    pub url: String,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_location_label")]
    pub location_label: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            url: default_weather_url(),
            city: default_city(),
            location_label: default_location_label(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdhanConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Audio file; defaults to `adhan.mp3` in the data directory.
    #[serde(default)]
    pub audio_file: Option<PathBuf>,
    #[serde(default = "default_player_command")]
    pub player_command: String,
    #[serde(default = "default_player_args")]
    pub player_args: Vec<String>,
}

impl Default for AdhanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            audio_file: None,
            player_command: default_player_command(),
            player_args: default_player_args(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Prayer times older than this are refetched.
    #[serde(default = "default_prayer_minutes")]
    pub prayer_minutes: u32,
    #[serde(default = "default_weather_minutes")]
    pub weather_minutes: u32,
    /// Cached timetables kept in the database.
    #[serde(default = "default_cache_days")]
    pub cache_days: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            prayer_minutes: default_prayer_minutes(),
            weather_minutes: default_weather_minutes(),
            cache_days: default_cache_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show prayer times as `h:mm AM/PM` instead of `HH:MM`.
    #[serde(default = "default_true")]
    pub twelve_hour: bool,
    /// Days to add/subtract from the computed Hijri date for local moon sighting.
    /// 0 = default (Saudi), -1 = one day behind, +1 = one day ahead
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            twelve_hour: true,
            hijri_offset: default_hijri_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub mosque: MosqueConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub adhan: AdhanConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "minaret")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("minaret.db"))
    }

    /// The adhan recording to play.
    pub fn audio_path(&self) -> Result<PathBuf> {
        match &self.adhan.audio_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("adhan.mp3")),
        }
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(&path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(path)
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.refresh.prayer_minutes, 60);
        assert_eq!(config.refresh.weather_minutes, 30);
        assert!(config.adhan.enabled);
        assert!(config.display.twelve_hour);
        assert_eq!(config.weather.api_key, None);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::parse(
            r#"
            [mosque]
            name = "East London Mosque"
            page_url = "https://example.org/times"

            [adhan]
            audio_file = "/srv/adhan/makkah.mp3"

            [display]
            hijri_offset = -1
            "#,
        )
        .unwrap();
        assert_eq!(config.mosque.name, "East London Mosque");
        assert_eq!(config.mosque.api_url, default_api_url());
        assert_eq!(config.adhan.player_command, "mpv");
        assert_eq!(
            config.audio_path().unwrap(),
            PathBuf::from("/srv/adhan/makkah.mp3")
        );
        assert_eq!(config.display.hijri_offset, -1);
        assert!(config.display.twelve_hour);
    }

    #[test]
    fn defaults_survive_a_toml_round_trip() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let config = AppConfig::parse(&text).unwrap();
        assert_eq!(config.mosque.page_url, default_page_url());
        assert_eq!(config.adhan.player_args, default_player_args());
    }

    #[test]
    fn invalid_toml_is_reported() {
        assert!(AppConfig::parse("[refresh]\nprayer_minutes = \"soon\"").is_err());
    }
}
