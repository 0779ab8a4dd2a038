use serde::{Deserialize, Serialize};

/// Flat current-conditions record shown on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature: i32,
    pub feels_like: i32,
    pub condition: String,
    pub icon: String,
    /// 0..=100
    pub rain_chance: u8,
    /// 0..=100
    pub humidity: u8,
    pub wind: i32,
    pub location: String,
}

impl WeatherReport {
    /// Glyph for an OpenWeatherMap icon code such as "10d".
    pub fn glyph(&self) -> &'static str {
        match self.icon.get(..2).unwrap_or("") {
            "01" => "☀",
            "02" | "03" | "04" => "☁",
            "09" | "10" => "☂",
            "11" => "⚡",
            "13" => "❄",
            "50" => "≋",
            _ => "·",
        }
    }
}
