use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The six daily events a mosque timetable publishes.
///
/// Providers spell the midday prayer either "Zuhr" or "Dhuhr"; both resolve to
/// [`Prayer::Dhuhr`] through [`Prayer::resolve`], and raw provider strings are
/// never compared directly anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// Canonical order, which is also chronological for well-formed timetables.
    pub const ALL: [Prayer; 6] = [
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prayer::Fajr => "fajr",
            Prayer::Sunrise => "sunrise",
            Prayer::Dhuhr => "dhuhr",
            Prayer::Asr => "asr",
            Prayer::Maghrib => "maghrib",
            Prayer::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    /// Prayers that always fall after midday.
    pub fn is_afternoon(&self) -> bool {
        matches!(
            self,
            Prayer::Dhuhr | Prayer::Asr | Prayer::Maghrib | Prayer::Isha
        )
    }

    /// Sunrise is not a prayer, so no adhan is called for it unless asked.
    pub fn adhan_enabled_by_default(&self) -> bool {
        !matches!(self, Prayer::Sunrise)
    }

    /// Alias resolution for provider and user supplied names.
    pub fn resolve(name: &str) -> Option<Prayer> {
        match name.trim().to_lowercase().as_str() {
            "fajr" => Some(Prayer::Fajr),
            "sunrise" | "shuruq" => Some(Prayer::Sunrise),
            "zuhr" | "dhuhr" | "dhuhur" | "zohr" => Some(Prayer::Dhuhr),
            "asr" => Some(Prayer::Asr),
            "maghrib" => Some(Prayer::Maghrib),
            "isha" => Some(Prayer::Isha),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Prayer::Fajr => 0,
            Prayer::Sunrise => 1,
            Prayer::Dhuhr => 2,
            Prayer::Asr => 3,
            Prayer::Maghrib => 4,
            Prayer::Isha => 5,
        }
    }
}

impl std::fmt::Display for Prayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Prayer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prayer::resolve(s).ok_or_else(|| anyhow::anyhow!("Unknown prayer: {}", s))
    }
}
