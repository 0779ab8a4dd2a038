use regex::Regex;
use std::sync::LazyLock;

use crate::models::{ClockTime, Prayer};

static TWENTY_FOUR_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("24-hour pattern"));

static TWELVE_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(am|pm)$").expect("12-hour pattern"));

/// Provider text that is neither `H:MM` nor `H:MM am|pm`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised time '{text}'")]
pub struct TimeParseError {
    pub text: String,
}

/// Turn a provider's time text into a 24-hour clock time for `prayer`.
///
/// Afternoon prayers (Dhuhr, Asr, Maghrib, Isha) are forced past midday when
/// the text gives an hour below 12, whether it carried no meridiem or an
/// "am" marker. Upstream timetables regularly drop the PM distinction.
pub fn normalize(text: &str, prayer: Prayer) -> Result<ClockTime, TimeParseError> {
    let trimmed = text.trim();
    let unparsed = || TimeParseError {
        text: text.to_string(),
    };

    if let Some(caps) = TWENTY_FOUR_HOUR.captures(trimmed) {
        let (hour, minute) = hour_minute(&caps).ok_or_else(unparsed)?;
        let hour = afternoon_corrected(hour, prayer);
        return ClockTime::new(hour, minute).ok_or_else(unparsed);
    }

    if let Some(caps) = TWELVE_HOUR.captures(trimmed) {
        let (hour, minute) = hour_minute(&caps).ok_or_else(unparsed)?;
        if hour > 12 {
            return Err(unparsed());
        }
        let is_pm = caps[3].eq_ignore_ascii_case("pm");
        let hour = match (is_pm, hour) {
            (true, 12) => 12,
            (true, h) => h + 12,
            // 12am is hour 0 before the afternoon correction
            (false, h) => afternoon_corrected(h % 12, prayer),
        };
        return ClockTime::new(hour, minute).ok_or_else(unparsed);
    }

    Err(unparsed())
}

fn hour_minute(caps: &regex::Captures<'_>) -> Option<(u32, u32)> {
    let hour = caps[1].parse().ok()?;
    let minute = caps[2].parse().ok()?;
    Some((hour, minute))
}

fn afternoon_corrected(hour: u32, prayer: Prayer) -> u32 {
    if prayer.is_afternoon() && hour < 12 {
        hour + 12
    } else {
        hour
    }
}
