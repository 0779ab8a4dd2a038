use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

fn hijri_month_name(month: usize) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| HIJRI_MONTH_NAMES.get(i))
        .copied()
        .unwrap_or("Unknown")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HijriInfo {
    pub day: usize,
    pub month: usize,
    pub year: usize,
}

impl HijriInfo {
    pub fn month_name(&self) -> &'static str {
        hijri_month_name(self.month)
    }

    /// "25 Ramadan 1447"
    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, self.month_name(), self.year)
    }
}

pub fn to_hijri(date: NaiveDate) -> Result<HijriInfo> {
    let hd = HijriDate::from_gr(
        date.year() as usize,
        date.month() as usize,
        date.day() as usize,
    )
    .map_err(|e| anyhow::anyhow!("Hijri conversion error: {}", e))?;

    Ok(HijriInfo {
        day: hd.day(),
        month: hd.month(),
        year: hd.year(),
    })
}

/// Locally computed Hijri date for `date`, shifted by `offset_days` for local
/// moon sighting (e.g. -1 where the month starts a day after Saudi Arabia).
/// `None` outside the converter's supported range.
pub fn hijri_string(date: NaiveDate, offset_days: i32) -> Option<String> {
    let adjusted = date + Duration::days(i64::from(offset_days));
    match to_hijri(adjusted) {
        Ok(info) => Some(info.formatted()),
        Err(e) => {
            log::debug!("No Hijri date for {}: {:#}", adjusted, e);
            None
        }
    }
}
