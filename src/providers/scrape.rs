//! Timetable extraction from the mosque's public web page.
//!
//! Two heuristics run over the page's visible text: labelled times
//! (`Fajr: 05:12`) when all five daily prayers are named (Sunrise may be
//! missing), otherwise the first six clock-like tokens in page order. Raw texts are kept as found; the time
//! normalizer fixes up missing PM markers later.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Prayer, RawPrayerTimes};
use crate::providers::{get_text, http_client, PrayerTimesProvider, ProviderError};

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>").expect("script pattern")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space pattern"));

static HIJRI_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)class\s*=\s*"[^"]*\bhijri-date\b[^"]*"[^>]*>(.*?)</"#)
        .expect("hijri pattern")
});

static CLOCK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[01]?[0-9]|2[0-3]):[0-5][0-9]\b").expect("clock token pattern")
});

static LABELLED: LazyLock<Vec<(Prayer, Regex)>> = LazyLock::new(|| {
    Prayer::ALL
        .iter()
        .map(|prayer| {
            let pattern = format!(
                r"(?i)\b(?:{})[:\s]+(\d{{1,2}}:\d{{2}}(?:\s*[ap]m\b)?)",
                label_aliases(*prayer)
            );
            (*prayer, Regex::new(&pattern).expect("labelled time pattern"))
        })
        .collect()
});

/// Labels a timetable may use for each prayer.
fn label_aliases(prayer: Prayer) -> &'static str {
    match prayer {
        Prayer::Fajr => "fajr",
        Prayer::Sunrise => "sunrise|shuruq",
        Prayer::Dhuhr => "zuhr|dhuhr|dhuhur|zohr",
        Prayer::Asr => "asr",
        Prayer::Maghrib => "maghrib",
        Prayer::Isha => "isha",
    }
}

/// Fewer clock tokens than this and the page is not a timetable.
const MIN_CLOCK_TOKENS: usize = 5;

pub struct ScrapeProvider {
    url: String,
}

impl ScrapeProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl PrayerTimesProvider for ScrapeProvider {
    fn name(&self) -> &str {
        "mosque page"
    }

    fn fetch(&self, today: NaiveDate) -> Result<RawPrayerTimes, ProviderError> {
        let client = http_client()?;
        let html = get_text(&client, &self.url)?;
        extract_prayer_times(&html, today).ok_or(ProviderError::NoTimes)
    }
}

/// Pull today's timetable out of a page. `None` when neither heuristic
/// finds anything usable.
pub fn extract_prayer_times(html: &str, today: NaiveDate) -> Option<RawPrayerTimes> {
    let text = visible_text(html);
    let hijri_date = extract_hijri_date(html);

    let texts = labelled_times(&text).or_else(|| first_clock_tokens(&text))?;
    let [fajr, sunrise, zuhr, asr, maghrib, isha] = texts;
    Some(RawPrayerTimes {
        date: today,
        hijri_date,
        fajr,
        sunrise,
        zuhr,
        asr,
        maghrib,
        isha,
    })
}

fn visible_text(html: &str) -> String {
    let without_code = SCRIPT_OR_STYLE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_code, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#58;", ":");
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn extract_hijri_date(html: &str) -> Option<String> {
    let caps = HIJRI_ELEMENT.captures(html)?;
    let text = visible_text(&caps[1]);
    (!text.is_empty()).then_some(text)
}

fn labelled_times(text: &str) -> Option<[String; 6]> {
    let lower = text.to_lowercase();
    // Sunrise is not a prayer and many timetables omit it
    let mentions_every_prayer = Prayer::ALL
        .iter()
        .filter(|p| **p != Prayer::Sunrise)
        .all(|p| label_aliases(*p).split('|').any(|alias| lower.contains(alias)));
    if !mentions_every_prayer {
        return None;
    }

    let texts: Vec<String> = LABELLED
        .iter()
        .map(|(_, re)| {
            re.captures(text)
                .map(|caps| caps[1].to_string())
                .unwrap_or_default()
        })
        .collect();
    if texts.iter().all(String::is_empty) {
        return None;
    }
    texts.try_into().ok()
}

fn first_clock_tokens(text: &str) -> Option<[String; 6]> {
    let tokens: Vec<&str> = CLOCK_TOKEN.find_iter(text).map(|m| m.as_str()).take(6).collect();
    if tokens.len() < MIN_CLOCK_TOKENS {
        return None;
    }
    let mut texts: [String; 6] = Default::default();
    for (slot, token) in texts.iter_mut().zip(tokens) {
        *slot = token.to_string();
    }
    Some(texts)
}
