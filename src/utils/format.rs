use chrono::NaiveDateTime;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::PrayerEntry;

/// A prayer's time as shown on the board: "5:12 AM" or "05:12", or "N/A".
pub fn format_entry_time(entry: &PrayerEntry, twelve_hour: bool) -> String {
    match entry.time {
        Some(t) if twelve_hour => t.format_12h(),
        Some(t) => t.to_string(),
        None => "N/A".to_string(),
    }
}

/// "Last updated 09:14", with the date when it was not today.
pub fn format_last_updated(at: NaiveDateTime, now: NaiveDateTime) -> String {
    if at.date() == now.date() {
        format!("Last updated {}", at.format("%H:%M"))
    } else {
        format!("Last updated {}", at.format("%a %-d %b %H:%M"))
    }
}

/// Cut `s` to at most `width` terminal columns, marking the cut with "…".
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockTime, Prayer};
    use chrono::NaiveDate;

    fn entry(time: Option<ClockTime>) -> PrayerEntry {
        PrayerEntry {
            prayer: Prayer::Asr,
            time,
            source_text: "3:45 pm".to_string(),
        }
    }

    #[test]
    fn entry_times() {
        let e = entry(ClockTime::new(15, 45));
        assert_eq!(format_entry_time(&e, true), "3:45 PM");
        assert_eq!(format_entry_time(&e, false), "15:45");
        assert_eq!(format_entry_time(&entry(None), true), "N/A");
    }

    #[test]
    fn last_updated_mentions_the_day_only_when_stale() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let at = day.and_hms_opt(9, 14, 0).unwrap();
        assert_eq!(
            format_last_updated(at, day.and_hms_opt(12, 0, 0).unwrap()),
            "Last updated 09:14"
        );
        let next = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(
            format_last_updated(at, next.and_hms_opt(6, 0, 0).unwrap()),
            "Last updated Sat 14 Mar 09:14"
        );
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate("Birmingham", 20), "Birmingham");
        assert_eq!(truncate("Birmingham Central Mosque", 10), "Birmingha…");
        assert_eq!(truncate("مسجد", 2), "م…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn progress_bar_scales() {
        assert_eq!(progress_bar(50, 100, 10), "█████░░░░░");
        assert_eq!(progress_bar(0, 100, 4), "░░░░");
        assert_eq!(progress_bar(150, 100, 4), "████");
        assert_eq!(progress_bar(1, 0, 3), "░░░");
    }
}
