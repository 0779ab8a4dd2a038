use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::thread;
use std::time::Duration;

use crate::adhan::{AdhanService, Player, Trigger};
use crate::cli::args::AdhanCommands;
use crate::config::AppConfig;
use crate::models::{CurrentNext, DayTag, Prayer, PrayerSchedule, WeatherReport};
use crate::prayer_times::{resolve_current_next, time_until};
use crate::refresh::{FeedState, FetchKind, FetchOutcome, Sources};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::format::{format_entry_time, format_last_updated};
use crate::utils::hijri::hijri_string;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

const ADHAN_POLL: Duration = Duration::from_millis(250);

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(conn: &Connection, config: &AppConfig) -> Result<()> {
    let clock = SystemClock;
    let now = clock.now();
    let mut feed = FeedState::load(conn, now.date());

    if feed.schedule().is_none() {
        let sources = Sources::from_config(config);
        let outcome = sources.fetch(FetchKind::PrayerTimes, now.date());
        feed.apply(conn, outcome, now, config.refresh.cache_days);
    }

    let Some(schedule) = feed.schedule() else {
        println_colored!(RED, "  ✗ {}", feed.error().unwrap_or("No prayer times available"));
        return Ok(());
    };

    print_header(config, schedule, now);
    if let Some(message) = feed.error() {
        println_colored!(AMBER, "  ⚠ {}", message);
        println!();
    }

    let current_next = resolve_current_next(schedule, now.time());
    print_schedule(schedule, current_next.as_ref(), config.display.twelve_hour);

    if let Some(cn) = &current_next {
        println!();
        println_colored!(BOLD, "  Now:  {}", cn.current.label());
        if let Some(countdown) = time_until(Some(&cn.next), now.time()) {
            println_colored!(AMBER, "  Next: {} in {}", cn.next.label(), countdown);
        }
    }

    if let Some(at) = feed.last_updated() {
        println!();
        println_colored!(DIM, "  {}", format_last_updated(at, now));
    }
    println!();
    Ok(())
}

fn print_header(config: &AppConfig, schedule: &PrayerSchedule, now: NaiveDateTime) {
    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {} ({})",
        config.mosque.name,
        now.format("%A %-d %B %Y")
    );
    let local = hijri_string(now.date(), config.display.hijri_offset);
    match (schedule.hijri_date(), local) {
        (Some(published), _) => println_colored!(DIM, "  {}", published),
        (None, Some(local)) => println_colored!(DIM, "  {}", local),
        (None, None) => {}
    }
    if schedule.date() != now.date() {
        println_colored!(AMBER, "  Timetable from {}", schedule.date().format("%Y-%m-%d"));
    }
    println!();
}

fn print_schedule(schedule: &PrayerSchedule, current_next: Option<&CurrentNext>, twelve_hour: bool) {
    let current = current_next
        .filter(|cn| cn.current.day == DayTag::Today)
        .map(|cn| cn.current.prayer);
    let next = current_next
        .filter(|cn| cn.next.day == DayTag::Today)
        .map(|cn| cn.next.prayer);

    for entry in schedule.entries() {
        let time = format_entry_time(entry, twelve_hour);
        let name = entry.prayer.display_name();
        if Some(entry.prayer) == current {
            println_colored!(GREEN, "  ▶ {:<10}  {}", name, time);
        } else if Some(entry.prayer) == next {
            println_colored!(GOLD, "    {:<10}  {}", name, time);
        } else if entry.time.is_none() {
            println_colored!(RED, "    {:<10}  {}", name, time);
        } else {
            println!("    {:<10}  {}", name, time);
        }
    }
}

// ─── Fetch ───────────────────────────────────────────────────────────────────

pub fn handle_fetch(conn: &Connection, config: &AppConfig) -> Result<()> {
    let clock = SystemClock;
    let now = clock.now();
    let sources = Sources::from_config(config);
    let mut feed = FeedState::load(conn, now.date());

    let outcome = sources.fetch(FetchKind::PrayerTimes, now.date());
    let fetched = matches!(outcome, FetchOutcome::PrayerTimes(Some(_)));
    feed.apply(conn, outcome, now, config.refresh.cache_days);
    if fetched {
        let count = feed.schedule().map(|s| s.timed().count()).unwrap_or(0);
        println_colored!(GREEN, "  ✓ Prayer times updated ({} of 6 times readable)", count);
    } else {
        println_colored!(RED, "  ✗ {}", feed.error().unwrap_or("Prayer times unavailable"));
    }

    if sources.weather.is_none() {
        println_colored!(DIM, "  Weather is not configured");
        return Ok(());
    }
    let outcome = sources.fetch(FetchKind::Weather, now.date());
    feed.apply(conn, outcome, now, config.refresh.cache_days);
    match feed.weather() {
        Some(w) => println_colored!(GREEN, "  ✓ Weather updated: {}°C, {}", w.temperature, w.condition),
        None => println_colored!(RED, "  ✗ Weather unavailable"),
    }
    Ok(())
}

// ─── Weather ─────────────────────────────────────────────────────────────────

pub fn handle_weather(conn: &Connection, config: &AppConfig) -> Result<()> {
    let clock = SystemClock;
    let now = clock.now();
    let sources = Sources::from_config(config);
    let mut feed = FeedState::load(conn, now.date());

    let cached = feed.weather().cloned();
    if sources.weather.is_some() {
        let outcome = sources.fetch(FetchKind::Weather, now.date());
        feed.apply(conn, outcome, now, config.refresh.cache_days);
    }

    println!();
    match feed.weather().or(cached.as_ref()) {
        Some(report) => {
            if feed.weather().is_none() {
                println_colored!(AMBER, "  Showing the last known weather");
            }
            print_weather(report);
        }
        None if sources.weather.is_none() => {
            println_colored!(DIM, "  Weather is off. Set weather.api_key in {}", config_location());
        }
        None => println_colored!(RED, "  ✗ Weather unavailable"),
    }
    println!();
    Ok(())
}

fn print_weather(w: &WeatherReport) {
    println_colored!(GOLD, "  {} {}", w.glyph(), w.location);
    println_colored!(BOLD, "  {}°C  {}", w.temperature, w.condition);
    println!("  Feels like {}°C", w.feels_like);
    println!("  Rain       {}%", w.rain_chance);
    println!("  Humidity   {}%", w.humidity);
    println!("  Wind       {} m/s", w.wind);
}

fn config_location() -> String {
    AppConfig::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "config.toml".to_string())
}

// ─── Adhan ───────────────────────────────────────────────────────────────────

pub fn handle_adhan(conn: &Connection, config: &AppConfig, action: &AdhanCommands) -> Result<()> {
    let clock = SystemClock;
    let player = Player::from_config(config)?;
    let mut adhan = AdhanService::new(player, conn, &clock);

    match action {
        AdhanCommands::List => {
            println!();
            println_colored!(GOLD, "  Automatic adhan");
            println!();
            for prayer in Prayer::ALL {
                if adhan.is_enabled(prayer) {
                    println_colored!(GREEN, "  🔔 {:<10} on", prayer.display_name());
                } else {
                    println_colored!(DIM, "  🔕 {:<10} off", prayer.display_name());
                }
            }
            if let Some((prayer, date)) = adhan.last_automatic_play() {
                println!();
                println_colored!(DIM, "  Last played automatically: {} on {}", prayer, date);
            }
            if !config.adhan.enabled {
                println!();
                println_colored!(AMBER, "  Audio is switched off in the config file");
            }
            println!();
        }
        AdhanCommands::Toggle { prayer } => {
            let prayer: Prayer = prayer.parse().map_err(|_| {
                anyhow!(
                    "Unknown prayer '{}'. Use: fajr, sunrise, zuhr, asr, maghrib, isha",
                    prayer
                )
            })?;
            if adhan.toggle_prayer_enabled(prayer) {
                println_colored!(GREEN, "  🔔 Automatic adhan on for {}", prayer);
            } else {
                println_colored!(DIM, "  🔕 Automatic adhan off for {}", prayer);
            }
        }
        AdhanCommands::Test => {
            let prayer = FeedState::load(conn, clock.now().date())
                .schedule()
                .and_then(|s| resolve_current_next(s, clock.now().time()))
                .map(|cn| cn.next.prayer)
                .unwrap_or(Prayer::Fajr);
            adhan
                .play_adhan(prayer, Trigger::Manual)
                .with_context(|| format!("Playing the adhan for {}", prayer))?;
            println_colored!(GREEN, "  ▶ Playing the adhan for {}. Press Ctrl-C to stop.", prayer);
            while adhan.is_playing() {
                thread::sleep(ADHAN_POLL);
                adhan.poll();
            }
            println_colored!(DIM, "  Finished");
        }
        AdhanCommands::StopMarkerReset => {
            match adhan.last_automatic_play() {
                Some((prayer, date)) => {
                    adhan.forget_last_automatic_play();
                    println_colored!(GREEN, "  ✓ Cleared the marker for {} on {}", prayer, date);
                }
                None => println_colored!(DIM, "  Nothing to clear"),
            }
        }
    }
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if init {
        if path.exists() {
            println_colored!(AMBER, "  Config already exists at {}", path.display());
            return Ok(());
        }
        let written = AppConfig::default().save()?;
        println_colored!(GREEN, "  ✓ Wrote default config to {}", written.display());
        return Ok(());
    }

    println_colored!(DIM, "# {}", path.display());
    let content = toml::to_string_pretty(config).context("Serializing config")?;
    print!("{}", content);
    Ok(())
}
