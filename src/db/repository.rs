use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{RawPrayerTimes, WeatherReport};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

// ─── Cached timetables ───────────────────────────────────────────────────────

pub struct CacheRepo;

impl CacheRepo {
    pub fn store(conn: &Connection, raw: &RawPrayerTimes) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO prayer_times_cache
                (date, hijri_date, fajr, sunrise, zuhr, asr, maghrib, isha, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now', 'localtime'))",
            params![
                raw.date.format(DATE_FMT).to_string(),
                raw.hijri_date,
                raw.fajr,
                raw.sunrise,
                raw.zuhr,
                raw.asr,
                raw.maghrib,
                raw.isha,
            ],
        )?;
        Ok(())
    }

    pub fn get_for_date(conn: &Connection, date: NaiveDate) -> Result<Option<RawPrayerTimes>> {
        let row = conn
            .query_row(
                "SELECT date, hijri_date, fajr, sunrise, zuhr, asr, maghrib, isha
                 FROM prayer_times_cache WHERE date = ?1",
                params![date.format(DATE_FMT).to_string()],
                read_row,
            )
            .optional()?;
        row.map(into_raw).transpose()
    }

    /// Most recent timetable we ever stored, whatever its date.
    pub fn get_latest(conn: &Connection) -> Result<Option<RawPrayerTimes>> {
        let row = conn
            .query_row(
                "SELECT date, hijri_date, fajr, sunrise, zuhr, asr, maghrib, isha
                 FROM prayer_times_cache ORDER BY date DESC LIMIT 1",
                [],
                read_row,
            )
            .optional()?;
        row.map(into_raw).transpose()
    }

    /// Keep only the newest `keep` days.
    pub fn prune(conn: &Connection, keep: u32) -> Result<usize> {
        let removed = conn.execute(
            "DELETE FROM prayer_times_cache WHERE date NOT IN
                (SELECT date FROM prayer_times_cache ORDER BY date DESC LIMIT ?1)",
            params![keep],
        )?;
        Ok(removed)
    }
}

type CacheRow = (String, Option<String>, [String; 6]);

fn read_row(row: &Row<'_>) -> rusqlite::Result<CacheRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        [
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ],
    ))
}

fn into_raw((date, hijri_date, times): CacheRow) -> Result<RawPrayerTimes> {
    let date = NaiveDate::parse_from_str(&date, DATE_FMT)
        .with_context(|| format!("Bad cached date '{}'", date))?;
    let [fajr, sunrise, zuhr, asr, maghrib, isha] = times;
    Ok(RawPrayerTimes {
        date,
        hijri_date,
        fajr,
        sunrise,
        zuhr,
        asr,
        maghrib,
        isha,
    })
}

// ─── Weather ─────────────────────────────────────────────────────────────────

pub struct WeatherRepo;

impl WeatherRepo {
    const KEY: &'static str = "weather_cache";

    pub fn store(conn: &Connection, report: &WeatherReport) -> Result<()> {
        let json = serde_json::to_string(report).context("Serializing weather")?;
        MetaRepo::set(conn, Self::KEY, &json)
    }

    pub fn get(conn: &Connection) -> Result<Option<WeatherReport>> {
        match MetaRepo::get(conn, Self::KEY)? {
            None => Ok(None),
            Some(json) => Ok(Some(
                serde_json::from_str(&json).context("Parsing cached weather")?,
            )),
        }
    }
}

// ─── Fetch timestamps ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    PrayerTimes,
    Weather,
}

impl Feed {
    fn key(&self) -> &'static str {
        match self {
            Feed::PrayerTimes => "prayer_times_last_fetch",
            Feed::Weather => "weather_last_fetch",
        }
    }
}

pub struct FetchLog;

impl FetchLog {
    pub fn last_success(conn: &Connection, feed: Feed) -> Result<Option<NaiveDateTime>> {
        let Some(value) = MetaRepo::get(conn, feed.key())? else {
            return Ok(None);
        };
        let parsed = NaiveDateTime::parse_from_str(&value, DATETIME_FMT)
            .with_context(|| format!("Bad timestamp '{}' for {}", value, feed.key()))?;
        Ok(Some(parsed))
    }

    pub fn record_success(conn: &Connection, feed: Feed, at: NaiveDateTime) -> Result<()> {
        MetaRepo::set(conn, feed.key(), &at.format(DATETIME_FMT).to_string())
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}
