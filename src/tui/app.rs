use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::Block,
    Frame,
};
use rusqlite::Connection;
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::adhan::{
    AdhanService, AudioPlayer, Permission, PlayError, Player, Trigger, WakeQueue,
};
use crate::config::AppConfig;
use crate::models::{CurrentNext, Prayer};
use crate::prayer_times::{resolve_current_next, time_until, Countdown};
use crate::refresh::policy::{CLOCK_TICK, REFRESH_TICK};
use crate::refresh::{FeedState, FetchKind, FetchOutcome, Fetcher, RefreshPolicy, Sources};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{clock, header, next_prayer, popups, prayers, statusbar, weather};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::format::format_last_updated;
use crate::utils::hijri::hijri_string;

const TOAST_SECS: i64 = 6;
const RETRY_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Board,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub error: bool,
    until: NaiveDateTime,
}

pub struct App<'a, P: AudioPlayer> {
    pub config: AppConfig,
    conn: &'a Connection,
    clock: &'a dyn Clock,
    adhan: AdhanService<'a, P>,
    adhan_changed: Rc<Cell<bool>>,
    feed: FeedState,
    policy: RefreshPolicy,
    wakes: WakeQueue,
    retried: HashSet<Prayer>,
    permission: Option<Permission>,

    pub view: View,
    pub should_quit: bool,
    pub selected: usize,
    pub fetching: bool,
    fetch_requests: Vec<FetchKind>,

    // Derived on every tick
    now: NaiveDateTime,
    local_hijri: Option<String>,
    current_next: Option<CurrentNext>,
    countdown: Option<Countdown>,
    playing: Option<Prayer>,
    toast: Option<Toast>,
}

impl<'a, P: AudioPlayer> App<'a, P> {
    pub fn new(
        config: AppConfig,
        conn: &'a Connection,
        clock: &'a dyn Clock,
        player: P,
    ) -> Result<Self> {
        let now = clock.now();
        let feed = FeedState::load(conn, now.date());
        let mut adhan = AdhanService::new(player, conn, clock);
        let adhan_changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&adhan_changed);
        adhan.subscribe(move || flag.set(true));

        let mut app = App {
            policy: RefreshPolicy::from(&config.refresh),
            local_hijri: hijri_string(now.date(), config.display.hijri_offset),
            config,
            conn,
            clock,
            adhan,
            adhan_changed,
            feed,
            wakes: WakeQueue::default(),
            retried: HashSet::new(),
            permission: Permission::load(conn),
            view: View::Board,
            should_quit: false,
            selected: 0,
            fetching: false,
            fetch_requests: Vec::new(),
            now,
            current_next: None,
            countdown: None,
            playing: None,
            toast: None,
        };
        app.rearm();
        app.recompute();
        Ok(app)
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// Fetches the board wants started; drained by the event loop.
    pub fn take_fetch_requests(&mut self) -> Vec<FetchKind> {
        std::mem::take(&mut self.fetch_requests)
    }

    fn request_fetch(&mut self, kind: FetchKind) {
        if !self.fetch_requests.contains(&kind) {
            self.fetch_requests.push(kind);
        }
    }

    // ─── Timers ──────────────────────────────────────────────────────────────

    /// One-second cadence: clock, countdown, adhan wakes.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        let rolled_over = now.date() != self.now.date();
        self.now = now;

        if rolled_over {
            log::info!("Date changed to {}", now.date());
            self.local_hijri = hijri_string(now.date(), self.config.display.hijri_offset);
            self.rearm();
            self.check_refresh();
        }

        self.adhan.poll();
        self.fire_due_wakes();
        self.recompute();
        self.sync_adhan();

        if self.toast.as_ref().is_some_and(|t| t.until <= now) {
            self.toast = None;
        }
    }

    /// Sixty-second cadence: queue whatever the refresh policy says is stale.
    pub fn check_refresh(&mut self) {
        self.now = self.clock.now();
        for kind in self.feed.due(&self.policy, self.now) {
            self.request_fetch(kind);
        }
    }

    pub fn on_fetched(&mut self, outcome: FetchOutcome) {
        self.now = self.clock.now();
        let cache_days = self.config.refresh.cache_days;
        if self.feed.apply(self.conn, outcome, self.now, cache_days) {
            self.rearm();
            self.recompute();
        }
    }

    fn rearm(&mut self) {
        self.retried.clear();
        match (self.permission, self.feed.schedule()) {
            (Some(Permission::Granted), Some(schedule)) => self.wakes.rearm(schedule, self.now),
            _ => self.wakes.clear(),
        }
    }

    fn fire_due_wakes(&mut self) {
        for prayer in self.wakes.due(self.now) {
            match self.adhan.play_adhan(prayer, Trigger::Automatic) {
                Ok(()) => {
                    self.show_toast("Prayer Time", format!("It's time for {} prayer.", prayer), false);
                }
                Err(e @ (PlayError::Disabled(_) | PlayError::AlreadyPlayed(_))) => {
                    log::debug!("No automatic adhan: {}", e);
                }
                Err(PlayError::Busy) => {
                    log::info!("Adhan for {} skipped, another adhan is playing", prayer);
                }
                Err(e) => {
                    if self.retried.insert(prayer) {
                        self.wakes
                            .retry_at(prayer, self.now + Duration::seconds(RETRY_SECS));
                    }
                    self.show_toast("Adhan", format!("Could not play the adhan: {}", e), true);
                }
            }
        }
    }

    fn recompute(&mut self) {
        let time = self.now.time();
        self.current_next = self
            .feed
            .schedule()
            .and_then(|schedule| resolve_current_next(schedule, time));
        self.countdown = time_until(self.current_next.as_ref().map(|cn| &cn.next), time);
    }

    fn sync_adhan(&mut self) {
        if self.adhan_changed.replace(false) {
            self.playing = self.adhan.currently_playing();
        }
    }

    fn show_toast(&mut self, title: &str, message: String, error: bool) {
        self.toast = Some(Toast {
            title: title.to_string(),
            message,
            error,
            until: self.now + Duration::seconds(TOAST_SECS),
        });
    }

    // ─── Keys ────────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Only handle actual key presses, some terminals also send release/repeat events
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Esc && self.view == View::Board {
            self.should_quit = true;
            return;
        }

        if self.permission.is_none() {
            self.handle_permission_key(key.code);
            return;
        }

        match self.view {
            View::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                    self.view = View::Board;
                }
            }
            View::Board => self.handle_board_key(key.code),
        }
    }

    fn handle_permission_key(&mut self, code: KeyCode) {
        let answer = match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Permission::Granted,
            KeyCode::Char('n') | KeyCode::Char('N') => Permission::Denied,
            _ => return,
        };
        answer.save(self.conn);
        self.permission = Some(answer);
        if answer == Permission::Granted {
            if let Err(e) = self.adhan.initialize() {
                self.show_toast("Adhan", format!("Adhan audio unavailable: {}", e), true);
            }
        }
        self.rearm();
    }

    fn handle_board_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('?') => self.view = View::Help,
            KeyCode::Char('r') => {
                self.request_fetch(FetchKind::PrayerTimes);
                self.request_fetch(FetchKind::Weather);
            }
            KeyCode::Char('t') => self.test_adhan(),
            KeyCode::Char('x') => {
                self.adhan.stop_adhan();
                self.sync_adhan();
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < Prayer::ALL.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char(' ') => {
                let prayer = Prayer::ALL[self.selected];
                let on = self.adhan.toggle_prayer_enabled(prayer);
                let state = if on { "on" } else { "off" };
                self.show_toast("Adhan", format!("Automatic adhan {} for {}", state, prayer), false);
            }
            _ => {}
        }
    }

    /// Manual play of the upcoming prayer's adhan.
    fn test_adhan(&mut self) {
        let prayer = self
            .current_next
            .map(|cn| cn.next.prayer)
            .unwrap_or(Prayer::Fajr);
        match self.adhan.play_adhan(prayer, Trigger::Manual) {
            Ok(()) => self.show_toast(
                "Adhan Test",
                "The adhan is playing. If you can't hear it, check your volume.".to_string(),
                false,
            ),
            Err(e) => self.show_toast("Adhan Test Failed", e.to_string(), true),
        }
        self.sync_adhan();
    }

    /// Silence any playback before the process exits.
    pub fn shutdown(&mut self) {
        self.adhan.stop_adhan();
    }

    // ─── Drawing ─────────────────────────────────────────────────────────────

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let banner_height = if self.feed.error().is_some() { 1 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),             // header
                Constraint::Length(banner_height), // error banner
                Constraint::Min(0),                // body
                Constraint::Length(1),             // status bar
            ])
            .split(area);

        let schedule = self.feed.schedule();
        header::render(
            frame,
            outer[0],
            &self.config.mosque.name,
            self.today(),
            schedule.and_then(|s| s.hijri_date()),
            self.local_hijri.as_deref(),
        );

        if let Some(message) = self.feed.error() {
            statusbar::render_banner(frame, outer[1], message);
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(outer[2]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(columns[0]);

        let twelve_hour = self.config.display.twelve_hour;
        clock::render(frame, left[0], self.now.time(), twelve_hour);
        next_prayer::render(
            frame,
            left[1],
            self.current_next.as_ref(),
            self.countdown.as_ref(),
            self.playing,
            twelve_hour,
        );

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(columns[1]);

        let rows = prayers::PrayerRows {
            schedule,
            current_next: self.current_next.as_ref(),
            bells: Prayer::ALL.map(|p| self.adhan.is_enabled(p)),
            selected: self.selected,
            twelve_hour,
        };
        prayers::render(frame, right[0], &rows);
        weather::render(frame, right[1], self.feed.weather());

        let updated = self
            .feed
            .last_updated()
            .map(|at| format_last_updated(at, self.now));
        statusbar::render(frame, outer[3], updated.as_deref(), self.fetching);

        if self.view == View::Help {
            popups::render_help(frame, area);
        }
        if self.permission.is_none() {
            popups::render_permission_prompt(frame, area);
        }
        if let Some(toast) = &self.toast {
            popups::render_toast(frame, area, &toast.title, &toast.message, toast.error);
        }
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let clock = SystemClock;
    let player = Player::from_config(&config)?;
    let sources = Sources::from_config(&config);
    let mut app = App::new(config, &conn, &clock, player)?;

    let events = EventHandler::new(CLOCK_TICK, REFRESH_TICK);
    let tx = events.sender();
    let mut fetcher = Fetcher::spawn(sources, move |outcome| {
        tx.send(Event::Fetched(outcome)).is_ok()
    });

    let mut terminal = ratatui::init();
    app.check_refresh();
    let result = event_loop(&mut terminal, &mut app, &events, &mut fetcher);
    app.shutdown();
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App<'_, Player>,
    events: &EventHandler,
    fetcher: &mut Fetcher,
) -> Result<()> {
    loop {
        for kind in app.take_fetch_requests() {
            fetcher.request(kind, app.today());
        }
        app.fetching = fetcher.is_busy();

        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key);
                if app.should_quit {
                    return Ok(());
                }
            }
            Event::Tick => app.tick(),
            Event::RefreshTick => app.check_refresh(),
            Event::Fetched(outcome) => {
                fetcher.complete(&outcome);
                app.on_fetched(outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adhan::{AdhanState, PlaybackError};
    use crate::db::migrations::run_migrations;
    use crate::prayer_times::fixtures::sample_raw;
    use crate::utils::clock::FixedClock;
    use crossterm::event::KeyModifiers;

    #[derive(Default)]
    struct SilentPlayer {
        plays: u32,
        fail: bool,
    }

    impl AudioPlayer for SilentPlayer {
        fn load(&mut self) -> Result<(), PlaybackError> {
            Ok(())
        }
        fn is_ready(&self) -> bool {
            true
        }
        fn play(&mut self) -> Result<(), PlaybackError> {
            if self.fail {
                return Err(PlaybackError::Disabled);
            }
            self.plays += 1;
            Ok(())
        }
        fn pause(&mut self) {}
        fn rewind(&mut self) {}
        fn poll_ended(&mut self) -> bool {
            false
        }
    }

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn granted(conn: &Connection) {
        Permission::Granted.save(conn);
    }

    #[test]
    fn first_start_asks_for_data_and_permission() {
        let conn = open();
        let clock = FixedClock::at(2026, 3, 14, 9, 0, 0);
        let mut app = App::new(AppConfig::default(), &conn, &clock, SilentPlayer::default()).unwrap();
        app.check_refresh();
        assert_eq!(
            app.take_fetch_requests(),
            vec![FetchKind::PrayerTimes, FetchKind::Weather]
        );
        assert!(app.take_fetch_requests().is_empty());
        assert!(app.permission.is_none());

        // board keys are swallowed by the prompt
        app.handle_key(press(KeyCode::Char('t')));
        assert_eq!(app.adhan.state(), AdhanState::Idle);

        app.handle_key(press(KeyCode::Char('y')));
        assert_eq!(Permission::load(&conn), Some(Permission::Granted));
    }

    #[test]
    fn fetched_schedule_drives_current_next_and_countdown() {
        let conn = open();
        let clock = FixedClock::at(2026, 3, 14, 14, 0, 0);
        let mut app = App::new(AppConfig::default(), &conn, &clock, SilentPlayer::default()).unwrap();
        app.on_fetched(FetchOutcome::PrayerTimes(Some(sample_raw())));

        let cn = app.current_next.unwrap();
        assert_eq!(cn.current.prayer, Prayer::Dhuhr);
        assert_eq!(cn.next.prayer, Prayer::Asr);
        assert_eq!(app.countdown.map(|c| c.to_string()).as_deref(), Some("1h 45m 0s"));

        clock.advance(Duration::seconds(1));
        app.tick();
        assert_eq!(app.countdown.map(|c| c.to_string()).as_deref(), Some("1h 44m 59s"));
    }

    #[test]
    fn adhan_plays_once_at_prayer_time_when_permitted() {
        let conn = open();
        granted(&conn);
        let clock = FixedClock::at(2026, 3, 14, 15, 44, 58);
        let mut app = App::new(AppConfig::default(), &conn, &clock, SilentPlayer::default()).unwrap();
        app.on_fetched(FetchOutcome::PrayerTimes(Some(sample_raw())));

        app.tick();
        assert_eq!(app.playing, None);

        clock.advance(Duration::seconds(2));
        app.tick();
        assert_eq!(app.playing, Some(Prayer::Asr));
        let toast = app.toast.clone().unwrap();
        assert_eq!(toast.message, "It's time for Asr prayer.");

        // a refetch rearms the queue, the daily marker still holds
        app.handle_key(press(KeyCode::Char('x')));
        assert_eq!(app.playing, None);
        app.on_fetched(FetchOutcome::PrayerTimes(Some(sample_raw())));
        clock.advance(Duration::seconds(1));
        app.tick();
        assert_eq!(app.playing, None);
        assert_eq!(app.adhan.player_mut().plays, 1);

        // toast expires
        clock.advance(Duration::seconds(TOAST_SECS));
        app.tick();
        assert!(app.toast.is_none());
    }

    #[test]
    fn denied_permission_arms_nothing() {
        let conn = open();
        Permission::Denied.save(&conn);
        let clock = FixedClock::at(2026, 3, 14, 15, 44, 59);
        let mut app = App::new(AppConfig::default(), &conn, &clock, SilentPlayer::default()).unwrap();
        app.on_fetched(FetchOutcome::PrayerTimes(Some(sample_raw())));
        assert!(app.wakes.is_empty());
        clock.advance(Duration::seconds(1));
        app.tick();
        assert_eq!(app.playing, None);

        // manual test still works
        app.handle_key(press(KeyCode::Char('t')));
        assert_eq!(app.playing, Some(Prayer::Maghrib));
    }

    #[test]
    fn failed_automatic_start_is_retried_once() {
        let conn = open();
        granted(&conn);
        let clock = FixedClock::at(2026, 3, 14, 19, 50, 0);
        let player = SilentPlayer {
            fail: true,
            ..SilentPlayer::default()
        };
        let mut app = App::new(AppConfig::default(), &conn, &clock, player).unwrap();
        app.on_fetched(FetchOutcome::PrayerTimes(Some(sample_raw())));
        app.tick();
        assert!(app.toast.as_ref().is_some_and(|t| t.error));
        assert_eq!(app.wakes.next_wake().map(|w| w.prayer), Some(Prayer::Maghrib));

        app.adhan.player_mut().fail = false;
        clock.advance(Duration::seconds(RETRY_SECS));
        app.tick();
        assert_eq!(app.playing, Some(Prayer::Maghrib));
    }

    #[test]
    fn space_toggles_the_selected_prayer() {
        let conn = open();
        granted(&conn);
        let clock = FixedClock::at(2026, 3, 14, 9, 0, 0);
        let mut app = App::new(AppConfig::default(), &conn, &clock, SilentPlayer::default()).unwrap();
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Char(' ')));
        assert!(app.adhan.is_enabled(Prayer::Sunrise));
        for _ in 0..10 {
            app.handle_key(press(KeyCode::Down));
        }
        assert_eq!(app.selected, Prayer::ALL.len() - 1);
        app.handle_key(press(KeyCode::Char(' ')));
        assert!(!app.adhan.is_enabled(Prayer::Isha));
    }

    #[test]
    fn date_rollover_rearms_and_refreshes() {
        let conn = open();
        granted(&conn);
        let clock = FixedClock::at(2026, 3, 14, 23, 59, 59);
        let mut app = App::new(AppConfig::default(), &conn, &clock, SilentPlayer::default()).unwrap();
        app.on_fetched(FetchOutcome::PrayerTimes(Some(sample_raw())));
        app.on_fetched(FetchOutcome::Weather(None));
        app.take_fetch_requests();
        assert!(app.wakes.is_empty());

        clock.advance(Duration::seconds(2));
        app.tick();
        assert_eq!(app.wakes.len(), 6);
        assert!(app.take_fetch_requests().contains(&FetchKind::PrayerTimes));
        let cn = app.current_next.unwrap();
        assert_eq!(cn.current.label(), "Isha (Yesterday)");
    }

    #[test]
    fn help_and_quit() {
        let conn = open();
        granted(&conn);
        let clock = FixedClock::at(2026, 3, 14, 9, 0, 0);
        let mut app = App::new(AppConfig::default(), &conn, &clock, SilentPlayer::default()).unwrap();
        app.handle_key(press(KeyCode::Char('?')));
        assert_eq!(app.view, View::Help);
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.view, View::Board);
        assert!(!app.should_quit);
        app.handle_key(press(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
