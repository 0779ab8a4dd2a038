//! Adhan playback state machine.
//!
//! `Idle --play--> Playing(prayer) --ended|stop--> Idle`. At most one playback
//! is active at a time; a second request while playing is refused, never
//! queued. Automatic triggers fire at most once per prayer per calendar day,
//! and the once-per-day marker is only written after playback actually
//! started. Enabled flags and the marker are persisted through a
//! [`KeyValueStore`]; persistence failures are logged and otherwise ignored.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::adhan::observers::{Observers, SubscriptionId};
use crate::adhan::player::{AudioPlayer, PlaybackError};
use crate::db::KeyValueStore;
use crate::models::Prayer;
use crate::utils::clock::Clock;

const ENABLED_KEY: &str = "adhan_enabled";
const LAST_PRAYER_KEY: &str = "adhan_last_prayer";
const LAST_DATE_KEY: &str = "adhan_last_date";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdhanState {
    Idle,
    Playing(Prayer),
}

/// Who asked for the adhan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The prayer time arrived. Subject to enablement and once-per-day.
    Automatic,
    /// A person pressed play. Only refused while already playing.
    Manual,
}

#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    #[error("adhan audio is unavailable: {0}")]
    Unavailable(#[source] PlaybackError),
    #[error("adhan is switched off for {0}")]
    Disabled(Prayer),
    #[error("adhan for {0} has already played today")]
    AlreadyPlayed(Prayer),
    #[error("adhan is already playing")]
    Busy,
    #[error("adhan playback failed: {0}")]
    Playback(#[source] PlaybackError),
}

pub struct AdhanService<'a, P: AudioPlayer> {
    player: P,
    initialized: bool,
    store: &'a dyn KeyValueStore,
    clock: &'a dyn Clock,
    state: AdhanState,
    enabled: BTreeMap<Prayer, bool>,
    last_automatic: Option<(Prayer, NaiveDate)>,
    observers: Observers,
}

impl<'a, P: AudioPlayer> AdhanService<'a, P> {
    /// Reads persisted settings once; defaults apply for anything missing.
    pub fn new(player: P, store: &'a dyn KeyValueStore, clock: &'a dyn Clock) -> Self {
        let mut service = Self {
            player,
            initialized: false,
            store,
            clock,
            state: AdhanState::Idle,
            enabled: Prayer::ALL
                .iter()
                .map(|p| (*p, p.adhan_enabled_by_default()))
                .collect(),
            last_automatic: None,
            observers: Observers::default(),
        };
        service.load_settings();
        service
    }

    fn load_settings(&mut self) {
        match self.store.get(ENABLED_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<BTreeMap<String, bool>>(&json) {
                Ok(saved) => {
                    for (name, on) in saved {
                        match Prayer::resolve(&name) {
                            Some(prayer) => {
                                self.enabled.insert(prayer, on);
                            }
                            None => log::debug!("Ignoring adhan setting for '{}'", name),
                        }
                    }
                }
                Err(e) => log::warn!("Discarding unreadable adhan settings: {}", e),
            },
            Ok(None) => self.save_enabled(),
            Err(e) => log::warn!("Could not read adhan settings: {:#}", e),
        }

        let prayer = self.read_key(LAST_PRAYER_KEY).and_then(|s| Prayer::resolve(&s));
        let date = self
            .read_key(LAST_DATE_KEY)
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());
        self.last_automatic = prayer.zip(date);
    }

    fn read_key(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            log::warn!("Could not read {}: {:#}", key, e);
            None
        })
    }

    fn write_key(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            log::warn!("Could not persist {}: {:#}", key, e);
        }
    }

    fn save_enabled(&self) {
        let map: BTreeMap<&str, bool> = self
            .enabled
            .iter()
            .map(|(p, on)| (p.as_str(), *on))
            .collect();
        match serde_json::to_string(&map) {
            Ok(json) => self.write_key(ENABLED_KEY, &json),
            Err(e) => log::warn!("Could not serialize adhan settings: {}", e),
        }
    }

    fn ensure_initialized(&mut self) -> Result<(), PlaybackError> {
        if !self.initialized {
            self.player.load()?;
            self.initialized = true;
            log::info!("Adhan audio initialized");
        }
        Ok(())
    }

    /// Eagerly prepare the audio resource, e.g. when permission is granted.
    pub fn initialize(&mut self) -> Result<(), PlaybackError> {
        self.ensure_initialized()
    }

    #[cfg(test)]
    pub fn state(&self) -> AdhanState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, AdhanState::Playing(_))
    }

    pub fn currently_playing(&self) -> Option<Prayer> {
        match self.state {
            AdhanState::Playing(prayer) => Some(prayer),
            AdhanState::Idle => None,
        }
    }

    pub fn is_enabled(&self, prayer: Prayer) -> bool {
        self.enabled.get(&prayer).copied().unwrap_or(false)
    }

    pub fn last_automatic_play(&self) -> Option<(Prayer, NaiveDate)> {
        self.last_automatic
    }

    /// Drop the once-per-day marker so today's automatic adhans can ring again.
    pub fn forget_last_automatic_play(&mut self) {
        self.last_automatic = None;
        self.write_key(LAST_PRAYER_KEY, "");
        self.write_key(LAST_DATE_KEY, "");
    }

    /// Flip and persist the automatic adhan for `prayer`. Returns the new value.
    pub fn toggle_prayer_enabled(&mut self, prayer: Prayer) -> bool {
        let on = !self.is_enabled(prayer);
        self.enabled.insert(prayer, on);
        self.save_enabled();
        on
    }

    /// The guard for a transition to `Playing`, without side effects.
    pub fn should_play(&self, prayer: Prayer, trigger: Trigger) -> Result<(), PlayError> {
        if trigger == Trigger::Automatic {
            if !self.is_enabled(prayer) {
                return Err(PlayError::Disabled(prayer));
            }
            let today = self.clock.now().date();
            if self.last_automatic == Some((prayer, today)) {
                return Err(PlayError::AlreadyPlayed(prayer));
            }
        }
        if self.is_playing() {
            return Err(PlayError::Busy);
        }
        Ok(())
    }

    pub fn play_adhan(&mut self, prayer: Prayer, trigger: Trigger) -> Result<(), PlayError> {
        self.ensure_initialized().map_err(PlayError::Unavailable)?;
        self.should_play(prayer, trigger)?;

        self.player.pause();
        self.player.rewind();
        if !self.player.is_ready() {
            log::debug!("Adhan audio not ready, reloading");
            self.player.load().map_err(PlayError::Unavailable)?;
        }

        if let Err(e) = self.player.play() {
            log::error!("Adhan for {} failed to start: {}", prayer, e);
            self.state = AdhanState::Idle;
            self.observers.notify();
            return Err(PlayError::Playback(e));
        }

        self.state = AdhanState::Playing(prayer);
        if trigger == Trigger::Automatic {
            let today = self.clock.now().date();
            self.last_automatic = Some((prayer, today));
            self.write_key(LAST_PRAYER_KEY, prayer.as_str());
            self.write_key(LAST_DATE_KEY, &today.format("%Y-%m-%d").to_string());
        }
        log::info!("Adhan for {} started ({:?})", prayer, trigger);
        self.observers.notify();
        Ok(())
    }

    /// Unconditional stop. A no-op when nothing is playing.
    pub fn stop_adhan(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.player.pause();
        self.player.rewind();
        self.state = AdhanState::Idle;
        log::info!("Adhan stopped");
        self.observers.notify();
    }

    /// Check the audio resource for its "ended" signal. Call on every tick.
    pub fn poll(&mut self) {
        if self.is_playing() && self.player.poll_ended() {
            self.handle_ended();
        }
    }

    fn handle_ended(&mut self) {
        if let AdhanState::Playing(prayer) = self.state {
            log::info!("Adhan for {} finished", prayer);
            self.state = AdhanState::Idle;
            self.observers.notify();
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }
}
