use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};

use crate::refresh::FetchOutcome;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Display cadence: clock, countdown, adhan wakes.
    Tick,
    /// Refresh cadence: staleness checks.
    RefreshTick,
    /// A background fetch finished.
    Fetched(FetchOutcome),
}

pub struct EventHandler {
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration, refresh_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            let mut last_refresh = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                if event::poll(timeout).unwrap_or(false) {
                    match event::read() {
                        Ok(CEvent::Key(key)) => {
                            if input_tx.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if input_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }

                if last_refresh.elapsed() >= refresh_rate {
                    if input_tx.send(Event::RefreshTick).is_err() {
                        break;
                    }
                    last_refresh = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// For producers outside the input thread, e.g. the fetcher.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
