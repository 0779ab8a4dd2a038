use chrono::{Local, NaiveDateTime};

/// Source of local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;

#[cfg(test)]
mod fixed {
    use super::Clock;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::cell::Cell;

    /// Manually advanced clock for tests.
    pub struct FixedClock(Cell<NaiveDateTime>);

    impl FixedClock {
        pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Self {
            let dt = NaiveDate::from_ymd_opt(y, mo, d)
                .and_then(|date| date.and_hms_opt(h, mi, s))
                .expect("valid test datetime");
            Self(Cell::new(dt))
        }

        pub fn set(&self, dt: NaiveDateTime) {
            self.0.set(dt);
        }

        pub fn advance(&self, by: Duration) {
            self.0.set(self.0.get() + by);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0.get()
        }
    }
}
