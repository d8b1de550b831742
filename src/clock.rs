use std::cell::Cell;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};

/// Source of "now" for the scheduler and the deadline countdown.
///
/// `Tz` is the zone wall-clock triggers are resolved in, so a weekly time keeps
/// its local hour across daylight-saving changes.
pub trait Clock {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
    fn sleep(&self, dur: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, dur: Duration) {
        thread::sleep(dur);
    }
}

/// Clock that only moves when told to. `sleep` advances it instantly.
#[derive(Debug)]
pub struct ManualClock<Tz: TimeZone = FixedOffset> {
    now: Cell<DateTime<Utc>>,
    tz: Tz,
}

impl<Tz: TimeZone> ManualClock<Tz> {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self {
            tz: now.timezone(),
            now: Cell::new(now.with_timezone(&Utc)),
        }
    }

    pub fn set(&self, now: DateTime<Tz>) {
        self.now.set(now.with_timezone(&Utc));
    }

    /// Saturates at the latest representable instant.
    pub fn advance(&self, dur: Duration) {
        let next = chrono::Duration::from_std(dur)
            .ok()
            .and_then(|step| self.now.get().checked_add_signed(step))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.now.set(next);
    }
}

impl<Tz: TimeZone> Clock for ManualClock<Tz> {
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.now.get().with_timezone(&self.tz)
    }

    fn sleep(&self, dur: Duration) {
        self.advance(dur);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    type Tz = C::Tz;

    fn now(&self) -> DateTime<C::Tz> {
        (**self).now()
    }

    fn sleep(&self, dur: Duration) {
        (**self).sleep(dur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_keeps_sub_millisecond_steps() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::from_micros(1_500));
        assert_eq!(clock.now() - start, chrono::Duration::microseconds(1_500));
    }

    #[test]
    fn advance_saturates_instead_of_wrapping() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        clock.advance(Duration::MAX);
        assert_eq!(clock.now(), DateTime::<Utc>::MAX_UTC);
    }
}
