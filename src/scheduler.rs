use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use tracing::info;

use crate::clock::Clock;
use crate::config::ScheduleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTrigger {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl Default for WeeklyTrigger {
    fn default() -> Self {
        Self {
            weekday: Weekday::Fri,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
        }
    }
}

impl WeeklyTrigger {
    /// First occurrence strictly after `after`, as wall-clock time in `after`'s zone.
    pub fn next_after<Tz: TimeZone>(&self, after: DateTime<Tz>) -> DateTime<Tz> {
        let tz = after.timezone();
        let local = after.naive_local();
        let today = local.weekday().num_days_from_monday();
        let target = self.weekday.num_days_from_monday();
        let days_ahead = (7 + target - today) % 7;
        let mut date = local.date() + chrono::Duration::days(i64::from(days_ahead));
        loop {
            let candidate = resolve_local(&tz, date.and_time(self.time));
            if candidate > after {
                return candidate;
            }
            date += chrono::Duration::days(7);
        }
    }
}

// A wall time that falls in a spring-forward gap runs at the first valid
// half hour after it; an ambiguous one runs at its first occurrence.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    (0..=4)
        .find_map(|step| {
            tz.from_local_datetime(&(naive + chrono::Duration::minutes(30 * step)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle { next_run: DateTime<FixedOffset> },
    Firing { scheduled_for: DateTime<FixedOffset> },
}

/// Weekly trigger polled on a fixed interval. Nothing survives a restart, and
/// occurrences missed while the process was down are not replayed.
pub struct Scheduler<C> {
    trigger: WeeklyTrigger,
    poll_interval: Duration,
    clock: C,
    state: SchedulerState,
    fired: u64,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(config: &ScheduleConfig, clock: C) -> Self {
        let next_run = config.trigger.next_after(clock.now()).fixed_offset();
        Self {
            trigger: config.trigger,
            poll_interval: config.poll_interval,
            clock,
            state: SchedulerState::Idle { next_run },
            fired: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn next_run(&self) -> Option<DateTime<FixedOffset>> {
        match self.state {
            SchedulerState::Idle { next_run } => Some(next_run),
            SchedulerState::Firing { .. } => None,
        }
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Run `job` if the trigger is due. Returns whether it fired.
    pub fn tick<F>(&mut self, mut job: F) -> bool
    where
        F: FnMut(&SchedulerState),
    {
        let SchedulerState::Idle { next_run } = self.state else {
            return false;
        };
        if self.clock.now().fixed_offset() < next_run {
            return false;
        }

        self.state = SchedulerState::Firing {
            scheduled_for: next_run,
        };
        info!(scheduled_for = %next_run, "weekly job firing");
        job(&self.state);
        self.fired += 1;

        let next_run = self.trigger.next_after(self.clock.now()).fixed_offset();
        info!(next_run = %next_run, "weekly job re-armed");
        self.state = SchedulerState::Idle { next_run };
        true
    }

    /// Poll forever. Blocks the calling thread between checks.
    pub fn run<F>(&mut self, mut job: F) -> !
    where
        F: FnMut(&SchedulerState),
    {
        loop {
            self.tick(&mut job);
            self.clock.sleep(self.poll_interval);
        }
    }
}
