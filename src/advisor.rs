use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::UserConfig;
use crate::error::FetchError;
use crate::fpl_fetch::{Chip, LeagueSource};

pub const UNCONFIGURED_DEADLINE: &str =
    "⏰ Set your FPL ID (FPL_ID) to see the countdown to your next deadline.";
pub const UNCONFIGURED_CHIPS: &str =
    "🃏 Set your FPL ID (FPL_ID) to get advice on your remaining chips.";
pub const ALL_CHIPS_USED: &str =
    "All chips used - focus on making the most of your free transfers.";

// Rounds after this count as the back half for wildcard advice.
const EARLY_SEASON_LAST_ROUND: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining { days: i64, hours: i64, minutes: i64 },
    Passed,
}

impl Countdown {
    pub fn between(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Self {
        let secs = (deadline - now).num_seconds();
        if secs < 0 {
            return Countdown::Passed;
        }
        let total_minutes = secs / 60;
        Countdown::Remaining {
            days: total_minutes / (24 * 60),
            hours: (total_minutes % (24 * 60)) / 60,
            minutes: total_minutes % 60,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining {
                days,
                hours,
                minutes,
            } => write!(f, "{days}d {hours}h {minutes}m"),
            Countdown::Passed => f.write_str("deadline passed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deadline {
    pub round: u32,
    pub name: String,
    pub at: DateTime<Utc>,
    pub countdown: Countdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Advice {
    Unconfigured,
    Ready {
        next_round: Option<u32>,
        deadline: Option<Deadline>,
        chip_tips: Vec<String>,
    },
}

impl Advice {
    pub fn next_round(&self) -> Option<u32> {
        match self {
            Advice::Unconfigured => None,
            Advice::Ready { next_round, .. } => *next_round,
        }
    }

    pub fn deadline_line(&self) -> String {
        match self {
            Advice::Unconfigured => UNCONFIGURED_DEADLINE.to_string(),
            Advice::Ready {
                deadline: Some(d), ..
            } => format!("⏰ Next deadline ({}): {}", round_label(d), d.countdown),
            Advice::Ready { deadline: None, .. } => "⏰ No upcoming deadline found.".to_string(),
        }
    }

    pub fn chip_lines(&self) -> Vec<String> {
        match self {
            Advice::Unconfigured => vec![UNCONFIGURED_CHIPS.to_string()],
            Advice::Ready { chip_tips, .. } => chip_tips.clone(),
        }
    }
}

fn round_label(d: &Deadline) -> String {
    if d.name.is_empty() {
        format!("GW {}", d.round)
    } else {
        d.name.clone()
    }
}

/// Deadline text and chip lines. A failed fetch becomes one error string for both.
pub fn advice_lines(result: &Result<Advice, FetchError>) -> (String, Vec<String>) {
    match result {
        Ok(advice) => (advice.deadline_line(), advice.chip_lines()),
        Err(err) => {
            let msg = format!("❌ Could not load deadline and chip info: {err}");
            (msg.clone(), vec![msg])
        }
    }
}

pub struct DeadlineAdvisor<'a, S, C> {
    user: &'a UserConfig,
    source: S,
    clock: C,
}

impl<'a, S: LeagueSource, C: Clock> DeadlineAdvisor<'a, S, C> {
    pub fn new(user: &'a UserConfig, source: S, clock: C) -> Self {
        Self {
            user,
            source,
            clock,
        }
    }

    pub fn advise(&self) -> Result<Advice, FetchError> {
        let Some(entry_id) = self.user.entry_id() else {
            debug!("no FPL id configured, skipping deadline fetch");
            return Ok(Advice::Unconfigured);
        };

        let boot = self.source.bootstrap()?;
        let now = self.clock.now().with_timezone(&Utc);
        let next = boot.next_event();
        let next_round = next.map(|e| e.id);
        let deadline = next.and_then(|e| {
            let at = e.deadline?;
            Some(Deadline {
                round: e.id,
                name: e.name.clone(),
                at,
                countdown: Countdown::between(now, at),
            })
        });
        if let Some(Deadline {
            countdown: Countdown::Passed,
            round,
            ..
        }) = &deadline
        {
            warn!(round, "next deadline is already in the past");
        }

        let entry = self.source.entry(entry_id)?;
        let chip_tips = chip_tips(&entry.unused_chips(), next_round.unwrap_or(0));

        Ok(Advice::Ready {
            next_round,
            deadline,
            chip_tips,
        })
    }
}

/// One sentence per unused chip, in canonical chip order.
pub fn chip_tips(unused: &[Chip], next_round: u32) -> Vec<String> {
    let mut ordered: Vec<Chip> = unused.to_vec();
    ordered.sort();
    ordered.dedup();
    if ordered.is_empty() {
        return vec![ALL_CHIPS_USED.to_string()];
    }
    ordered
        .into_iter()
        .map(|chip| chip_tip(chip, next_round).to_string())
        .collect()
}

fn chip_tip(chip: Chip, next_round: u32) -> &'static str {
    match chip {
        Chip::Wildcard if next_round > EARLY_SEASON_LAST_ROUND => {
            "Wildcard: still unused - plan it around a fixture swing or an injury crisis."
        }
        Chip::Wildcard => {
            "Wildcard: hold it until the early-season form picture settles, then rebuild."
        }
        Chip::BenchBoost => {
            "Bench Boost: save it for a double gameweek when all 15 players have two fixtures."
        }
        Chip::TripleCaptain => {
            "Triple Captain: use it on a premium player with a double gameweek or a soft fixture."
        }
        Chip::FreeHit => {
            "Free Hit: keep it for a blank gameweek when many of your starters have no fixture."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn countdown_floors_partial_minutes() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let deadline = now + chrono::Duration::seconds(2 * 86_400 + 3 * 3_600 + 4 * 60 + 59);
        assert_eq!(Countdown::between(now, deadline).to_string(), "2d 3h 4m");
    }

    #[test]
    fn past_deadline_reports_passed() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let deadline = now - chrono::Duration::minutes(1);
        assert_eq!(Countdown::between(now, deadline), Countdown::Passed);
        assert_eq!(Countdown::Passed.to_string(), "deadline passed");
    }

    #[test]
    fn wildcard_tip_depends_on_round() {
        let early = chip_tips(&[Chip::Wildcard], 8);
        let late = chip_tips(&[Chip::Wildcard], 9);
        assert_eq!(early.len(), 1);
        assert_ne!(early, late);
    }

    #[test]
    fn no_unused_chips_gives_fallback() {
        assert_eq!(chip_tips(&[], 20), vec![ALL_CHIPS_USED.to_string()]);
    }

    #[test]
    fn tips_follow_canonical_order() {
        let tips = chip_tips(&[Chip::FreeHit, Chip::BenchBoost], 1);
        assert!(tips[0].starts_with("Bench Boost"));
        assert!(tips[1].starts_with("Free Hit"));
    }
}
