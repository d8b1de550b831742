use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::time::Duration;

use chrono::{NaiveTime, Weekday};

use crate::error::ConfigError;
use crate::scheduler::WeeklyTrigger;

pub const PLACEHOLDER_FPL_ID: &str = "your_fpl_id_here";
pub const PLACEHOLDER_EMAIL: &str = "your_email_here";
pub const PLACEHOLDER_SENDER: &str = "your_gmail@gmail.com";
pub const PLACEHOLDER_PASSWORD: &str = "your_app_password";

pub const DEFAULT_API_BASE: &str = "https://fantasy.premierleague.com/api";
pub const DEFAULT_TEMPLATE_BASE: &str = "https://api.livefpl.net";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_SECS: u64 = 60;
const SEASON_WEEKS: u32 = 38;
const SEASON_RANGE: RangeInclusive<u32> = 1..=SEASON_WEEKS;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub user: UserConfig,
    pub email: EmailConfig,
    pub api: ApiConfig,
    pub schedule: ScheduleConfig,
    // Serve a synthetic snapshot instead of hitting the network.
    pub demo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserConfig {
    pub fpl_id: String,
    pub email: String,
    pub reminder_weeks: BTreeSet<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub template_base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub trigger: WeeklyTrigger,
    pub poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user: UserConfig {
                fpl_id: PLACEHOLDER_FPL_ID.to_string(),
                email: PLACEHOLDER_EMAIL.to_string(),
                reminder_weeks: SEASON_RANGE.collect(),
            },
            email: EmailConfig {
                smtp_host: DEFAULT_SMTP_HOST.to_string(),
                smtp_port: DEFAULT_SMTP_PORT,
                sender: PLACEHOLDER_SENDER.to_string(),
                password: PLACEHOLDER_PASSWORD.to_string(),
                recipient: String::new(),
            },
            api: ApiConfig {
                base_url: DEFAULT_API_BASE.to_string(),
                template_base_url: DEFAULT_TEMPLATE_BASE.to_string(),
                timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            },
            schedule: ScheduleConfig {
                trigger: WeeklyTrigger::default(),
                poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            },
            demo: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut cfg = Self::default();

        if let Some(id) = get("FPL_ID") {
            if !is_placeholder(&id) && id.parse::<u64>().is_err() {
                return Err(ConfigError::Invalid {
                    name: "FPL_ID",
                    value: id,
                    reason: "expected a numeric entry id".to_string(),
                });
            }
            cfg.user.fpl_id = id;
        }
        if let Some(email) = get("FPL_EMAIL") {
            cfg.user.email = email;
        }
        if let Some(raw) = get("FPL_REMINDER_WEEKS") {
            cfg.user.reminder_weeks = parse_week_set(&raw)?;
        }

        if let Some(host) = get("SMTP_HOST") {
            cfg.email.smtp_host = host;
        }
        if let Some(raw) = get("SMTP_PORT") {
            cfg.email.smtp_port = raw.parse().map_err(|_| ConfigError::Invalid {
                name: "SMTP_PORT",
                value: raw.clone(),
                reason: "expected a port number".to_string(),
            })?;
        }
        if let Some(sender) = get("SMTP_SENDER") {
            cfg.email.sender = sender;
        }
        if let Some(password) = get("SMTP_PASSWORD") {
            cfg.email.password = password;
        }
        cfg.email.recipient = get("SMTP_RECIPIENT").unwrap_or_else(|| cfg.user.email.clone());

        if let Some(base) = get("FPL_API_BASE") {
            cfg.api.base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(base) = get("FPL_TEMPLATE_BASE") {
            cfg.api.template_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(raw) = get("FPL_HTTP_TIMEOUT_SECS") {
            let secs = parse_secs("FPL_HTTP_TIMEOUT_SECS", &raw)?;
            cfg.api.timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(raw) = get("FPL_REMINDER_DAY") {
            cfg.schedule.trigger.weekday =
                raw.parse::<Weekday>().map_err(|_| ConfigError::Invalid {
                    name: "FPL_REMINDER_DAY",
                    value: raw.clone(),
                    reason: "expected a weekday name".to_string(),
                })?;
        }
        if let Some(raw) = get("FPL_REMINDER_TIME") {
            cfg.schedule.trigger.time =
                NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|_| ConfigError::Invalid {
                    name: "FPL_REMINDER_TIME",
                    value: raw.clone(),
                    reason: "expected HH:MM".to_string(),
                })?;
        }
        if let Some(raw) = get("FPL_POLL_SECS") {
            let secs = parse_secs("FPL_POLL_SECS", &raw)?;
            cfg.schedule.poll_interval = Duration::from_secs(secs.max(1));
        }

        cfg.demo = get("FPL_DEMO").is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));
        Ok(cfg)
    }
}

impl UserConfig {
    /// Numeric entry id, or `None` while the id is unset or still the placeholder.
    pub fn entry_id(&self) -> Option<u64> {
        if is_placeholder(&self.fpl_id) {
            return None;
        }
        self.fpl_id.trim().parse().ok()
    }

    pub fn wants_reminder(&self, week: u32) -> bool {
        self.reminder_weeks.contains(&week)
    }
}

impl EmailConfig {
    /// Sender and password, refusing blanks and the shipped placeholders.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        if is_placeholder(&self.sender) {
            return Err(ConfigError::Missing("SMTP_SENDER"));
        }
        if is_placeholder(&self.password) {
            return Err(ConfigError::Missing("SMTP_PASSWORD"));
        }
        Ok((self.sender.as_str(), self.password.as_str()))
    }
}

pub fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    v.is_empty()
        || [
            PLACEHOLDER_FPL_ID,
            PLACEHOLDER_EMAIL,
            PLACEHOLDER_SENDER,
            PLACEHOLDER_PASSWORD,
        ]
        .contains(&v)
}

/// Parse `"1-38"`, `"1,5,9"` or a mix such as `"1-4,10"`.
pub fn parse_week_set(raw: &str) -> Result<BTreeSet<u32>, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: "FPL_REMINDER_WEEKS",
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let mut weeks = BTreeSet::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((lo, hi)) = part.split_once('-') {
            let lo: u32 = lo.trim().parse().map_err(|_| invalid("bad range start"))?;
            let hi: u32 = hi.trim().parse().map_err(|_| invalid("bad range end"))?;
            if lo > hi {
                return Err(invalid("range start after end"));
            }
            if !SEASON_RANGE.contains(&lo) || !SEASON_RANGE.contains(&hi) {
                return Err(invalid("weeks run from 1 to 38"));
            }
            weeks.extend(lo..=hi);
        } else {
            let week: u32 = part.parse().map_err(|_| invalid("bad week number"))?;
            if !SEASON_RANGE.contains(&week) {
                return Err(invalid("weeks run from 1 to 38"));
            }
            weeks.insert(week);
        }
    }
    Ok(weeks)
}

fn parse_secs(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: "expected whole seconds".to_string(),
    })
}
