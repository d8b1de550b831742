use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::http_client::http_client;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Player {
    pub id: u32,
    #[serde(rename = "web_name")]
    pub name: String,
    // Tenths of a million.
    #[serde(rename = "now_cost", default)]
    pub cost: i32,
    #[serde(rename = "total_points", default)]
    pub points: i32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub form: f64,
    #[serde(rename = "selected_by_percent", default, deserialize_with = "lenient_f64")]
    pub ownership: f64,
    #[serde(rename = "transfers_in_event", default)]
    pub transfers_in: i64,
    #[serde(rename = "transfers_out_event", default)]
    pub transfers_out: i64,
    #[serde(default)]
    pub status: PlayerStatus,
    #[serde(
        rename = "ep_next",
        alias = "expected_points",
        default,
        deserialize_with = "lenient_opt_f64"
    )]
    pub expected_points: Option<f64>,
    #[serde(default)]
    pub team_code: u32,
    #[serde(rename = "element_type", default)]
    pub position: u8,
}

impl Player {
    pub fn cost_millions(&self) -> f64 {
        f64::from(self.cost) / 10.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PlayerStatus {
    #[default]
    Available,
    Injured,
    Doubtful,
    Suspended,
    Unavailable,
    NotInSquad,
    Other(String),
}

impl PlayerStatus {
    /// Injured, doubtful, suspended or unavailable.
    pub fn is_flagged(&self) -> bool {
        matches!(
            self,
            PlayerStatus::Injured
                | PlayerStatus::Doubtful
                | PlayerStatus::Suspended
                | PlayerStatus::Unavailable
        )
    }

    pub fn code(&self) -> &str {
        match self {
            PlayerStatus::Available => "a",
            PlayerStatus::Injured => "i",
            PlayerStatus::Doubtful => "d",
            PlayerStatus::Suspended => "s",
            PlayerStatus::Unavailable => "u",
            PlayerStatus::NotInSquad => "n",
            PlayerStatus::Other(code) => code,
        }
    }
}

impl From<String> for PlayerStatus {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "a" | "" => PlayerStatus::Available,
            "i" => PlayerStatus::Injured,
            "d" => PlayerStatus::Doubtful,
            "s" => PlayerStatus::Suspended,
            "u" => PlayerStatus::Unavailable,
            "n" => PlayerStatus::NotInSquad,
            other => PlayerStatus::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScheduleEvent {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "deadline_time", default, deserialize_with = "lenient_deadline")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub finished: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Bootstrap {
    #[serde(rename = "elements", default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub events: Vec<ScheduleEvent>,
}

impl Bootstrap {
    /// The round flagged next, falling back to the current one.
    pub fn next_event(&self) -> Option<&ScheduleEvent> {
        self.events
            .iter()
            .find(|e| e.is_next)
            .or_else(|| self.events.iter().find(|e| e.is_current))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chip {
    Wildcard,
    BenchBoost,
    TripleCaptain,
    FreeHit,
}

impl Chip {
    pub const ALL: [Chip; 4] = [
        Chip::Wildcard,
        Chip::BenchBoost,
        Chip::TripleCaptain,
        Chip::FreeHit,
    ];

    pub fn from_api_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "wildcard" => Some(Chip::Wildcard),
            "bboost" | "bench_boost" | "benchboost" => Some(Chip::BenchBoost),
            "3xc" | "triple_captain" | "triplecaptain" => Some(Chip::TripleCaptain),
            "freehit" | "free_hit" => Some(Chip::FreeHit),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Chip::Wildcard => "Wildcard",
            Chip::BenchBoost => "Bench Boost",
            Chip::TripleCaptain => "Triple Captain",
            Chip::FreeHit => "Free Hit",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEntry {
    pub id: u64,
    pub lineup: Vec<u32>,
    pub used_chips: BTreeSet<Chip>,
}

impl UserEntry {
    pub fn unused_chips(&self) -> Vec<Chip> {
        Chip::ALL
            .into_iter()
            .filter(|c| !self.used_chips.contains(c))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplatePlayer {
    pub name: String,
    pub team: String,
    pub position: String,
    pub ownership: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateGroup {
    pub position: &'static str,
    pub players: Vec<TemplatePlayer>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateTeam {
    pub groups: Vec<TemplateGroup>,
}

pub const TEMPLATE_POSITIONS: [&str; 4] = ["gk", "def", "mid", "fwd"];

/// Everything the reports need from the league.
pub trait LeagueSource {
    fn bootstrap(&self) -> Result<Bootstrap, FetchError>;
    fn entry(&self, entry_id: u64) -> Result<UserEntry, FetchError>;
    fn top10k_template(&self) -> Result<TemplateTeam, FetchError>;

    fn players(&self) -> Result<Vec<Player>, FetchError> {
        Ok(self.bootstrap()?.players)
    }
}

impl<S: LeagueSource + ?Sized> LeagueSource for &S {
    fn bootstrap(&self) -> Result<Bootstrap, FetchError> {
        (**self).bootstrap()
    }

    fn entry(&self, entry_id: u64) -> Result<UserEntry, FetchError> {
        (**self).entry(entry_id)
    }

    fn top10k_template(&self) -> Result<TemplateTeam, FetchError> {
        (**self).top10k_template()
    }
}

impl<S: LeagueSource + ?Sized> LeagueSource for Box<S> {
    fn bootstrap(&self) -> Result<Bootstrap, FetchError> {
        (**self).bootstrap()
    }

    fn entry(&self, entry_id: u64) -> Result<UserEntry, FetchError> {
        (**self).entry(entry_id)
    }

    fn top10k_template(&self) -> Result<TemplateTeam, FetchError> {
        (**self).top10k_template()
    }
}

/// Live API. One GET per call, no cache, no retry.
#[derive(Debug, Clone)]
pub struct HttpLeagueSource {
    api: ApiConfig,
}

impl HttpLeagueSource {
    pub fn new(api: ApiConfig) -> Self {
        Self { api }
    }

    pub fn bootstrap_url(&self) -> String {
        format!("{}/bootstrap-static/", self.api.base_url)
    }

    pub fn entry_url(&self, entry_id: u64) -> String {
        format!("{}/entry/{entry_id}/", self.api.base_url)
    }

    pub fn template_url(&self) -> String {
        format!("{}/api/template/", self.api.template_base_url)
    }

    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let client = http_client(self.api.timeout)?;
        debug!(url, "fetching");
        let resp = client.get(url).send().map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        resp.text().map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

impl LeagueSource for HttpLeagueSource {
    fn bootstrap(&self) -> Result<Bootstrap, FetchError> {
        let body = self.fetch_text(&self.bootstrap_url())?;
        parse_bootstrap_json(&body)
    }

    fn entry(&self, entry_id: u64) -> Result<UserEntry, FetchError> {
        let body = self.fetch_text(&self.entry_url(entry_id))?;
        parse_entry_json(&body)
    }

    fn top10k_template(&self) -> Result<TemplateTeam, FetchError> {
        let body = self.fetch_text(&self.template_url())?;
        parse_template_json(&body)
    }
}

pub fn parse_bootstrap_json(raw: &str) -> Result<Bootstrap, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        warn!("bootstrap body was empty, views will have no players");
        return Ok(Bootstrap::default());
    }
    serde_json::from_str(trimmed).map_err(|source| FetchError::Parse {
        what: "bootstrap",
        source,
    })
}

#[derive(Debug, Deserialize)]
struct EntryResponse {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    chips: Vec<ChipPlay>,
    #[serde(default)]
    picks: Vec<EntryPick>,
}

#[derive(Debug, Deserialize)]
struct ChipPlay {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EntryPick {
    element: u32,
}

pub fn parse_entry_json(raw: &str) -> Result<UserEntry, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(UserEntry::default());
    }
    let resp: EntryResponse = serde_json::from_str(trimmed).map_err(|source| FetchError::Parse {
        what: "entry",
        source,
    })?;
    Ok(UserEntry {
        id: resp.id,
        lineup: resp.picks.into_iter().map(|p| p.element).collect(),
        used_chips: resp
            .chips
            .iter()
            .filter_map(|c| Chip::from_api_name(&c.name))
            .collect(),
    })
}

pub fn parse_template_json(raw: &str) -> Result<TemplateTeam, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(TemplateTeam::default());
    }
    let root: Value = serde_json::from_str(trimmed).map_err(|source| FetchError::Parse {
        what: "template",
        source,
    })?;
    let top = root.get("top_10k").unwrap_or(&Value::Null);

    let groups = TEMPLATE_POSITIONS
        .into_iter()
        .map(|position| {
            let players = top
                .get(position)
                .and_then(Value::as_array)
                .map(|rows| rows.iter().map(parse_template_player).collect())
                .unwrap_or_default();
            TemplateGroup { position, players }
        })
        .collect();
    Ok(TemplateTeam { groups })
}

fn parse_template_player(row: &Value) -> TemplatePlayer {
    TemplatePlayer {
        name: pick_string(row, "element_name"),
        team: pick_string(row, "element_team_short"),
        position: pick_string(row, "element_type"),
        ownership: row.get("ownership").and_then(value_to_f64).unwrap_or(0.0),
    }
}

fn pick_string(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

// Non-finite strings such as "NaN" or "inf" count as missing.
fn value_to_f64(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|f: &f64| f.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?.unwrap_or(0.0))
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&v))
}

fn lenient_deadline<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<String>::deserialize(deserializer)?;
    Ok(v.as_deref().and_then(parse_deadline))
}

/// RFC 3339, or a bare `YYYY-MM-DDTHH:MM:SS` taken as UTC.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        assert_eq!(PlayerStatus::from("i".to_string()), PlayerStatus::Injured);
        assert_eq!(PlayerStatus::from("n".to_string()), PlayerStatus::NotInSquad);
        assert!(!PlayerStatus::NotInSquad.is_flagged());
        assert!(PlayerStatus::Unavailable.is_flagged());
        assert_eq!(PlayerStatus::Other("x".to_string()).code(), "x");
    }

    #[test]
    fn deadline_accepts_zulu_and_naive() {
        let zulu = parse_deadline("2030-01-01T09:00:00Z").expect("rfc3339");
        let naive = parse_deadline("2030-01-01T09:00:00").expect("naive");
        assert_eq!(zulu, naive);
        assert!(parse_deadline("soon").is_none());
    }

    #[test]
    fn chip_names_cover_api_aliases() {
        assert_eq!(Chip::from_api_name("bboost"), Some(Chip::BenchBoost));
        assert_eq!(Chip::from_api_name("3xc"), Some(Chip::TripleCaptain));
        assert_eq!(Chip::from_api_name("FREEHIT"), Some(Chip::FreeHit));
        assert_eq!(Chip::from_api_name("manager"), None);
    }

    #[test]
    fn next_event_falls_back_to_current() {
        let boot = Bootstrap {
            players: Vec::new(),
            events: vec![
                ScheduleEvent {
                    id: 3,
                    is_current: true,
                    ..Default::default()
                },
                ScheduleEvent {
                    id: 4,
                    ..Default::default()
                },
            ],
        };
        assert_eq!(boot.next_event().map(|e| e.id), Some(3));
    }
}
