//! Synthetic league snapshot for offline runs (`FPL_DEMO=1`) and benches.

use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::FetchError;
use crate::fpl_fetch::{
    Bootstrap, Chip, LeagueSource, Player, PlayerStatus, ScheduleEvent, TEMPLATE_POSITIONS,
    TemplateGroup, TemplatePlayer, TemplateTeam, UserEntry,
};

const FIRST_NAMES: [&str; 12] = [
    "Alvarez", "Becker", "Costa", "Diallo", "Eriksen", "Fofana", "Gomes", "Haaland", "Isak",
    "Jota", "Kane", "Lamptey",
];
const TEAM_SHORT: [&str; 10] = [
    "ARS", "AVL", "BHA", "CHE", "EVE", "LIV", "MCI", "MUN", "NEW", "TOT",
];
const DEFAULT_SEED: u64 = 2024;
const DEMO_PLAYERS: usize = 120;
const DEMO_ROUND: u32 = 12;

#[derive(Debug, Clone, Copy)]
pub struct DemoLeagueSource {
    seed: u64,
}

impl Default for DemoLeagueSource {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl DemoLeagueSource {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

impl LeagueSource for DemoLeagueSource {
    fn bootstrap(&self) -> Result<Bootstrap, FetchError> {
        let mut rng = self.rng();
        Ok(Bootstrap {
            players: seed_players(&mut rng, DEMO_PLAYERS),
            events: seed_events(),
        })
    }

    fn entry(&self, entry_id: u64) -> Result<UserEntry, FetchError> {
        let mut rng = self.rng();
        let used_chips = Chip::ALL
            .into_iter()
            .filter(|_| rng.gen_bool(0.4))
            .collect();
        let lineup = (0..15)
            .map(|_| rng.gen_range(1..=DEMO_PLAYERS as u32))
            .collect();
        Ok(UserEntry {
            id: entry_id,
            lineup,
            used_chips,
        })
    }

    fn top10k_template(&self) -> Result<TemplateTeam, FetchError> {
        let mut rng = self.rng();
        let players = seed_players(&mut rng, DEMO_PLAYERS);
        let groups = TEMPLATE_POSITIONS
            .into_iter()
            .zip(1u8..)
            .map(|(position, element_type)| {
                let mut rows: Vec<TemplatePlayer> = players
                    .iter()
                    .filter(|p| p.position == element_type)
                    .map(|p| TemplatePlayer {
                        name: p.name.clone(),
                        team: TEAM_SHORT[p.team_code as usize % TEAM_SHORT.len()].to_string(),
                        position: position.to_uppercase(),
                        ownership: (p.ownership * 1.8).min(99.0),
                    })
                    .collect();
                rows.sort_by(|a, b| b.ownership.total_cmp(&a.ownership));
                rows.truncate(5);
                TemplateGroup {
                    position,
                    players: rows,
                }
            })
            .collect();
        Ok(TemplateTeam { groups })
    }
}

pub fn seed_players(rng: &mut impl Rng, count: usize) -> Vec<Player> {
    (0..count)
        .map(|i| {
            let id = i as u32 + 1;
            let position = rng.gen_range(1..=4u8);
            let cost = rng.gen_range(40..=140);
            let form = f64::from(rng.gen_range(0..=90u32)) / 10.0;
            let status = match rng.gen_range(0..20u8) {
                0 => PlayerStatus::Injured,
                1 => PlayerStatus::Doubtful,
                2 => PlayerStatus::Suspended,
                3 => PlayerStatus::Unavailable,
                _ => PlayerStatus::Available,
            };
            Player {
                id,
                name: format!("{} {}", FIRST_NAMES[i % FIRST_NAMES.len()], id),
                cost,
                points: rng.gen_range(0..=160),
                form,
                ownership: f64::from(rng.gen_range(0..=600u32)) / 10.0,
                transfers_in: rng.gen_range(0..=400_000),
                transfers_out: rng.gen_range(0..=400_000),
                status,
                expected_points: rng.gen_bool(0.9).then(|| form * 0.8),
                team_code: rng.gen_range(1..=20),
                position,
            }
        })
        .collect()
}

fn seed_events() -> Vec<ScheduleEvent> {
    let now = Utc::now();
    vec![
        ScheduleEvent {
            id: DEMO_ROUND - 1,
            name: format!("Gameweek {}", DEMO_ROUND - 1),
            deadline: Some(now - ChronoDuration::days(4)),
            is_current: true,
            is_next: false,
            finished: false,
        },
        ScheduleEvent {
            id: DEMO_ROUND,
            name: format!("Gameweek {DEMO_ROUND}"),
            deadline: Some(now + ChronoDuration::days(3) + ChronoDuration::hours(5)),
            is_current: false,
            is_next: true,
            finished: false,
        },
    ]
}
