//! Ranked views over a single player snapshot.
//!
//! Every view sorts descending with a stable sort, so ties keep API order.

use std::cmp::Ordering;

use crate::fpl_fetch::Player;

pub const TIPS_TOP_N: usize = 5;
pub const LIST_TOP_N: usize = 10;
pub const TEMPLATE_TOP_N: usize = 15;
pub const WEEKLY_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePick<'a> {
    pub player: &'a Player,
    // Points per million, rounded to 2 decimals.
    pub points_per_million: f64,
}

pub fn suggested_transfers(players: &[Player], n: usize) -> Vec<&Player> {
    top_by(players.iter(), n, |p| p.form)
}

/// Highest expected points, missing counted as zero. First one wins a tie.
pub fn captain_pick(players: &[Player]) -> Option<&Player> {
    let mut best: Option<(&Player, f64)> = None;
    for p in players {
        let ep = p.expected_points.unwrap_or(0.0);
        match best {
            Some((_, best_ep)) if ep <= best_ep => {}
            _ => best = Some((p, ep)),
        }
    }
    best.map(|(p, _)| p)
}

pub fn value_for_money(players: &[Player], n: usize) -> Vec<ValuePick<'_>> {
    let eligible = players.iter().filter(|p| p.cost > 0 && p.points > 0);
    top_by(eligible, n, |p| f64::from(p.points) / f64::from(p.cost))
        .into_iter()
        .map(|player| ValuePick {
            player,
            points_per_million: round2(f64::from(player.points) / player.cost_millions()),
        })
        .collect()
}

pub fn most_transferred_in(players: &[Player], n: usize) -> Vec<&Player> {
    top_by(players.iter(), n, |p| p.transfers_in as f64)
}

pub fn most_transferred_out(players: &[Player], n: usize) -> Vec<&Player> {
    top_by(players.iter(), n, |p| p.transfers_out as f64)
}

/// Flagged players (injured, doubtful, suspended, unavailable), most expensive first.
pub fn injury_report(players: &[Player], n: usize) -> Vec<&Player> {
    top_by(
        players.iter().filter(|p| p.status.is_flagged()),
        n,
        |p| f64::from(p.cost),
    )
}

pub fn ownership_template(players: &[Player], n: usize) -> Vec<&Player> {
    top_by(players.iter(), n, |p| p.ownership)
}

/// Players from `lineup`, in snapshot order. Unknown ids are dropped.
pub fn my_team<'a>(players: &'a [Player], lineup: &[u32]) -> Vec<&'a Player> {
    players.iter().filter(|p| lineup.contains(&p.id)).collect()
}

fn top_by<'a, I, F>(players: I, n: usize, key: F) -> Vec<&'a Player>
where
    I: Iterator<Item = &'a Player>,
    F: Fn(&Player) -> f64,
{
    let mut keyed: Vec<(f64, &'a Player)> = players.map(|p| (key(p), p)).collect();
    // sort_by is stable.
    keyed.sort_by(|a, b| desc(a.0, b.0));
    keyed.into_iter().take(n).map(|(_, p)| p).collect()
}

// NaN keys rank last.
fn desc(a: f64, b: f64) -> Ordering {
    let rank = |v: f64| if v.is_nan() { f64::NEG_INFINITY } else { v };
    rank(b).total_cmp(&rank(a))
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
