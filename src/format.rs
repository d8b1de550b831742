//! Fixed-format text blocks shared by the terminal views and the weekly email.

use std::fmt::Write as _;

use crate::fpl_fetch::{Player, TemplateTeam};
use crate::report::ValuePick;

pub fn suggested_transfers_block(players: &[&Player]) -> String {
    let mut out = String::from("💡 Suggested Transfers:\n");
    for p in players {
        let _ = writeln!(
            out,
            "• {} - Form: {:.1} - Cost: £{:.1}m",
            p.name,
            p.form,
            p.cost_millions()
        );
    }
    out
}

pub fn captain_line(captain: Option<&Player>) -> String {
    match captain {
        Some(p) => format!("🧢 Recommended Captain: {}\n", p.name),
        None => "🧢 Recommended Captain: no players in snapshot\n".to_string(),
    }
}

pub fn value_block(picks: &[ValuePick<'_>], n: usize) -> String {
    let mut out = format!("💸 Top {n} Value for Money Players (Points per Million):\n");
    for pick in picks {
        let p = pick.player;
        let _ = writeln!(
            out,
            "• {} - {} pts - £{:.1}m - {:.2} pts/m",
            p.name,
            p.points,
            p.cost_millions(),
            pick.points_per_million
        );
    }
    out
}

pub fn transferred_in_block(players: &[&Player], n: usize) -> String {
    let mut out = format!("⬆️ Top {n} Most Transferred In (This GW):\n");
    for p in players {
        let _ = writeln!(out, "• {} - {} transfers in", p.name, p.transfers_in);
    }
    out
}

pub fn transferred_out_block(players: &[&Player], n: usize) -> String {
    let mut out = format!("⬇️ Top {n} Most Transferred Out (This GW):\n");
    for p in players {
        let _ = writeln!(out, "• {} - {} transfers out", p.name, p.transfers_out);
    }
    out
}

pub fn injury_block(players: &[&Player], n: usize) -> String {
    let mut out = format!("🚑 Top {n} Expensive Injured/Unavailable Players:\n");
    if players.is_empty() {
        out.push_str("• Nobody flagged this week\n");
    }
    for p in players {
        let _ = writeln!(
            out,
            "• {} - Status: {} - £{:.1}m",
            p.name,
            p.status.code(),
            p.cost_millions()
        );
    }
    out
}

pub fn ownership_block(players: &[&Player], n: usize) -> String {
    let mut out = format!("🏆 Template Team (Top {n} by Ownership):\n");
    for p in players {
        let _ = writeln!(
            out,
            "• {} - Owned by {:.1}% - Cost: £{:.1}m",
            p.name,
            p.ownership,
            p.cost_millions()
        );
    }
    out
}

pub fn my_team_block(players: &[&Player]) -> String {
    let mut out = String::from("👕 My Team:\n");
    for p in players {
        let _ = writeln!(out, "• {} ({})", p.name, p.team_code);
    }
    out
}

pub fn top10k_block(template: &TemplateTeam) -> String {
    let mut out = String::from("📊 Top 10K Template Team:\n");
    for group in &template.groups {
        let _ = writeln!(out, "\n🔹 {}s:", group.position.to_uppercase());
        let rows: Vec<[String; 4]> = group
            .players
            .iter()
            .map(|p| {
                [
                    p.name.clone(),
                    p.team.clone(),
                    p.position.clone(),
                    format!("{:.2}%", p.ownership),
                ]
            })
            .collect();
        out.push_str(&github_table(["Player", "Team", "Pos", "Ownership"], &rows));
    }
    out
}

/// Markdown pipe table, columns padded to the widest cell.
pub fn github_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = headers.map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| format!("| {} |\n", cells.join(" | "));
    let pad = |s: &str, w: usize| format!("{s}{}", " ".repeat(w - s.chars().count()));

    let mut out = line(
        headers
            .iter()
            .zip(widths.iter())
            .map(|(h, w)| pad(h, *w))
            .collect(),
    );
    out.push_str(&format!(
        "|{}|\n",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("|")
    ));
    for row in rows {
        out.push_str(&line(
            row.iter()
                .zip(widths.iter())
                .map(|(c, w)| pad(c, *w))
                .collect(),
        ));
    }
    out
}
