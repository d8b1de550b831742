use chrono::{TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

use fpl_helper::advisor::{Advice, Countdown, Deadline, chip_tips};
use fpl_helper::demo_feed::seed_players;
use fpl_helper::error::FetchError;
use fpl_helper::fpl_fetch::{Chip, parse_bootstrap_json};
use fpl_helper::notify::compose_weekly_report;
use fpl_helper::report;

const BOOTSTRAP_JSON: &str = include_str!("../tests/fixtures/bootstrap_static.json");

fn bench_bootstrap_parse(c: &mut Criterion) {
    c.bench_function("bootstrap_parse", |b| {
        b.iter(|| {
            let snapshot = parse_bootstrap_json(black_box(BOOTSTRAP_JSON)).unwrap();
            black_box(snapshot.players.len());
        })
    });
}

fn bench_ranked_views(c: &mut Criterion) {
    // Roughly the size of a real season's player list.
    let players = seed_players(&mut StdRng::seed_from_u64(7), 700);

    c.bench_function("ranked_views", |b| {
        b.iter(|| {
            let players = black_box(&players);
            black_box(report::suggested_transfers(players, 5).len());
            black_box(report::captain_pick(players).map(|p| p.id));
            black_box(report::value_for_money(players, 10).len());
            black_box(report::most_transferred_in(players, 10).len());
            black_box(report::most_transferred_out(players, 10).len());
            black_box(report::injury_report(players, 10).len());
            black_box(report::ownership_template(players, 15).len());
        })
    });
}

fn bench_weekly_report(c: &mut Criterion) {
    let players: Result<_, FetchError> = Ok(seed_players(&mut StdRng::seed_from_u64(11), 700));
    let advice: Result<_, FetchError> = Ok(Advice::Ready {
        next_round: Some(12),
        deadline: Some(Deadline {
            round: 12,
            name: "Gameweek 12".to_string(),
            at: Utc.with_ymd_and_hms(2030, 1, 4, 11, 0, 0).unwrap(),
            countdown: Countdown::Remaining {
                days: 2,
                hours: 4,
                minutes: 30,
            },
        }),
        chip_tips: chip_tips(&[Chip::BenchBoost, Chip::FreeHit], 12),
    });

    c.bench_function("weekly_report_compose", |b| {
        b.iter(|| {
            let report = compose_weekly_report(black_box(&advice), black_box(&players));
            black_box(report.len());
        })
    });
}

criterion_group!(
    benches,
    bench_bootstrap_parse,
    bench_ranked_views,
    bench_weekly_report
);
criterion_main!(benches);
