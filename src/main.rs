use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fpl_helper::advisor::{DeadlineAdvisor, advice_lines};
use fpl_helper::clock::SystemClock;
use fpl_helper::config::AppConfig;
use fpl_helper::demo_feed::DemoLeagueSource;
use fpl_helper::error::FetchError;
use fpl_helper::format;
use fpl_helper::fpl_fetch::{HttpLeagueSource, LeagueSource, Player};
use fpl_helper::notify::{
    DispatchOutcome, Dispatcher, OsDesktopNotifier, SmtpMailer, WeeklyOutcome,
};
use fpl_helper::report::{self, LIST_TOP_N, TEMPLATE_TOP_N, TIPS_TOP_N};
use fpl_helper::scheduler::Scheduler;

const HELP: &str = "\
fpl_helper - weekly Fantasy Premier League tips

USAGE:
    fpl_helper              interactive menu
    fpl_helper --send-now   build the weekly report and deliver it once
    fpl_helper --schedule   start the weekly reminder loop
    fpl_helper --help       show this message

Configuration is read from the environment (and .env / .env.local):
    FPL_ID, FPL_EMAIL, FPL_REMINDER_WEEKS, FPL_REMINDER_DAY, FPL_REMINDER_TIME,
    FPL_POLL_SECS, FPL_API_BASE, FPL_TEMPLATE_BASE, FPL_HTTP_TIMEOUT_SECS, FPL_DEMO,
    SMTP_HOST, SMTP_PORT, SMTP_SENDER, SMTP_PASSWORD, SMTP_RECIPIENT";

enum Mode {
    Menu,
    SendNow,
    Schedule,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fpl_helper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mode = parse_args()?;
    let config = AppConfig::from_env().context("invalid configuration")?;
    let source: Box<dyn LeagueSource> = if config.demo {
        tracing::info!("demo mode: serving a synthetic snapshot");
        Box::new(DemoLeagueSource::default())
    } else {
        Box::new(HttpLeagueSource::new(config.api.clone()))
    };

    match mode {
        Mode::Menu => run_menu(&config, source.as_ref()),
        Mode::SendNow => {
            let outcome = dispatcher(&config, source.as_ref()).send_weekly_notifications();
            print_dispatch(&outcome, &config.email.recipient);
            Ok(())
        }
        Mode::Schedule => start_weekly_reminder(&config, source.as_ref()),
    }
}

fn parse_args() -> Result<Mode> {
    let mut mode = Mode::Menu;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--send-now" => mode = Mode::SendNow,
            "--schedule" => mode = Mode::Schedule,
            "-h" | "--help" => {
                println!("{HELP}");
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument: {other} (try --help)"),
        }
    }
    Ok(mode)
}

fn run_menu(config: &AppConfig, source: &dyn LeagueSource) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("\n{}", "==== FPL Helper ====".bold().cyan());
        println!("1. Get FPL tips for the week");
        println!("2. Show template team by ownership");
        println!("3. Show top 10K template team (LiveFPL)");
        println!("4. Set up weekly reminder");
        println!("5. Show value for money players");
        println!("6. Show most transferred in players");
        println!("7. Show most transferred out players");
        println!("8. Show injury/unavailable report");
        println!("0. Exit");
        print!("Select an option: ");
        io::stdout().flush().context("flush stdout")?;

        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line.context("read menu selection")?;
        match line.trim() {
            "1" => show_weekly_tips(config, source),
            "2" => with_players(source, |players| {
                format::ownership_block(
                    &report::ownership_template(players, TEMPLATE_TOP_N),
                    TEMPLATE_TOP_N,
                )
            }),
            "3" => match source.top10k_template() {
                Ok(template) => println!("\n{}", format::top10k_block(&template)),
                Err(err) => print_fetch_error(&err),
            },
            "4" => start_weekly_reminder(config, source)?,
            "5" => with_players(source, |players| {
                format::value_block(&report::value_for_money(players, LIST_TOP_N), LIST_TOP_N)
            }),
            "6" => with_players(source, |players| {
                format::transferred_in_block(
                    &report::most_transferred_in(players, LIST_TOP_N),
                    LIST_TOP_N,
                )
            }),
            "7" => with_players(source, |players| {
                format::transferred_out_block(
                    &report::most_transferred_out(players, LIST_TOP_N),
                    LIST_TOP_N,
                )
            }),
            "8" => with_players(source, |players| {
                format::injury_block(&report::injury_report(players, LIST_TOP_N), LIST_TOP_N)
            }),
            "0" => {
                println!("Goodbye!");
                return Ok(());
            }
            _ => println!("{}", "Invalid option. Please try again.".yellow()),
        }
    }
}

// Each view does its own fetch; a failure only aborts that view.
fn with_players<F>(source: &dyn LeagueSource, render: F)
where
    F: FnOnce(&[Player]) -> String,
{
    match source.players() {
        Ok(players) if players.is_empty() => {
            println!("{}", "⚠️ The league returned no players.".yellow())
        }
        Ok(players) => println!("\n{}", render(&players)),
        Err(err) => print_fetch_error(&err),
    }
}

fn show_weekly_tips(config: &AppConfig, source: &dyn LeagueSource) {
    println!("\n📊 Fetching your FPL tips for the week...");

    let advice = DeadlineAdvisor::new(&config.user, source, SystemClock).advise();
    let (deadline, chips) = advice_lines(&advice);
    println!("{deadline}");
    for line in chips {
        println!("🃏 {line}");
    }

    with_players(source, |players| {
        format::suggested_transfers_block(&report::suggested_transfers(players, TIPS_TOP_N))
    });
    with_players(source, |players| format::captain_line(report::captain_pick(players)));

    let Some(entry_id) = config.user.entry_id() else {
        return;
    };
    match source.entry(entry_id) {
        Ok(entry) if !entry.lineup.is_empty() => with_players(source, |players| {
            format::my_team_block(&report::my_team(players, &entry.lineup))
        }),
        Ok(_) => {}
        Err(err) => print_fetch_error(&err),
    }
}

fn start_weekly_reminder(config: &AppConfig, source: &dyn LeagueSource) -> Result<()> {
    let trigger = config.schedule.trigger;
    println!(
        "🔔 Reminder set for every {} at {}.",
        trigger.weekday,
        trigger.time.format("%H:%M")
    );
    println!("📧 Will send email to {}", config.email.recipient);
    println!("🖥️ Will show desktop notification");

    let dispatcher = dispatcher(config, source);
    let mut scheduler = Scheduler::new(&config.schedule, SystemClock);
    if let Some(next) = scheduler.next_run() {
        tracing::info!(next_run = %next, "weekly reminder armed");
    }
    scheduler.run(|_| {
        println!("\n{}", "🗓️ Weekly FPL Reminder:".bold());
        match dispatcher.weekly_job() {
            WeeklyOutcome::Skipped { round } => {
                println!("Gameweek {round} is not in your reminder weeks, skipping.");
            }
            WeeklyOutcome::Dispatched(outcome) => {
                print_dispatch(&outcome, &config.email.recipient)
            }
        }
    })
}

fn dispatcher<'a>(
    config: &'a AppConfig,
    source: &'a dyn LeagueSource,
) -> Dispatcher<'a, &'a dyn LeagueSource, SystemClock, OsDesktopNotifier, SmtpMailer> {
    Dispatcher::new(
        config,
        source,
        SystemClock,
        OsDesktopNotifier,
        SmtpMailer::new(config.email.clone()),
    )
}

fn print_dispatch(outcome: &DispatchOutcome, recipient: &str) {
    println!("{}", outcome.report);
    match &outcome.desktop {
        Ok(()) => println!("✅ Desktop notification sent"),
        Err(err) => println!("❌ {err}"),
    }
    match &outcome.email {
        Ok(()) => println!("✅ Email sent to {recipient}"),
        Err(err) => println!("❌ Failed to send email: {err}"),
    }
}

fn print_fetch_error(err: &FetchError) {
    println!("{}", format!("❌ Failed to fetch data: {err}").red());
}
