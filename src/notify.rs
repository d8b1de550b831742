use std::process::Command;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

use crate::advisor::{Advice, DeadlineAdvisor, advice_lines};
use crate::clock::Clock;
use crate::config::{AppConfig, EmailConfig, is_placeholder};
use crate::error::{ConfigError, DeliveryError, FetchError};
use crate::format;
use crate::fpl_fetch::{LeagueSource, Player};
use crate::report::{self, WEEKLY_TOP_N};

pub const DESKTOP_TITLE: &str = "FPL Weekly Reminder";
pub const DESKTOP_MESSAGE: &str = "Check your email for this week's FPL tips!";
pub const EMAIL_SUBJECT: &str = "⚽️ FPL Weekly Report";

pub trait DesktopSink {
    fn notify(&self, title: &str, message: &str) -> Result<(), DeliveryError>;
}

pub trait MailSink {
    fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError>;
}

impl<T: DesktopSink + ?Sized> DesktopSink for &T {
    fn notify(&self, title: &str, message: &str) -> Result<(), DeliveryError> {
        (**self).notify(title, message)
    }
}

impl<T: MailSink + ?Sized> MailSink for &T {
    fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError> {
        (**self).send(subject, body, recipient)
    }
}

/// Banner through the platform's command-line notifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsDesktopNotifier;

impl DesktopSink for OsDesktopNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), DeliveryError> {
        let mut cmd = desktop_command(title, message);
        let program = cmd.get_program().to_string_lossy().into_owned();
        let status = cmd
            .status()
            .map_err(|e| DeliveryError::Desktop(format!("{program}: {e}")))?;
        if !status.success() {
            return Err(DeliveryError::Desktop(format!("{program} exited with {status}")));
        }
        info!(title, "desktop notification sent");
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn desktop_command(title: &str, message: &str) -> Command {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        applescript_escape(message),
        applescript_escape(title)
    );
    let mut cmd = Command::new("osascript");
    cmd.arg("-e").arg(script);
    cmd
}

#[cfg(not(target_os = "macos"))]
fn desktop_command(title: &str, message: &str) -> Command {
    let mut cmd = Command::new("notify-send");
    cmd.arg(title).arg(message);
    cmd
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn applescript_escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Plain-text mail over a STARTTLS relay.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

impl MailSink for SmtpMailer {
    fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError> {
        // Credentials are checked before any connection is attempted.
        let (sender, password) = self.config.credentials()?;
        if is_placeholder(recipient) {
            return Err(ConfigError::Missing("SMTP_RECIPIENT").into());
        }

        let email = Message::builder()
            .from(sender.parse()?)
            .to(recipient.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DeliveryError::Build(e.to_string()))?;

        let mailer = SmtpTransport::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(sender.to_string(), password.to_string()))
            .build();
        mailer.send(&email)?;

        info!(to = recipient, "weekly report email sent");
        Ok(())
    }
}

#[derive(Debug)]
pub struct DispatchOutcome {
    pub report: String,
    pub desktop: Result<(), DeliveryError>,
    pub email: Result<(), DeliveryError>,
}

#[derive(Debug)]
pub enum WeeklyOutcome {
    // Round not in the configured reminder weeks.
    Skipped { round: u32 },
    Dispatched(DispatchOutcome),
}

pub struct Dispatcher<'a, S, C, D, M> {
    config: &'a AppConfig,
    source: S,
    clock: C,
    desktop: D,
    mailer: M,
}

impl<'a, S, C, D, M> Dispatcher<'a, S, C, D, M>
where
    S: LeagueSource,
    C: Clock,
    D: DesktopSink,
    M: MailSink,
{
    pub fn new(config: &'a AppConfig, source: S, clock: C, desktop: D, mailer: M) -> Self {
        Self {
            config,
            source,
            clock,
            desktop,
            mailer,
        }
    }

    /// Compose the report and push it through both channels regardless of either's result.
    pub fn send_weekly_notifications(&self) -> DispatchOutcome {
        let advice = self.advice();
        self.dispatch(&advice)
    }

    /// The scheduled job: same as `send_weekly_notifications`, unless the
    /// upcoming round is outside the configured reminder weeks. The round comes
    /// from the public snapshot, so the filter applies without an FPL id too.
    pub fn weekly_job(&self) -> WeeklyOutcome {
        match self.source.bootstrap() {
            Ok(boot) => {
                if let Some(round) = boot.next_event().map(|e| e.id) {
                    if !self.config.user.wants_reminder(round) {
                        info!(round, "round not in reminder weeks, skipping");
                        return WeeklyOutcome::Skipped { round };
                    }
                }
            }
            Err(err) => warn!(error = %err, "could not read next round, sending anyway"),
        }
        WeeklyOutcome::Dispatched(self.send_weekly_notifications())
    }

    fn advice(&self) -> Result<Advice, FetchError> {
        DeadlineAdvisor::new(&self.config.user, &self.source, &self.clock).advise()
    }

    fn dispatch(&self, advice: &Result<Advice, FetchError>) -> DispatchOutcome {
        let players = self.source.players();
        if let Err(err) = &players {
            warn!(error = %err, "player fetch failed for weekly report");
        }
        let report = compose_weekly_report(advice, &players);

        let desktop = self.desktop.notify(DESKTOP_TITLE, DESKTOP_MESSAGE);
        if let Err(err) = &desktop {
            warn!(error = %err, "desktop notification failed");
        }
        let email = self
            .mailer
            .send(EMAIL_SUBJECT, &report, &self.config.email.recipient);
        if let Err(err) = &email {
            warn!(error = %err, "email delivery failed");
        }

        DispatchOutcome {
            report,
            desktop,
            email,
        }
    }
}

pub fn compose_weekly_report(
    advice: &Result<Advice, FetchError>,
    players: &Result<Vec<Player>, FetchError>,
) -> String {
    let mut out = String::from("📊 FPL Weekly Report\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    let (deadline, chips) = advice_lines(advice);
    out.push_str(&deadline);
    out.push_str("\n\n🃏 Chip Advice:\n");
    for line in chips {
        out.push_str("• ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');

    let players = match players {
        Ok(players) => players,
        Err(err) => {
            out.push_str(&format!("❌ Failed to generate report: {err}\n"));
            return out;
        }
    };

    let n = WEEKLY_TOP_N;
    let blocks = [
        format::suggested_transfers_block(&report::suggested_transfers(players, n)),
        format::captain_line(report::captain_pick(players)),
        format::value_block(&report::value_for_money(players, n), n),
        format::transferred_in_block(&report::most_transferred_in(players, n), n),
        format::injury_block(&report::injury_report(players, n), n),
    ];
    out.push_str(&blocks.join("\n"));
    out
}
