mod common;

use std::cell::RefCell;

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use common::{FakeSource, parse_failure};
use fpl_helper::advisor::Advice;
use fpl_helper::clock::ManualClock;
use fpl_helper::config::{AppConfig, EmailConfig};
use fpl_helper::error::{ConfigError, DeliveryError};
use fpl_helper::notify::{
    DESKTOP_TITLE, DesktopSink, Dispatcher, EMAIL_SUBJECT, MailSink, SmtpMailer, WeeklyOutcome,
    compose_weekly_report,
};

fn at(raw: &str) -> DateTime<FixedOffset> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .expect("valid timestamp")
        .and_utc()
        .fixed_offset()
}

#[derive(Default)]
struct RecordingDesktop {
    fail: bool,
    sent: RefCell<Vec<(String, String)>>,
}

impl DesktopSink for RecordingDesktop {
    fn notify(&self, title: &str, message: &str) -> Result<(), DeliveryError> {
        self.sent
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
        if self.fail {
            return Err(DeliveryError::Desktop("no notifier".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingMail {
    fail: bool,
    sent: RefCell<Vec<(String, String, String)>>,
}

impl MailSink for RecordingMail {
    fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError> {
        self.sent
            .borrow_mut()
            .push((subject.to_string(), body.to_string(), recipient.to_string()));
        if self.fail {
            return Err(DeliveryError::Build("relay down".to_string()));
        }
        Ok(())
    }
}

fn configured() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.user.fpl_id = "123456".to_string();
    cfg.email.recipient = "me@example.com".to_string();
    cfg
}

fn email_config(sender: &str, password: &str) -> EmailConfig {
    EmailConfig {
        // Reserved TLD: any attempt to connect would fail loudly, not hang.
        smtp_host: "smtp.invalid".to_string(),
        smtp_port: 587,
        sender: sender.to_string(),
        password: password.to_string(),
        recipient: "me@example.com".to_string(),
    }
}

#[test]
fn mail_with_empty_sender_fails_before_connecting() {
    let mailer = SmtpMailer::new(email_config("", "secret"));
    let err = mailer
        .send("subject", "body", "me@example.com")
        .unwrap_err();
    assert!(matches!(
        err,
        DeliveryError::NotConfigured(ConfigError::Missing("SMTP_SENDER"))
    ));
}

#[test]
fn mail_with_placeholder_password_fails_before_connecting() {
    let mailer = SmtpMailer::new(email_config("bot@example.com", "your_app_password"));
    let err = mailer
        .send("subject", "body", "me@example.com")
        .unwrap_err();
    assert!(matches!(
        err,
        DeliveryError::NotConfigured(ConfigError::Missing("SMTP_PASSWORD"))
    ));
}

#[test]
fn mail_without_recipient_is_not_configured() {
    let mailer = SmtpMailer::new(email_config("bot@example.com", "secret"));
    let err = mailer.send("subject", "body", "").unwrap_err();
    assert!(matches!(
        err,
        DeliveryError::NotConfigured(ConfigError::Missing("SMTP_RECIPIENT"))
    ));
}

#[test]
fn mail_with_bad_sender_address_is_address_error() {
    let mailer = SmtpMailer::new(email_config("not-an-email", "secret"));
    let err = mailer.send("subject", "body", "me@example.com").unwrap_err();
    assert!(matches!(err, DeliveryError::Address(_)));
}

#[test]
fn weekly_notifications_use_both_channels() {
    let cfg = configured();
    let source = FakeSource::from_fixtures();
    let clock = ManualClock::new(at("2024-11-20T11:00:00"));
    let desktop = RecordingDesktop::default();
    let mail = RecordingMail::default();

    let outcome =
        Dispatcher::new(&cfg, &source, &clock, &desktop, &mail).send_weekly_notifications();
    assert!(outcome.desktop.is_ok());
    assert!(outcome.email.is_ok());

    let sent = mail.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, EMAIL_SUBJECT);
    assert_eq!(sent[0].1, outcome.report);
    assert_eq!(sent[0].2, "me@example.com");
    assert_eq!(desktop.sent.borrow()[0].0, DESKTOP_TITLE);
}

#[test]
fn desktop_failure_does_not_stop_email() {
    let cfg = configured();
    let source = FakeSource::from_fixtures();
    let clock = ManualClock::new(at("2024-11-20T11:00:00"));
    let desktop = RecordingDesktop {
        fail: true,
        ..Default::default()
    };
    let mail = RecordingMail {
        fail: true,
        ..Default::default()
    };

    let outcome =
        Dispatcher::new(&cfg, &source, &clock, &desktop, &mail).send_weekly_notifications();
    assert!(matches!(outcome.desktop, Err(DeliveryError::Desktop(_))));
    assert!(outcome.email.is_err());
    assert_eq!(desktop.sent.borrow().len(), 1);
    assert_eq!(mail.sent.borrow().len(), 1);
}

#[test]
fn weekly_job_skips_rounds_outside_reminder_weeks() {
    let mut cfg = configured();
    cfg.user.reminder_weeks = [1, 2, 3].into_iter().collect();
    let source = FakeSource::from_fixtures();
    let clock = ManualClock::new(at("2024-11-20T11:00:00"));
    let desktop = RecordingDesktop::default();
    let mail = RecordingMail::default();

    let outcome = Dispatcher::new(&cfg, &source, &clock, &desktop, &mail).weekly_job();
    assert!(matches!(outcome, WeeklyOutcome::Skipped { round: 12 }));
    assert!(mail.sent.borrow().is_empty());
    assert!(desktop.sent.borrow().is_empty());
}

#[test]
fn weekly_job_filters_weeks_without_fpl_id() {
    let mut cfg = AppConfig::default();
    cfg.email.recipient = "me@example.com".to_string();
    cfg.user.reminder_weeks = [1, 2, 3].into_iter().collect();
    let source = FakeSource::from_fixtures();
    let clock = ManualClock::new(at("2024-11-20T11:00:00"));
    let desktop = RecordingDesktop::default();
    let mail = RecordingMail::default();

    let outcome = Dispatcher::new(&cfg, &source, &clock, &desktop, &mail).weekly_job();
    assert!(matches!(outcome, WeeklyOutcome::Skipped { round: 12 }));
    assert!(mail.sent.borrow().is_empty());
    assert_eq!(source.entry_calls.get(), 0);
}

#[test]
fn weekly_job_sends_when_round_is_unknown() {
    let mut cfg = configured();
    cfg.user.reminder_weeks = [1, 2, 3].into_iter().collect();
    let mut source = FakeSource::from_fixtures();
    source.fail_bootstrap = true;
    let clock = ManualClock::new(at("2024-11-20T11:00:00"));
    let desktop = RecordingDesktop::default();
    let mail = RecordingMail::default();

    let outcome = Dispatcher::new(&cfg, &source, &clock, &desktop, &mail).weekly_job();
    assert!(matches!(outcome, WeeklyOutcome::Dispatched(_)));
    assert_eq!(mail.sent.borrow().len(), 1);
}

#[test]
fn weekly_job_sends_for_eligible_round() {
    let cfg = configured();
    let source = FakeSource::from_fixtures();
    let clock = ManualClock::new(at("2024-11-20T11:00:00"));
    let desktop = RecordingDesktop::default();
    let mail = RecordingMail::default();

    let outcome = Dispatcher::new(&cfg, &source, &clock, &desktop, &mail).weekly_job();
    assert!(matches!(outcome, WeeklyOutcome::Dispatched(_)));
    assert_eq!(mail.sent.borrow().len(), 1);
}

#[test]
fn report_contains_every_block_in_order() {
    let players = Ok(common::fixture_bootstrap().players);
    let report = compose_weekly_report(&Ok(Advice::Unconfigured), &players);

    let order = [
        "📊 FPL Weekly Report",
        "⏰ Set your FPL ID",
        "🃏 Chip Advice:",
        "💡 Suggested Transfers:",
        "🧢 Recommended Captain: Salah",
        "💸 Top 5 Value for Money",
        "⬆️ Top 5 Most Transferred In",
        "🚑 Top 5 Expensive Injured",
    ];
    let mut cursor = 0;
    for marker in order {
        let idx = report[cursor..]
            .find(marker)
            .unwrap_or_else(|| panic!("missing {marker:?} after byte {cursor}"));
        cursor += idx + marker.len();
    }
    assert!(report.contains("• Raya - 100 pts - £5.5m - 18.18 pts/m"));
    assert!(report.contains("• Saka - Status: i - £10.0m"));
}

#[test]
fn report_survives_player_fetch_failure() {
    let report = compose_weekly_report(&Ok(Advice::Unconfigured), &Err(parse_failure()));
    assert!(report.contains("⏰ Set your FPL ID"));
    assert!(report.contains("❌ Failed to generate report"));
    assert!(!report.contains("Suggested Transfers"));
}
