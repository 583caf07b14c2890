//! Focus session command: wiring, Ctrl-C forwarding and the progress line

use anyhow::Result;
use std::io::Write;
use tokio::sync::mpsc;

use focusmode_core::{
    FocusConfig, FocusSession, SessionOutcome, SessionPlan, SessionReport, TimerEvent,
};

use super::helpers::{format_clock, percent, progress_bar};

const BAR_WIDTH: usize = 30;

/// Forward every Ctrl-C into the timer's interrupt channel
fn forward_ctrl_c() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Cannot listen for Ctrl-C: {e}");
                break;
            }
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Render one timer event on the terminal
fn render(event: TimerEvent) {
    let mut stdout = std::io::stdout().lock();
    match event {
        TimerEvent::Tick {
            elapsed_secs,
            total_secs,
        } => {
            let _ = write!(
                stdout,
                "\rFocusing... {} {:>3}% {} remaining ",
                progress_bar(elapsed_secs, total_secs, BAR_WIDTH),
                percent(elapsed_secs, total_secs),
                format_clock(total_secs.saturating_sub(elapsed_secs)),
            );
        }
        TimerEvent::Refused { remaining_secs, .. } => {
            let _ = writeln!(
                stdout,
                "\nStrict mode: Can't exit focus early. {} to go.",
                format_clock(remaining_secs)
            );
        }
    }
    let _ = stdout.flush();
}

/// Run a focus session from start to finish
///
/// # Errors
///
/// Returns an error if the history file cannot be written or the watchdog fails
pub async fn run_session(config: &FocusConfig, plan: &SessionPlan) -> Result<SessionOutcome> {
    println!("Starting Focus Mode...");
    let session = FocusSession::from_config(config);
    let mut interrupts = forward_ctrl_c();
    session.run(plan, &mut interrupts, render).await
}

pub fn print_end_summary(report: &SessionReport) {
    println!();
    println!("Focus session complete!");
    println!("Duration: {} minutes", report.duration_minutes);
    println!("Apps blocked: {}", report.apps.join(", "));
    if !report.websites.is_empty() {
        println!("Websites blocked: {}", report.websites.join(", "));
    }
    if report.strict_restarts > 0 {
        println!("Early exits refused: {}", report.strict_restarts);
    }
    if report.logged.is_some() {
        println!("Session saved to history.");
    }
    println!("Well done. Time well used.");
}
