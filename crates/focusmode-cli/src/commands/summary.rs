//! Weekly summary command

use anyhow::Result;
use chrono::Local;
use tabled::{Table, Tabled};

use focusmode_core::FocusConfig;
use focusmode_storage::HistoryStore;

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Blocked (minutes)")]
    minutes: u64,
}

/// Print focus totals for the last seven days
///
/// # Errors
///
/// Returns an error if the history file exists but cannot be read
pub fn show_weekly_summary(config: &FocusConfig) -> Result<()> {
    let store = HistoryStore::new(&config.history_file);

    let Some(summary) = store.weekly_summary(Local::now().naive_local())? else {
        println!("No session history to summarize.");
        return Ok(());
    };

    println!("\nWeekly Focus Summary:");
    println!(
        "Total time focused: {} minutes ({} sessions)",
        summary.total_minutes, summary.session_count
    );

    if summary.apps.is_empty() {
        return Ok(());
    }

    let rows: Vec<AppRow> = summary
        .apps
        .into_iter()
        .map(|t| AppRow {
            app: t.app,
            minutes: t.minutes,
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}
