use chrono::{Duration, NaiveDateTime};

use crate::models::SessionRecord;

/// Minutes an app spent blocked within the summary window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTotal {
    pub app: String,
    pub minutes: u64,
}

/// Focus time of the last seven days
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySummary {
    pub total_minutes: u64,
    pub session_count: usize,
    /// Per-app totals in the order the apps first appear in the history
    pub apps: Vec<AppTotal>,
}

impl WeeklySummary {
    pub const WINDOW_DAYS: i64 = 7;

    /// Aggregate every session stamped at or after `now - 7 days`.
    ///
    /// Each blocked app is credited with the full session duration, no matter
    /// how many other apps were blocked alongside it.
    #[must_use]
    pub fn from_sessions(sessions: &[SessionRecord], now: NaiveDateTime) -> Self {
        let cutoff = now - Duration::days(Self::WINDOW_DAYS);
        let mut summary = Self::default();

        for session in sessions.iter().filter(|s| s.timestamp >= cutoff) {
            let minutes = u64::from(session.duration);
            summary.total_minutes += minutes;
            summary.session_count += 1;

            for app in &session.apps {
                match summary.apps.iter_mut().find(|t| &t.app == app) {
                    Some(total) => total.minutes += minutes,
                    None => summary.apps.push(AppTotal {
                        app: app.clone(),
                        minutes,
                    }),
                }
            }
        }

        summary
    }

    #[must_use]
    pub fn minutes_for(&self, app: &str) -> Option<u64> {
        self.apps.iter().find(|t| t.app == app).map(|t| t.minutes)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.session_count == 0
    }
}
