use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;

use crate::blocker::{report_outcomes, BlockOutcome, ProcessBlocker, Verbosity};
use crate::cancel::CancellationToken;
use crate::config::FocusConfig;
use crate::error::HostsError;
use crate::hosts::HostsFile;
use crate::timer::{SessionTimer, TimerEvent, TimerOutcome};
use crate::watchdog::Watchdog;
use focusmode_storage::{HistoryStore, SessionRecord};

/// What the user asked for on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub duration_minutes: u32,
    /// Lower-cased app names, in the order given
    pub apps: Vec<String>,
    pub websites: Vec<String>,
    pub strict: bool,
    pub log_history: bool,
}

impl SessionPlan {
    #[must_use]
    pub fn new(duration_minutes: u32, apps: &[String], websites: Vec<String>) -> Self {
        Self {
            duration_minutes,
            apps: apps.iter().map(|a| a.to_lowercase()).collect(),
            websites,
            strict: false,
            log_history: false,
        }
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn log_history(mut self, log_history: bool) -> Self {
        self.log_history = log_history;
        self
    }

    #[must_use]
    pub fn total_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }
}

/// Facts about a session that ran to the end
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub duration_minutes: u32,
    pub apps: Vec<String>,
    pub websites: Vec<String>,
    pub websites_redirected: Vec<String>,
    pub strict_restarts: u32,
    pub watchdog_passes: u32,
    pub logged: Option<SessionRecord>,
}

#[derive(Debug, Clone)]
pub enum SessionOutcome {
    Completed(SessionReport),
    /// Non-strict interrupt. History and hosts cleanup were skipped.
    Interrupted {
        elapsed_secs: u64,
        watchdog_passes: u32,
    },
}

/// Runs one focus session end to end
pub struct FocusSession {
    blocker: Arc<ProcessBlocker>,
    hosts: HostsFile,
    history: HistoryStore,
    watchdog_interval: Duration,
}

impl FocusSession {
    #[must_use]
    pub fn new(
        blocker: ProcessBlocker,
        hosts: HostsFile,
        history: HistoryStore,
        watchdog_interval: Duration,
    ) -> Self {
        Self {
            blocker: Arc::new(blocker),
            hosts,
            history,
            watchdog_interval,
        }
    }

    /// Session wired to the real platform, hosts file and history file
    #[must_use]
    pub fn from_config(config: &FocusConfig) -> Self {
        Self::new(
            ProcessBlocker::for_current_platform(config.app_table()),
            HostsFile::new(&config.hosts_file, &config.redirect_ip),
            HistoryStore::new(&config.history_file),
            config.watchdog_interval(),
        )
    }

    /// Block, count down, then clean up.
    ///
    /// Website and app blocking problems are only warnings. On a non-strict
    /// interrupt the watchdog is stopped and everything after the countdown
    /// is skipped, redirects included.
    ///
    /// # Errors
    ///
    /// Returns an error if the watchdog task panics or the history file
    /// cannot be updated
    pub async fn run<F>(
        &self,
        plan: &SessionPlan,
        interrupts: &mut mpsc::UnboundedReceiver<()>,
        on_event: F,
    ) -> Result<SessionOutcome>
    where
        F: FnMut(TimerEvent),
    {
        log::info!(
            "Starting Focus Mode: {} min, apps [{}]{}",
            plan.duration_minutes,
            plan.apps.join(", "),
            if plan.strict { ", strict" } else { "" }
        );

        let outcomes = self.blocker.block_apps(&plan.apps).await;
        report_outcomes(&outcomes, Verbosity::Loud);
        if !outcomes.iter().any(BlockOutcome::is_blocked) {
            log::warn!("None of the requested apps can be blocked on this system");
        }

        let websites_redirected = self.redirect_websites(&plan.websites);

        let watchdog = Watchdog::new(
            self.blocker.clone(),
            plan.apps.clone(),
            self.watchdog_interval,
        )
        .spawn(CancellationToken::new());

        let timer = SessionTimer::new(plan.total_secs(), plan.strict);
        let timer_outcome = timer.run(interrupts, on_event).await;
        let watchdog_passes = watchdog.stop().await?;

        let strict_restarts = match timer_outcome {
            TimerOutcome::Completed { restarts } => restarts,
            TimerOutcome::Interrupted { elapsed_secs } => {
                return Ok(SessionOutcome::Interrupted {
                    elapsed_secs,
                    watchdog_passes,
                });
            }
        };

        let logged = if plan.log_history {
            Some(self.history.log_session(plan.duration_minutes, &plan.apps)?)
        } else {
            None
        };

        if !plan.websites.is_empty() {
            if let Err(e) = self.hosts.unblock_websites(&plan.websites) {
                log::warn!("Error unblocking websites: {e}");
            }
        }

        Ok(SessionOutcome::Completed(SessionReport {
            duration_minutes: plan.duration_minutes,
            apps: plan.apps.clone(),
            websites: plan.websites.clone(),
            websites_redirected,
            strict_restarts,
            watchdog_passes,
            logged,
        }))
    }

    fn redirect_websites(&self, websites: &[String]) -> Vec<String> {
        if websites.is_empty() {
            return Vec::new();
        }
        match self.hosts.block_websites(websites) {
            Ok(added) => added,
            Err(e @ HostsError::PermissionDenied { .. }) => {
                log::warn!("You need to run as administrator to block websites ({e})");
                Vec::new()
            }
            Err(e) => {
                log::warn!("Website blocking skipped: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocker::{testing::RecordingTerminator, AppTable};
    use crate::hosts::DEFAULT_REDIRECT_IP;

    const HOSTS: &str = "127.0.0.1 localhost\n";

    struct Fixture {
        _dir: tempfile::TempDir,
        terminator: RecordingTerminator,
        session: FocusSession,
        hosts_path: std::path::PathBuf,
        history_path: std::path::PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let hosts_path = dir.path().join("hosts");
        let history_path = dir.path().join("history.json");
        std::fs::write(&hosts_path, HOSTS).unwrap();

        let terminator = RecordingTerminator::default();
        let session = FocusSession::new(
            ProcessBlocker::new(AppTable::builtin(), Box::new(terminator.clone())),
            HostsFile::new(&hosts_path, DEFAULT_REDIRECT_IP),
            HistoryStore::new(&history_path),
            Duration::from_secs(10),
        );

        Fixture {
            _dir: dir,
            terminator,
            session,
            hosts_path,
            history_path,
        }
    }

    fn plan(apps: &[&str], websites: &[&str]) -> SessionPlan {
        let apps: Vec<String> = apps.iter().map(ToString::to_string).collect();
        SessionPlan::new(1, &apps, websites.iter().map(ToString::to_string).collect())
    }

    fn interrupt_after(at: Duration) -> mpsc::UnboundedReceiver<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            tokio::time::sleep(at).await;
            let _ = tx.send(());
        });
        rx
    }

    #[test]
    fn test_plan_lowercases_apps() {
        let plan = plan(&["Chrome", "DISCORD"], &[]).strict(true);
        assert_eq!(plan.apps, vec!["chrome", "discord"]);
        assert!(plan.strict);
        assert_eq!(plan.total_secs(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_session_logs_and_cleans_up() {
        let fx = fixture();
        let plan = plan(&["chrome", "mystery"], &["youtube.com"]).log_history(true);
        let (_tx, mut rx) = mpsc::unbounded_channel();
        let mut ticks = 0;

        let outcome = fx
            .session
            .run(&plan, &mut rx, |event| {
                if matches!(event, TimerEvent::Tick { .. }) {
                    ticks += 1;
                }
            })
            .await
            .unwrap();

        let SessionOutcome::Completed(report) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(ticks, 60);
        assert_eq!(report.websites_redirected, vec!["youtube.com"]);
        assert_eq!(report.watchdog_passes, 6);
        assert_eq!(report.logged.as_ref().unwrap().duration, 1);

        // unknown app skipped, valid one blocked by the first pass and the watchdog
        let calls = fx.terminator.calls();
        assert!(calls.iter().all(|c| c == "chrome"));
        assert_eq!(calls.len() as u32, 1 + report.watchdog_passes);

        let history = HistoryStore::new(&fx.history_path).load().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].apps, vec!["chrome", "mystery"]);

        assert_eq!(std::fs::read_to_string(&fx.hosts_path).unwrap(), HOSTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_is_optional() {
        let fx = fixture();
        let (_tx, mut rx) = mpsc::unbounded_channel();

        let outcome = fx
            .session
            .run(&plan(&["steam"], &[]), &mut rx, |_| {})
            .await
            .unwrap();

        assert!(matches!(outcome, SessionOutcome::Completed(ref r) if r.logged.is_none()));
        assert!(!fx.history_path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_skips_history_and_leaves_redirects() {
        let fx = fixture();
        let plan = plan(&["chrome"], &["reddit.com"]).log_history(true);
        let mut rx = interrupt_after(Duration::from_millis(15_500));

        let outcome = fx.session.run(&plan, &mut rx, |_| {}).await.unwrap();

        assert!(matches!(
            outcome,
            SessionOutcome::Interrupted {
                elapsed_secs: 15,
                watchdog_passes: 2
            }
        ));
        assert!(!fx.history_path.exists());
        assert!(std::fs::read_to_string(&fx.hosts_path)
            .unwrap()
            .contains("127.0.0.1 reddit.com"));

        // watchdog is gone once run() returns
        let calls = fx.terminator.call_count();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fx.terminator.call_count(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_interrupt_still_completes() {
        let fx = fixture();
        let plan = plan(&["chrome"], &[]).strict(true).log_history(true);
        let mut rx = interrupt_after(Duration::from_millis(20_500));

        let outcome = fx.session.run(&plan, &mut rx, |_| {}).await.unwrap();

        let SessionOutcome::Completed(report) = outcome else {
            panic!("strict session must complete");
        };
        assert_eq!(report.strict_restarts, 1);
        assert!(report.logged.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_hosts_file_does_not_stop_session() {
        let fx = fixture();
        std::fs::remove_file(&fx.hosts_path).unwrap();
        let (_tx, mut rx) = mpsc::unbounded_channel();

        let outcome = fx
            .session
            .run(&plan(&["chrome"], &["youtube.com"]), &mut rx, |_| {})
            .await
            .unwrap();

        let SessionOutcome::Completed(report) = outcome else {
            panic!("expected completion");
        };
        assert!(report.websites_redirected.is_empty());
        assert_eq!(report.websites, vec!["youtube.com"]);
    }

    #[cfg(unix)]
    #[tokio::test(start_paused = true)]
    async fn test_read_only_hosts_does_not_stop_session() {
        use std::os::unix::fs::PermissionsExt;

        let fx = fixture();
        std::fs::set_permissions(&fx.hosts_path, std::fs::Permissions::from_mode(0o444))
            .unwrap();
        // privileged users ignore file modes, nothing to exercise then
        if std::fs::OpenOptions::new()
            .write(true)
            .open(&fx.hosts_path)
            .is_ok()
        {
            return;
        }
        let (_tx, mut rx) = mpsc::unbounded_channel();

        let outcome = fx
            .session
            .run(&plan(&["chrome"], &["youtube.com"]), &mut rx, |_| {})
            .await
            .unwrap();

        let SessionOutcome::Completed(report) = outcome else {
            panic!("expected completion");
        };
        assert!(report.websites_redirected.is_empty());
        assert_eq!(std::fs::read_to_string(&fx.hosts_path).unwrap(), HOSTS);
        assert!(matches!(
            fx.session.hosts.block_websites(&report.websites),
            Err(HostsError::PermissionDenied { .. })
        ));
    }
}
