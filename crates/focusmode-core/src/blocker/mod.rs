use async_trait::async_trait;
use serde::Deserialize;
use std::{collections::BTreeMap, fmt};

use crate::error::BlockError;

pub mod linux;
pub mod macos;
pub mod windows;

/// Operating system family, as far as blocking is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::Other => std::env::consts::OS,
        };
        f.write_str(name)
    }
}

/// Process identifiers of one application, per platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppIdentifiers {
    pub windows: Option<String>,
    pub macos: Option<String>,
    pub linux: Option<String>,
}

impl AppIdentifiers {
    fn new(windows: &str, macos: &str, linux: Option<&str>) -> Self {
        Self {
            windows: Some(windows.to_string()),
            macos: Some(macos.to_string()),
            linux: linux.map(ToString::to_string),
        }
    }

    #[must_use]
    pub fn for_platform(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Windows => self.windows.as_deref(),
            Platform::MacOs => self.macos.as_deref(),
            Platform::Linux => self.linux.as_deref(),
            Platform::Other => None,
        }
    }
}

/// Lookup from symbolic app name to process identifiers
#[derive(Debug, Clone)]
pub struct AppTable {
    entries: BTreeMap<String, AppIdentifiers>,
}

impl AppTable {
    /// The apps known out of the box
    #[must_use]
    pub fn builtin() -> Self {
        let entries = [
            (
                "chrome",
                AppIdentifiers::new("chrome.exe", "Google Chrome", Some("chrome")),
            ),
            (
                "discord",
                AppIdentifiers::new("Discord.exe", "Discord", Some("Discord")),
            ),
            (
                "steam",
                AppIdentifiers::new("steam.exe", "Steam", Some("steam")),
            ),
            (
                "spotify",
                AppIdentifiers::new("Spotify.exe", "Spotify", Some("spotify")),
            ),
            (
                "whatsapp",
                AppIdentifiers::new("WhatsApp.exe", "WhatsApp", None),
            ),
        ]
        .into_iter()
        .map(|(name, ids)| (name.to_string(), ids))
        .collect();

        Self { entries }
    }

    /// Built-in table with user entries layered on top.
    ///
    /// An override only replaces the platforms it names.
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<String, AppIdentifiers>) -> Self {
        let mut table = Self::builtin();
        for (name, ids) in overrides {
            let entry = table.entries.entry(name.to_lowercase()).or_default();
            if ids.windows.is_some() {
                entry.windows.clone_from(&ids.windows);
            }
            if ids.macos.is_some() {
                entry.macos.clone_from(&ids.macos);
            }
            if ids.linux.is_some() {
                entry.linux.clone_from(&ids.linux);
            }
        }
        table
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AppIdentifiers> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for AppTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Platform-specific way of making an application go away
#[async_trait]
pub trait ProcessTerminator: Send + Sync {
    /// Platform whose identifiers this terminator understands
    fn platform(&self) -> Platform;

    /// Send a one-shot terminate/quit to the process.
    ///
    /// A process that is not running is not an error.
    async fn terminate(&self, process: &str) -> Result<(), BlockError>;
}

/// Terminator for platforms without a blocking mechanism
pub struct UnsupportedTerminator;

#[async_trait]
impl ProcessTerminator for UnsupportedTerminator {
    fn platform(&self) -> Platform {
        Platform::Other
    }

    async fn terminate(&self, _process: &str) -> Result<(), BlockError> {
        Err(BlockError::UnsupportedPlatform {
            platform: Platform::Other.to_string(),
        })
    }
}

/// Create the terminator for the running platform
#[must_use]
pub fn create_terminator() -> Box<dyn ProcessTerminator> {
    match Platform::current() {
        Platform::Windows => Box::new(windows::TaskkillTerminator),
        Platform::MacOs => Box::new(macos::OsascriptTerminator),
        Platform::Linux => Box::new(linux::SignalTerminator),
        Platform::Other => Box::new(UnsupportedTerminator),
    }
}

/// Result of blocking one app during a pass
#[derive(Debug)]
pub enum BlockOutcome {
    Blocked {
        app: String,
        process: String,
    },
    /// Name missing from the app table
    Unknown { app: String },
    /// Known app without an identifier for this platform
    Unsupported { app: String, platform: Platform },
    Failed {
        app: String,
        process: String,
        error: BlockError,
    },
}

impl BlockOutcome {
    #[must_use]
    pub fn app(&self) -> &str {
        match self {
            Self::Blocked { app, .. }
            | Self::Unknown { app }
            | Self::Unsupported { app, .. }
            | Self::Failed { app, .. } => app,
        }
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// How loudly a pass should be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// First pass of a session: every outcome is shown
    Loud,
    /// Repeated watchdog passes: only failures surface
    Quiet,
}

/// Log the outcome of one blocking pass
pub fn report_outcomes(outcomes: &[BlockOutcome], verbosity: Verbosity) {
    for outcome in outcomes {
        match (outcome, verbosity) {
            (BlockOutcome::Blocked { app, process }, Verbosity::Loud) => {
                log::info!("Blocked: {app} ({process})");
            }
            (BlockOutcome::Blocked { app, .. }, Verbosity::Quiet) => {
                log::debug!("Watchdog pass blocked {app}");
            }
            (BlockOutcome::Unknown { app }, Verbosity::Loud) => {
                log::warn!("Unsupported or unknown app: {app}");
            }
            (BlockOutcome::Unsupported { app, platform }, Verbosity::Loud) => {
                log::warn!("Unsupported or unknown app: {app} (nothing to block on {platform})");
            }
            (BlockOutcome::Unknown { app } | BlockOutcome::Unsupported { app, .. }, _) => {
                log::debug!("Skipping {app}");
            }
            (BlockOutcome::Failed { app, error, .. }, _) => {
                log::warn!("Error blocking {app}: {error}");
            }
        }
    }
}

/// Resolves app names and terminates the matching processes
pub struct ProcessBlocker {
    table: AppTable,
    terminator: Box<dyn ProcessTerminator>,
}

impl ProcessBlocker {
    #[must_use]
    pub fn new(table: AppTable, terminator: Box<dyn ProcessTerminator>) -> Self {
        Self { table, terminator }
    }

    /// Blocker for the running platform
    #[must_use]
    pub fn for_current_platform(table: AppTable) -> Self {
        Self::new(table, create_terminator())
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.terminator.platform()
    }

    /// Block every app in order.
    ///
    /// Never fails as a whole: each app gets its own outcome and a failure
    /// does not stop the pass.
    pub async fn block_apps(&self, names: &[String]) -> Vec<BlockOutcome> {
        let platform = self.platform();
        let mut outcomes = Vec::with_capacity(names.len());

        for name in names {
            let app = name.to_lowercase();
            let Some(ids) = self.table.get(&app) else {
                outcomes.push(BlockOutcome::Unknown { app });
                continue;
            };
            let Some(process) = ids.for_platform(platform) else {
                outcomes.push(BlockOutcome::Unsupported { app, platform });
                continue;
            };

            let process = process.to_string();
            let outcome = match self.terminator.terminate(&process).await {
                Ok(()) => BlockOutcome::Blocked { app, process },
                Err(error) => BlockOutcome::Failed {
                    app,
                    process,
                    error,
                },
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}
