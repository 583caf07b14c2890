pub mod blocker;
pub mod cancel;
pub mod config;
pub mod error;
pub mod hosts;
pub mod session;
pub mod timer;
pub mod watchdog;

pub use blocker::{BlockOutcome, Platform, ProcessBlocker};
pub use cancel::CancellationToken;
pub use config::FocusConfig;
pub use error::{BlockError, HostsError};
pub use hosts::HostsFile;
pub use session::{FocusSession, SessionOutcome, SessionPlan, SessionReport};
pub use timer::{SessionTimer, TimerEvent, TimerOutcome};
pub use watchdog::{Watchdog, WatchdogHandle};
