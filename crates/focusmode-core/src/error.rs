//! Typed errors for the blocking primitives.
//!
//! Both are advisory: the session keeps running when they occur, callers only
//! need to tell them apart to phrase the warning.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to terminate a single application
#[derive(Error, Debug)]
pub enum BlockError {
    /// The terminate command could not be started
    #[error("failed to run {command} for {process}: {source}")]
    Launch {
        command: &'static str,
        process: String,
        #[source]
        source: std::io::Error,
    },

    /// The OS refused to deliver the kill signal
    #[error("could not signal {process} (pid {pid})")]
    SignalRefused { process: String, pid: u32 },

    /// No terminate mechanism exists on this platform
    #[error("blocking apps is not supported on {platform}")]
    UnsupportedPlatform { platform: String },
}

/// Failure to edit the hosts file
#[derive(Error, Debug)]
pub enum HostsError {
    /// The hosts file exists but is not writable by this process
    #[error("no write access to {path} (run as administrator to block websites)")]
    PermissionDenied { path: PathBuf },

    /// Any other read or write failure
    #[error("failed to update {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HostsError {
    pub(crate) fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
