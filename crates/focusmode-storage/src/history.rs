use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::models::SessionRecord;
use crate::summary::WeeklySummary;

/// Default history location, relative to the working directory
pub const DEFAULT_HISTORY_FILE: &str = ".focus_history.json";

/// Append-only JSON history of focus sessions.
///
/// Every write reads the whole file and writes it back. There is no locking,
/// sessions are expected to run one at a time.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load every recorded session, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(&self) -> Result<Vec<SessionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse history file {}", self.path.display()))
    }

    /// Append a record and rewrite the file
    ///
    /// # Errors
    ///
    /// Returns an error if the existing history cannot be loaded or the file cannot be written
    pub fn append(&self, record: SessionRecord) -> Result<()> {
        let mut history = self.load()?;
        history.push(record);
        self.write_all(&history)?;
        log::debug!(
            "History now holds {} sessions ({})",
            history.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Record a session that just finished
    ///
    /// # Errors
    ///
    /// Returns an error if the history file cannot be read or written
    pub fn log_session(&self, duration: u32, apps: &[String]) -> Result<SessionRecord> {
        let record = SessionRecord::new(duration, apps.to_vec());
        self.append(record.clone())?;
        log::info!("Logged {duration} minute session to {}", self.path.display());
        Ok(record)
    }

    /// Aggregate the sessions of the seven days before `now`.
    ///
    /// Returns `None` when there is no history file at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the history file cannot be read or parsed
    pub fn weekly_summary(&self, now: NaiveDateTime) -> Result<Option<WeeklySummary>> {
        if !self.exists() {
            return Ok(None);
        }
        let history = self.load()?;
        Ok(Some(WeeklySummary::from_sessions(&history, now)))
    }

    fn write_all(&self, history: &[SessionRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create history directory")?;
            }
        }

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        history
            .serialize(&mut serializer)
            .context("Failed to serialize history")?;

        std::fs::write(&self.path, buffer)
            .with_context(|| format!("Failed to write history file {}", self.path.display()))
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_FILE)
    }
}
