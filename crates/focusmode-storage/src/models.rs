use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One finished focus session as stored in the history file.
///
/// The timestamp is a local, offset-free ISO-8601 date-time so that files
/// written by earlier releases keep parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub duration: u32,
    pub apps: Vec<String>,
    pub timestamp: NaiveDateTime,
}

impl SessionRecord {
    /// Record a session that ends now
    #[must_use]
    pub fn new(duration: u32, apps: Vec<String>) -> Self {
        Self::at(duration, apps, Local::now().naive_local())
    }

    #[must_use]
    pub fn at(duration: u32, apps: Vec<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            duration,
            apps,
            timestamp,
        }
    }
}
