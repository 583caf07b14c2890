use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use super::{Platform, ProcessTerminator};
use crate::error::BlockError;

/// Asks an application to quit through AppleScript
pub struct OsascriptTerminator;

#[async_trait]
impl ProcessTerminator for OsascriptTerminator {
    fn platform(&self) -> Platform {
        Platform::MacOs
    }

    async fn terminate(&self, process: &str) -> Result<(), BlockError> {
        let status = Command::new("osascript")
            .arg("-e")
            .arg(quit_script(process))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| BlockError::Launch {
                command: "osascript",
                process: process.to_string(),
                source,
            })?;

        if !status.success() {
            log::debug!("osascript quit {process} exited with {status}");
        }
        Ok(())
    }
}

fn quit_script(app_name: &str) -> String {
    let escaped = app_name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("quit app \"{escaped}\"")
}
