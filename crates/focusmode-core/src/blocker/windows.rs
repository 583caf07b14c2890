use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use super::{Platform, ProcessTerminator};
use crate::error::BlockError;

/// Force-kills every process with the given image name via `taskkill`
pub struct TaskkillTerminator;

#[async_trait]
impl ProcessTerminator for TaskkillTerminator {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    async fn terminate(&self, process: &str) -> Result<(), BlockError> {
        let status = Command::new("taskkill")
            .args(["/F", "/IM", process])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| BlockError::Launch {
                command: "taskkill",
                process: process.to_string(),
                source,
            })?;

        // taskkill exits non-zero when the image is not running
        if !status.success() {
            log::debug!("taskkill /IM {process} exited with {status}");
        }
        Ok(())
    }
}
