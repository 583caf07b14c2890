use async_trait::async_trait;
use sysinfo::System;

use super::{Platform, ProcessTerminator};
use crate::error::BlockError;

/// Kills every process whose executable name matches exactly
pub struct SignalTerminator;

#[async_trait]
impl ProcessTerminator for SignalTerminator {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    async fn terminate(&self, process: &str) -> Result<(), BlockError> {
        let mut system = System::new();
        system.refresh_processes();

        let own_pid = std::process::id();
        let mut matched = 0usize;
        let mut refused = None;

        for proc_ in system.processes_by_exact_name(process) {
            let pid = proc_.pid().as_u32();
            if pid == own_pid {
                continue;
            }
            matched += 1;
            if !proc_.kill() {
                refused = Some(pid);
            }
        }

        if let Some(pid) = refused {
            return Err(BlockError::SignalRefused {
                process: process.to_string(),
                pid,
            });
        }

        if matched == 0 {
            log::debug!("No running process named {process}");
        } else {
            log::debug!("Sent kill to {matched} {process} process(es)");
        }
        Ok(())
    }
}
