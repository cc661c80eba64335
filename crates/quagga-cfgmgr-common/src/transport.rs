//! Command channel to the routing daemons.
//!
//! A [`Transport`] takes one ordered list of CLI fragments and submits it
//! as a unit, returning whatever text the daemon printed. The reconciler
//! only ever talks to the device through this trait, so tests substitute a
//! recording mock.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::{CfgMgrError, CfgMgrResult};
use crate::shell::{self, shellquote, VTYSH_CMD};

/// Fragment that prints the running configuration.
pub const SHOW_RUNNING_CONFIG: &str = "show running-config";

/// Prefix `vtysh` puts on lines reporting a rejected command.
const REJECTION_PREFIX: &str = "% ";

/// Executes CLI fragments against a device.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submits `fragments` in order as a single invocation and returns the
    /// raw output. Fails if the device rejects any fragment.
    async fn execute(&self, fragments: &[String]) -> CfgMgrResult<String>;

    /// Reads the current running configuration.
    async fn running_config(&self) -> CfgMgrResult<String> {
        self.execute(&[SHOW_RUNNING_CONFIG.to_string()]).await
    }
}

/// [`Transport`] backed by the `vtysh` binary.
#[derive(Debug, Clone)]
pub struct VtyshTransport {
    binary: String,
}

impl VtyshTransport {
    /// Uses the `vtysh` at `binary`.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the `vtysh` binary in use.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Shell command line submitting `fragments`, one `-c` per fragment.
    pub fn command_line(&self, fragments: &[String]) -> String {
        let mut cmd = self.binary.clone();
        for fragment in fragments {
            cmd.push_str(" -c ");
            cmd.push_str(&shellquote(fragment));
        }
        cmd
    }
}

impl Default for VtyshTransport {
    fn default() -> Self {
        Self::new(VTYSH_CMD)
    }
}

#[async_trait]
impl Transport for VtyshTransport {
    #[instrument(skip(self, fragments), fields(fragments = fragments.len()))]
    async fn execute(&self, fragments: &[String]) -> CfgMgrResult<String> {
        let cmd = self.command_line(fragments);
        let output = shell::exec_or_throw(&cmd).await?;

        // Older vtysh builds exit 0 after rejecting a line.
        if let Some(rejection) = rejected_line(&output) {
            return Err(CfgMgrError::ShellCommandFailed {
                command: cmd,
                exit_code: 0,
                output: rejection.to_string(),
            });
        }

        debug!(bytes = output.len(), "vtysh completed");
        Ok(output)
    }
}

fn rejected_line(output: &str) -> Option<&str> {
    output
        .lines()
        .map(str::trim_start)
        .find(|line| line.starts_with(REJECTION_PREFIX))
}
