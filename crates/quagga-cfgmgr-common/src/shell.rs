//! Shell execution for talking to the routing daemons.
//!
//! Commands run through `/bin/sh -c`, so every configuration fragment is
//! passed through [`shellquote`] before it is placed on a command line.
//!
//! ```ignore
//! use quagga_cfgmgr_common::shell::{self, shellquote, VTYSH_CMD};
//!
//! let cmd = format!("{} -c {}", VTYSH_CMD, shellquote("show running-config"));
//! let text = shell::exec_or_throw(&cmd).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{CfgMgrError, CfgMgrResult};

/// Path to the integrated Quagga/FRR shell.
pub const VTYSH_CMD: &str = "/usr/bin/vtysh";

/// Characters with special meaning inside double quotes: `$`, `` ` ``,
/// `"`, `\` and newline.
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Wraps `s` in double quotes, escaping the characters the shell would
/// otherwise interpret.
///
/// Route-map and AS-path rules routinely carry `$` and `\`
/// (`ip as-path access-list AS-1 permit ^65001$`), so this is applied to
/// every fragment.
///
/// ```
/// use quagga_cfgmgr_common::shell::shellquote;
///
/// assert_eq!(shellquote("router bgp 65000"), "\"router bgp 65000\"");
/// assert_eq!(shellquote("permit _65001$"), "\"permit _65001\\$\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Outcome of one shell invocation.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Exit code (0 = success, -1 if killed by a signal).
    pub exit_code: i32,
    /// Trimmed stdout.
    pub stdout: String,
    /// Trimmed stderr.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command exited with 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout and stderr joined for error messages.
    pub fn combined_output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Runs `cmd` through `/bin/sh -c`.
///
/// A non-zero exit is reported in the result, not as an error; only a
/// failure to spawn the shell is an `Err`.
pub async fn exec(cmd: &str) -> CfgMgrResult<ExecResult> {
    tracing::debug!(command = %cmd, "Executing shell command");

    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(cmd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CfgMgrError::ShellExec {
            command: cmd.to_string(),
            source: e,
        })?;

    let result = ExecResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if result.success() {
        tracing::trace!(command = %cmd, "Command succeeded");
    } else {
        tracing::warn!(
            command = %cmd,
            exit_code = result.exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Runs `cmd` and turns a non-zero exit into
/// [`CfgMgrError::ShellCommandFailed`]. Returns stdout on success.
pub async fn exec_or_throw(cmd: &str) -> CfgMgrResult<String> {
    let result = exec(cmd).await?;
    if result.success() {
        Ok(result.stdout)
    } else {
        Err(CfgMgrError::ShellCommandFailed {
            command: cmd.to_string(),
            exit_code: result.exit_code,
            output: result.combined_output(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shellquote_plain_fragment() {
        assert_eq!(shellquote("configure terminal"), "\"configure terminal\"");
        assert_eq!(shellquote(""), "\"\"");
    }

    #[test]
    fn test_shellquote_regex_rules() {
        assert_eq!(
            shellquote("ip as-path access-list AS-1 permit ^65001$"),
            "\"ip as-path access-list AS-1 permit ^65001\\$\""
        );
        assert_eq!(
            shellquote("set community `x`"),
            "\"set community \\`x\\`\""
        );
    }

    #[test]
    fn test_shellquote_quotes_and_backslashes() {
        assert_eq!(
            shellquote("description \"core\\1\""),
            "\"description \\\"core\\\\1\\\"\""
        );
        assert_eq!(shellquote("a\nb"), "\"a\\\nb\"");
    }

    #[test]
    fn test_combined_output() {
        let result = ExecResult {
            exit_code: 1,
            stdout: "% Unknown command".to_string(),
            stderr: "line 3".to_string(),
        };
        assert!(!result.success());
        assert_eq!(result.combined_output(), "% Unknown command\nline 3");

        let result = ExecResult {
            exit_code: 1,
            stdout: String::new(),
            stderr: "failed to connect".to_string(),
        };
        assert_eq!(result.combined_output(), "failed to connect");
    }

    #[tokio::test]
    async fn test_exec_keeps_quoted_dollar() {
        let cmd = format!("printf %s {}", shellquote("permit ^65001$"));
        let result = exec(&cmd).await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "permit ^65001$");
    }

    #[tokio::test]
    async fn test_exec_or_throw_failure() {
        match exec_or_throw("echo '% Unknown command' && exit 3").await {
            Err(CfgMgrError::ShellCommandFailed {
                exit_code, output, ..
            }) => {
                assert_eq!(exit_code, 3);
                assert_eq!(output, "% Unknown command");
            }
            other => panic!("Expected ShellCommandFailed error, got {:?}", other),
        }
    }
}
