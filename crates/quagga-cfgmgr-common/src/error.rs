//! Error types for configuration manager operations.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use quagga_config::ConfigError;
use std::io;
use thiserror::Error;

/// Result type alias for cfgmgr operations.
pub type CfgMgrResult<T> = Result<T, CfgMgrError>;

/// Errors that can occur while reading or changing the device configuration.
#[derive(Debug, Error)]
pub enum CfgMgrError {
    /// Failed to execute a shell command (spawn error).
    #[error("Failed to execute shell command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Shell command returned non-zero exit code.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// The device rejected or never received a command sequence. Its state
    /// is unknown afterwards.
    #[error("Transport failed for {entity}: {message}")]
    Transport {
        /// Entity whose sequence was being submitted.
        entity: String,
        /// Error message.
        message: String,
    },

    /// Schema, identity or desired-state error (including YAML decoding).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading a settings or desired-state file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file path.
        path: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl CfgMgrError {
    /// Creates a transport error.
    pub fn transport(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Creates a file read error.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CfgMgrError::Transport { .. } | CfgMgrError::ShellCommandFailed { .. }
        )
    }
}
