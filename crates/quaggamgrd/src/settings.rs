//! Daemon settings

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use quagga_cfgmgr_common::shell::VTYSH_CMD;
use quagga_cfgmgr_common::{CfgMgrError, CfgMgrResult};
use quagga_config::{load_desired, EntityInstance};

/// Quagga/FRR configuration manager
#[derive(Parser, Debug, Clone)]
#[command(name = "quaggamgrd")]
#[command(author, version, about, long_about = None)]
pub struct Settings {
    /// Desired-state YAML document
    #[arg(short = 'f', long, env = "QUAGGAMGRD_DESIRED")]
    pub desired: PathBuf,

    /// Path to the vtysh binary
    #[arg(long, env = "QUAGGAMGRD_VTYSH", default_value = VTYSH_CMD)]
    pub vtysh: String,

    /// Plan and print sequences without submitting them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Report format on stdout
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,
}

/// How the reconcile report is printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-entity fragment listing
    Text,
    /// The summary as JSON
    Json,
    /// A reviewable shell script with one vtysh call per entity
    Script,
}

impl Settings {
    /// Reads and coerces the desired-state document.
    pub fn load_desired(&self) -> CfgMgrResult<Vec<EntityInstance>> {
        let text = std::fs::read_to_string(&self.desired)
            .map_err(|e| CfgMgrError::io(self.desired.display().to_string(), e))?;
        Ok(load_desired(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings(args: &[&str]) -> Settings {
        Settings::try_parse_from(std::iter::once("quaggamgrd").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&["-f", "/etc/quagga/desired.yaml"]);
        assert_eq!(settings.vtysh, VTYSH_CMD);
        assert!(!settings.dry_run);
        assert_eq!(settings.output, OutputFormat::Text);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_flags() {
        let settings = settings(&[
            "--desired",
            "desired.yaml",
            "--vtysh",
            "/usr/local/bin/vtysh",
            "--dry-run",
            "--output",
            "script",
        ]);
        assert_eq!(settings.vtysh, "/usr/local/bin/vtysh");
        assert!(settings.dry_run);
        assert_eq!(settings.output, OutputFormat::Script);
    }

    #[test]
    fn test_load_desired() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "entities:\n  - kind: interface\n    name: eth0\n    attributes:\n      description: uplink"
        )
        .unwrap();

        let settings = settings(&["-f", file.path().to_str().unwrap()]);
        let desired = settings.load_desired().unwrap();
        assert_eq!(desired.len(), 1);
        assert_eq!(desired[0].to_string(), "interface[eth0]");
    }

    #[test]
    fn test_load_missing_file() {
        let settings = settings(&["-f", "/nonexistent/desired.yaml"]);
        match settings.load_desired() {
            Err(CfgMgrError::Io { path, .. }) => assert_eq!(path, "/nonexistent/desired.yaml"),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_invalid_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "entities:\n  - kind: isis\n    name: x").unwrap();
        let settings = settings(&["-f", file.path().to_str().unwrap()]);
        assert!(matches!(settings.load_desired(), Err(CfgMgrError::Config(_))));
    }
}
