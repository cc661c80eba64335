//! Report and script builders for reconcile results

use std::fmt::Write;

use quagga_cfgmgr_common::VtyshTransport;

use crate::types::ReconcileSummary;

/// Build a shell script with one `vtysh` invocation per planned sequence
///
/// Each invocation is preceded by a comment naming the entity, so a dry
/// run can be reviewed and replayed by hand.
pub fn build_vtysh_script(vtysh: &str, summary: &ReconcileSummary) -> String {
    let transport = VtyshTransport::new(vtysh);
    let mut script = String::from("#!/bin/sh\nset -e\n");
    for planned in &summary.sequences {
        let _ = writeln!(script, "\n# {}", planned.entity);
        let _ = writeln!(script, "{}", transport.command_line(planned.fragments.fragments()));
    }
    script
}

/// Build the human-readable report
pub fn build_text_report(summary: &ReconcileSummary) -> String {
    let mut report = String::new();
    for planned in &summary.sequences {
        let marker = if planned.submitted { "applied" } else { "planned" };
        let _ = writeln!(report, "! {} ({})", planned.entity, marker);
        for fragment in planned.fragments.fragments() {
            let _ = writeln!(report, "{}", fragment);
        }
    }
    for failure in &summary.failures {
        let _ = writeln!(report, "! {} FAILED: {}", failure.entity, failure.error);
    }
    let _ = writeln!(
        report,
        "! {} unchanged, {} changed, {} failed",
        summary.unchanged,
        summary.changed,
        summary.failed()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityOutcome;
    use quagga_config::{emit, observe, Kind, MutationSet};

    fn summary() -> ReconcileSummary {
        let parsed = observe("interface eth0\n");
        let interface = parsed.of_kind(Kind::Interface).next().unwrap();
        let sequence = emit(interface, &MutationSet::new(Kind::Interface)).unwrap();

        let mut summary = ReconcileSummary::default();
        summary.record("interface[eth0]".to_string(), Ok(EntityOutcome::Planned(sequence)));
        summary.record("interface[lo]".to_string(), Ok(EntityOutcome::Unchanged));
        summary
    }

    #[test]
    fn test_build_vtysh_script() {
        let script = build_vtysh_script("/usr/bin/vtysh", &summary());
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("# interface[eth0]"));
        assert!(script.contains(
            "/usr/bin/vtysh -c \"configure terminal\" -c \"interface eth0\" -c \"end\" -c \"write memory\""
        ));
    }

    #[test]
    fn test_build_text_report() {
        let report = build_text_report(&summary());
        assert!(report.contains("! interface[eth0] (planned)"));
        assert!(report.contains("\ninterface eth0\n"));
        assert!(report.ends_with("! 1 unchanged, 1 changed, 0 failed\n"));
    }
}
