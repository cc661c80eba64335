//! Type definitions for quaggamgrd

use quagga_config::CommandSequence;
use serde::Serialize;

/// Result of reconciling one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    /// Observed state already matches.
    Unchanged,
    /// Sequence was submitted to the device.
    Changed(CommandSequence),
    /// Sequence was planned but not submitted (dry run).
    Planned(CommandSequence),
}

impl EntityOutcome {
    /// The sequence, if any was planned or submitted.
    pub fn sequence(&self) -> Option<&CommandSequence> {
        match self {
            EntityOutcome::Unchanged => None,
            EntityOutcome::Changed(sequence) | EntityOutcome::Planned(sequence) => Some(sequence),
        }
    }
}

/// Commands planned for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSequence {
    /// Entity display id, e.g. `bgp_peer[65000 10.0.0.2]`.
    pub entity: String,
    /// Whether the sequence reached the device.
    pub submitted: bool,
    /// The fragments.
    pub fragments: CommandSequence,
}

/// An entity that could not be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityFailure {
    /// Entity display id.
    pub entity: String,
    /// Rendered error.
    pub error: String,
}

/// Totals for one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Entities already in sync.
    pub unchanged: usize,
    /// Entities with a planned or submitted sequence.
    pub changed: usize,
    /// Sequences in processing order.
    pub sequences: Vec<PlannedSequence>,
    /// Entities that failed.
    pub failures: Vec<EntityFailure>,
}

impl ReconcileSummary {
    /// Number of failed entities.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if no entity failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Records the outcome for `entity`.
    pub fn record(&mut self, entity: String, outcome: Result<EntityOutcome, String>) {
        match outcome {
            Ok(EntityOutcome::Unchanged) => self.unchanged += 1,
            Ok(EntityOutcome::Changed(fragments)) => {
                self.changed += 1;
                self.sequences.push(PlannedSequence {
                    entity,
                    submitted: true,
                    fragments,
                });
            }
            Ok(EntityOutcome::Planned(fragments)) => {
                self.changed += 1;
                self.sequences.push(PlannedSequence {
                    entity,
                    submitted: false,
                    fragments,
                });
            }
            Err(error) => self.failures.push(EntityFailure { entity, error }),
        }
    }
}
