//! Quagga Manager - reconciles declared entities against the device

use quagga_cfgmgr_common::{CfgMgrError, CfgMgrResult, Transport};
use quagga_config::{observe, plan, EntityInstance, ParsedConfig};
use tracing::{debug, info, instrument, warn};

use crate::types::{EntityOutcome, ReconcileSummary};

/// Quagga Manager
///
/// Drives parse, plan and submit for each desired entity over a
/// [`Transport`]. Entities are handled one at a time and the running
/// configuration is read again for every entity, so a sequence is always
/// planned against the state left by the previous one.
pub struct QuaggaMgr<T: Transport> {
    transport: T,
    dry_run: bool,
}

impl<T: Transport> QuaggaMgr<T> {
    /// Create a new QuaggaMgr submitting through `transport`
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            dry_run: false,
        }
    }

    /// Plan without submitting
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns true if sequences are only planned.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Reconcile every entity in order
    ///
    /// A failing entity is recorded and does not stop the ones after it.
    #[instrument(skip(self, desired), fields(entities = desired.len(), dry_run = self.dry_run))]
    pub async fn reconcile(&self, desired: &[EntityInstance]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for entity in desired {
            let outcome = self.reconcile_entity(entity).await;
            if let Err(ref e) = outcome {
                warn!(entity = %entity, error = %e, "Reconcile failed");
            }
            summary.record(entity.to_string(), outcome.map_err(|e| e.to_string()));
        }

        info!(
            unchanged = summary.unchanged,
            changed = summary.changed,
            failed = summary.failed(),
            "Reconcile pass complete"
        );
        summary
    }

    /// Reconcile one entity
    #[instrument(skip(self, desired), fields(entity = %desired))]
    pub async fn reconcile_entity(&self, desired: &EntityInstance) -> CfgMgrResult<EntityOutcome> {
        let parsed = self.observe(desired).await?;
        let observed = parsed.find(&desired.identity);

        let Some(sequence) = plan(observed, desired)? else {
            debug!("Entity in sync");
            return Ok(EntityOutcome::Unchanged);
        };

        if self.dry_run {
            info!(fragments = sequence.len(), "Planned (dry run)");
            return Ok(EntityOutcome::Planned(sequence));
        }

        info!(fragments = sequence.len(), "Submitting command sequence");
        self.transport
            .execute(sequence.fragments())
            .await
            .map_err(|e| CfgMgrError::transport(desired.to_string(), e.to_string()))?;

        Ok(EntityOutcome::Changed(sequence))
    }

    /// Fresh parse of the running configuration
    async fn observe(&self, entity: &EntityInstance) -> CfgMgrResult<ParsedConfig> {
        let text = self
            .transport
            .running_config()
            .await
            .map_err(|e| CfgMgrError::transport(entity.to_string(), e.to_string()))?;

        let parsed = observe(&text);
        if !parsed.diagnostics.is_empty() {
            warn!(
                diagnostics = parsed.diagnostics.len(),
                "Running configuration has malformed values"
            );
        }
        Ok(parsed)
    }
}
