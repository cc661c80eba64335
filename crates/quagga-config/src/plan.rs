//! Per-entity planning: create, modify, destroy.

use tracing::debug;

use crate::diff::diff;
use crate::emitter::{emit, CommandSequence, Frame};
use crate::error::{ConfigError, ConfigResult};
use crate::instance::{EntityInstance, Ensure};
use crate::template::Bindings;

/// Plans the commands that move the device from `observed` to `desired`.
///
/// Returns `None` when nothing needs to change. A missing observed
/// instance is materialized from schema defaults, so creation is a diff
/// against defaults.
pub fn plan(
    observed: Option<&EntityInstance>,
    desired: &EntityInstance,
) -> ConfigResult<Option<CommandSequence>> {
    if let Some(observed) = observed {
        if observed.identity != desired.identity {
            return Err(ConfigError::invalid_identity(
                desired.kind(),
                desired.identity.to_string(),
                format!("observed instance is {}", observed),
            ));
        }
    }

    match (desired.ensure, observed) {
        (Ensure::Absent, None) => {
            debug!(entity = %desired, "Already absent");
            Ok(None)
        }
        (Ensure::Absent, Some(observed)) => destroy(observed),
        (Ensure::Present, observed) => {
            let base = observed
                .cloned()
                .unwrap_or_else(|| EntityInstance::materialized(desired.identity.clone()));
            let mutations = diff(desired.kind(), &base.attributes, &desired.attributes);
            if mutations.is_empty() {
                debug!(entity = %desired, "In sync");
                return Ok(None);
            }
            debug!(
                entity = %desired,
                create = observed.is_none(),
                mutations = mutations.len(),
                "Planned changes"
            );
            emit(&base, &mutations).map(Some)
        }
    }
}

/// Removes an observed entity: its removal statement if the kind has one,
/// otherwise every attribute driven back to its default.
pub fn destroy(observed: &EntityInstance) -> ConfigResult<Option<CommandSequence>> {
    let schema = observed.schema();

    match schema.destroy {
        Some(destroy) => {
            let line = Bindings::new(&observed.identity)
                .with_attributes(&observed.attributes)
                .render(destroy.template)?;
            let frame = if destroy.within_context {
                Frame::for_instance(observed)?
            } else {
                Frame::global()
            };
            debug!(entity = %observed, "Planned removal");
            Ok(Some(frame.wrap(vec![line])))
        }
        None => {
            let mutations = diff(observed.kind(), &observed.attributes, &schema.defaults());
            if mutations.is_empty() {
                debug!(entity = %observed, "Nothing to reset");
                return Ok(None);
            }
            debug!(entity = %observed, mutations = mutations.len(), "Planned reset to defaults");
            emit(observed, &mutations).map(Some)
        }
    }
}
