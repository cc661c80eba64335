//! Command emitter.
//!
//! Turns a [`MutationSet`] into the flat fragment list submitted to the
//! device in one call:
//!
//! ```text
//! configure terminal
//! <context entry lines>          router bgp 65000
//! [<sub-context entry>]          address-family ipv6 unicast
//! <attribute lines>              neighbor 10.0.0.2 activate
//! [<sub-context exit>]           exit-address-family
//! end
//! write memory
//! ```
//!
//! Every template is rendered before the sequence is assembled, so a
//! missing identity field fails the whole call and no partial sequence is
//! ever produced.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

use crate::diff::{set_delta, MutationSet};
use crate::error::ConfigResult;
use crate::family::AddressFamily;
use crate::instance::{Attributes, EntityInstance};
use crate::schema::{AttributeSpec, FamilyHandling, Record};
use crate::template::Bindings;
use crate::value::{desymbolize, AttributeValue, ValueType};

/// Enters configuration mode.
pub const CONFIGURE_TERMINAL: &str = "configure terminal";
/// Leaves configuration mode from any depth.
pub const END: &str = "end";
/// Persists the running configuration.
pub const WRITE_MEMORY: &str = "write memory";

const IPV6_FAMILY_ENTER: &str = "address-family ipv6";
const IPV6_FAMILY_EXIT: &str = "exit-address-family";

/// Ordered command fragments for one entity, submitted as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandSequence {
    fragments: Vec<String>,
}

impl CommandSequence {
    /// The fragments, in submission order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Consumes the sequence.
    pub fn into_fragments(self) -> Vec<String> {
        self.fragments
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Always false for sequences built by [`emit`].
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns true if any fragment equals `line`.
    pub fn contains(&self, line: &str) -> bool {
        self.fragments.iter().any(|fragment| fragment == line)
    }
}

impl fmt::Display for CommandSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragments.join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    None,
    EnterContext,
    Emit,
    ExitContext,
    Persist,
}

/// Assembles a sequence strictly in stage order.
struct SequenceBuilder {
    stage: Stage,
    fragments: Vec<String>,
}

impl SequenceBuilder {
    fn new() -> Self {
        Self {
            stage: Stage::None,
            fragments: Vec::new(),
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "{:?} after {:?}", next, self.stage);
        self.stage = next;
    }

    fn enter(mut self, frame: &Frame) -> Self {
        self.advance(Stage::EnterContext);
        self.fragments.push(CONFIGURE_TERMINAL.to_string());
        self.fragments.extend(frame.context.iter().cloned());
        if let Some((enter, _)) = &frame.sub_context {
            self.fragments.push(enter.clone());
        }
        self
    }

    fn emit(mut self, body: Vec<String>) -> Self {
        self.advance(Stage::Emit);
        self.fragments.extend(body);
        self
    }

    fn exit(mut self, frame: &Frame) -> Self {
        self.advance(Stage::ExitContext);
        if let Some((_, exit)) = &frame.sub_context {
            self.fragments.push(exit.to_string());
        }
        self
    }

    fn persist(mut self) -> CommandSequence {
        self.advance(Stage::Persist);
        self.fragments.push(END.to_string());
        self.fragments.push(WRITE_MEMORY.to_string());
        CommandSequence {
            fragments: self.fragments,
        }
    }
}

/// Rendered context of one entity.
#[derive(Debug, Clone, Default)]
pub(crate) struct Frame {
    context: Vec<String>,
    sub_context: Option<(String, &'static str)>,
}

impl Frame {
    /// Context entry lines for `instance`, including its sub-context unless
    /// the identity names the implicit one.
    pub(crate) fn for_instance(instance: &EntityInstance) -> ConfigResult<Self> {
        let schema = instance.schema();
        let bindings = Bindings::new(&instance.identity);

        let context = schema
            .context
            .iter()
            .map(|template| bindings.render(template))
            .collect::<ConfigResult<Vec<_>>>()?;

        let sub_context = match schema.sub_context {
            Some(sub)
                if !sub
                    .implicit
                    .iter()
                    .all(|(field, value)| instance.identity.get(field) == Some(*value)) =>
            {
                Some((bindings.render(sub.enter)?, sub.exit))
            }
            _ => None,
        };

        Ok(Self {
            context,
            sub_context,
        })
    }

    /// Configuration mode only, no entity context.
    pub(crate) fn global() -> Self {
        Self::default()
    }

    pub(crate) fn wrap(&self, body: Vec<String>) -> CommandSequence {
        SequenceBuilder::new()
            .enter(self)
            .emit(body)
            .exit(self)
            .persist()
    }
}

/// Emits the command sequence applying `mutations` to `observed`.
///
/// An empty mutation set yields the bare entry/exit/persist frame.
pub fn emit(observed: &EntityInstance, mutations: &MutationSet) -> ConfigResult<CommandSequence> {
    debug_assert_eq!(observed.kind(), mutations.kind());

    let frame = Frame::for_instance(observed)?;
    let body = match observed.schema().record {
        Some(record) => record_body(observed, mutations, &record)?,
        None => line_body(observed, mutations)?,
    };

    let sequence = frame.wrap(body);
    debug!(
        entity = %observed,
        mutations = mutations.len(),
        fragments = sequence.len(),
        "Emitted command sequence"
    );
    Ok(sequence)
}

/// Attribute lines in schema order.
///
/// Field attributes have no line of their own and are rendered into the
/// lines of their siblings. When one changes, every element of a set
/// rendered with it is rewritten: removed in the observed form, then
/// written in the target form.
fn line_body(observed: &EntityInstance, mutations: &MutationSet) -> ConfigResult<Vec<String>> {
    let schema = observed.schema();

    let mut have_fields = Attributes::new();
    let mut want_fields = Attributes::new();
    let mut changed_fields = Vec::new();
    for spec in schema.attributes.iter().filter(|spec| spec.pattern().is_none()) {
        let have = current(observed, spec);
        let want = mutations.get(spec.name).cloned().unwrap_or_else(|| have.clone());
        if want != have {
            changed_fields.push(format!("{{{}}}", spec.name));
        }
        have_fields.insert(spec.name.to_string(), have);
        want_fields.insert(spec.name.to_string(), want);
    }
    let old = Bindings::new(&observed.identity).with_attributes(&have_fields);
    let new = Bindings::new(&observed.identity).with_attributes(&want_fields);

    let mut body = Vec::new();
    for spec in schema.attributes.iter().filter(|spec| spec.pattern().is_some()) {
        let rewrite = matches!(spec.value_type, ValueType::StringSet)
            && changed_fields.iter().any(|field| spec.template.contains(field.as_str()));
        let have = current(observed, spec);

        match mutations.get(spec.name) {
            Some(want) if matches!(spec.value_type, ValueType::StringSet) => {
                body.extend(set_body(spec, &old, &new, &have, want, rewrite)?);
            }
            Some(want) => body.extend(attribute_body(spec, &new, &have, want)?),
            None if rewrite => body.extend(set_body(spec, &old, &new, &have, &have, true)?),
            None => {}
        }
    }
    Ok(body)
}

fn current(observed: &EntityInstance, spec: &AttributeSpec) -> AttributeValue {
    observed
        .get(spec.name)
        .cloned()
        .unwrap_or_else(|| spec.default_value())
}

fn attribute_body(
    spec: &AttributeSpec,
    bindings: &Bindings<'_>,
    have: &AttributeValue,
    want: &AttributeValue,
) -> ConfigResult<Vec<String>> {
    match spec.value_type {
        ValueType::Boolean => {
            let line = if want.as_bool().unwrap_or(false) {
                assertion(spec, bindings, None)?
            } else {
                negation(spec, bindings, None)?
            };
            Ok(vec![line])
        }
        ValueType::Enum(_) if spec.toggle => toggle_body(spec, bindings, have, want),
        ValueType::String | ValueType::Integer | ValueType::Enum(_) | ValueType::StringSet => {
            scalar_body(spec, bindings, have, want)
        }
    }
}

fn assertion(spec: &AttributeSpec, bindings: &Bindings<'_>, value: Option<String>) -> ConfigResult<String> {
    bindings.clone().with_value(value).render(spec.template)
}

fn negation(spec: &AttributeSpec, bindings: &Bindings<'_>, value: Option<String>) -> ConfigResult<String> {
    let bindings = bindings.clone().with_value(value);
    match spec.removal {
        Some(removal) => bindings.render(removal),
        None => Ok(format!("no {}", bindings.render(spec.template)?)),
    }
}

/// Removals first, then additions, each element scoped to its family.
/// A rewrite removes every observed element and writes every target one.
fn set_body(
    spec: &AttributeSpec,
    old: &Bindings<'_>,
    new: &Bindings<'_>,
    have: &AttributeValue,
    want: &AttributeValue,
    rewrite: bool,
) -> ConfigResult<Vec<String>> {
    let empty = BTreeSet::new();
    let have = have.as_set().unwrap_or(&empty);
    let want = want.as_set().unwrap_or(&empty);
    let (removed, added) = if rewrite {
        (
            have.iter().map(String::as_str).collect(),
            want.iter().map(String::as_str).collect(),
        )
    } else {
        set_delta(have, want)
    };

    let mut lines = Vec::new();
    for element in removed {
        lines.extend(element_lines(spec, old, element, false)?);
    }
    for element in added {
        lines.extend(element_lines(spec, new, element, true)?);
    }
    Ok(lines)
}

fn element_lines(
    spec: &AttributeSpec,
    bindings: &Bindings<'_>,
    element: &str,
    add: bool,
) -> ConfigResult<Vec<String>> {
    let value = Some(element.to_string());
    let ipv6 = AddressFamily::of(element).is_ipv6();

    match spec.family {
        FamilyHandling::Ipv6Template(template) if ipv6 => {
            let line = bindings.clone().with_value(value).render(template)?;
            Ok(vec![if add { line } else { format!("no {}", line) }])
        }
        FamilyHandling::WrapIpv6 if ipv6 => {
            let line = if add {
                assertion(spec, bindings, value)?
            } else {
                negation(spec, bindings, value)?
            };
            Ok(vec![
                IPV6_FAMILY_ENTER.to_string(),
                line,
                IPV6_FAMILY_EXIT.to_string(),
            ])
        }
        FamilyHandling::None | FamilyHandling::WrapIpv6 | FamilyHandling::Ipv6Template(_) => {
            let line = if add {
                assertion(spec, bindings, value)?
            } else {
                negation(spec, bindings, value)?
            };
            Ok(vec![line])
        }
    }
}

/// Forms of a toggle are exclusive: an active observed form that differs
/// from the target is negated before the target form is asserted.
fn toggle_body(
    spec: &AttributeSpec,
    bindings: &Bindings<'_>,
    have: &AttributeValue,
    want: &AttributeValue,
) -> ConfigResult<Vec<String>> {
    let have = toggle_symbol(have);
    let want = toggle_symbol(want);

    let mut lines = Vec::new();
    if have != "false" && have != want {
        lines.push(negation(spec, bindings, None)?);
    }
    if want != "false" {
        let value = (want != "true").then(|| desymbolize(want));
        lines.push(assertion(spec, bindings, value)?);
    }
    Ok(lines)
}

fn toggle_symbol(value: &AttributeValue) -> &str {
    match value {
        AttributeValue::Enum(symbol) => symbol,
        AttributeValue::Bool(true) => "true",
        _ => "false",
    }
}

/// Clearing, or returning to a non-absent default, removes the observed
/// statement; anything else asserts the new value.
fn scalar_body(
    spec: &AttributeSpec,
    bindings: &Bindings<'_>,
    have: &AttributeValue,
    want: &AttributeValue,
) -> ConfigResult<Vec<String>> {
    let default = spec.default_value();
    let clearing = want.is_absent() || (!default.is_absent() && *want == default);

    let line = if clearing {
        negation(spec, bindings, have.render().or_else(|| want.render()))?
    } else {
        assertion(spec, bindings, want.render())?
    };
    Ok(vec![line])
}

/// Whole-line entities: the old line is removed and the merged line
/// written.
fn record_body(
    observed: &EntityInstance,
    mutations: &MutationSet,
    record: &Record,
) -> ConfigResult<Vec<String>> {
    if mutations.is_empty() {
        return Ok(Vec::new());
    }

    let mut merged = observed.attributes.clone();
    for mutation in mutations {
        merged.insert(mutation.spec.name.to_string(), mutation.value.clone());
    }

    let line = Bindings::new(&observed.identity)
        .with_attributes(&merged)
        .render(record.template)?;

    let mut body = Vec::new();
    // An entry that does not render fully was never on the device.
    if let Ok(old) = Bindings::new(&observed.identity)
        .with_attributes(&observed.attributes)
        .render(record.template)
    {
        if old != line {
            body.push(format!("no {}", old));
        }
    }
    body.push(line);
    Ok(body)
}
