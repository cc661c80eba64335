//! Attribute diff engine.

use std::collections::BTreeSet;
use tracing::trace;

use crate::instance::Attributes;
use crate::schema::{AttributeSpec, Kind};
use crate::value::AttributeValue;

/// One attribute whose desired value differs from the observed one.
///
/// Always carries the complete target value (the full desired set for set
/// attributes), never a partial delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// The attribute.
    pub spec: &'static AttributeSpec,
    /// Target value.
    pub value: AttributeValue,
}

/// Mutations for one entity, in schema attribute order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSet {
    kind: Kind,
    mutations: Vec<Mutation>,
}

impl MutationSet {
    /// An empty set for `kind`.
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            mutations: Vec::new(),
        }
    }

    /// The entity kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns true if nothing needs to change.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Number of mutated attributes.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Target value of one attribute, if it is mutated.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.mutations
            .iter()
            .find(|mutation| mutation.spec.name == name)
            .map(|mutation| &mutation.value)
    }

    /// Iterates in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.mutations.iter()
    }
}

impl<'a> IntoIterator for &'a MutationSet {
    type Item = &'a Mutation;
    type IntoIter = std::slice::Iter<'a, Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.iter()
    }
}

/// Computes the mutations that move `observed` to `desired`.
///
/// Only attributes named in `desired` are considered; unnamed attributes are
/// left alone. An attribute missing from `observed` is taken at its schema
/// default. Attributes not declared by the schema are ignored.
pub fn diff(kind: Kind, observed: &Attributes, desired: &Attributes) -> MutationSet {
    let mut set = MutationSet::new(kind);

    for spec in kind.schema().attributes {
        let Some(want) = desired.get(spec.name) else {
            continue;
        };
        let have = observed
            .get(spec.name)
            .cloned()
            .unwrap_or_else(|| spec.default_value());

        if differs(&have, want) {
            trace!(kind = %kind, attribute = spec.name, from = %have, to = %want, "Attribute differs");
            set.mutations.push(Mutation {
                spec,
                value: want.clone(),
            });
        }
    }

    set
}

fn differs(have: &AttributeValue, want: &AttributeValue) -> bool {
    use AttributeValue::*;

    match (have, want) {
        (Set(have), Set(want)) => have.symmetric_difference(want).next().is_some(),
        (Set(items), Absent) | (Absent, Set(items)) => !items.is_empty(),
        (Bool(have), Bool(want)) => have != want,
        (Bool(flag), Absent) | (Absent, Bool(flag)) => *flag,
        (Int(have), Int(want)) => have != want,
        (Str(have), Str(want)) => have != want,
        (Enum(have), Enum(want)) => have != want,
        (Absent, Absent) => false,
        // type changed
        _ => true,
    }
}

/// Elements to remove and add to turn `have` into `want`.
pub(crate) fn set_delta<'a>(
    have: &'a BTreeSet<String>,
    want: &'a BTreeSet<String>,
) -> (Vec<&'a str>, Vec<&'a str>) {
    let removed = have.difference(want).map(String::as_str).collect();
    let added = want.difference(have).map(String::as_str).collect();
    (removed, added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Attributes;

    fn attrs(pairs: &[(&str, AttributeValue)]) -> Attributes {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_identical_attributes_yield_nothing() {
        let observed = Kind::BgpRouter.schema().defaults();
        assert!(diff(Kind::BgpRouter, &observed, &observed).is_empty());
    }

    #[test]
    fn test_only_desired_attributes_compared() {
        let mut observed = Kind::BgpRouter.schema().defaults();
        observed.insert("router_id".to_string(), AttributeValue::str("10.0.0.1"));
        observed.insert("maximum_paths_ebgp".to_string(), AttributeValue::Int(4));

        let desired = attrs(&[("maximum_paths_ebgp", AttributeValue::Int(8))]);
        let set = diff(Kind::BgpRouter, &observed, &desired);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("maximum_paths_ebgp"), Some(&AttributeValue::Int(8)));
    }

    #[test]
    fn test_missing_observed_uses_default() {
        let desired = attrs(&[("default_local_preference", AttributeValue::Int(100))]);
        assert!(diff(Kind::BgpRouter, &Attributes::new(), &desired).is_empty());
    }

    #[test]
    fn test_boolean_transitions() {
        let observed = attrs(&[("deterministic_med", AttributeValue::Bool(false))]);
        let enable = attrs(&[("deterministic_med", AttributeValue::Bool(true))]);
        assert_eq!(diff(Kind::BgpRouter, &observed, &enable).len(), 1);
        assert!(diff(Kind::BgpRouter, &observed, &observed).is_empty());
    }

    #[test]
    fn test_equal_sets_in_any_order_yield_nothing() {
        let observed = attrs(&[("networks", AttributeValue::set(["b", "a"]))]);
        let desired = attrs(&[("networks", AttributeValue::set(["a", "b"]))]);
        assert!(diff(Kind::BgpRouter, &observed, &desired).is_empty());
    }

    #[test]
    fn test_same_size_different_members_emit_full_set() {
        let observed = attrs(&[("networks", AttributeValue::set(["10.0.0.0/8"]))]);
        let desired = attrs(&[("networks", AttributeValue::set(["192.168.0.0/16"]))]);
        let set = diff(Kind::BgpRouter, &observed, &desired);
        assert_eq!(set.get("networks"), Some(&AttributeValue::set(["192.168.0.0/16"])));
    }

    #[test]
    fn test_clearing_scalar_yields_absent() {
        let observed = attrs(&[("router_id", AttributeValue::str("10.0.0.1"))]);
        let desired = attrs(&[("router_id", AttributeValue::Absent)]);
        let set = diff(Kind::BgpRouter, &observed, &desired);
        assert_eq!(set.get("router_id"), Some(&AttributeValue::Absent));
    }

    #[test]
    fn test_mutations_follow_schema_order() {
        let observed = Kind::BgpRouter.schema().defaults();
        let desired = attrs(&[
            ("networks", AttributeValue::set(["10.0.0.0/8"])),
            ("router_id", AttributeValue::str("10.0.0.1")),
            ("maximum_paths_ebgp", AttributeValue::Int(2)),
        ]);
        let names: Vec<&str> = diff(Kind::BgpRouter, &observed, &desired)
            .iter()
            .map(|mutation| mutation.spec.name)
            .collect();
        assert_eq!(names, vec!["router_id", "maximum_paths_ebgp", "networks"]);
    }

    #[test]
    fn test_set_delta() {
        let have: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let want: BTreeSet<String> = ["b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(set_delta(&have, &want), (vec!["a"], vec!["c"]));
    }
}
