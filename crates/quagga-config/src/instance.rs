//! Entity instances: observed or desired state of one managed object.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::identity::Identity;
use crate::schema::{AttributeSpec, Kind, KindSchema};
use crate::value::AttributeValue;

/// Attribute name to value.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Lifecycle requested for an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// The entity should exist with the given attributes.
    #[default]
    Present,
    /// The entity should not exist.
    Absent,
}

/// One managed object.
///
/// Instances built from device text are fully materialized: every schema
/// attribute has a value. Desired instances only carry the attributes the
/// caller cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInstance {
    /// Key fields.
    pub identity: Identity,
    /// Requested or observed lifecycle.
    pub ensure: Ensure,
    /// Attribute values.
    pub attributes: Attributes,
    explicit: BTreeSet<&'static str>,
}

impl EntityInstance {
    /// Creates an instance with every attribute at its schema default.
    pub fn materialized(identity: Identity) -> Self {
        let attributes = identity.kind().schema().defaults();
        Self {
            identity,
            ensure: Ensure::Present,
            attributes,
            explicit: BTreeSet::new(),
        }
    }

    /// Creates a desired-state instance carrying only the given attributes.
    pub fn desired(identity: Identity, ensure: Ensure, attributes: Attributes) -> Self {
        Self {
            identity,
            ensure,
            attributes,
            explicit: BTreeSet::new(),
        }
    }

    /// The entity kind.
    pub fn kind(&self) -> Kind {
        self.identity.kind()
    }

    /// The kind's schema.
    pub fn schema(&self) -> &'static KindSchema {
        self.kind().schema()
    }

    /// Value of an attribute.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Records a value stated by a configuration line.
    pub fn assign(&mut self, spec: &'static AttributeSpec, value: AttributeValue) {
        self.explicit.insert(spec.name);
        self.attributes.insert(spec.name.to_string(), value);
    }

    /// Adds one element to a set attribute stated by a configuration line.
    pub fn append(&mut self, spec: &'static AttributeSpec, element: &str) {
        self.explicit.insert(spec.name);
        let entry = self
            .attributes
            .entry(spec.name.to_string())
            .or_insert_with(|| AttributeValue::Set(BTreeSet::new()));
        match entry {
            AttributeValue::Set(items) => {
                items.insert(element.to_string());
            }
            other => *other = AttributeValue::set([element]),
        }
    }

    /// Sets a value derived from other instances, leaving it non-explicit.
    pub fn derive(&mut self, name: &str, value: AttributeValue) {
        self.attributes.insert(name.to_string(), value);
    }

    /// Whether an attribute was stated by a line of its own.
    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains(name)
    }
}

impl fmt::Display for EntityInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind(), self.identity)
    }
}
