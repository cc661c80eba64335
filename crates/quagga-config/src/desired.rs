//! Desired-state documents.
//!
//! ```yaml
//! entities:
//!   - kind: bgp_router
//!     name: "65000"
//!     attributes:
//!       router_id: 10.0.0.1
//!       networks: [10.0.0.0/8, "2001:db8::/32"]
//!   - kind: bgp_peer
//!     name: 65000 10.0.0.2
//!     ensure: absent
//! ```
//!
//! Attribute values are coerced to the schema's declared type on load;
//! `null` (or the string `absent`) clears an attribute.

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};
use crate::identity::Identity;
use crate::instance::{Attributes, EntityInstance, Ensure};
use crate::schema::{AttributeSpec, Kind};
use crate::value::{AttributeValue, ValueType};

/// Top-level desired-state document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DesiredDocument {
    /// Declared entities, reconciled in order.
    #[serde(default)]
    pub entities: Vec<DesiredEntity>,
}

/// One declared entity, before coercion.
#[derive(Debug, Clone, Deserialize)]
pub struct DesiredEntity {
    /// Kind name (`bgp_peer`, `interface`, ...).
    pub kind: String,
    /// Identity string. Numbers are accepted for single-field identities.
    pub name: Value,
    /// Requested lifecycle.
    #[serde(default)]
    pub ensure: Ensure,
    /// Attribute name to raw value.
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl DesiredDocument {
    /// Parses a YAML document.
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Coerces every entity. Fails on the first invalid one.
    pub fn into_instances(self) -> ConfigResult<Vec<EntityInstance>> {
        self.entities
            .into_iter()
            .map(DesiredEntity::into_instance)
            .collect()
    }
}

impl DesiredEntity {
    /// Resolves kind and identity and coerces attributes.
    pub fn into_instance(self) -> ConfigResult<EntityInstance> {
        let kind: Kind = self.kind.parse()?;
        let text = scalar_text(&self.name).ok_or_else(|| {
            ConfigError::invalid_identity(kind, render(&self.name), "name must be a scalar")
        })?;
        let identity = Identity::parse(kind, &text)?;
        let schema = kind.schema();

        let mut attributes = Attributes::new();
        for (name, raw) in &self.attributes {
            let spec = schema
                .attribute(name)
                .ok_or_else(|| ConfigError::UnknownAttribute {
                    kind,
                    attribute: name.clone(),
                })?;
            let value = coerce(spec, raw).ok_or_else(|| ConfigError::TypeCoercion {
                kind,
                identity: identity.to_string(),
                attribute: name.clone(),
                value: render(raw),
                expected: spec.value_type.name(),
            })?;
            attributes.insert(spec.name.to_string(), value);
        }

        Ok(EntityInstance::desired(identity, self.ensure, attributes))
    }
}

/// Loads and coerces a desired-state document.
pub fn load_desired(text: &str) -> ConfigResult<Vec<EntityInstance>> {
    DesiredDocument::from_yaml(text)?.into_instances()
}

/// Converts a YAML value to the attribute's declared type.
pub fn coerce(spec: &AttributeSpec, raw: &Value) -> Option<AttributeValue> {
    if is_absent(raw) {
        return Some(spec.value_type.absent());
    }

    match (spec.value_type, raw) {
        (ValueType::Boolean, Value::Bool(flag)) => Some(AttributeValue::Bool(*flag)),
        (ValueType::Integer, Value::Number(number)) => number.as_i64().map(AttributeValue::Int),
        // toggles accept plain booleans for their two simple forms
        (ValueType::Enum(_), Value::Bool(flag)) if spec.toggle => {
            Some(AttributeValue::Enum(flag.to_string()))
        }
        (ValueType::StringSet, Value::Sequence(items)) => items
            .iter()
            .map(scalar_text)
            .collect::<Option<Vec<_>>>()
            .map(|items| AttributeValue::set(items.iter().map(|item| item.trim()))),
        (value_type, raw) => scalar_text(raw).and_then(|text| value_type.coerce(&text)),
    }
}

fn is_absent(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(text) => text == "absent",
        _ => false,
    }
}

fn scalar_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn render(raw: &Value) -> String {
    scalar_text(raw).unwrap_or_else(|| {
        serde_yaml::to_string(raw)
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(kind: Kind, name: &str) -> &'static AttributeSpec {
        kind.schema().attribute(name).unwrap()
    }

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_load_document() {
        let text = r#"
entities:
  - kind: bgp_router
    name: 65000
    attributes:
      router_id: 10.0.0.1
      maximum_paths_ebgp: "8"
      networks: [10.0.0.0/8, "2001:db8::/32"]
  - kind: bgp_peer
    name: 65000 10.0.0.2
    ensure: absent
"#;
        let instances = load_desired(text).unwrap();
        assert_eq!(instances.len(), 2);

        let router = &instances[0];
        assert_eq!(router.identity.to_string(), "65000");
        assert_eq!(router.get("router_id"), Some(&AttributeValue::str("10.0.0.1")));
        assert_eq!(router.get("maximum_paths_ebgp"), Some(&AttributeValue::Int(8)));
        assert_eq!(
            router.get("networks"),
            Some(&AttributeValue::set(["10.0.0.0/8", "2001:db8::/32"]))
        );
        assert_eq!(router.get("deterministic_med"), None);

        assert_eq!(instances[1].ensure, Ensure::Absent);
        assert!(instances[1].attributes.is_empty());
    }

    #[test]
    fn test_boolean_coercion() {
        let flag = spec(Kind::BgpRouter, "deterministic_med");
        assert_eq!(coerce(flag, &yaml("true")), Some(AttributeValue::Bool(true)));
        assert_eq!(coerce(flag, &yaml("'false'")), Some(AttributeValue::Bool(false)));
        assert_eq!(coerce(flag, &yaml("yes please")), None);
    }

    #[test]
    fn test_enum_coercion_accepts_cli_spelling() {
        let network = spec(Kind::Interface, "ospf_network");
        assert_eq!(
            coerce(network, &yaml("point-to-point")),
            Some(AttributeValue::symbol("point_to_point"))
        );
        assert_eq!(coerce(network, &yaml("ring")), None);
    }

    #[test]
    fn test_toggle_accepts_booleans() {
        let toggle = spec(Kind::OspfRouter, "log_adjacency_changes");
        assert_eq!(coerce(toggle, &yaml("true")), Some(AttributeValue::symbol("true")));
        assert_eq!(coerce(toggle, &yaml("detail")), Some(AttributeValue::symbol("detail")));
    }

    #[test]
    fn test_absent_values() {
        assert_eq!(
            coerce(spec(Kind::BgpRouter, "router_id"), &yaml("~")),
            Some(AttributeValue::Absent)
        );
        assert_eq!(
            coerce(spec(Kind::BgpRouter, "networks"), &yaml("absent")),
            Some(AttributeValue::set(Vec::<String>::new()))
        );
        assert_eq!(
            coerce(spec(Kind::BgpRouter, "import_check"), &yaml("null")),
            Some(AttributeValue::Bool(false))
        );
    }

    #[test]
    fn test_single_scalar_becomes_set() {
        assert_eq!(
            coerce(spec(Kind::OspfRouter, "passive_interfaces"), &yaml("lo")),
            Some(AttributeValue::set(["lo"]))
        );
    }

    #[test]
    fn test_unknown_kind_and_attribute() {
        let err = load_desired("entities:\n  - kind: isis_router\n    name: x\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKind(_)));

        let err = load_desired(
            "entities:\n  - kind: interface\n    name: eth0\n    attributes:\n      speed: 100\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAttribute { .. }));
    }

    #[test]
    fn test_type_coercion_error() {
        let err = load_desired(
            "entities:\n  - kind: bgp_peer\n    name: 65000 10.0.0.2\n    attributes:\n      remote_as: external\n",
        )
        .unwrap_err();
        match err {
            ConfigError::TypeCoercion {
                attribute,
                value,
                expected,
                ..
            } => {
                assert_eq!(attribute, "remote_as");
                assert_eq!(value, "external");
                assert_eq!(expected, "integer");
            }
            other => panic!("Expected TypeCoercion, got {:?}", other),
        }
    }

    #[test]
    fn test_peer_without_asn_fails_on_load() {
        let err = load_desired("entities:\n  - kind: bgp_peer\n    name: 10.0.0.2\n    ensure: absent\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingContext { .. }));
    }
}
