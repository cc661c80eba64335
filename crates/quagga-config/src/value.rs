//! Typed attribute values.
//!
//! Every attribute carries one [`AttributeValue`], resolved once at parse
//! (or desired-state load) time according to its declared [`ValueType`].

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Declared value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Free-form text.
    String,
    /// Decimal integer.
    Integer,
    /// Presence/negation flag.
    Boolean,
    /// Closed set of symbols. Symbols use `_` where the CLI uses `-`.
    Enum(&'static [&'static str]),
    /// Unordered set of strings without duplicates.
    StringSet,
}

impl ValueType {
    /// Human readable type name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::Enum(_) => "enum",
            ValueType::StringSet => "string set",
        }
    }

    /// Converts a captured scalar into a value of this type.
    ///
    /// Booleans are not converted from text: their value comes from the
    /// presence of the line and of a `no` prefix.
    pub fn coerce(&self, raw: &str) -> Option<AttributeValue> {
        let raw = raw.trim();
        match self {
            ValueType::String => Some(AttributeValue::Str(raw.to_string())),
            ValueType::Integer => raw.parse::<i64>().ok().map(AttributeValue::Int),
            ValueType::Boolean => match raw {
                "true" => Some(AttributeValue::Bool(true)),
                "false" => Some(AttributeValue::Bool(false)),
                _ => None,
            },
            ValueType::Enum(symbols) => {
                let symbol = symbolize(raw);
                symbols
                    .contains(&symbol.as_str())
                    .then_some(AttributeValue::Enum(symbol))
            }
            ValueType::StringSet => Some(AttributeValue::Set(BTreeSet::from([raw.to_string()]))),
        }
    }

    /// Value used when desired state asks for "absent".
    ///
    /// Booleans collapse to `false` and sets to the empty set so they
    /// compare cleanly against observed state.
    pub fn absent(&self) -> AttributeValue {
        match self {
            ValueType::Boolean => AttributeValue::Bool(false),
            ValueType::StringSet => AttributeValue::Set(BTreeSet::new()),
            _ => AttributeValue::Absent,
        }
    }
}

/// Normalizes a CLI keyword into an enum symbol (`message-digest` -> `message_digest`).
pub fn symbolize(raw: &str) -> String {
    raw.trim().replace('-', "_")
}

/// Renders an enum symbol back into CLI syntax.
pub fn desymbolize(symbol: &str) -> String {
    symbol.replace('_', "-")
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// The attribute is not configured.
    Absent,
    /// Free-form text.
    Str(String),
    /// Integer.
    Int(i64),
    /// Flag.
    Bool(bool),
    /// Enum symbol.
    Enum(String),
    /// Sorted set of strings.
    Set(BTreeSet<String>),
}

impl AttributeValue {
    /// Builds a set value from any iterable of strings.
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeValue::Set(items.into_iter().map(Into::into).collect())
    }

    /// Builds a string value.
    pub fn str(value: impl Into<String>) -> Self {
        AttributeValue::Str(value.into())
    }

    /// Builds an enum value, normalizing separators.
    pub fn symbol(value: &str) -> Self {
        AttributeValue::Enum(symbolize(value))
    }

    /// Returns true for [`AttributeValue::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, AttributeValue::Absent)
    }

    /// Returns the boolean, if this is a flag.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the set members, if this is a set.
    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            AttributeValue::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Renders a scalar in CLI syntax. Returns `None` for absent values and sets.
    pub fn render(&self) -> Option<String> {
        match self {
            AttributeValue::Absent | AttributeValue::Set(_) => None,
            AttributeValue::Str(s) => Some(s.clone()),
            AttributeValue::Int(i) => Some(i.to_string()),
            AttributeValue::Bool(b) => Some(b.to_string()),
            AttributeValue::Enum(symbol) => Some(desymbolize(symbol)),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Absent => write!(f, "absent"),
            AttributeValue::Str(s) => write!(f, "{}", s),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Enum(symbol) => write!(f, ":{}", symbol),
            AttributeValue::Set(items) => {
                let joined: Vec<&str> = items.iter().map(String::as_str).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

/// Schema default, expressible in a `static` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// Not configured unless observed.
    Absent,
    /// Flag default.
    Bool(bool),
    /// Integer default.
    Int(i64),
    /// Enum symbol default.
    Enum(&'static str),
    /// Empty set.
    EmptySet,
}

impl DefaultValue {
    /// Materializes the default as a value.
    pub fn to_value(self) -> AttributeValue {
        match self {
            DefaultValue::Absent => AttributeValue::Absent,
            DefaultValue::Bool(b) => AttributeValue::Bool(b),
            DefaultValue::Int(i) => AttributeValue::Int(i),
            DefaultValue::Enum(symbol) => AttributeValue::Enum(symbol.to_string()),
            DefaultValue::EmptySet => AttributeValue::Set(BTreeSet::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_coercion() {
        assert_eq!(ValueType::Integer.coerce("65000"), Some(AttributeValue::Int(65000)));
        assert_eq!(ValueType::Integer.coerce("external"), None);
    }

    #[test]
    fn test_enum_coercion_normalizes_separators() {
        let ty = ValueType::Enum(&["false", "true", "message_digest"]);
        assert_eq!(
            ty.coerce("message-digest"),
            Some(AttributeValue::Enum("message_digest".to_string()))
        );
        assert_eq!(ty.coerce("md5"), None);
    }

    #[test]
    fn test_set_coercion_wraps_single_element() {
        assert_eq!(
            ValueType::StringSet.coerce("10.0.0.0/8"),
            Some(AttributeValue::set(["10.0.0.0/8"]))
        );
    }

    #[test]
    fn test_absent_collapses_flags_and_sets() {
        assert_eq!(ValueType::Boolean.absent(), AttributeValue::Bool(false));
        assert_eq!(ValueType::StringSet.absent(), AttributeValue::set(Vec::<String>::new()));
        assert_eq!(ValueType::Integer.absent(), AttributeValue::Absent);
    }

    #[test]
    fn test_render_enum_restores_dashes() {
        assert_eq!(
            AttributeValue::symbol("non-broadcast").render(),
            Some("non-broadcast".to_string())
        );
        assert_eq!(AttributeValue::Absent.render(), None);
    }

    #[test]
    fn test_set_deduplicates() {
        let value = AttributeValue::set(["b", "a", "b"]);
        assert_eq!(value.as_set().map(|s| s.len()), Some(2));
        assert_eq!(value.to_string(), "[a, b]");
    }
}
