//! Entity identities.
//!
//! An identity is the ordered list of key field values declared by the
//! kind's schema. Its string form joins the values with the kind's
//! separator: `65000 10.0.0.2` for a peer, `PL-IN:10` for a prefix-list
//! entry.

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Kind;

/// Identity of one entity instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    kind: Kind,
    values: Vec<String>,
}

impl Identity {
    /// Parses an identity string supplied by a caller.
    ///
    /// Fewer parts than identity fields is a [`ConfigError::MissingContext`]
    /// naming the first missing field; extra or malformed parts are a
    /// [`ConfigError::InvalidIdentity`].
    pub fn parse(kind: Kind, text: &str) -> ConfigResult<Self> {
        let schema = kind.schema();
        let text = text.trim();
        let parts: Vec<&str> = if schema.separator == ' ' {
            text.split_whitespace().collect()
        } else {
            text.split(schema.separator).collect()
        };

        if parts.len() > schema.identity.len() {
            return Err(ConfigError::invalid_identity(
                kind,
                text,
                format!(
                    "expected {} field(s) ({}), found {}",
                    schema.identity.len(),
                    schema.identity.join(&schema.separator.to_string()),
                    parts.len()
                ),
            ));
        }

        if parts.len() < schema.identity.len() {
            // A leading part that is not a valid first field means the
            // enclosing context was left out ("10.0.0.2" for a peer).
            let leading_ok = parts
                .first()
                .map(|part| validate_field(schema.identity[0], part).is_ok())
                .unwrap_or(false);
            let missing = if leading_ok {
                schema.identity[parts.len()]
            } else {
                schema.identity[0]
            };
            return Err(ConfigError::missing_context(kind, text, missing));
        }

        let mut values = Vec::with_capacity(schema.identity.len());
        for (i, field) in schema.identity.iter().enumerate() {
            let part = match parts.get(i) {
                Some(part) if !part.is_empty() => *part,
                _ => {
                    return Err(ConfigError::invalid_identity(
                        kind,
                        text,
                        format!("empty '{}'", field),
                    ))
                }
            };
            if let Some(fixed) = schema.fixed(field) {
                if part != fixed {
                    return Err(ConfigError::invalid_identity(
                        kind,
                        text,
                        format!("'{}' must be '{}'", field, fixed),
                    ));
                }
            }
            validate_field(field, part)
                .map_err(|message| ConfigError::invalid_identity(kind, text, message))?;
            values.push(normalize_field(field, part));
        }

        Ok(Self { kind, values })
    }

    /// Builds an identity by looking up every field.
    ///
    /// Returns `None` if any field cannot be resolved. Used while scanning,
    /// where values come from line captures and block context.
    pub fn from_fields<'a, F>(kind: Kind, mut lookup: F) -> Option<Self>
    where
        F: FnMut(&str) -> Option<&'a str>,
    {
        let values = kind
            .schema()
            .identity
            .iter()
            .map(|field| lookup(field).map(|value| normalize_field(field, value)))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { kind, values })
    }

    /// The entity kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Value of an identity field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.kind
            .schema()
            .identity
            .iter()
            .position(|name| *name == field)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// Returns `(field, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.kind
            .schema()
            .identity
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Returns a sibling identity of another kind sharing these fields,
    /// with extra fields appended.
    pub fn extend(&self, kind: Kind, extra: &[(&str, &str)]) -> Option<Self> {
        Self::from_fields(kind, |field| {
            self.get(field).or_else(|| {
                extra
                    .iter()
                    .find(|(name, _)| *name == field)
                    .map(|(_, value)| *value)
            })
        })
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = self.kind.schema().separator.to_string();
        f.write_str(&self.values.join(&separator))
    }
}

fn validate_field(field: &str, value: &str) -> Result<(), String> {
    match field {
        "asn" | "seq" if value.parse::<u32>().is_err() => {
            Err(format!("'{}' must be a decimal number, got '{}'", field, value))
        }
        "area" if value.parse::<Ipv4Addr>().is_err() && value.parse::<u32>().is_err() => {
            Err(format!("area must be a dotted quad, got '{}'", value))
        }
        "action" if value != "permit" && value != "deny" => {
            Err(format!("action must be permit or deny, got '{}'", value))
        }
        _ => Ok(()),
    }
}

/// Areas written in decimal form (`area 0`) are the same as their dotted
/// quad (`0.0.0.0`).
fn normalize_field(field: &str, value: &str) -> String {
    match field {
        "area" => value
            .parse::<u32>()
            .map(|n| Ipv4Addr::from(n).to_string())
            .unwrap_or_else(|_| value.to_string()),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound_peer_identity() {
        let id = Identity::parse(Kind::BgpPeer, "65000 10.0.0.2").unwrap();
        assert_eq!(id.get("asn"), Some("65000"));
        assert_eq!(id.get("peer"), Some("10.0.0.2"));
        assert_eq!(id.to_string(), "65000 10.0.0.2");
    }

    #[test]
    fn test_parse_peer_address_family_identity() {
        let id = Identity::parse(Kind::BgpPeerAddressFamily, "65000 INTERNAL ipv6 unicast").unwrap();
        assert_eq!(id.get("family"), Some("ipv6"));
        assert_eq!(id.get("subtype"), Some("unicast"));
    }

    #[test]
    fn test_parse_prefix_list_identity() {
        let id = Identity::parse(Kind::PrefixList, "PL-IN:10").unwrap();
        assert_eq!(id.get("name"), Some("PL-IN"));
        assert_eq!(id.get("seq"), Some("10"));
        assert_eq!(id.to_string(), "PL-IN:10");
    }

    #[test]
    fn test_peer_without_asn_is_missing_context() {
        let err = Identity::parse(Kind::BgpPeer, "10.0.0.2").unwrap_err();
        match err {
            ConfigError::MissingContext { field, .. } => assert_eq!(field, "asn"),
            other => panic!("Expected MissingContext, got {:?}", other),
        }
    }

    #[test]
    fn test_address_family_without_family_is_missing_context() {
        let err = Identity::parse(Kind::BgpPeerAddressFamily, "65000 10.0.0.2").unwrap_err();
        match err {
            ConfigError::MissingContext { field, .. } => assert_eq!(field, "family"),
            other => panic!("Expected MissingContext, got {:?}", other),
        }
    }

    #[test]
    fn test_peer_with_non_numeric_asn_is_invalid() {
        let err = Identity::parse(Kind::BgpPeer, "core 10.0.0.2").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentity { .. }));
    }

    #[test]
    fn test_extra_parts_are_invalid() {
        let err = Identity::parse(Kind::BgpRouter, "65000 65001").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentity { .. }));
    }

    #[test]
    fn test_fixed_identity() {
        assert!(Identity::parse(Kind::OspfRouter, "ospf").is_ok());
        assert!(Identity::parse(Kind::OspfRouter, "ospf6").is_err());
    }

    #[test]
    fn test_decimal_area_normalized() {
        let id = Identity::parse(Kind::OspfArea, "0").unwrap();
        assert_eq!(id.to_string(), "0.0.0.0");
        assert!(Identity::parse(Kind::OspfArea, "backbone").is_err());
    }

    #[test]
    fn test_extend_to_address_family() {
        let peer = Identity::parse(Kind::BgpPeer, "65000 INTERNAL").unwrap();
        let af = peer
            .extend(
                Kind::BgpPeerAddressFamily,
                &[("family", "ipv4"), ("subtype", "unicast")],
            )
            .unwrap();
        assert_eq!(af.to_string(), "65000 INTERNAL ipv4 unicast");
    }
}
