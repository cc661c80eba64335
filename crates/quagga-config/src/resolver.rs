//! Post-parse resolution of inherited attributes.
//!
//! Address-family activation of a BGP neighbor is often implied rather
//! than stated. Its effective value is, in order of precedence:
//!
//! 1. an explicit `[no] neighbor X activate` line for that family
//! 2. the resolved value of the peer-group the neighbor belongs to
//! 3. the router's `bgp default ipv4-unicast` flag, for ipv4 unicast only;
//!    every other family defaults to inactive
//!
//! Peer-groups are resolved before plain neighbors so their values can be
//! inherited. A neighbor naming an undefined peer-group falls back to the
//! router default.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::identity::Identity;
use crate::instance::EntityInstance;
use crate::parser::ParsedConfig;
use crate::schema::Kind;
use crate::value::AttributeValue;

const ACTIVATE: &str = "activate";

/// (family, subtype) of the address-family every neighbor takes part in
/// unless told otherwise.
const DEFAULT_FAMILY: [(&str, &str); 2] = [("family", "ipv4"), ("subtype", "unicast")];

impl ParsedConfig {
    /// Applies [`resolve`] to the parsed instances.
    pub fn resolved(mut self) -> Self {
        self.instances = resolve(self.instances);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Membership<'a> {
    is_group: bool,
    group: Option<&'a str>,
}

/// Resolves inherited attributes.
///
/// Every neighbor gains an ipv4 unicast address-family instance (placed
/// right after it) if the text had none, and a member of a peer-group gains
/// one for every address-family its group appears in, so inherited
/// activation is always observable.
pub fn resolve(instances: Vec<EntityInstance>) -> Vec<EntityInstance> {
    let instances = materialize_default_families(instances);
    let mut instances = materialize_group_families(instances);

    let router_defaults: HashMap<String, bool> = instances
        .iter()
        .filter(|instance| instance.kind() == Kind::BgpRouter)
        .filter_map(|router| {
            let asn = router.identity.get("asn")?.to_string();
            let enabled = router
                .get("default_ipv4_unicast")
                .and_then(AttributeValue::as_bool)
                .unwrap_or(true);
            Some((asn, enabled))
        })
        .collect();

    let memberships: HashMap<(String, String), Membership<'_>> = instances
        .iter()
        .filter(|instance| instance.kind() == Kind::BgpPeer)
        .filter_map(|peer| {
            let key = (
                peer.identity.get("asn")?.to_string(),
                peer.identity.get("peer")?.to_string(),
            );
            let membership = Membership {
                is_group: peer.get("is_peer_group").and_then(AttributeValue::as_bool) == Some(true),
                group: match peer.get("peer_group") {
                    Some(AttributeValue::Str(group)) => Some(group.as_str()),
                    _ => None,
                },
            };
            Some((key, membership))
        })
        .collect();

    let membership_of = |identity: &Identity| {
        match (identity.get("asn"), identity.get("peer")) {
            (Some(asn), Some(peer)) => memberships
                .get(&(asn.to_string(), peer.to_string()))
                .copied()
                .unwrap_or_default(),
            _ => Membership::default(),
        }
    };

    let default_for = |identity: &Identity| -> bool {
        let is_default_family = DEFAULT_FAMILY
            .iter()
            .all(|(field, value)| identity.get(field) == Some(*value));
        is_default_family
            && identity
                .get("asn")
                .and_then(|asn| router_defaults.get(asn))
                .copied()
                .unwrap_or(true)
    };

    // Computed against an immutable view, applied afterwards.
    let mut group_values: HashMap<(String, String, String, String), bool> = HashMap::new();
    let mut updates: Vec<(usize, bool)> = Vec::new();

    let families: Vec<(usize, &EntityInstance)> = instances
        .iter()
        .enumerate()
        .filter(|(_, instance)| instance.kind() == Kind::BgpPeerAddressFamily)
        .collect();

    // Pass A: peer-groups.
    for (index, af) in &families {
        if !membership_of(&af.identity).is_group {
            continue;
        }
        let value = match af.get(ACTIVATE) {
            Some(AttributeValue::Bool(explicit)) if af.is_explicit(ACTIVATE) => *explicit,
            _ => default_for(&af.identity),
        };
        if let Some(key) = family_key(&af.identity, None) {
            group_values.insert(key, value);
        }
        if !af.is_explicit(ACTIVATE) {
            updates.push((*index, value));
        }
    }

    // Pass B: neighbors, inheriting from their group.
    for (index, af) in &families {
        let membership = membership_of(&af.identity);
        if membership.is_group || af.is_explicit(ACTIVATE) {
            continue;
        }
        let inherited = membership
            .group
            .and_then(|group| family_key(&af.identity, Some(group)))
            .and_then(|key| group_values.get(&key).copied());
        let value = inherited.unwrap_or_else(|| default_for(&af.identity));
        updates.push((*index, value));
    }

    for (index, value) in updates {
        let af = &mut instances[index];
        debug!(identity = %af.identity, activate = value, "Resolved address-family activation");
        af.derive(ACTIVATE, AttributeValue::Bool(value));
    }

    instances
}

/// `(asn, peer, family, subtype)`, with the peer optionally replaced.
fn family_key(identity: &Identity, peer: Option<&str>) -> Option<(String, String, String, String)> {
    Some((
        identity.get("asn")?.to_string(),
        peer.or_else(|| identity.get("peer"))?.to_string(),
        identity.get("family")?.to_string(),
        identity.get("subtype")?.to_string(),
    ))
}

fn materialize_default_families(instances: Vec<EntityInstance>) -> Vec<EntityInstance> {
    let existing: HashSet<Identity> = instances
        .iter()
        .filter(|instance| instance.kind() == Kind::BgpPeerAddressFamily)
        .map(|instance| instance.identity.clone())
        .collect();

    let mut out = Vec::with_capacity(instances.len());
    for instance in instances {
        let implied = (instance.kind() == Kind::BgpPeer)
            .then(|| {
                instance
                    .identity
                    .extend(Kind::BgpPeerAddressFamily, &DEFAULT_FAMILY)
            })
            .flatten()
            .filter(|identity| !existing.contains(identity));
        out.push(instance);
        if let Some(identity) = implied {
            out.push(EntityInstance::materialized(identity));
        }
    }
    out
}

/// Places each implied family of a member after the member's own
/// address-family instances that directly follow it.
fn materialize_group_families(instances: Vec<EntityInstance>) -> Vec<EntityInstance> {
    let mut existing: HashSet<Identity> = HashSet::new();
    let mut group_families: HashMap<(String, String), Vec<(String, String)>> = HashMap::new();
    for af in instances
        .iter()
        .filter(|instance| instance.kind() == Kind::BgpPeerAddressFamily)
    {
        existing.insert(af.identity.clone());
        if let Some((asn, peer, family, subtype)) = family_key(&af.identity, None) {
            group_families
                .entry((asn, peer))
                .or_default()
                .push((family, subtype));
        }
    }

    let mut out = Vec::with_capacity(instances.len());
    let mut pending: Vec<EntityInstance> = Vec::new();
    for instance in instances {
        let follows_member = instance.kind() == Kind::BgpPeerAddressFamily
            && pending.first().is_some_and(|implied| {
                ["asn", "peer"]
                    .iter()
                    .all(|field| implied.identity.get(field) == instance.identity.get(field))
            });
        if !follows_member {
            out.append(&mut pending);
        }

        if instance.kind() == Kind::BgpPeer {
            let group = match instance.get("peer_group") {
                Some(AttributeValue::Str(group)) => Some(group.as_str()),
                _ => None,
            };
            let families = instance
                .identity
                .get("asn")
                .zip(group)
                .and_then(|(asn, group)| group_families.get(&(asn.to_string(), group.to_string())));
            pending = families
                .into_iter()
                .flatten()
                .filter_map(|(family, subtype)| {
                    instance.identity.extend(
                        Kind::BgpPeerAddressFamily,
                        &[("family", family.as_str()), ("subtype", subtype.as_str())],
                    )
                })
                .filter(|identity| !existing.contains(identity))
                .map(EntityInstance::materialized)
                .collect();
        }
        out.push(instance);
    }
    out.append(&mut pending);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn activate(parsed: &ParsedConfig, identity: &str) -> Option<bool> {
        let identity = Identity::parse(Kind::BgpPeerAddressFamily, identity).unwrap();
        parsed
            .find(&identity)
            .and_then(|af| af.get(ACTIVATE))
            .and_then(AttributeValue::as_bool)
    }

    #[test]
    fn test_peer_group_inherits_router_default() {
        let text = "\
router bgp 65000
 neighbor INTERNAL peer-group
 neighbor INTERNAL remote-as 65000
 neighbor 10.0.0.2 peer-group INTERNAL
 neighbor 10.0.0.3 peer-group INTERNAL
 no neighbor 10.0.0.3 activate
!
";
        let parsed = parse(text).resolved();
        assert_eq!(activate(&parsed, "65000 INTERNAL ipv4 unicast"), Some(true));
        assert_eq!(activate(&parsed, "65000 10.0.0.2 ipv4 unicast"), Some(true));
        assert_eq!(activate(&parsed, "65000 10.0.0.3 ipv4 unicast"), Some(false));
    }

    #[test]
    fn test_router_default_disabled() {
        let text = "\
router bgp 65000
 no bgp default ipv4-unicast
 neighbor 10.0.0.2 remote-as 65001
 neighbor 10.0.0.4 remote-as 65002
 neighbor 10.0.0.4 activate
";
        let parsed = parse(text).resolved();
        assert_eq!(activate(&parsed, "65000 10.0.0.2 ipv4 unicast"), Some(false));
        assert_eq!(activate(&parsed, "65000 10.0.0.4 ipv4 unicast"), Some(true));
    }

    #[test]
    fn test_member_inherits_group_explicit_value() {
        let text = "\
router bgp 65000
 no bgp default ipv4-unicast
 neighbor EDGE peer-group
 neighbor EDGE activate
 neighbor 10.0.0.2 peer-group EDGE
";
        let parsed = parse(text).resolved();
        assert_eq!(activate(&parsed, "65000 EDGE ipv4 unicast"), Some(true));
        assert_eq!(activate(&parsed, "65000 10.0.0.2 ipv4 unicast"), Some(true));
    }

    #[test]
    fn test_unknown_group_falls_back_to_router_default() {
        let text = "router bgp 65000\n neighbor 10.0.0.2 peer-group GHOST\n";
        let parsed = parse(text).resolved();
        assert_eq!(activate(&parsed, "65000 10.0.0.2 ipv4 unicast"), Some(true));
    }

    #[test]
    fn test_other_families_default_inactive() {
        let text = "\
router bgp 65000
 neighbor 10.0.0.2 remote-as 65001
 address-family ipv6
  neighbor 10.0.0.2 route-map RM-V6 in
 exit-address-family
";
        let parsed = parse(text).resolved();
        assert_eq!(activate(&parsed, "65000 10.0.0.2 ipv6 unicast"), Some(false));
        assert_eq!(activate(&parsed, "65000 10.0.0.2 ipv4 unicast"), Some(true));
    }

    #[test]
    fn test_default_family_placed_after_peer() {
        let text = "router bgp 65000\n neighbor 10.0.0.2 remote-as 65001\ninterface eth0\n";
        let parsed = parse(text).resolved();
        let order: Vec<String> = parsed.instances.iter().map(ToString::to_string).collect();
        assert_eq!(
            order,
            vec![
                "bgp_router[65000]",
                "bgp_peer[65000 10.0.0.2]",
                "bgp_peer_address_family[65000 10.0.0.2 ipv4 unicast]",
                "interface[eth0]",
            ]
        );
    }

    #[test]
    fn test_member_inherits_group_activation_in_other_family() {
        let text = "\
router bgp 65000
 neighbor EDGE peer-group
 neighbor 10.0.0.2 peer-group EDGE
 neighbor 10.0.0.3 remote-as 65001
 address-family ipv6
  neighbor EDGE activate
 exit-address-family
";
        let parsed = parse(text).resolved();
        assert_eq!(activate(&parsed, "65000 EDGE ipv6 unicast"), Some(true));
        assert_eq!(activate(&parsed, "65000 10.0.0.2 ipv6 unicast"), Some(true));
        assert_eq!(activate(&parsed, "65000 10.0.0.3 ipv6 unicast"), None);

        let order: Vec<String> = parsed.instances.iter().map(ToString::to_string).collect();
        assert_eq!(
            order,
            vec![
                "bgp_router[65000]",
                "bgp_peer[65000 EDGE]",
                "bgp_peer_address_family[65000 EDGE ipv4 unicast]",
                "bgp_peer[65000 10.0.0.2]",
                "bgp_peer_address_family[65000 10.0.0.2 ipv4 unicast]",
                "bgp_peer_address_family[65000 10.0.0.2 ipv6 unicast]",
                "bgp_peer[65000 10.0.0.3]",
                "bgp_peer_address_family[65000 10.0.0.3 ipv4 unicast]",
                "bgp_peer_address_family[65000 EDGE ipv6 unicast]",
            ]
        );
    }

    #[test]
    fn test_member_own_family_line_overrides_group() {
        let text = "\
router bgp 65000
 neighbor EDGE peer-group
 neighbor 10.0.0.2 peer-group EDGE
 address-family ipv6
  neighbor EDGE activate
  no neighbor 10.0.0.2 activate
 exit-address-family
";
        let parsed = parse(text).resolved();
        assert_eq!(activate(&parsed, "65000 10.0.0.2 ipv6 unicast"), Some(false));
        let identity = Identity::parse(Kind::BgpPeerAddressFamily, "65000 10.0.0.2 ipv6 unicast").unwrap();
        assert_eq!(
            parsed.instances.iter().filter(|i| i.identity == identity).count(),
            1
        );
    }

    #[test]
    fn test_resolved_values_are_not_explicit() {
        let parsed = parse("router bgp 65000\n neighbor 10.0.0.2 remote-as 65001\n").resolved();
        let identity = Identity::parse(Kind::BgpPeerAddressFamily, "65000 10.0.0.2 ipv4 unicast").unwrap();
        assert!(!parsed.find(&identity).unwrap().is_explicit(ACTIVATE));
    }
}
