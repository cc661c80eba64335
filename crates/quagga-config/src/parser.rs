//! Running-configuration parser.
//!
//! A single forward scan over the text. Non-indented lines either open a
//! block (`router bgp`, `interface`, ...) or are matched against top-level
//! kinds; indented lines belong to the most recent block. A block ends at
//! the next non-indented, non-comment line, which is then examined afresh.
//!
//! Inside `router bgp`, `address-family` sub-blocks narrow the active
//! attribute set and supply the family of any peer address-family instance
//! created while they are open.

use regex::Captures;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace, warn};

use crate::error::Diagnostic;
use crate::identity::Identity;
use crate::instance::EntityInstance;
use crate::registry::{CompiledBlock, Matcher, REGISTRY};
use crate::schema::{AttributeSpec, Kind, Scope};
use crate::value::{AttributeValue, ValueType};

/// Result of scanning configuration text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    /// Instances in first-seen order, fully materialized.
    pub instances: Vec<EntityInstance>,
    /// Values that could not be coerced to their declared type.
    pub diagnostics: Vec<Diagnostic>,
    /// Lines that matched no block and no attribute.
    pub skipped: usize,
}

impl ParsedConfig {
    /// Finds an instance by identity.
    pub fn find(&self, identity: &Identity) -> Option<&EntityInstance> {
        self.instances
            .iter()
            .find(|instance| &instance.identity == identity)
    }

    /// Iterates over instances of one kind.
    pub fn of_kind(&self, kind: Kind) -> impl Iterator<Item = &EntityInstance> {
        self.instances
            .iter()
            .filter(move |instance| instance.kind() == kind)
    }
}

/// Parses configuration text into materialized instances.
///
/// Never fails: malformed values become [`Diagnostic`]s and unknown lines
/// are skipped.
pub fn parse(text: &str) -> ParsedConfig {
    let mut scanner = Scanner::default();
    for (index, line) in text.lines().enumerate() {
        scanner.scan_line(index + 1, line);
    }
    scanner.finish()
}

struct OpenBlock {
    block: &'static CompiledBlock,
    header: BTreeMap<String, String>,
    /// Fields captured by the open sub-block header, if any.
    sub_block: Option<BTreeMap<String, String>>,
}

impl OpenBlock {
    /// Context fields in effect: the open sub-block's, or the block's
    /// implicit root context.
    fn context(&self, field: &str) -> Option<&str> {
        match &self.sub_block {
            Some(fields) => fields.get(field).map(String::as_str),
            None => self.block.sub_block.as_ref().and_then(|sub| {
                sub.root
                    .iter()
                    .find(|(name, _)| *name == field)
                    .map(|(_, value)| *value)
            }),
        }
    }

    fn in_root_family(&self) -> bool {
        let (Some(fields), Some(sub)) = (&self.sub_block, &self.block.sub_block) else {
            return true;
        };
        sub.root
            .iter()
            .all(|(name, value)| fields.get(*name).map(String::as_str) == Some(*value))
    }

    fn allows(&self, scope: Scope) -> bool {
        match scope {
            Scope::Root => self.sub_block.is_none(),
            Scope::DefaultFamily => self.in_root_family(),
            Scope::AnyFamily => true,
        }
    }
}

#[derive(Default)]
struct Scanner {
    instances: Vec<EntityInstance>,
    index: HashMap<Identity, usize>,
    diagnostics: Vec<Diagnostic>,
    skipped: usize,
    open: Option<OpenBlock>,
}

impl Scanner {
    fn scan_line(&mut self, line_no: usize, raw: &str) {
        let line = raw.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('!') {
            return;
        }

        if trimmed.len() == line.len() {
            self.scan_top_level(line_no, line);
        } else {
            // Nesting depth is tracked by sub-block headers, not by the
            // amount of indentation.
            let normalized = format!(" {}", trimmed);
            self.scan_indented(line_no, &normalized);
        }
    }

    fn scan_top_level(&mut self, line_no: usize, line: &str) {
        if let Some(open) = self.open.take() {
            debug!(line = line_no, section = ?open.block.section, "Block closed");
        }

        for block in &REGISTRY.blocks {
            if let Some(caps) = block.header.captures(line) {
                self.open_block(line_no, block, &caps);
                return;
            }
        }

        for matcher in &REGISTRY.top_level {
            if let Some(caps) = matcher.regex().captures(line) {
                self.apply(line_no, matcher, &caps, None);
                return;
            }
        }

        self.skip(line_no, line);
    }

    fn open_block(&mut self, line_no: usize, block: &'static CompiledBlock, caps: &Captures<'_>) {
        let header: BTreeMap<String, String> = block
            .header
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
            .collect();

        debug!(line = line_no, section = ?block.section, header = ?header, "Block opened");

        for kind in &block.openers {
            let schema = kind.schema();
            let identity = Identity::from_fields(*kind, |field| {
                header
                    .get(field)
                    .map(String::as_str)
                    .or_else(|| schema.fixed(field))
            });
            if let Some(identity) = identity {
                self.instance(identity);
            }
        }

        self.open = Some(OpenBlock {
            block,
            header,
            sub_block: None,
        });
    }

    fn scan_indented(&mut self, line_no: usize, line: &str) {
        let Some(mut open) = self.open.take() else {
            self.skip(line_no, line);
            return;
        };

        if let Some(sub) = &open.block.sub_block {
            if sub.exit.is_match(line) {
                trace!(line = line_no, "Sub-block closed");
                open.sub_block = None;
                self.open = Some(open);
                return;
            }
            if let Some(caps) = sub.enter.captures(line) {
                let mut fields: BTreeMap<String, String> = sub
                    .defaults
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
                for name in sub.enter.capture_names().flatten() {
                    if let Some(m) = caps.name(name) {
                        fields.insert(name.to_string(), m.as_str().to_string());
                    }
                }
                trace!(line = line_no, context = ?fields, "Sub-block opened");
                open.sub_block = Some(fields);
                self.open = Some(open);
                return;
            }
        }

        let matched = open
            .block
            .matchers
            .iter()
            .filter(|matcher| open.allows(matcher.scope()))
            .find_map(|matcher| matcher.regex().captures(line).map(|caps| (matcher, caps)));

        match matched {
            Some((matcher, caps)) => self.apply(line_no, matcher, &caps, Some(&open)),
            None => self.skip(line_no, line),
        }
        self.open = Some(open);
    }

    fn apply(
        &mut self,
        line_no: usize,
        matcher: &'static Matcher,
        caps: &Captures<'_>,
        open: Option<&OpenBlock>,
    ) {
        let kind = matcher.kind();
        let schema = kind.schema();
        let identity = Identity::from_fields(kind, |field| {
            caps.name(field)
                .map(|m| m.as_str())
                .or_else(|| open.and_then(|open| open.context(field)))
                .or_else(|| open.and_then(|open| open.header.get(field).map(String::as_str)))
                .or_else(|| schema.fixed(field))
        });
        let Some(identity) = identity else {
            self.skip(line_no, caps.get(0).map(|m| m.as_str()).unwrap_or_default());
            return;
        };

        let index = self.instance(identity);
        match matcher {
            Matcher::Attribute { spec, .. } => {
                self.assign(line_no, index, spec, caps);
                for field in schema.attributes.iter().filter(|s| s.pattern().is_none()) {
                    if caps.name(field.name).is_some() {
                        self.assign(line_no, index, field, caps);
                    }
                }
            }
            Matcher::Record { .. } => {
                for spec in schema.attributes {
                    if caps.name(spec.name).is_some() {
                        self.assign(line_no, index, spec, caps);
                    }
                }
            }
        }
    }

    fn assign(
        &mut self,
        line_no: usize,
        index: usize,
        spec: &'static AttributeSpec,
        caps: &Captures<'_>,
    ) {
        let negated = caps.name("no").is_some();
        let group = if spec.pattern().is_some() { "value" } else { spec.name };
        let raw = caps.name(group).map(|m| m.as_str()).or(spec.implied);

        let instance = &mut self.instances[index];
        let coerced = match (spec.value_type, raw) {
            (ValueType::Boolean, _) => Some(AttributeValue::Bool(!negated)),
            (ValueType::Enum(_), _) if spec.toggle && negated => {
                Some(AttributeValue::Enum("false".to_string()))
            }
            (ValueType::StringSet, Some(element)) => {
                instance.append(spec, element.trim());
                return;
            }
            (value_type, Some(raw)) => value_type.coerce(raw),
            (_, None) => None,
        };

        match coerced {
            Some(value) => instance.assign(spec, value),
            None => {
                let diagnostic = Diagnostic {
                    line: line_no,
                    kind: instance.kind(),
                    identity: instance.identity.to_string(),
                    attribute: spec.name,
                    raw: raw.unwrap_or_default().to_string(),
                    expected: spec.value_type.name(),
                };
                warn!(diagnostic = %diagnostic, "Keeping default for malformed value");
                self.diagnostics.push(diagnostic);
            }
        }
    }

    /// Returns the index of the instance with this identity, creating it
    /// with schema defaults on first sight.
    fn instance(&mut self, identity: Identity) -> usize {
        if let Some(index) = self.index.get(&identity) {
            return *index;
        }
        let index = self.instances.len();
        trace!(kind = %identity.kind(), identity = %identity, "New instance");
        self.index.insert(identity.clone(), index);
        self.instances.push(EntityInstance::materialized(identity));
        index
    }

    fn skip(&mut self, line_no: usize, line: &str) {
        trace!(line = line_no, text = line, "No schema match");
        self.skipped += 1;
    }

    fn finish(self) -> ParsedConfig {
        debug!(
            instances = self.instances.len(),
            diagnostics = self.diagnostics.len(),
            skipped = self.skipped,
            "Parsed running configuration"
        );
        ParsedConfig {
            instances: self.instances,
            diagnostics: self.diagnostics,
            skipped: self.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(kind: Kind, text: &str) -> Identity {
        Identity::parse(kind, text).unwrap()
    }

    #[test]
    fn test_bgp_router_scalars() {
        let parsed = parse("router bgp 65000\n bgp router-id 10.0.0.1\n maximum-paths 4\n!\n");
        assert_eq!(parsed.instances.len(), 1);
        let router = &parsed.instances[0];
        assert_eq!(router.identity.to_string(), "65000");
        assert_eq!(router.get("router_id"), Some(&AttributeValue::str("10.0.0.1")));
        assert_eq!(router.get("maximum_paths_ebgp"), Some(&AttributeValue::Int(4)));
        assert_eq!(router.get("maximum_paths_ibgp"), Some(&AttributeValue::Int(1)));
        assert_eq!(router.get("default_ipv4_unicast"), Some(&AttributeValue::Bool(true)));
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_ibgp_not_shadowed_by_ebgp() {
        let parsed = parse("router bgp 65000\n maximum-paths ibgp 8\n");
        let router = &parsed.instances[0];
        assert_eq!(router.get("maximum_paths_ibgp"), Some(&AttributeValue::Int(8)));
        assert_eq!(router.get("maximum_paths_ebgp"), Some(&AttributeValue::Int(1)));
    }

    #[test]
    fn test_negated_boolean_forces_false() {
        let parsed = parse("router bgp 65000\n no bgp default ipv4-unicast\n");
        assert_eq!(
            parsed.instances[0].get("default_ipv4_unicast"),
            Some(&AttributeValue::Bool(false))
        );
    }

    #[test]
    fn test_set_accumulates_across_lines() {
        let text = "router bgp 65000\n network 10.0.0.0/8\n network 192.168.0.0/16\n network 10.0.0.0/8\n";
        let parsed = parse(text);
        assert_eq!(
            parsed.instances[0].get("networks"),
            Some(&AttributeValue::set(["10.0.0.0/8", "192.168.0.0/16"]))
        );
    }

    #[test]
    fn test_ipv6_networks_inside_address_family() {
        let text = "router bgp 65000\n network 10.0.0.0/8\n address-family ipv6\n  network 2001:db8::/32\n exit-address-family\n";
        let parsed = parse(text);
        assert_eq!(
            parsed.instances[0].get("networks"),
            Some(&AttributeValue::set(["10.0.0.0/8", "2001:db8::/32"]))
        );
    }

    #[test]
    fn test_root_scoped_attribute_inactive_in_sub_block() {
        let text = "router bgp 65000\n address-family ipv6\n  maximum-paths 4\n exit-address-family\n";
        let parsed = parse(text);
        assert_eq!(parsed.instances[0].get("maximum_paths_ebgp"), Some(&AttributeValue::Int(1)));
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_peers_and_address_families() {
        let text = "\
router bgp 65000
 neighbor INTERNAL peer-group
 neighbor INTERNAL remote-as 65000
 neighbor 10.0.0.2 remote-as 65001
 neighbor 10.0.0.2 description uplink to core
 address-family ipv6 unicast
  neighbor 10.0.0.2 activate
  neighbor 10.0.0.2 route-map RM-V6 in
 exit-address-family
!
";
        let parsed = parse(text);

        let group = parsed.find(&id(Kind::BgpPeer, "65000 INTERNAL")).unwrap();
        assert_eq!(group.get("is_peer_group"), Some(&AttributeValue::Bool(true)));
        assert_eq!(group.get("remote_as"), Some(&AttributeValue::Int(65000)));

        let peer = parsed.find(&id(Kind::BgpPeer, "65000 10.0.0.2")).unwrap();
        assert_eq!(peer.get("description"), Some(&AttributeValue::str("uplink to core")));

        let af = parsed
            .find(&id(Kind::BgpPeerAddressFamily, "65000 10.0.0.2 ipv6 unicast"))
            .unwrap();
        assert_eq!(af.get("activate"), Some(&AttributeValue::Bool(true)));
        assert_eq!(af.get("route_map_in"), Some(&AttributeValue::str("RM-V6")));
        assert!(af.is_explicit("activate"));
    }

    #[test]
    fn test_address_family_without_subtype_defaults_to_unicast() {
        let text = "router bgp 65000\n address-family ipv6\n  neighbor 10.0.0.2 activate\n";
        let parsed = parse(text);
        assert!(parsed
            .find(&id(Kind::BgpPeerAddressFamily, "65000 10.0.0.2 ipv6 unicast"))
            .is_some());
    }

    #[test]
    fn test_coercion_failure_keeps_default_and_reports() {
        let text = "router bgp 65000\n neighbor 10.0.0.2 remote-as external\n maximum-paths 2\n";
        let parsed = parse(text);
        let peer = parsed.find(&id(Kind::BgpPeer, "65000 10.0.0.2")).unwrap();
        assert_eq!(peer.get("remote_as"), Some(&AttributeValue::Absent));
        assert_eq!(parsed.diagnostics.len(), 1);
        let diagnostic = &parsed.diagnostics[0];
        assert_eq!(diagnostic.line, 2);
        assert_eq!(diagnostic.attribute, "remote_as");
        assert_eq!(diagnostic.raw, "external");
        assert_eq!(diagnostic.expected, "integer");
        // the parse continued past the malformed line
        assert_eq!(parsed.instances[0].get("maximum_paths_ebgp"), Some(&AttributeValue::Int(2)));
    }

    #[test]
    fn test_non_matching_top_level_line_closes_block() {
        let text = "router bgp 65000\n bgp router-id 10.0.0.1\nhostname r1\n maximum-paths 4\n";
        let parsed = parse(text);
        assert_eq!(parsed.instances.len(), 1);
        assert_eq!(parsed.instances[0].get("maximum_paths_ebgp"), Some(&AttributeValue::Int(1)));
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn test_comment_does_not_close_block() {
        let text = "interface eth0\n description uplink\n!\n shutdown\n";
        let parsed = parse(text);
        let interface = &parsed.instances[0];
        assert_eq!(interface.get("description"), Some(&AttributeValue::str("uplink")));
        assert_eq!(interface.get("shutdown"), Some(&AttributeValue::Bool(true)));
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_ospf_router_and_areas() {
        let text = "\
router ospf
 ospf router-id 10.0.0.1
 log-adjacency-changes detail
 passive-interface lo
 network 10.0.0.0/24 area 0.0.0.0
 network 10.1.0.0/24 area 0
 area 0.0.0.1 stub no-summary
 area 0.0.0.1 authentication message-digest
";
        let parsed = parse(text);
        let router = parsed.find(&id(Kind::OspfRouter, "ospf")).unwrap();
        assert_eq!(router.get("log_adjacency_changes"), Some(&AttributeValue::symbol("detail")));
        assert_eq!(router.get("passive_interfaces"), Some(&AttributeValue::set(["lo"])));

        let backbone = parsed.find(&id(Kind::OspfArea, "0.0.0.0")).unwrap();
        assert_eq!(
            backbone.get("networks"),
            Some(&AttributeValue::set(["10.0.0.0/24", "10.1.0.0/24"]))
        );

        let stub = parsed.find(&id(Kind::OspfArea, "0.0.0.1")).unwrap();
        assert_eq!(stub.get("stub"), Some(&AttributeValue::symbol("no_summary")));
        assert_eq!(stub.get("auth"), Some(&AttributeValue::symbol("message_digest")));
    }

    #[test]
    fn test_bare_toggle_is_true() {
        let parsed = parse("router ospf\n log-adjacency-changes\n");
        assert_eq!(
            parsed.instances[0].get("log_adjacency_changes"),
            Some(&AttributeValue::symbol("true"))
        );
    }

    #[test]
    fn test_interface_with_mixed_addresses() {
        let text = "\
interface eth0
 description core link
 ip address 10.0.0.1/24
 ipv6 address 2001:db8::1/64
 ip ospf network point-to-point
 ip ospf hello-interval 5
 no link-detect
";
        let parsed = parse(text);
        let interface = parsed.find(&id(Kind::Interface, "eth0")).unwrap();
        assert_eq!(
            interface.get("ip_address"),
            Some(&AttributeValue::set(["10.0.0.1/24", "2001:db8::1/64"]))
        );
        assert_eq!(
            interface.get("ospf_network"),
            Some(&AttributeValue::symbol("point_to_point"))
        );
        assert_eq!(interface.get("ospf_hello_interval"), Some(&AttributeValue::Int(5)));
        assert_eq!(interface.get("ospf_dead_interval"), Some(&AttributeValue::Int(40)));
        assert_eq!(interface.get("link_detect"), Some(&AttributeValue::Bool(false)));
    }

    #[test]
    fn test_empty_interface_block_still_yields_instance() {
        let parsed = parse("interface lo\n!\ninterface eth0\n");
        assert_eq!(parsed.instances.len(), 2);
        assert_eq!(parsed.instances[1].identity.to_string(), "eth0");
    }

    #[test]
    fn test_top_level_policy_lines() {
        let text = "\
ip prefix-list PL-IN seq 5 permit 10.0.0.0/8 le 24
ipv6 prefix-list PL6 seq 10 deny ::/0
ip community-list standard CL-1 permit 65000:100
ip community-list standard CL-1 deny 65000:200
ip as-path access-list AS-1 permit ^65001_
route-map RM-IN permit 10
 match ip address prefix-list PL-IN
 set local-preference 200
 on-match next
";
        let parsed = parse(text);

        let entry = parsed.find(&id(Kind::PrefixList, "PL-IN:5")).unwrap();
        assert_eq!(entry.get("proto"), Some(&AttributeValue::symbol("ip")));
        assert_eq!(entry.get("action"), Some(&AttributeValue::symbol("permit")));
        assert_eq!(entry.get("prefix"), Some(&AttributeValue::str("10.0.0.0/8")));
        assert_eq!(entry.get("ge"), Some(&AttributeValue::Absent));
        assert_eq!(entry.get("le"), Some(&AttributeValue::Int(24)));

        let v6 = parsed.find(&id(Kind::PrefixList, "PL6:10")).unwrap();
        assert_eq!(v6.get("proto"), Some(&AttributeValue::symbol("ipv6")));

        let community = parsed.find(&id(Kind::BgpCommunityList, "CL-1")).unwrap();
        assert_eq!(
            community.get("rules"),
            Some(&AttributeValue::set(["deny 65000:200", "permit 65000:100"]))
        );

        assert_eq!(community.get("list_type"), Some(&AttributeValue::symbol("standard")));

        let as_path = parsed.find(&id(Kind::BgpAsPath, "AS-1")).unwrap();
        assert_eq!(as_path.get("rules"), Some(&AttributeValue::set(["permit ^65001_"])));

        let route_map = parsed.find(&id(Kind::RouteMap, "RM-IN:permit:10")).unwrap();
        assert_eq!(
            route_map.get("match"),
            Some(&AttributeValue::set(["ip address prefix-list PL-IN"]))
        );
        assert_eq!(route_map.get("on_match"), Some(&AttributeValue::str("next")));
    }

    #[test]
    fn test_community_list_type_captured_with_rule() {
        let parsed = parse("ip community-list expanded CL-2 permit 65000:.*\n");
        let community = parsed.find(&id(Kind::BgpCommunityList, "CL-2")).unwrap();
        assert_eq!(community.get("list_type"), Some(&AttributeValue::symbol("expanded")));
        assert_eq!(community.get("rules"), Some(&AttributeValue::set(["permit 65000:.*"])));
        assert!(community.is_explicit("list_type"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "\
router bgp 65000
 neighbor B remote-as 1
 neighbor A remote-as 2
 network 10.0.0.0/8
interface eth1
interface eth0
";
        assert_eq!(parse(text), parse(text));
        let order: Vec<String> = parse(text)
            .instances
            .iter()
            .map(|instance| instance.to_string())
            .collect();
        assert_eq!(
            order,
            vec![
                "bgp_router[65000]",
                "bgp_peer[65000 B]",
                "bgp_peer[65000 A]",
                "interface[eth1]",
                "interface[eth0]",
            ]
        );
    }

    #[test]
    fn test_indented_line_outside_block_is_skipped() {
        let parsed = parse(" bgp router-id 10.0.0.1\n");
        assert!(parsed.instances.is_empty());
        assert_eq!(parsed.skipped, 1);
    }
}
