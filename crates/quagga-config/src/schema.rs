//! Static attribute schema.
//!
//! Each entity kind owns an ordered table of [`AttributeSpec`]s. Order is
//! significant: when a configuration line is scanned, the first spec whose
//! pattern matches wins, so tables list the most specific patterns first
//! (`maximum-paths ibgp N` before `maximum-paths N`).
//!
//! Patterns use named capture groups:
//!
//! - `value`: the attribute value
//! - `no`: a leading `no ` that negates a flag or toggle
//! - any identity field name (`peer`, `area`, ...): the key of the entity
//!   the line belongs to
//!
//! Templates reference identity fields and `{value}`; see [`crate::template`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::kinds;
use crate::value::{AttributeValue, DefaultValue, ValueType};

/// Manageable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// `router bgp <asn>`
    BgpRouter,
    /// A neighbor or peer-group inside `router bgp`.
    BgpPeer,
    /// Per address-family settings of a neighbor.
    BgpPeerAddressFamily,
    /// `router ospf`
    OspfRouter,
    /// An area inside `router ospf`.
    OspfArea,
    /// `interface <name>`
    Interface,
    /// `route-map <name> <action> <seq>`
    RouteMap,
    /// `ip community-list` lines grouped by list name.
    BgpCommunityList,
    /// `ip as-path access-list` lines grouped by list name.
    BgpAsPath,
    /// A single `ip prefix-list ... seq N` entry.
    PrefixList,
}

impl Kind {
    /// All kinds, in scan dispatch order.
    pub const ALL: [Kind; 10] = [
        Kind::BgpRouter,
        Kind::BgpPeer,
        Kind::BgpPeerAddressFamily,
        Kind::OspfRouter,
        Kind::OspfArea,
        Kind::Interface,
        Kind::RouteMap,
        Kind::BgpCommunityList,
        Kind::BgpAsPath,
        Kind::PrefixList,
    ];

    /// Returns the snake_case kind name used in desired-state documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::BgpRouter => "bgp_router",
            Kind::BgpPeer => "bgp_peer",
            Kind::BgpPeerAddressFamily => "bgp_peer_address_family",
            Kind::OspfRouter => "ospf_router",
            Kind::OspfArea => "ospf_area",
            Kind::Interface => "interface",
            Kind::RouteMap => "route_map",
            Kind::BgpCommunityList => "bgp_community_list",
            Kind::BgpAsPath => "bgp_as_path",
            Kind::PrefixList => "prefix_list",
        }
    }

    /// Returns the static schema for this kind.
    pub fn schema(&self) -> &'static KindSchema {
        match self {
            Kind::BgpRouter => &kinds::bgp::BGP_ROUTER,
            Kind::BgpPeer => &kinds::bgp::BGP_PEER,
            Kind::BgpPeerAddressFamily => &kinds::bgp::BGP_PEER_ADDRESS_FAMILY,
            Kind::OspfRouter => &kinds::ospf::OSPF_ROUTER,
            Kind::OspfArea => &kinds::ospf::OSPF_AREA,
            Kind::Interface => &kinds::interface::INTERFACE,
            Kind::RouteMap => &kinds::policy::ROUTE_MAP,
            Kind::BgpCommunityList => &kinds::policy::COMMUNITY_LIST,
            Kind::BgpAsPath => &kinds::policy::AS_PATH,
            Kind::PrefixList => &kinds::policy::PREFIX_LIST,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKind(s.to_string()))
    }
}

/// Where inside a block an attribute spec is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Block body only, no sub-block open.
    Root,
    /// Block body, or the sub-block naming the block's implicit family
    /// (`address-family ipv4 unicast` inside `router bgp`).
    DefaultFamily,
    /// Block body or any sub-block.
    AnyFamily,
}

/// How set elements of a foreign protocol family are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyHandling {
    /// Every element uses the attribute template as-is.
    None,
    /// IPv6 elements are wrapped in `address-family ipv6` / `exit-address-family`.
    WrapIpv6,
    /// IPv6 elements use this alternate template.
    Ipv6Template(&'static str),
}

/// How an attribute value is extracted from configuration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The attribute owns a line pattern.
    Line(&'static str),
    /// The value is a named group of another pattern of the same kind: the
    /// [`Record`] pattern, or a line pattern it shares with a sibling
    /// attribute. It is rendered through that pattern's template.
    Field,
}

/// Declaration of one manageable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Attribute name.
    pub name: &'static str,
    /// Declared value type.
    pub value_type: ValueType,
    /// Extraction rule.
    pub extraction: Extraction,
    /// Value of an unobserved attribute.
    pub default: DefaultValue,
    /// Line asserting the attribute.
    pub template: &'static str,
    /// Full removal line, when it is not `no ` + template.
    pub removal: Option<&'static str>,
    /// Where in a block the pattern is active.
    pub scope: Scope,
    /// Enum whose symbols are mutually exclusive forms of one statement.
    pub toggle: bool,
    /// Raw value assumed when the line matches but the `value` group does
    /// not participate (`neighbor X allowas-in` means 3).
    pub implied: Option<&'static str>,
    /// Per-element family handling for sets.
    pub family: FamilyHandling,
}

impl AttributeSpec {
    /// Declares an attribute extracted by its own line pattern.
    pub const fn new(
        name: &'static str,
        value_type: ValueType,
        pattern: &'static str,
        template: &'static str,
    ) -> Self {
        let default = match value_type {
            ValueType::Boolean => DefaultValue::Bool(false),
            ValueType::StringSet => DefaultValue::EmptySet,
            _ => DefaultValue::Absent,
        };
        Self {
            name,
            value_type,
            extraction: Extraction::Line(pattern),
            default,
            template,
            removal: None,
            scope: Scope::Root,
            toggle: false,
            implied: None,
            family: FamilyHandling::None,
        }
    }

    /// Declares an attribute filled from a named group of another pattern.
    pub const fn field(name: &'static str, value_type: ValueType) -> Self {
        let mut spec = Self::new(name, value_type, "", "");
        spec.extraction = Extraction::Field;
        spec
    }

    /// Declares a toggle-style enum. Symbol `false` means the statement is
    /// absent, `true` the bare template, anything else `template <symbol>`.
    pub const fn toggle(
        name: &'static str,
        symbols: &'static [&'static str],
        pattern: &'static str,
        template: &'static str,
    ) -> Self {
        let mut spec = Self::new(name, ValueType::Enum(symbols), pattern, template);
        spec.default = DefaultValue::Enum("false");
        spec.toggle = true;
        spec.implied = Some("true");
        spec
    }

    /// Overrides the default.
    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    /// Declares the raw value of a bare statement.
    pub const fn with_implied(mut self, raw: &'static str) -> Self {
        self.implied = Some(raw);
        self
    }

    /// Declares a distinct removal line.
    pub const fn with_removal(mut self, removal: &'static str) -> Self {
        self.removal = Some(removal);
        self
    }

    /// Sets the scope.
    pub const fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets per-element family handling.
    pub const fn with_family(mut self, family: FamilyHandling) -> Self {
        self.family = family;
        self
    }

    /// Returns the line pattern, if the attribute owns one.
    pub fn pattern(&self) -> Option<&'static str> {
        match self.extraction {
            Extraction::Line(pattern) => Some(pattern),
            Extraction::Field => None,
        }
    }

    /// Materialized default value.
    pub fn default_value(&self) -> AttributeValue {
        self.default.to_value()
    }
}

/// Parser section hosting a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `router bgp <asn>` block.
    RouterBgp,
    /// `router ospf` block.
    RouterOspf,
    /// `interface <name>` block.
    Interface,
    /// `route-map <name> <action> <seq>` block.
    RouteMap,
    /// Single non-indented lines outside any block.
    TopLevel,
}

/// Sub-context a kind's commands must run in, depending on its identity.
#[derive(Debug, Clone, Copy)]
pub struct SubContext {
    /// Entry line, rendered against the identity.
    pub enter: &'static str,
    /// Exit line.
    pub exit: &'static str,
    /// Identity values for which the sub-context is implicit and no
    /// entry/exit lines are emitted.
    pub implicit: &'static [(&'static str, &'static str)],
}

/// How an entity is removed from the device.
#[derive(Debug, Clone, Copy)]
pub struct Destroy {
    /// Removal line, rendered against identity and observed attributes.
    pub template: &'static str,
    /// Whether the line runs inside the kind's context.
    pub within_context: bool,
}

/// Whole-line entity: one pattern fills identity and every attribute, and
/// any change re-emits the full line.
#[derive(Debug, Clone, Copy)]
pub struct Record {
    /// Line pattern with a named group per identity field and attribute.
    pub pattern: &'static str,
    /// Line template.
    pub template: &'static str,
}

/// Static schema of one entity kind.
#[derive(Debug)]
pub struct KindSchema {
    /// The kind.
    pub kind: Kind,
    /// Identity field names, in identity string order.
    pub identity: &'static [&'static str],
    /// Separator between identity fields in identity strings.
    pub separator: char,
    /// Identity fields with a constant value.
    pub fixed_identity: &'static [(&'static str, &'static str)],
    /// Parser section the kind lives in.
    pub section: Section,
    /// Ordered attribute table.
    pub attributes: &'static [AttributeSpec],
    /// Context entry lines, outermost first.
    pub context: &'static [&'static str],
    /// Optional identity-dependent sub-context.
    pub sub_context: Option<SubContext>,
    /// Removal rule. Kinds without one are destroyed by resetting every
    /// attribute to its default.
    pub destroy: Option<Destroy>,
    /// Whole-line layout.
    pub record: Option<Record>,
}

impl KindSchema {
    /// Looks up an attribute spec by name.
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeSpec> {
        self.attributes.iter().find(|spec| spec.name == name)
    }

    /// Position of an attribute in the table.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|spec| spec.name == name)
    }

    /// Every attribute at its default value.
    pub fn defaults(&self) -> BTreeMap<String, AttributeValue> {
        self.attributes
            .iter()
            .map(|spec| (spec.name.to_string(), spec.default_value()))
            .collect()
    }

    /// Returns the fixed value of an identity field, if any.
    pub fn fixed(&self, field: &str) -> Option<&'static str> {
        self.fixed_identity
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| *value)
    }
}

/// Optional nested scope inside a block (BGP address-family).
#[derive(Debug, Clone, Copy)]
pub struct SubBlockSchema {
    /// Sub-block header pattern; named groups become context fields.
    pub enter: &'static str,
    /// Sub-block terminator pattern.
    pub exit: &'static str,
    /// Context fields in effect when no sub-block is open.
    pub root: &'static [(&'static str, &'static str)],
    /// Values for context groups that did not participate in a match.
    pub defaults: &'static [(&'static str, &'static str)],
}

/// A block header and the scoping rules inside it.
#[derive(Debug, Clone, Copy)]
pub struct BlockSchema {
    /// The section this block opens.
    pub section: Section,
    /// Header pattern; named groups become identity fields.
    pub header: &'static str,
    /// Optional nested scope.
    pub sub_block: Option<SubBlockSchema>,
}

/// Block headers, tested in order against every non-indented line.
pub static BLOCKS: &[BlockSchema] = &[
    BlockSchema {
        section: Section::RouterBgp,
        header: r"^router bgp (?P<asn>\d+)(?: view \S+)?$",
        sub_block: Some(SubBlockSchema {
            enter: r"^ address-family (?P<family>ipv4|ipv6|vpnv4|vpnv6|l2vpn)(?: (?P<subtype>unicast|multicast|vpn|labeled-unicast|evpn))?$",
            exit: r"^ exit-address-family$",
            root: &[("family", "ipv4"), ("subtype", "unicast")],
            defaults: &[("subtype", "unicast")],
        }),
    },
    BlockSchema {
        section: Section::RouterOspf,
        header: r"^router ospf$",
        sub_block: None,
    },
    BlockSchema {
        section: Section::Interface,
        header: r"^interface (?P<name>\S+)(?: vrf \S+)?$",
        sub_block: None,
    },
    BlockSchema {
        section: Section::RouteMap,
        header: r"^route-map (?P<name>\S+) (?P<action>permit|deny) (?P<seq>\d+)$",
        sub_block: None,
    },
];
