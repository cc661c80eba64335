//! Routing policy kinds: route-maps, community lists, as-path lists and
//! prefix-lists.

use crate::schema::{AttributeSpec, Destroy, Kind, KindSchema, Record, Section};
use crate::value::{DefaultValue, ValueType};

static ROUTE_MAP_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::new(
        "description",
        ValueType::String,
        r"^ description (?P<value>.+)$",
        "description {value}",
    ),
    AttributeSpec::new(
        "match",
        ValueType::StringSet,
        r"^ match (?P<value>.+)$",
        "match {value}",
    ),
    AttributeSpec::new(
        "set",
        ValueType::StringSet,
        r"^ set (?P<value>.+)$",
        "set {value}",
    ),
    AttributeSpec::new(
        "on_match",
        ValueType::String,
        r"^ on-match (?P<value>.+)$",
        "on-match {value}",
    ),
    AttributeSpec::new(
        "call",
        ValueType::String,
        r"^ call (?P<value>\S+)$",
        "call {value}",
    ),
];

pub static ROUTE_MAP: KindSchema = KindSchema {
    kind: Kind::RouteMap,
    identity: &["name", "action", "seq"],
    separator: ':',
    fixed_identity: &[],
    section: Section::RouteMap,
    attributes: ROUTE_MAP_ATTRIBUTES,
    context: &["route-map {name} {action} {seq}"],
    sub_context: None,
    destroy: Some(Destroy {
        template: "no route-map {name} {action} {seq}",
        within_context: false,
    }),
    record: None,
};

static COMMUNITY_LIST_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::field("list_type", ValueType::Enum(&["standard", "expanded"]))
        .with_default(DefaultValue::Enum("standard")),
    AttributeSpec::new(
        "rules",
        ValueType::StringSet,
        r"^ip community-list (?:(?P<list_type>standard|expanded) )?(?P<name>\S+) (?P<value>(?:permit|deny) .+)$",
        "ip community-list {list_type} {name} {value}",
    ),
];

/// Destroyed by removing every rule. Rules are matched as standard or
/// expanded patterns depending on `list_type`, so every rule line carries
/// it.
pub static COMMUNITY_LIST: KindSchema = KindSchema {
    kind: Kind::BgpCommunityList,
    identity: &["name"],
    separator: ' ',
    fixed_identity: &[],
    section: Section::TopLevel,
    attributes: COMMUNITY_LIST_ATTRIBUTES,
    context: &[],
    sub_context: None,
    destroy: None,
    record: None,
};

static AS_PATH_ATTRIBUTES: &[AttributeSpec] = &[AttributeSpec::new(
    "rules",
    ValueType::StringSet,
    r"^ip as-path access-list (?P<name>\S+) (?P<value>(?:permit|deny) .+)$",
    "ip as-path access-list {name} {value}",
)];

pub static AS_PATH: KindSchema = KindSchema {
    kind: Kind::BgpAsPath,
    identity: &["name"],
    separator: ' ',
    fixed_identity: &[],
    section: Section::TopLevel,
    attributes: AS_PATH_ATTRIBUTES,
    context: &[],
    sub_context: None,
    destroy: Some(Destroy {
        template: "no ip as-path access-list {name}",
        within_context: false,
    }),
    record: None,
};

static PREFIX_LIST_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::field("proto", ValueType::Enum(&["ip", "ipv6"]))
        .with_default(DefaultValue::Enum("ip")),
    AttributeSpec::field("action", ValueType::Enum(&["permit", "deny"])),
    AttributeSpec::field("prefix", ValueType::String),
    AttributeSpec::field("ge", ValueType::Integer),
    AttributeSpec::field("le", ValueType::Integer),
];

/// One sequenced entry. The device only edits entries whole, so every
/// change removes the old line and writes the new one.
pub static PREFIX_LIST: KindSchema = KindSchema {
    kind: Kind::PrefixList,
    identity: &["name", "seq"],
    separator: ':',
    fixed_identity: &[],
    section: Section::TopLevel,
    attributes: PREFIX_LIST_ATTRIBUTES,
    context: &[],
    sub_context: None,
    destroy: Some(Destroy {
        template: "no {proto} prefix-list {name} seq {seq} {action} {prefix}[ ge {ge}][ le {le}]",
        within_context: false,
    }),
    record: Some(Record {
        pattern: r"^(?P<proto>ip|ipv6) prefix-list (?P<name>\S+) seq (?P<seq>\d+) (?P<action>permit|deny) (?P<prefix>\S+)(?: ge (?P<ge>\d+))?(?: le (?P<le>\d+))?$",
        template: "{proto} prefix-list {name} seq {seq} {action} {prefix}[ ge {ge}][ le {le}]",
    }),
};
