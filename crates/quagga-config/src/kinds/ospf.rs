//! OSPFv2 entity kinds: the router process and its areas.

use crate::schema::{AttributeSpec, Destroy, Kind, KindSchema, Section};
use crate::value::{DefaultValue, ValueType};

static OSPF_ROUTER_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::new(
        "router_id",
        ValueType::String,
        r"^ ospf router-id (?P<value>\S+)$",
        "ospf router-id {value}",
    ),
    AttributeSpec::new(
        "abr_type",
        ValueType::Enum(&["cisco", "ibm", "shortcut", "standard"]),
        r"^ ospf abr-type (?P<value>\S+)$",
        "ospf abr-type {value}",
    )
    .with_default(DefaultValue::Enum("cisco")),
    AttributeSpec::new(
        "opaque",
        ValueType::Boolean,
        r"^ capability opaque$",
        "capability opaque",
    ),
    AttributeSpec::new(
        "rfc1583",
        ValueType::Boolean,
        r"^ (?:ospf rfc1583compatibility|compatible rfc1583)$",
        "ospf rfc1583compatibility",
    ),
    AttributeSpec::toggle(
        "log_adjacency_changes",
        &["false", "true", "detail"],
        r"^ (?P<no>no )?log-adjacency-changes(?: (?P<value>detail))?$",
        "log-adjacency-changes[ {value}]",
    ),
    AttributeSpec::new(
        "redistribute",
        ValueType::StringSet,
        r"^ redistribute (?P<value>.+)$",
        "redistribute {value}",
    ),
    AttributeSpec::new(
        "default_information",
        ValueType::String,
        r"^ default-information (?P<value>originate.*)$",
        "default-information {value}",
    )
    .with_removal("no default-information originate"),
    AttributeSpec::new(
        "passive_interfaces",
        ValueType::StringSet,
        r"^ passive-interface (?P<value>\S+)$",
        "passive-interface {value}",
    ),
    AttributeSpec::new(
        "distance",
        ValueType::Integer,
        r"^ distance (?P<value>\d+)$",
        "distance {value}",
    ),
    AttributeSpec::new(
        "auto_cost_reference_bandwidth",
        ValueType::Integer,
        r"^ auto-cost reference-bandwidth (?P<value>\d+)$",
        "auto-cost reference-bandwidth {value}",
    )
    .with_default(DefaultValue::Int(100)),
];

pub static OSPF_ROUTER: KindSchema = KindSchema {
    kind: Kind::OspfRouter,
    identity: &["name"],
    separator: ' ',
    fixed_identity: &[("name", "ospf")],
    section: Section::RouterOspf,
    attributes: OSPF_ROUTER_ATTRIBUTES,
    context: &["router ospf"],
    sub_context: None,
    destroy: Some(Destroy {
        template: "no router ospf",
        within_context: false,
    }),
    record: None,
};

static OSPF_AREA_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::toggle(
        "auth",
        &["false", "true", "message_digest"],
        r"^ (?P<no>no )?area (?P<area>\S+) authentication(?: (?P<value>message-digest))?$",
        "area {area} authentication[ {value}]",
    ),
    AttributeSpec::toggle(
        "stub",
        &["false", "true", "no_summary"],
        r"^ (?P<no>no )?area (?P<area>\S+) stub(?: (?P<value>no-summary))?$",
        "area {area} stub[ {value}]",
    ),
    AttributeSpec::new(
        "default_cost",
        ValueType::Integer,
        r"^ area (?P<area>\S+) default-cost (?P<value>\d+)$",
        "area {area} default-cost {value}",
    ),
    AttributeSpec::new(
        "access_list_export",
        ValueType::String,
        r"^ area (?P<area>\S+) export-list (?P<value>\S+)$",
        "area {area} export-list {value}",
    ),
    AttributeSpec::new(
        "access_list_import",
        ValueType::String,
        r"^ area (?P<area>\S+) import-list (?P<value>\S+)$",
        "area {area} import-list {value}",
    ),
    AttributeSpec::new(
        "prefix_list_export",
        ValueType::String,
        r"^ area (?P<area>\S+) filter-list prefix (?P<value>\S+) out$",
        "area {area} filter-list prefix {value} out",
    ),
    AttributeSpec::new(
        "prefix_list_import",
        ValueType::String,
        r"^ area (?P<area>\S+) filter-list prefix (?P<value>\S+) in$",
        "area {area} filter-list prefix {value} in",
    ),
    AttributeSpec::new(
        "networks",
        ValueType::StringSet,
        r"^ network (?P<value>\S+) area (?P<area>\S+)$",
        "network {value} area {area}",
    ),
    AttributeSpec::new(
        "ranges",
        ValueType::StringSet,
        r"^ area (?P<area>\S+) range (?P<value>.+)$",
        "area {area} range {value}",
    ),
];

/// Areas have no removal statement of their own; destroying one resets
/// every attribute, which removes every line mentioning it.
pub static OSPF_AREA: KindSchema = KindSchema {
    kind: Kind::OspfArea,
    identity: &["area"],
    separator: ' ',
    fixed_identity: &[],
    section: Section::RouterOspf,
    attributes: OSPF_AREA_ATTRIBUTES,
    context: &["router ospf"],
    sub_context: None,
    destroy: None,
    record: None,
};
