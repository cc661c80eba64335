//! Interface entity kind, including per-interface OSPF settings.

use crate::schema::{AttributeSpec, FamilyHandling, Kind, KindSchema, Section};
use crate::value::{DefaultValue, ValueType};

static INTERFACE_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::new(
        "description",
        ValueType::String,
        r"^ description (?P<value>.+)$",
        "description {value}",
    ),
    AttributeSpec::new("shutdown", ValueType::Boolean, r"^ shutdown$", "shutdown"),
    AttributeSpec::new(
        "link_detect",
        ValueType::Boolean,
        r"^ (?P<no>no )?link-detect$",
        "link-detect",
    ),
    AttributeSpec::new(
        "multicast",
        ValueType::Boolean,
        r"^ multicast$",
        "multicast",
    ),
    AttributeSpec::new(
        "bandwidth",
        ValueType::Integer,
        r"^ bandwidth (?P<value>\d+)$",
        "bandwidth {value}",
    ),
    AttributeSpec::new(
        "ip_address",
        ValueType::StringSet,
        r"^ (?:ip|ipv6) address (?P<value>\S+)$",
        "ip address {value}",
    )
    .with_family(FamilyHandling::Ipv6Template("ipv6 address {value}")),
    AttributeSpec::new("igmp", ValueType::Boolean, r"^ ip igmp$", "ip igmp"),
    AttributeSpec::new("pim_ssm", ValueType::Boolean, r"^ ip pim ssm$", "ip pim ssm"),
    AttributeSpec::new(
        "ospf_cost",
        ValueType::Integer,
        r"^ ip ospf cost (?P<value>\d+)$",
        "ip ospf cost {value}",
    ),
    AttributeSpec::new(
        "ospf_hello_interval",
        ValueType::Integer,
        r"^ ip ospf hello-interval (?P<value>\d+)$",
        "ip ospf hello-interval {value}",
    )
    .with_default(DefaultValue::Int(10)),
    AttributeSpec::new(
        "ospf_dead_interval",
        ValueType::Integer,
        r"^ ip ospf dead-interval (?P<value>\d+)$",
        "ip ospf dead-interval {value}",
    )
    .with_default(DefaultValue::Int(40)),
    AttributeSpec::new(
        "ospf_priority",
        ValueType::Integer,
        r"^ ip ospf priority (?P<value>\d+)$",
        "ip ospf priority {value}",
    )
    .with_default(DefaultValue::Int(1)),
    AttributeSpec::new(
        "ospf_retransmit_interval",
        ValueType::Integer,
        r"^ ip ospf retransmit-interval (?P<value>\d+)$",
        "ip ospf retransmit-interval {value}",
    )
    .with_default(DefaultValue::Int(5)),
    AttributeSpec::new(
        "ospf_transmit_delay",
        ValueType::Integer,
        r"^ ip ospf transmit-delay (?P<value>\d+)$",
        "ip ospf transmit-delay {value}",
    )
    .with_default(DefaultValue::Int(1)),
    AttributeSpec::new(
        "ospf_mtu_ignore",
        ValueType::Boolean,
        r"^ ip ospf mtu-ignore$",
        "ip ospf mtu-ignore",
    ),
    AttributeSpec::new(
        "ospf_network",
        ValueType::Enum(&[
            "broadcast",
            "non_broadcast",
            "point_to_multipoint",
            "point_to_point",
            "loopback",
        ]),
        r"^ ip ospf network (?P<value>\S+)$",
        "ip ospf network {value}",
    ),
    AttributeSpec::toggle(
        "ospf_auth",
        &["false", "true", "message_digest", "null"],
        r"^ (?P<no>no )?ip ospf authentication(?: (?P<value>message-digest|null))?$",
        "ip ospf authentication[ {value}]",
    ),
];

pub static INTERFACE: KindSchema = KindSchema {
    kind: Kind::Interface,
    identity: &["name"],
    separator: ' ',
    fixed_identity: &[],
    section: Section::Interface,
    attributes: INTERFACE_ATTRIBUTES,
    context: &["interface {name}"],
    sub_context: None,
    destroy: None,
    record: None,
};
