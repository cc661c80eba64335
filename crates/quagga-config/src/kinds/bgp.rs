//! BGP entity kinds: router, peer, peer address-family.

use crate::schema::{
    AttributeSpec, Destroy, FamilyHandling, Kind, KindSchema, Scope, Section, SubContext,
};
use crate::value::{DefaultValue, ValueType};

static BGP_ROUTER_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::new(
        "router_id",
        ValueType::String,
        r"^ bgp router-id (?P<value>\S+)$",
        "bgp router-id {value}",
    ),
    AttributeSpec::new(
        "default_ipv4_unicast",
        ValueType::Boolean,
        r"^ (?P<no>no )?bgp default ipv4-unicast$",
        "bgp default ipv4-unicast",
    )
    .with_default(DefaultValue::Bool(true)),
    AttributeSpec::new(
        "default_local_preference",
        ValueType::Integer,
        r"^ bgp default local-preference (?P<value>\d+)$",
        "bgp default local-preference {value}",
    )
    .with_default(DefaultValue::Int(100)),
    AttributeSpec::new(
        "import_check",
        ValueType::Boolean,
        r"^ bgp network import-check$",
        "bgp network import-check",
    ),
    AttributeSpec::new(
        "deterministic_med",
        ValueType::Boolean,
        r"^ bgp deterministic-med$",
        "bgp deterministic-med",
    ),
    AttributeSpec::new(
        "always_compare_med",
        ValueType::Boolean,
        r"^ bgp always-compare-med$",
        "bgp always-compare-med",
    ),
    AttributeSpec::new(
        "log_neighbor_changes",
        ValueType::Boolean,
        r"^ bgp log-neighbor-changes$",
        "bgp log-neighbor-changes",
    ),
    AttributeSpec::new(
        "bestpath_as_path_multipath_relax",
        ValueType::Boolean,
        r"^ bgp bestpath as-path multipath-relax$",
        "bgp bestpath as-path multipath-relax",
    ),
    // ibgp first: the ebgp pattern would otherwise never see it
    AttributeSpec::new(
        "maximum_paths_ibgp",
        ValueType::Integer,
        r"^ maximum-paths ibgp (?P<value>\d+)$",
        "maximum-paths ibgp {value}",
    )
    .with_default(DefaultValue::Int(1))
    .in_scope(Scope::DefaultFamily),
    AttributeSpec::new(
        "maximum_paths_ebgp",
        ValueType::Integer,
        r"^ maximum-paths (?P<value>\d+)$",
        "maximum-paths {value}",
    )
    .with_default(DefaultValue::Int(1))
    .in_scope(Scope::DefaultFamily),
    AttributeSpec::new(
        "networks",
        ValueType::StringSet,
        r"^ network (?P<value>\S+)$",
        "network {value}",
    )
    .in_scope(Scope::AnyFamily)
    .with_family(FamilyHandling::WrapIpv6),
    AttributeSpec::new(
        "aggregate_addresses",
        ValueType::StringSet,
        r"^ aggregate-address (?P<value>.+)$",
        "aggregate-address {value}",
    )
    .in_scope(Scope::AnyFamily)
    .with_family(FamilyHandling::WrapIpv6),
    AttributeSpec::new(
        "redistribute",
        ValueType::StringSet,
        r"^ redistribute (?P<value>.+)$",
        "redistribute {value}",
    )
    .in_scope(Scope::DefaultFamily),
];

pub static BGP_ROUTER: KindSchema = KindSchema {
    kind: Kind::BgpRouter,
    identity: &["asn"],
    separator: ' ',
    fixed_identity: &[],
    section: Section::RouterBgp,
    attributes: BGP_ROUTER_ATTRIBUTES,
    context: &["router bgp {asn}"],
    sub_context: None,
    destroy: Some(Destroy {
        template: "no router bgp {asn}",
        within_context: false,
    }),
    record: None,
};

static BGP_PEER_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::new(
        "is_peer_group",
        ValueType::Boolean,
        r"^ neighbor (?P<peer>\S+) peer-group$",
        "neighbor {peer} peer-group",
    ),
    AttributeSpec::new(
        "peer_group",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) peer-group (?P<value>\S+)$",
        "neighbor {peer} peer-group {value}",
    ),
    AttributeSpec::new(
        "remote_as",
        ValueType::Integer,
        r"^ neighbor (?P<peer>\S+) remote-as (?P<value>\S+)$",
        "neighbor {peer} remote-as {value}",
    ),
    AttributeSpec::new(
        "local_as",
        ValueType::Integer,
        r"^ neighbor (?P<peer>\S+) local-as (?P<value>\S+)$",
        "neighbor {peer} local-as {value}",
    ),
    AttributeSpec::new(
        "description",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) description (?P<value>.+)$",
        "neighbor {peer} description {value}",
    ),
    AttributeSpec::new(
        "password",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) password (?P<value>\S+)$",
        "neighbor {peer} password {value}",
    ),
    AttributeSpec::new(
        "update_source",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) update-source (?P<value>\S+)$",
        "neighbor {peer} update-source {value}",
    ),
    AttributeSpec::new(
        "ebgp_multihop",
        ValueType::Integer,
        r"^ neighbor (?P<peer>\S+) ebgp-multihop (?P<value>\d+)$",
        "neighbor {peer} ebgp-multihop {value}",
    ),
    AttributeSpec::new(
        "passive",
        ValueType::Boolean,
        r"^ neighbor (?P<peer>\S+) passive$",
        "neighbor {peer} passive",
    ),
    AttributeSpec::new(
        "shutdown",
        ValueType::Boolean,
        r"^ neighbor (?P<peer>\S+) shutdown$",
        "neighbor {peer} shutdown",
    ),
];

pub static BGP_PEER: KindSchema = KindSchema {
    kind: Kind::BgpPeer,
    identity: &["asn", "peer"],
    separator: ' ',
    fixed_identity: &[],
    section: Section::RouterBgp,
    attributes: BGP_PEER_ATTRIBUTES,
    context: &["router bgp {asn}"],
    sub_context: None,
    destroy: Some(Destroy {
        template: "no neighbor {peer}",
        within_context: true,
    }),
    record: None,
};

static BGP_PEER_ADDRESS_FAMILY_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::new(
        "activate",
        ValueType::Boolean,
        r"^ (?P<no>no )?neighbor (?P<peer>\S+) activate$",
        "neighbor {peer} activate",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "allow_as_in",
        ValueType::Integer,
        r"^ neighbor (?P<peer>\S+) allowas-in(?: (?P<value>\d+))?$",
        "neighbor {peer} allowas-in {value}",
    )
    .with_implied("3")
    .with_removal("no neighbor {peer} allowas-in")
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "default_originate",
        ValueType::Boolean,
        r"^ neighbor (?P<peer>\S+) default-originate$",
        "neighbor {peer} default-originate",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "next_hop_self",
        ValueType::Boolean,
        r"^ neighbor (?P<peer>\S+) next-hop-self$",
        "neighbor {peer} next-hop-self",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "prefix_list_in",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) prefix-list (?P<value>\S+) in$",
        "neighbor {peer} prefix-list {value} in",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "prefix_list_out",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) prefix-list (?P<value>\S+) out$",
        "neighbor {peer} prefix-list {value} out",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "route_map_in",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) route-map (?P<value>\S+) in$",
        "neighbor {peer} route-map {value} in",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "route_map_out",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) route-map (?P<value>\S+) out$",
        "neighbor {peer} route-map {value} out",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "route_map_import",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) route-map (?P<value>\S+) import$",
        "neighbor {peer} route-map {value} import",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "route_map_export",
        ValueType::String,
        r"^ neighbor (?P<peer>\S+) route-map (?P<value>\S+) export$",
        "neighbor {peer} route-map {value} export",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "route_reflector_client",
        ValueType::Boolean,
        r"^ neighbor (?P<peer>\S+) route-reflector-client$",
        "neighbor {peer} route-reflector-client",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "route_server_client",
        ValueType::Boolean,
        r"^ neighbor (?P<peer>\S+) route-server-client$",
        "neighbor {peer} route-server-client",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "send_community",
        ValueType::Boolean,
        r"^ (?P<no>no )?neighbor (?P<peer>\S+) send-community$",
        "neighbor {peer} send-community",
    )
    .with_default(DefaultValue::Bool(true))
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "soft_reconfiguration_inbound",
        ValueType::Boolean,
        r"^ neighbor (?P<peer>\S+) soft-reconfiguration inbound$",
        "neighbor {peer} soft-reconfiguration inbound",
    )
    .in_scope(Scope::AnyFamily),
    AttributeSpec::new(
        "maximum_prefix",
        ValueType::Integer,
        r"^ neighbor (?P<peer>\S+) maximum-prefix (?P<value>\d+)$",
        "neighbor {peer} maximum-prefix {value}",
    )
    .in_scope(Scope::AnyFamily),
];

pub static BGP_PEER_ADDRESS_FAMILY: KindSchema = KindSchema {
    kind: Kind::BgpPeerAddressFamily,
    identity: &["asn", "peer", "family", "subtype"],
    separator: ' ',
    fixed_identity: &[],
    section: Section::RouterBgp,
    attributes: BGP_PEER_ADDRESS_FAMILY_ATTRIBUTES,
    context: &["router bgp {asn}"],
    sub_context: Some(SubContext {
        enter: "address-family {family} {subtype}",
        exit: "exit-address-family",
        implicit: &[("family", "ipv4"), ("subtype", "unicast")],
    }),
    destroy: None,
    record: None,
};
