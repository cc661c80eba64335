//! Test fixtures for reconciliation scenarios
//!
//! Running-configuration samples as `vtysh` prints them, and a builder for
//! desired entity instances.

use quagga_config::{
    AttributeValue, Attributes, ConfigError, ConfigResult, EntityInstance, Ensure, Identity, Kind,
};

/// Running-configuration samples
pub mod running_config {
    /// Minimal BGP router.
    pub const BGP_ROUTER: &str = "\
router bgp 65000
 bgp router-id 10.0.0.1
 maximum-paths 4
!
";

    /// BGP router with a single IPv4 network.
    pub const BGP_NETWORKS: &str = "\
router bgp 65000
 network 10.0.0.0/8
!
";

    /// Peer-group with two members, one of them deactivated explicitly.
    pub const BGP_PEER_GROUPS: &str = "\
router bgp 65000
 bgp router-id 10.0.0.1
 neighbor INTERNAL peer-group
 neighbor INTERNAL remote-as 65000
 neighbor INTERNAL update-source lo
 neighbor 10.0.0.2 peer-group INTERNAL
 neighbor 10.0.0.3 peer-group INTERNAL
 neighbor 10.0.0.4 remote-as 65100
 no neighbor 10.0.0.3 activate
 address-family ipv6 unicast
  neighbor 10.0.0.4 activate
  neighbor 10.0.0.4 route-map RM-V6-IN in
 exit-address-family
!
";

    /// OSPF with areas, interface settings and policy objects.
    pub const OSPF_AND_POLICY: &str = "\
interface eth0
 description uplink
 ip address 10.0.0.1/24
 ip ospf network point-to-point
 ip ospf authentication message-digest
!
interface lo
 ip address 10.255.0.1/32
!
router ospf
 ospf router-id 10.255.0.1
 log-adjacency-changes
 passive-interface lo
 network 10.0.0.0/24 area 0.0.0.0
 network 10.1.0.0/24 area 0.0.0.1
 area 0.0.0.1 stub
!
ip prefix-list PL-IN seq 5 permit 10.0.0.0/8 le 24
ip prefix-list PL-IN seq 10 deny 0.0.0.0/0
!
route-map RM-IN permit 10
 match ip address prefix-list PL-IN
 set local-preference 200
!
line vty
!
";

    /// Nothing configured.
    pub const EMPTY: &str = "!\nend\n";
}

/// Builder for desired entity instances
#[derive(Debug, Clone)]
pub struct DesiredBuilder {
    kind: Kind,
    name: String,
    ensure: Ensure,
    attributes: Attributes,
}

impl DesiredBuilder {
    /// A present entity of `kind` identified by `name`.
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            ensure: Ensure::Present,
            attributes: Attributes::new(),
        }
    }

    /// Marks the entity for removal.
    pub fn absent(mut self) -> Self {
        self.ensure = Ensure::Absent;
        self
    }

    /// Sets an attribute to an already typed value.
    pub fn with(mut self, attribute: &str, value: AttributeValue) -> Self {
        self.attributes.insert(attribute.to_string(), value);
        self
    }

    /// Sets a string attribute.
    pub fn with_str(self, attribute: &str, value: &str) -> Self {
        self.with(attribute, AttributeValue::str(value))
    }

    /// Sets an integer attribute.
    pub fn with_int(self, attribute: &str, value: i64) -> Self {
        self.with(attribute, AttributeValue::Int(value))
    }

    /// Sets a boolean attribute.
    pub fn with_bool(self, attribute: &str, value: bool) -> Self {
        self.with(attribute, AttributeValue::Bool(value))
    }

    /// Sets an enum attribute from its CLI spelling.
    pub fn with_symbol(self, attribute: &str, value: &str) -> Self {
        self.with(attribute, AttributeValue::symbol(value))
    }

    /// Sets a string-set attribute.
    pub fn with_set(self, attribute: &str, items: &[&str]) -> Self {
        self.with(attribute, AttributeValue::set(items.iter().copied()))
    }

    /// Validates the identity and attribute names.
    pub fn build(self) -> ConfigResult<EntityInstance> {
        let identity = Identity::parse(self.kind, &self.name)?;
        let schema = self.kind.schema();
        if let Some(unknown) = self
            .attributes
            .keys()
            .find(|name| schema.attribute(name).is_none())
        {
            return Err(ConfigError::UnknownAttribute {
                kind: self.kind,
                attribute: unknown.clone(),
            });
        }
        Ok(EntityInstance::desired(identity, self.ensure, self.attributes))
    }
}

/// Desired states used across the scenario tests
pub mod desired_fixtures {
    use super::*;

    /// BGP router 65000 with `paths` eBGP paths.
    pub fn bgp_maximum_paths(paths: i64) -> DesiredBuilder {
        DesiredBuilder::new(Kind::BgpRouter, "65000").with_int("maximum_paths_ebgp", paths)
    }

    /// BGP router 65000 announcing `networks`.
    pub fn bgp_networks(networks: &[&str]) -> DesiredBuilder {
        DesiredBuilder::new(Kind::BgpRouter, "65000").with_set("networks", networks)
    }

    /// eBGP neighbor of router 65000.
    pub fn bgp_peer(peer: &str, remote_as: i64) -> DesiredBuilder {
        DesiredBuilder::new(Kind::BgpPeer, format!("65000 {}", peer)).with_int("remote_as", remote_as)
    }

    /// Address-family settings of a neighbor of router 65000.
    pub fn bgp_peer_family(peer: &str, family: &str, subtype: &str) -> DesiredBuilder {
        DesiredBuilder::new(
            Kind::BgpPeerAddressFamily,
            format!("65000 {} {} {}", peer, family, subtype),
        )
    }

    /// Interface with a description.
    pub fn interface(name: &str, description: &str) -> DesiredBuilder {
        DesiredBuilder::new(Kind::Interface, name).with_str("description", description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let instance = desired_fixtures::bgp_peer("10.0.0.2", 65001)
            .with_str("description", "spine")
            .build()
            .unwrap();
        assert_eq!(instance.identity.to_string(), "65000 10.0.0.2");
        assert_eq!(instance.get("remote_as"), Some(&AttributeValue::Int(65001)));
        assert_eq!(instance.ensure, Ensure::Present);
    }

    #[test]
    fn test_builder_rejects_unknown_attribute() {
        let err = DesiredBuilder::new(Kind::Interface, "eth0")
            .with_int("speed", 100)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAttribute { .. }));
    }

    #[test]
    fn test_fixtures_parse_cleanly() {
        for text in [
            running_config::BGP_ROUTER,
            running_config::BGP_NETWORKS,
            running_config::BGP_PEER_GROUPS,
            running_config::OSPF_AND_POLICY,
            running_config::EMPTY,
        ] {
            let parsed = quagga_config::observe(text);
            assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        }
    }
}
