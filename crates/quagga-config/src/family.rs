//! Protocol family detection for set elements.
//!
//! Set attributes such as BGP `networks` or interface addresses mix IPv4
//! and IPv6 members. The emitter needs to know which family each element
//! belongs to so it can scope the command correctly.

use std::fmt;
use std::net::IpAddr;

/// Protocol family implied by an element's syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4 (the default scope of most contexts).
    Ipv4,
    /// IPv6.
    Ipv6,
}

impl AddressFamily {
    /// Classifies an element by its leading token.
    ///
    /// `2001:db8::/32`, `fe80::1` and `2001:db8::/48 summary-only` are IPv6;
    /// anything without a colon in the leading token is IPv4.
    pub fn of(element: &str) -> Self {
        let token = element.split_whitespace().next().unwrap_or("");
        let address = token.split('/').next().unwrap_or(token);
        match address.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => AddressFamily::Ipv6,
            Ok(IpAddr::V4(_)) => AddressFamily::Ipv4,
            Err(_) if token.contains(':') => AddressFamily::Ipv6,
            Err(_) => AddressFamily::Ipv4,
        }
    }

    /// Returns true for IPv6.
    pub fn is_ipv6(&self) -> bool {
        matches!(self, AddressFamily::Ipv6)
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "ipv4"),
            AddressFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}
