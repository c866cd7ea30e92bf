//! Expansion of Ingresses into per-(hostname, address) service records.

use crate::{
    dns::name::is_subdomain,
    resources::IngressRecord,
};
use std::{
    iter::FusedIterator,
    net::{
        IpAddr,
        Ipv4Addr,
        Ipv6Addr,
    },
};

/// One hostname reachable through one external address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// The hostname this record answers for.
    pub key: String,
    /// IP literal or hostname.
    pub host: String,
    pub ttl: u32,
}

/// What kind of record `ServiceRecord::host` turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressClass {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
    /// Anything that is not an IP literal is a CNAME target.
    Name,
}

impl ServiceRecord {
    pub fn new(key: impl ToString, host: impl ToString, ttl: u32) -> Self {
        Self {
            key: key.to_string(),
            host: host.to_string(),
            ttl,
        }
    }

    pub fn classify(&self) -> AddressClass {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => AddressClass::V4(ip),
            Ok(IpAddr::V6(ip)) => AddressClass::V6(ip),
            Err(_) => AddressClass::Name,
        }
    }
}

/// Cross product of an Ingress' hosts and external addresses, address-major.
///
/// Cloning yields an independent iterator starting at the same position.
#[derive(Debug, Clone)]
pub struct HostAddressPairs<'a> {
    hosts: &'a [String],
    addresses: &'a [String],
    next: usize,
}

impl<'a> HostAddressPairs<'a> {
    pub fn new(ing: &'a IngressRecord) -> Self {
        Self {
            hosts: &ing.hosts,
            addresses: &ing.external_addresses,
            next: 0,
        }
    }

    fn total(&self) -> usize {
        self.hosts.len() * self.addresses.len()
    }
}

impl<'a> Iterator for HostAddressPairs<'a> {
    /// `(hostname, external address)`
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total() {
            return None;
        }
        let (hosts, addresses) = (self.hosts, self.addresses);
        let address = &addresses[self.next / hosts.len()];
        let host = &hosts[self.next % hosts.len()];
        self.next += 1;
        Some((host.as_str(), address.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HostAddressPairs<'_> {}

impl FusedIterator for HostAddressPairs<'_> {}

/// Service records for every (hostname, address) pair of `ing`.
pub fn expand(ing: &IngressRecord, ttl: u32) -> impl Iterator<Item = ServiceRecord> + Clone + '_ {
    HostAddressPairs::new(ing).map(move |(host, address)| ServiceRecord::new(host, address, ttl))
}

/// Drops records whose key does not fall under `qname`, so an index entry cannot answer
/// for names outside of what was asked.
pub fn in_scope<'a>(services: &'a [ServiceRecord], qname: &'a str) -> impl Iterator<Item = &'a ServiceRecord> + 'a {
    services.iter().filter(move |s| {
        let keep = is_subdomain(qname, &s.key);
        if !keep {
            trace!(key = %s.key, %qname, "service record out of scope");
        }
        keep
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingress(hosts: &[&str], addresses: &[&str]) -> IngressRecord {
        IngressRecord::new("ing", "testns", hosts.iter().copied(), addresses.iter().copied())
    }

    #[test]
    fn pairs_are_address_major() {
        let ing = ingress(&["a.example.com", "b.example.com"], &["1.1.1.1", "lb.example.net"]);
        let pairs: Vec<_> = HostAddressPairs::new(&ing).collect();

        assert_eq!(
            pairs,
            vec![
                ("a.example.com.", "1.1.1.1"),
                ("b.example.com.", "1.1.1.1"),
                ("a.example.com.", "lb.example.net"),
                ("b.example.com.", "lb.example.net"),
            ]
        );
    }

    #[test]
    fn pairs_are_restartable() {
        let ing = ingress(&["a.example.com", "b.example.com"], &["1.1.1.1"]);
        let mut pairs = HostAddressPairs::new(&ing);
        assert_eq!(pairs.len(), 2);

        pairs.next();
        let rest = pairs.clone();
        assert_eq!(pairs.len(), 1);
        assert_eq!(rest.collect::<Vec<_>>(), vec![("b.example.com.", "1.1.1.1")]);
        assert_eq!(pairs.next(), Some(("b.example.com.", "1.1.1.1")));
        assert_eq!(pairs.next(), None);
        assert_eq!(pairs.next(), None);
    }

    #[test]
    fn empty_side_yields_nothing() {
        assert_eq!(HostAddressPairs::new(&ingress(&[], &["1.1.1.1"])).count(), 0);
        assert_eq!(HostAddressPairs::new(&ingress(&["a.example.com"], &[])).count(), 0);
    }

    #[test]
    fn expand_applies_ttl() {
        let ing = ingress(&["a.example.com"], &["1.1.1.1", "::1"]);
        let services: Vec<_> = expand(&ing, 30).collect();

        assert_eq!(
            services,
            vec![
                ServiceRecord::new("a.example.com.", "1.1.1.1", 30),
                ServiceRecord::new("a.example.com.", "::1", 30),
            ]
        );
    }

    #[test]
    fn classifies_addresses() {
        assert_eq!(
            ServiceRecord::new("k.", "1.2.3.4", 5).classify(),
            AddressClass::V4(Ipv4Addr::new(1, 2, 3, 4))
        );
        assert!(matches!(ServiceRecord::new("k.", "1:2::5", 5).classify(), AddressClass::V6(_)));
        assert_eq!(ServiceRecord::new("k.", "dummy.hostname", 5).classify(), AddressClass::Name);
        assert_eq!(ServiceRecord::new("k.", "1.2.3", 5).classify(), AddressClass::Name);
        assert_eq!(ServiceRecord::new("k.", "", 5).classify(), AddressClass::Name);
    }

    #[test]
    fn scope_keeps_query_name_and_below() {
        let services = vec![
            ServiceRecord::new("foo.example.com", "1.2.3.4", 5),
            ServiceRecord::new("bar.example.com.", "1.2.3.4", 5),
            ServiceRecord::new("x.foo.example.com.", "1.2.3.4", 5),
            ServiceRecord::new("example.com.", "1.2.3.4", 5),
        ];

        let kept: Vec<_> = in_scope(&services, "foo.example.com.").map(|s| s.key.as_str()).collect();
        assert_eq!(kept, vec!["foo.example.com", "x.foo.example.com."]);
    }
}
