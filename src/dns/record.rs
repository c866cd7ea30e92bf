use super::name::fqdn;
use crate::resources::RecordType;
use std::{
    fmt,
    net::{
        IpAddr,
        Ipv4Addr,
        Ipv6Addr,
    },
};

/// Response codes this plugin can produce. Upstream failures are never turned into SERVFAIL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rcode {
    NoError,
    NxDomain,
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rcode::NoError => f.write_str("NOERROR"),
            Rcode::NxDomain => f.write_str("NXDOMAIN"),
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(String),
}

impl RData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RData::A(_) => RecordType::A,
            RData::AAAA(_) => RecordType::AAAA,
            RData::CNAME(_) => RecordType::CNAME,
        }
    }
}

impl From<IpAddr> for RData {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(ip) => RData::A(ip),
            IpAddr::V6(ip) => RData::AAAA(ip),
        }
    }
}

/// An answer record of class IN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Owner name, fully qualified.
    pub name: String,
    pub ttl: u32,
    pub data: RData,
}

impl ResourceRecord {
    pub fn new(name: &str, ttl: u32, data: RData) -> Self {
        Self {
            name: fqdn(name),
            ttl,
            data,
        }
    }

    pub fn a(name: &str, ttl: u32, ip: Ipv4Addr) -> Self {
        Self::new(name, ttl, RData::A(ip))
    }

    pub fn aaaa(name: &str, ttl: u32, ip: Ipv6Addr) -> Self {
        Self::new(name, ttl, RData::AAAA(ip))
    }

    pub fn cname(name: &str, ttl: u32, target: &str) -> Self {
        Self::new(name, ttl, RData::CNAME(fqdn(target)))
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }
}

/// Zone file presentation, e.g. `foo.example.com.	5	IN	A	1.2.3.4`.
impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\tIN\t{}\t", self.name, self.ttl, self.record_type())?;
        match &self.data {
            RData::A(ip) => write!(f, "{ip}"),
            RData::AAAA(ip) => write!(f, "{ip}"),
            RData::CNAME(target) => f.write_str(target),
        }
    }
}
