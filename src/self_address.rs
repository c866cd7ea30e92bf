//! Addresses under which this DNS server itself is reachable, answered for `ns1.dns.<zone>`.

use crate::dns::{
    name::fqdn,
    RData,
    ResourceRecord,
};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use std::net::IpAddr;

#[derive(Debug, thiserror::Error)]
pub enum SelfAddressError {
    #[error("unable to look up service: {0}")]
    Kube(#[from] kube::Error),
    #[error("unable to list network interfaces: {0}")]
    Interfaces(#[from] local_ip_address::Error),
}

/// Name the self-address records are owned by.
pub fn self_address_name(zone: &str) -> String {
    let zone = fqdn(zone);
    if zone == "." {
        return "ns1.dns.".to_string();
    }
    format!("ns1.dns.{zone}")
}

#[async_trait]
pub trait SelfAddress: Send + Sync {
    async fn addresses(&self) -> Result<Vec<IpAddr>, SelfAddressError>;
}

/// A/AAAA records for the addresses `source` reports. Failures are logged and yield no records.
pub async fn self_address(source: &dyn SelfAddress, zone: &str, ttl: u32) -> Vec<ResourceRecord> {
    let owner = self_address_name(zone);
    match source.addresses().await {
        Ok(ips) => ips
            .into_iter()
            .map(|ip| ResourceRecord::new(&owner, ttl, RData::from(ip)))
            .collect(),
        Err(err) => {
            warn!(%zone, "unable to determine own address: {err}");
            Vec::new()
        }
    }
}

/// Addresses given on the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticAddresses(pub Vec<IpAddr>);

#[async_trait]
impl SelfAddress for StaticAddresses {
    async fn addresses(&self) -> Result<Vec<IpAddr>, SelfAddressError> {
        Ok(self.0.clone())
    }
}

/// First non-loopback IPv4 and IPv6 address of the local machine. This is a guess when running
/// outside of the cluster: it can be wrong if the server is bound to a different address.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalInterfaces;

#[async_trait]
impl SelfAddress for LocalInterfaces {
    async fn addresses(&self) -> Result<Vec<IpAddr>, SelfAddressError> {
        let ips: Vec<IpAddr> = local_ip_address::list_afinet_netifas()?
            .into_iter()
            .map(|(_, ip)| ip)
            .collect();
        Ok(first_usable(&ips))
    }
}

fn first_usable(ips: &[IpAddr]) -> Vec<IpAddr> {
    let usable = |ip: &&IpAddr| match ip {
        IpAddr::V4(ip) => !ip.is_loopback() && !ip.is_unspecified(),
        // skip fe80::/10
        IpAddr::V6(ip) => !ip.is_loopback() && !ip.is_unspecified() && (ip.segments()[0] & 0xffc0) != 0xfe80,
    };
    let v4 = ips.iter().filter(usable).find(|ip| ip.is_ipv4());
    let v6 = ips.iter().filter(usable).find(|ip| ip.is_ipv6());
    v4.into_iter().chain(v6).copied().collect()
}

/// External addresses of the Service that targets the DNS pods.
#[derive(Clone)]
pub struct ServiceAddresses {
    client: kube::Client,
    name: String,
    namespace: String,
}

impl ServiceAddresses {
    pub fn new(client: kube::Client, name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            client,
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

#[async_trait]
impl SelfAddress for ServiceAddresses {
    async fn addresses(&self) -> Result<Vec<IpAddr>, SelfAddressError> {
        let (ns, name) = (&self.namespace, &self.name);
        let svc = kube::api::Api::<Service>::namespaced(self.client.clone(), ns)
            .get(name)
            .await?;

        let ips = external_ips(&svc);
        if ips.is_empty() {
            warn!("Service {ns}/{name} has no lb/external ip");
        }
        Ok(ips)
    }
}

/// Load balancer ingress IPs followed by `spec.externalIPs`, without duplicates.
pub fn external_ips(svc: &Service) -> Vec<IpAddr> {
    let lb_ips = svc
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|i| i.ip.as_deref());

    let external_ips = svc
        .spec
        .as_ref()
        .and_then(|spec| spec.external_ips.as_ref())
        .into_iter()
        .flatten()
        .map(String::as_str);

    let mut ips = Vec::new();
    for ip in lb_ips.chain(external_ips) {
        match ip.parse::<IpAddr>() {
            Ok(ip) if !ips.contains(&ip) => ips.push(ip),
            Ok(_) => {}
            Err(_) => trace!(?ip, "ignoring unparsable service address"),
        }
    }
    ips
}
