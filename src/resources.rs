use crate::dns::name::fqdn;
use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt as _;
use serde::Serialize;
use std::fmt;

/// Record types this plugin knows how to answer or chase.
#[allow(clippy::upper_case_acronyms)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    #[default]
    A,
    AAAA,
    CNAME,
}

impl std::str::FromStr for RecordType {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            "CNAME" => Ok(RecordType::CNAME),
            _ => Err(eyre::eyre!("Invalid RecordType: {s:?}")),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
        };
        f.write_str(s)
    }
}

/// A stripped down Ingress carrying only what is needed to answer queries.
///
/// `hosts` and `external_addresses` are not paired positionally: every host is
/// reachable through every address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngressRecord {
    pub name: String,
    pub namespace: String,
    /// Hostnames from the routing rules, in FQDN form.
    pub hosts: Vec<String>,
    /// IP literals or hostnames from the load balancer status.
    pub external_addresses: Vec<String>,
}

impl IngressRecord {
    pub fn new(
        name: impl ToString,
        namespace: impl ToString,
        hosts: impl IntoIterator<Item = impl AsRef<str>>,
        external_addresses: impl IntoIterator<Item = impl ToString>,
    ) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            hosts: hosts.into_iter().map(|h| fqdn(h.as_ref())).collect(),
            external_addresses: external_addresses.into_iter().map(|a| a.to_string()).collect(),
        }
    }

    /// `{namespace}/{name}`, for logging.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl From<&Ingress> for IngressRecord {
    fn from(ing: &Ingress) -> Self {
        let hosts = ing
            .spec
            .as_ref()
            .and_then(|spec| spec.rules.as_ref())
            .map(|rules| {
                rules
                    .iter()
                    .filter_map(|rule| rule.host.as_deref())
                    .filter(|host| !host.is_empty())
                    .map(fqdn)
                    .collect()
            })
            .unwrap_or_default();

        // Prefer the ip, fall back to the hostname (e.g. AWS ELBs only report the latter).
        let external_addresses = ing
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .map(|ingress| {
                ingress
                    .iter()
                    .filter_map(|i| {
                        let ip = i.ip.as_deref().filter(|ip| !ip.is_empty());
                        let hostname = i.hostname.as_deref().filter(|h| !h.is_empty());
                        ip.or(hostname).map(str::to_string)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: ing.name_any(),
            namespace: ing.namespace().unwrap_or_default(),
            hosts,
            external_addresses,
        }
    }
}
