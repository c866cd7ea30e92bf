use crate::{
    answer,
    dns::{
        name::{
            canonical,
            is_subdomain,
        },
        Rcode,
        ResourceRecord,
        Upstream,
    },
    external::external_ingress,
    index::ReverseIndex,
    query::Query,
    self_address::{
        self_address,
        self_address_name,
        SelfAddress,
    },
};
use std::sync::Arc;

/// Plugin wide settings.
#[derive(Debug, Clone)]
pub struct IngressConfig {
    /// Zones we are authoritative for, fully qualified.
    pub zones: Vec<String>,
    /// TTL of synthesized records, in seconds.
    pub ttl: u32,
}

impl IngressConfig {
    pub const DEFAULT_TTL: u32 = 5;

    pub fn new(zones: impl IntoIterator<Item = impl AsRef<str>>, ttl: u32) -> Self {
        Self {
            zones: zones.into_iter().map(|z| canonical(z.as_ref())).collect(),
            ttl,
        }
    }

    /// Most specific zone containing `qname`.
    pub fn zone_for(&self, qname: &str) -> Option<&str> {
        self.zones
            .iter()
            .filter(|zone| is_subdomain(zone, qname))
            .max_by_key(|zone| zone.len())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub rcode: Rcode,
    pub answer: Vec<ResourceRecord>,
}

/// Answers queries below the configured zones from Ingress state.
pub struct IngressHandler {
    config: IngressConfig,
    index: Arc<dyn ReverseIndex>,
    upstream: Arc<dyn Upstream>,
    self_address: Arc<dyn SelfAddress>,
}

impl IngressHandler {
    pub fn new(
        config: IngressConfig,
        index: Arc<dyn ReverseIndex>,
        upstream: Arc<dyn Upstream>,
        self_address: Arc<dyn SelfAddress>,
    ) -> Self {
        Self {
            config,
            index,
            upstream,
            self_address,
        }
    }

    /// `None` if `query` is not below any of our zones and should be handed on.
    #[instrument(level = "debug", skip_all, fields(qname = %query.name, qtype = %query.qtype))]
    pub async fn serve(&self, query: &Query) -> Option<Response> {
        let Some(zone) = self.config.zone_for(&query.name) else {
            trace!("not authoritative");
            return None;
        };

        if canonical(&query.name) == self_address_name(zone) {
            let answer = self_address(self.self_address.as_ref(), zone, self.config.ttl)
                .await
                .into_iter()
                .filter(|rr| rr.record_type() == query.qtype)
                .collect();
            return Some(Response {
                rcode: Rcode::NoError,
                answer,
            });
        }

        let (services, rcode) = external_ingress(self.index.as_ref(), &query.name, self.config.ttl);
        let answer = answer::synthesize(&services, query, self.config.ttl, self.upstream.as_ref()).await;

        debug!(%rcode, answers = answer.len(), "answered from ingress");
        Some(Response { rcode, answer })
    }
}
