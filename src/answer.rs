//! Turns service records into the answer section for an A or AAAA query.

use crate::{
    dns::{
        name::fqdn,
        ResourceRecord,
        Upstream,
        UpstreamError,
    },
    expand::{
        in_scope,
        AddressClass,
        ServiceRecord,
    },
    query::Query,
    resources::RecordType,
};
use std::collections::HashSet;

/// Answer records for `query`. Only A and AAAA queries produce anything.
///
/// `ttl` is the configured TTL, used for address records instead of the per-record one.
pub async fn synthesize(
    services: &[ServiceRecord],
    query: &Query,
    ttl: u32,
    upstream: &dyn Upstream,
) -> Vec<ResourceRecord> {
    match query.qtype {
        RecordType::A => a(services, query, ttl, upstream).await,
        RecordType::AAAA => aaaa(services, query, ttl, upstream).await,
        RecordType::CNAME => Vec::new(),
    }
}

pub async fn a(services: &[ServiceRecord], query: &Query, ttl: u32, upstream: &dyn Upstream) -> Vec<ResourceRecord> {
    answer(services, query, RecordType::A, ttl, upstream).await
}

pub async fn aaaa(
    services: &[ServiceRecord],
    query: &Query,
    ttl: u32,
    upstream: &dyn Upstream,
) -> Vec<ResourceRecord> {
    answer(services, query, RecordType::AAAA, ttl, upstream).await
}

async fn answer(
    services: &[ServiceRecord],
    query: &Query,
    ty: RecordType,
    ttl: u32,
    upstream: &dyn Upstream,
) -> Vec<ResourceRecord> {
    let qname = query.name.as_str();
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for s in in_scope(services, qname) {
        match (s.classify(), ty) {
            // CNAMEs are emitted once per service record, even for repeated targets.
            (AddressClass::Name, _) => {
                records.push(ResourceRecord::cname(qname, s.ttl, &s.host));

                let target = fqdn(&s.host);
                match resolve_within_deadline(upstream, query, &target, ty).await {
                    Ok(answer) => records.extend(answer),
                    Err(err) => debug!(%qname, %target, %ty, "ignoring failed upstream lookup: {err}"),
                }
            }

            (AddressClass::V4(ip), RecordType::A) => {
                if seen.insert(s.host.as_str()) {
                    records.push(ResourceRecord::a(qname, ttl, ip));
                }
            }

            (AddressClass::V6(ip), RecordType::AAAA) => {
                if seen.insert(s.host.as_str()) {
                    records.push(ResourceRecord::aaaa(qname, ttl, ip));
                }
            }

            (class, _) => {
                trace!(%qname, host = %s.host, ?class, %ty, "address family does not match query type");
            }
        }
    }

    records
}

async fn resolve_within_deadline(
    upstream: &dyn Upstream,
    query: &Query,
    target: &str,
    ty: RecordType,
) -> Result<Vec<ResourceRecord>, UpstreamError> {
    let lookup = upstream.resolve(query, target, ty);
    match query.deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, lookup)
            .await
            .map_err(|_| UpstreamError::DeadlineElapsed(target.to_string()))?,
        None => lookup.await,
    }
}
