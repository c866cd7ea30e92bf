use super::record::ResourceRecord;
use crate::{
    query::Query,
    resources::RecordType,
};
use async_trait::async_trait;
use rsdns::{
    clients::{
        tokio::Client,
        ClientConfig,
    },
    message::{
        reader::MessageIterator,
        RCode,
        RecordsSection,
    },
    records::{
        data::RecordData,
        Class,
        Type,
    },
};
use std::net::SocketAddr;

/// Large enough for any UDP answer with the default EDNS payload size.
const RESPONSE_BUFFER_SIZE: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream lookup failed: {0}")]
    Dns(#[from] rsdns::Error),
    #[error("upstream lookup for {0} did not finish before the query deadline")]
    DeadlineElapsed(String),
    #[error("no {1} records for {0}")]
    NoRecords(String, RecordType),
}

/// Resolves names that are not ours, such as the hostnames load balancers report.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Answer section for `target`/`ty`. Implementations need not enforce `query.deadline`,
    /// callers bound the returned future with it.
    async fn resolve(&self, query: &Query, target: &str, ty: RecordType) -> Result<Vec<ResourceRecord>, UpstreamError>;
}

/// Resolves against a single nameserver using rsdns.
#[derive(Debug, Clone)]
pub struct NameserverUpstream {
    nameserver: SocketAddr,
}

impl NameserverUpstream {
    pub fn new(nameserver: SocketAddr) -> Self {
        Self { nameserver }
    }
}

/// Answer section as sent by the nameserver: CNAME chains keep every hop, each record its own
/// owner and TTL.
fn answer_records(response: &[u8]) -> Result<Vec<ResourceRecord>, rsdns::Error> {
    let mi = MessageIterator::new(response)?;

    let rcode = mi.header().flags.response_code();
    if rcode != RCode::NOERROR {
        return Err(rsdns::Error::BadResponseCode(rcode));
    }

    let mut records = Vec::new();
    for record in mi.records() {
        let (section, record) = record?;
        if section != RecordsSection::Answer {
            break;
        }
        let owner = record.name.as_str();
        match record.rdata {
            RecordData::A(ref a) => records.push(ResourceRecord::a(owner, record.ttl, a.address)),
            RecordData::Aaaa(ref aaaa) => records.push(ResourceRecord::aaaa(owner, record.ttl, aaaa.address)),
            RecordData::Cname(ref cname) => records.push(ResourceRecord::cname(owner, record.ttl, cname.cname.as_str())),
            _ => trace!(%owner, rtype = %record.rtype, "skipping answer record"),
        }
    }
    Ok(records)
}

#[async_trait]
impl Upstream for NameserverUpstream {
    async fn resolve(&self, _query: &Query, target: &str, ty: RecordType) -> Result<Vec<ResourceRecord>, UpstreamError> {
        debug!(?target, ?ty, nameserver = %self.nameserver, "upstream lookup...");

        let config = ClientConfig::with_nameserver(self.nameserver);
        let mut client = Client::new(config).await?;

        let qtype = match ty {
            RecordType::A => Type::A,
            RecordType::AAAA => Type::AAAA,
            RecordType::CNAME => Type::CNAME,
        };
        let mut buf = vec![0u8; RESPONSE_BUFFER_SIZE];
        let len = client.query_raw(target, qtype, Class::IN, &mut buf).await?;
        let records = answer_records(&buf[..len])?;

        trace!(?target, ?ty, ?records, "upstream answer");
        if records.is_empty() {
            return Err(UpstreamError::NoRecords(target.to_string(), ty));
        }
        Ok(records)
    }
}
