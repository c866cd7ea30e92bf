//! Reverse index: which Ingresses declare a given hostname.

use crate::{
    dns::name::canonical,
    resources::IngressRecord,
};
use k8s_openapi::api::networking::v1::Ingress;
use kube::runtime::reflector::Store;
use std::collections::HashMap;

/// Hostname to Ingress lookup. Keeping it consistent with the cluster is the implementor's job.
pub trait ReverseIndex: Send + Sync {
    /// Ingresses whose hosts include `name`. Exact match only, no wildcard expansion.
    fn reverse_lookup(&self, name: &str) -> Vec<IngressRecord>;
}

/// Immutable in-memory index keyed by canonical hostname.
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    by_host: HashMap<String, Vec<IngressRecord>>,
}

impl StaticIndex {
    pub fn new(records: impl IntoIterator<Item = IngressRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Registers `record` under every one of its hosts.
    pub fn insert(&mut self, record: IngressRecord) {
        for host in &record.hosts {
            self.by_host.entry(canonical(host)).or_default().push(record.clone());
        }
    }

    /// Registers `record` under `name` only, regardless of its hosts.
    pub fn insert_at(&mut self, name: &str, record: IngressRecord) {
        self.by_host.entry(canonical(name)).or_default().push(record);
    }

    pub fn len(&self) -> usize {
        self.by_host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_host.is_empty()
    }
}

impl ReverseIndex for StaticIndex {
    fn reverse_lookup(&self, name: &str) -> Vec<IngressRecord> {
        self.by_host.get(&canonical(name)).cloned().unwrap_or_default()
    }
}

/// Scans the reflector cache; the reflector itself is driven elsewhere.
impl ReverseIndex for Store<Ingress> {
    fn reverse_lookup(&self, name: &str) -> Vec<IngressRecord> {
        let name = canonical(name);
        self.state()
            .iter()
            .map(|ing| IngressRecord::from(ing.as_ref()))
            .filter(|record| record.hosts.iter().any(|host| canonical(host) == name))
            .collect()
    }
}
