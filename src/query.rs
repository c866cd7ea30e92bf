use crate::{
    dns::name::fqdn,
    resources::RecordType,
};
use std::time::Duration;
use tokio::time::Instant;

/// A single question being answered, together with the time by which it has to be done.
#[derive(Debug, Clone)]
pub struct Query {
    /// Query name, fully qualified.
    pub name: String,
    pub qtype: RecordType,
    /// Nothing spawned on behalf of this query (upstream lookups) may outlive this instant.
    pub deadline: Option<Instant>,
}

impl Query {
    pub fn new(name: &str, qtype: RecordType) -> Self {
        Self {
            name: fqdn(name),
            qtype,
            deadline: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }
}
