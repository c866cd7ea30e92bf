pub mod lookup;
pub mod name;
pub mod record;

pub use lookup::{
    NameserverUpstream,
    Upstream,
    UpstreamError,
};
pub use record::{
    RData,
    Rcode,
    ResourceRecord,
};
