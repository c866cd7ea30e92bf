#[macro_use]
extern crate tracing;

pub mod answer;
pub mod dns;
pub mod expand;
pub mod external;
pub mod handler;
pub mod index;
pub mod query;
pub mod resources;
pub mod self_address;
