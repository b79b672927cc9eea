//! Roster backend library: domain, policy, adapters, and server wiring.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::{TRACE_ID_HEADER, Trace, TraceId};
