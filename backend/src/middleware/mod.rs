//! Actix middleware shared across the HTTP surface.

pub mod trace;

pub use trace::{TRACE_ID_HEADER, Trace, TraceId};
