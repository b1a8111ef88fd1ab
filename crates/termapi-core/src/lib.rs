#![forbid(unsafe_code)]

//! Core: escape sequences, terminal channels and modes, and terminal queries.

pub mod channel;
pub mod logging;
pub mod mode;
pub mod query;
pub mod sequence;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
