#![forbid(unsafe_code)]

//! Query configuration.

use std::env;
use std::time::Duration;

use super::OriginMode;

/// Default number of empty polling iterations before giving up.
pub const DEFAULT_TIMEOUT_CYCLES: u32 = 256;

/// Default sleep between empty polling iterations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Maximum bytes accumulated for a single reply.
pub const MAX_REPLY_LEN: usize = 256;

/// Tunables for one terminal query exchange.
///
/// `timeout_cycles` bounds polling iterations, not wall time: each empty
/// iteration sleeps `poll_interval`, while iterations that read a byte are
/// free. The worst-case wait is therefore roughly
/// `timeout_cycles * poll_interval` plus however long the terminal keeps
/// streaming bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Empty polling iterations allowed before the reply is abandoned.
    pub timeout_cycles: u32,
    /// Sleep after each empty probe.
    pub poll_interval: Duration,
    /// Flush the output channel before writing the query.
    pub flush_output: bool,
    /// Drop input that is already buffered before writing the query.
    pub discard_stale_input: bool,
    /// Byte budget for the accumulated reply.
    pub max_reply_len: usize,
    /// Coordinate origin applied to parsed positions.
    pub origin: OriginMode,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryConfig {
    /// Configuration with the default budget, 1 ms polling and a 1-based
    /// origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_cycles: DEFAULT_TIMEOUT_CYCLES,
            poll_interval: DEFAULT_POLL_INTERVAL,
            flush_output: true,
            discard_stale_input: false,
            max_reply_len: MAX_REPLY_LEN,
            origin: OriginMode::OneBased,
        }
    }

    /// Set the polling budget. Zero is raised to one.
    #[must_use]
    pub const fn with_timeout_cycles(mut self, cycles: u32) -> Self {
        self.timeout_cycles = if cycles == 0 { 1 } else { cycles };
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_flush_output(mut self, flush: bool) -> Self {
        self.flush_output = flush;
        self
    }

    #[must_use]
    pub const fn with_discard_stale_input(mut self, discard: bool) -> Self {
        self.discard_stale_input = discard;
        self
    }

    /// Set the reply byte budget. Zero is raised to one.
    #[must_use]
    pub const fn with_max_reply_len(mut self, len: usize) -> Self {
        self.max_reply_len = if len == 0 { 1 } else { len };
        self
    }

    #[must_use]
    pub const fn with_origin(mut self, origin: OriginMode) -> Self {
        self.origin = origin;
        self
    }

    /// Choose between a `(0, 0)` and the default `(1, 1)` origin for every
    /// subsequent parse issued through this configuration.
    pub fn set_origin_mode(&mut self, origin: OriginMode) {
        self.origin = origin;
    }

    /// Defaults overridden by `TERMAPI_QUERY_TIMEOUT_CYCLES`,
    /// `TERMAPI_QUERY_POLL_MS` and `TERMAPI_CURSOR_ORIGIN`.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_inputs(&QueryEnv::from_env())
    }

    /// Defaults overridden by already-captured environment values.
    #[must_use]
    pub fn from_inputs(env: &QueryEnv) -> Self {
        let mut config = Self::new();
        if let Some(cycles) = env.timeout_cycles.as_deref().and_then(parse_u32) {
            config = config.with_timeout_cycles(cycles);
        }
        if let Some(ms) = env.poll_ms.as_deref().and_then(parse_u32) {
            config = config.with_poll_interval(Duration::from_millis(u64::from(ms)));
        }
        if let Some(origin) = env.origin.as_deref().and_then(OriginMode::parse) {
            config = config.with_origin(origin);
        }
        config
    }
}

fn parse_u32(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Raw environment values consulted by [`QueryConfig::from_env`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryEnv {
    /// `TERMAPI_QUERY_TIMEOUT_CYCLES`
    pub timeout_cycles: Option<String>,
    /// `TERMAPI_QUERY_POLL_MS`
    pub poll_ms: Option<String>,
    /// `TERMAPI_CURSOR_ORIGIN`
    pub origin: Option<String>,
}

impl QueryEnv {
    /// Capture the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            timeout_cycles: env::var("TERMAPI_QUERY_TIMEOUT_CYCLES").ok(),
            poll_ms: env::var("TERMAPI_QUERY_POLL_MS").ok(),
            origin: env::var("TERMAPI_CURSOR_ORIGIN").ok(),
        }
    }
}
