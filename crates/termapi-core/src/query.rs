#![forbid(unsafe_code)]

//! Terminal queries: write a request, read the terminal's reply.
//!
//! A query is a two-way exchange over caller-owned channels:
//!
//! 1. [`ReplyReader`] writes a [`QuerySequence`] to the output channel and
//!    polls the input channel until the reply terminator arrives, a byte
//!    budget is spent, or the polling budget runs out.
//! 2. [`ReplyParser`] turns the collected [`RawReply`] into a
//!    [`CursorPosition`], adjusted by the configured [`OriginMode`].
//!
//! [`CursorQuery`] bundles both steps with the channels and a
//! [`QueryConfig`].
//!
//! # Example
//!
//! ```
//! use std::collections::VecDeque;
//! use std::io;
//!
//! use termapi_core::channel::InputChannel;
//! use termapi_core::query::{CursorQuery, OriginMode, QueryConfig};
//!
//! struct Canned(VecDeque<u8>);
//!
//! impl InputChannel for Canned {
//!     fn has_data_available(&mut self) -> io::Result<bool> {
//!         Ok(!self.0.is_empty())
//!     }
//!     fn read_one(&mut self) -> io::Result<u8> {
//!         self.0.pop_front().ok_or_else(|| io::ErrorKind::UnexpectedEof.into())
//!     }
//! }
//!
//! let input = Canned(b"\x1b[5;10R".iter().copied().collect());
//! let mut query = CursorQuery::new(Vec::new(), input, QueryConfig::default());
//! let pos = query.cursor_position().unwrap();
//! assert_eq!((pos.row, pos.col), (6, 11));
//!
//! query.set_origin_mode(OriginMode::ZeroBased);
//! ```
//!
//! # Concurrency
//!
//! Exactly one exchange may be in flight per terminal. Nothing here locks;
//! callers sharing a terminal must serialize queries themselves.

mod config;
mod error;
mod parser;
mod reader;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub use config::{
    DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT_CYCLES, MAX_REPLY_LEN, QueryConfig, QueryEnv,
};
pub use error::{QueryError, QueryStage};
pub use parser::{
    CURSOR_REPLY_TERMINATOR, DEVICE_ATTRIBUTES_TERMINATOR, ParseError, ParserState, Progress,
    ReplyParser, parse_device_attributes,
};
pub use reader::{RawReply, ReplyReader};

use crate::channel::{InputChannel, OutputChannel};
use crate::sequence::Sequence;

/// Report cursor position (DECXCPR): `ESC [ 6 n`.
pub const CURSOR_POSITION_QUERY: &[u8] = b"\x1b[6n";

/// Primary device attributes: `ESC [ 0 c`.
pub const DEVICE_ATTRIBUTES_QUERY: &[u8] = b"\x1b[0c";

// ── Data Model ───────────────────────────────────────────────────────────

/// An outbound query and the byte that ends its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuerySequence {
    bytes: &'static [u8],
    terminator: u8,
}

impl QuerySequence {
    /// `ESC [ 6 n`, answered by `ESC [ row ; col R`.
    pub const CURSOR_POSITION: Self = Self {
        bytes: CURSOR_POSITION_QUERY,
        terminator: CURSOR_REPLY_TERMINATOR,
    };

    /// `ESC [ 0 c`, answered by `ESC [ ? Ps ; ... c`.
    pub const DEVICE_ATTRIBUTES: Self = Self {
        bytes: DEVICE_ATTRIBUTES_QUERY,
        terminator: DEVICE_ATTRIBUTES_TERMINATOR,
    };

    /// A custom query.
    #[must_use]
    pub const fn new(bytes: &'static [u8], terminator: u8) -> Self {
        Self { bytes, terminator }
    }

    /// Bytes written to the terminal.
    #[must_use]
    pub const fn as_bytes(&self) -> &'static [u8] {
        self.bytes
    }

    /// Byte that completes the reply.
    #[must_use]
    pub const fn terminator(&self) -> u8 {
        self.terminator
    }

    /// The query as an owned [`Sequence`].
    #[must_use]
    pub fn to_sequence(&self) -> Sequence {
        Sequence::from_bytes(self.bytes)
    }
}

/// Coordinate origin applied to parsed positions.
///
/// The offset is added to both wire values: a `OneBased` parse of
/// `ESC [ 4 ; 9 R` yields `(5, 10)`, a `ZeroBased` parse yields `(4, 9)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OriginMode {
    /// Values are reported as received.
    ZeroBased,
    /// Values are reported plus one.
    #[default]
    OneBased,
}

impl OriginMode {
    /// Amount added to each wire value.
    #[must_use]
    pub const fn offset(self) -> u32 {
        match self {
            Self::ZeroBased => 0,
            Self::OneBased => 1,
        }
    }

    /// `ZeroBased` when `zero` is true.
    #[must_use]
    pub const fn from_zero_origin(zero: bool) -> Self {
        if zero { Self::ZeroBased } else { Self::OneBased }
    }

    /// Parse `0`/`zero` or `1`/`one`, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "0" | "zero" => Some(Self::ZeroBased),
            "1" | "one" => Some(Self::OneBased),
            _ => None,
        }
    }
}

/// A parsed cursor position, already adjusted by its [`OriginMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorPosition {
    pub row: u32,
    pub col: u32,
}

impl CursorPosition {
    /// A position that has already been adjusted for its origin.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// The wire reply that parses back to this position under `origin`.
    ///
    /// Values below the origin offset saturate at zero.
    #[must_use]
    pub fn to_reply(&self, origin: OriginMode) -> Sequence {
        let offset = origin.offset();
        Sequence::csi(
            &format!(
                "{};{}",
                self.row.saturating_sub(offset),
                self.col.saturating_sub(offset)
            ),
            CURSOR_REPLY_TERMINATOR,
        )
    }
}

impl From<CursorPosition> for (u32, u32) {
    fn from(pos: CursorPosition) -> Self {
        (pos.row, pos.col)
    }
}

/// Attribute codes from a primary device attributes reply.
///
/// Common values: 1 = 132 columns, 4 = Sixel, 6 = selective erase,
/// 22 = ANSI color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAttributes {
    pub codes: Vec<u32>,
}

impl DeviceAttributes {
    /// Whether `code` was reported.
    #[must_use]
    pub fn contains(&self, code: u32) -> bool {
        self.codes.contains(&code)
    }

    /// Whether the terminal reports ANSI color (code 22).
    #[must_use]
    pub fn supports_ansi_color(&self) -> bool {
        self.contains(22)
    }

    /// Whether the terminal reports Sixel graphics (code 4).
    #[must_use]
    pub fn supports_sixel(&self) -> bool {
        self.contains(4)
    }
}

// ── Session ──────────────────────────────────────────────────────────────

/// A terminal query session over caller-owned channels.
#[derive(Debug)]
pub struct CursorQuery<O, I> {
    output: O,
    input: I,
    config: QueryConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl<O: OutputChannel, I: InputChannel> CursorQuery<O, I> {
    #[must_use]
    pub fn new(output: O, input: I, config: QueryConfig) -> Self {
        Self {
            output,
            input,
            config,
            cancel: None,
        }
    }

    /// Abort queries with [`QueryError::Cancelled`] once `flag` is raised.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Choose the origin for all subsequent parses.
    pub fn set_origin_mode(&mut self, origin: OriginMode) {
        self.config.set_origin_mode(origin);
    }

    #[must_use]
    pub fn origin_mode(&self) -> OriginMode {
        self.config.origin
    }

    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Give the channels back.
    pub fn into_parts(self) -> (O, I) {
        (self.output, self.input)
    }

    fn reader(&self) -> ReplyReader {
        let reader = ReplyReader::from_config(&self.config);
        match &self.cancel {
            Some(flag) => reader.with_cancel_flag(Arc::clone(flag)),
            None => reader,
        }
    }

    /// Write `query` and collect whatever arrives, terminated or not.
    fn exchange(&mut self, query: &QuerySequence) -> Result<RawReply, QueryError> {
        let reader = self.reader();
        reader.read_reply(query, &mut self.output, &mut self.input)
    }

    /// Ask the terminal where the cursor is.
    pub fn cursor_position(&mut self) -> Result<CursorPosition, QueryError> {
        let span = crate::debug_span!("cursor_query", origin = ?self.config.origin);
        let _guard = span.enter();

        let reply = self.exchange(&QuerySequence::CURSOR_POSITION)?;
        match ReplyParser::parse(self.config.origin, reply.as_bytes()) {
            Ok(pos) => {
                crate::debug!(row = pos.row, col = pos.col, "cursor position received");
                Ok(pos)
            }
            Err(ParseError::Incomplete { .. }) => Err(timed_out(reply)),
            Err(err) => {
                crate::warn!(error = %err, "malformed cursor position reply");
                Err(QueryError::Malformed(err))
            }
        }
    }

    /// Ask the terminal for its primary device attributes.
    pub fn device_attributes(&mut self) -> Result<DeviceAttributes, QueryError> {
        let span = crate::debug_span!("device_attributes_query");
        let _guard = span.enter();

        let reply = self.exchange(&QuerySequence::DEVICE_ATTRIBUTES)?;
        match parse_device_attributes(reply.as_bytes()) {
            Ok(attrs) => {
                crate::debug!(codes = ?attrs.codes, "device attributes received");
                Ok(attrs)
            }
            Err(ParseError::Incomplete { .. }) => Err(timed_out(reply)),
            Err(err) => {
                crate::warn!(error = %err, "malformed device attributes reply");
                Err(QueryError::Malformed(err))
            }
        }
    }
}

fn timed_out(reply: RawReply) -> QueryError {
    crate::warn!(received = reply.len(), "terminal query timed out");
    QueryError::Timeout {
        received: reply.into_bytes(),
    }
}

/// One-shot cursor position query.
pub fn query_cursor_position<O, I>(
    config: &QueryConfig,
    output: &mut O,
    input: &mut I,
) -> Result<CursorPosition, QueryError>
where
    O: OutputChannel + ?Sized,
    I: InputChannel + ?Sized,
{
    CursorQuery::new(output, input, *config).cursor_position()
}
