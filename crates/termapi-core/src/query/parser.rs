#![forbid(unsafe_code)]

//! Reply parsers.
//!
//! # Cursor position reply
//!
//! ```text
//! ESC [ <row> ; <col> R
//! ```
//!
//! [`ReplyParser`] walks the reply strictly left to right with one dispatch
//! per byte:
//!
//! | State | digit | `;` | `R` | `ESC` / `[` | other |
//! |-------|-------|-----|-----|-------------|-------|
//! | Start | → Row | error | error | stay | error |
//! | Row | append | → Col | error | stay | error |
//! | Col | append | error | → Done if col has digits, else error | stay | error |
//!
//! Framing bytes are accepted anywhere, not only as a prefix. Bytes after
//! the terminator are ignored.

use std::fmt;

use super::{CursorPosition, DeviceAttributes, OriginMode};
use crate::sequence::{BRACKET, ESC};

/// Reply terminator for a cursor position report.
pub const CURSOR_REPLY_TERMINATOR: u8 = b'R';

/// Reply terminator for a primary device attributes report.
pub const DEVICE_ATTRIBUTES_TERMINATOR: u8 = b'c';

const SEPARATOR: u8 = b';';

/// Why a reply could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A byte that is not valid in the current state.
    UnexpectedChar {
        /// The offending byte, as a character.
        ch: char,
        /// Byte index within the reply.
        index: usize,
    },
    /// A numeric field does not fit in `u32`.
    FieldOverflow {
        /// Byte index of the digit that overflowed.
        index: usize,
    },
    /// The reply ended before the terminator.
    Incomplete {
        /// Bytes examined.
        len: usize,
    },
}

impl ParseError {
    fn unexpected(byte: u8, index: usize) -> Self {
        Self::UnexpectedChar {
            ch: char::from(byte),
            index,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar { ch, index } => {
                write!(f, "unexpected character {ch:?} at position {index}")
            }
            Self::FieldOverflow { index } => {
                write!(f, "numeric field overflows at position {index}")
            }
            Self::Incomplete { len } => {
                write!(f, "reply ended after {len} bytes without a terminator")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Lexer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// Framing; no digits seen yet.
    #[default]
    Start,
    /// Collecting the row.
    Row,
    /// Collecting the column.
    Col,
    /// Terminator seen.
    Done,
    /// An offending byte was seen.
    Error,
}

/// A base-10 unsigned accumulator.
#[derive(Debug, Clone, Copy, Default)]
struct Field {
    value: u32,
    digits: usize,
    last_index: usize,
}

impl Field {
    fn push(&mut self, digit: u8, index: usize) -> Result<(), ParseError> {
        self.value = self
            .value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(digit - b'0')))
            .ok_or(ParseError::FieldOverflow { index })?;
        self.digits += 1;
        self.last_index = index;
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.digits == 0
    }

    fn adjusted(&self, origin: OriginMode) -> Result<u32, ParseError> {
        self.value
            .checked_add(origin.offset())
            .ok_or(ParseError::FieldOverflow {
                index: self.last_index,
            })
    }
}

/// Result of feeding one byte to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More bytes are needed.
    Pending,
    /// A complete position was recognized.
    Complete(CursorPosition),
}

/// Incremental state machine for cursor position replies.
#[derive(Debug, Clone)]
pub struct ReplyParser {
    state: ParserState,
    origin: OriginMode,
    row: Field,
    col: Field,
    index: usize,
    outcome: Option<Result<CursorPosition, ParseError>>,
}

impl ReplyParser {
    /// A parser that adjusts results by `origin`.
    #[must_use]
    pub fn new(origin: OriginMode) -> Self {
        Self {
            state: ParserState::Start,
            origin,
            row: Field::default(),
            col: Field::default(),
            index: 0,
            outcome: None,
        }
    }

    /// Parse a complete reply.
    pub fn parse(origin: OriginMode, reply: &[u8]) -> Result<CursorPosition, ParseError> {
        let mut parser = Self::new(origin);
        for &byte in reply {
            if let Progress::Complete(pos) = parser.push(byte)? {
                return Ok(pos);
            }
        }
        parser.finish()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Feed the next byte.
    ///
    /// Once the parser reaches `Done` or `Error` it stays there and keeps
    /// returning the same outcome.
    pub fn push(&mut self, byte: u8) -> Result<Progress, ParseError> {
        if let Some(outcome) = self.outcome {
            return outcome.map(Progress::Complete);
        }
        let index = self.index;
        self.index += 1;

        match self.step(byte, index) {
            Ok(Some(pos)) => {
                self.state = ParserState::Done;
                self.outcome = Some(Ok(pos));
                Ok(Progress::Complete(pos))
            }
            Ok(None) => Ok(Progress::Pending),
            Err(err) => {
                self.state = ParserState::Error;
                self.outcome = Some(Err(err));
                Err(err)
            }
        }
    }

    /// Declare end of input.
    pub fn finish(self) -> Result<CursorPosition, ParseError> {
        match self.outcome {
            Some(outcome) => outcome,
            None => Err(ParseError::Incomplete { len: self.index }),
        }
    }

    fn step(&mut self, byte: u8, index: usize) -> Result<Option<CursorPosition>, ParseError> {
        if byte == ESC || byte == BRACKET {
            return Ok(None);
        }
        match (self.state, byte) {
            (ParserState::Start, b'0'..=b'9') => {
                self.row.push(byte, index)?;
                self.state = ParserState::Row;
                Ok(None)
            }
            (ParserState::Row, b'0'..=b'9') => {
                self.row.push(byte, index)?;
                Ok(None)
            }
            (ParserState::Row, SEPARATOR) => {
                self.state = ParserState::Col;
                Ok(None)
            }
            (ParserState::Col, b'0'..=b'9') => {
                self.col.push(byte, index)?;
                Ok(None)
            }
            (ParserState::Col, CURSOR_REPLY_TERMINATOR) if !self.col.is_empty() => {
                debug_assert!(!self.row.is_empty());
                Ok(Some(CursorPosition {
                    row: self.row.adjusted(self.origin)?,
                    col: self.col.adjusted(self.origin)?,
                }))
            }
            _ => Err(ParseError::unexpected(byte, index)),
        }
    }
}

/// Parse a primary device attributes reply: `ESC [ ? Ps ; ... ; Ps c`.
///
/// At least one attribute code is required. Bytes after `c` are ignored.
pub fn parse_device_attributes(reply: &[u8]) -> Result<DeviceAttributes, ParseError> {
    let mut codes = Vec::new();
    let mut current = Field::default();

    for (index, &byte) in reply.iter().enumerate() {
        match byte {
            ESC | BRACKET | b'?' => {}
            b'0'..=b'9' => current.push(byte, index)?,
            SEPARATOR | DEVICE_ATTRIBUTES_TERMINATOR if !current.is_empty() => {
                codes.push(current.value);
                current = Field::default();
                if byte == DEVICE_ATTRIBUTES_TERMINATOR {
                    return Ok(DeviceAttributes { codes });
                }
            }
            _ => return Err(ParseError::unexpected(byte, index)),
        }
    }
    Err(ParseError::Incomplete { len: reply.len() })
}
