#![forbid(unsafe_code)]

//! termapi public facade crate.
//!
//! Re-exports the query core and the styling layer, and offers
//! [`TerminalQuery`] for querying the process's own terminal.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use termapi_core::channel::{InputChannel, OutputChannel};
pub use termapi_core::mode::{ModeGuard, NoopController, Stream, TerminalModeController};
pub use termapi_core::query::{
    CursorPosition, CursorQuery, DeviceAttributes, OriginMode, ParseError, QueryConfig,
    QueryError, QuerySequence, QueryStage, RawReply, ReplyParser, ReplyReader,
    query_cursor_position,
};
pub use termapi_core::sequence::{CharacterSet, LineChar, Sequence};

// --- Style re-exports ------------------------------------------------------

pub use termapi_style::{
    Ansi16, Color, ColorPalette, FormatFlags, Layer, MessageKind, MessagePrinter, PaletteError,
    Rgb, SetColor, named,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for termapi.
#[derive(Debug)]
pub enum Error {
    /// A terminal query failed.
    Query(QueryError),
    /// A palette lookup failed.
    Palette(PaletteError),
    /// I/O failure opening or configuring the terminal.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(err) => write!(f, "{err}"),
            Self::Palette(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Query(err) => Some(err),
            Self::Palette(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Self::Query(err)
    }
}

impl From<PaletteError> for Error {
    fn from(err: PaletteError) -> Self {
        Self::Palette(err)
    }
}

/// Standard result type for termapi APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Terminal session -------------------------------------------------------

/// Queries against the controlling terminal.
///
/// Opening one switches the terminal's input out of canonical/echo mode;
/// dropping it restores the original mode. Keystrokes already buffered on
/// the terminal are dropped before every query.
#[cfg(unix)]
pub struct TerminalQuery {
    // Dropped before the mode guard so nothing is read after it restores.
    query: CursorQuery<std::io::Stdout, termapi_core::channel::TtyInput>,
    _input_mode: ModeGuard<Box<dyn TerminalModeController>>,
}

#[cfg(unix)]
impl TerminalQuery {
    /// Attach to `/dev/tty` for input and stdout for output.
    pub fn open(config: QueryConfig) -> Result<Self> {
        let controller = termapi_core::mode::platform_controller()?;
        let input_mode = ModeGuard::enable(controller, Stream::Input)?;
        let input = termapi_core::channel::TtyInput::open()?;
        Ok(Self {
            query: CursorQuery::new(std::io::stdout(), input, tty_config(config)),
            _input_mode: input_mode,
        })
    }

    /// Choose the origin for subsequent cursor queries.
    pub fn set_origin_mode(&mut self, origin: OriginMode) {
        self.query.set_origin_mode(origin);
    }

    pub fn cursor_position(&mut self) -> Result<CursorPosition> {
        Ok(self.query.cursor_position()?)
    }

    pub fn device_attributes(&mut self) -> Result<DeviceAttributes> {
        Ok(self.query.device_attributes()?)
    }

    /// The underlying session, for callers generic over channels.
    pub fn query_mut(
        &mut self,
    ) -> &mut CursorQuery<std::io::Stdout, termapi_core::channel::TtyInput> {
        &mut self.query
    }
}

/// Settings for a live terminal: typed-ahead input would be parsed as
/// part of the reply, so it is always discarded first.
#[cfg_attr(not(unix), allow(dead_code))]
fn tty_config(config: QueryConfig) -> QueryConfig {
    config.with_discard_stale_input(true)
}

#[cfg(unix)]
impl fmt::Debug for TerminalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalQuery")
            .field("origin", &self.query.origin_mode())
            .finish()
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Color, CursorPosition, CursorQuery, Error, FormatFlags, InputChannel, Layer, MessageKind,
        MessagePrinter, OriginMode, QueryConfig, QueryError, Result, SetColor, named,
    };

    pub use crate::{core, style};
}

pub use termapi_core as core;
pub use termapi_style as style;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use termapi_core::channel::ScriptedInput;

    use super::*;

    #[test]
    fn query_error_converts_and_keeps_source() {
        let mut q = CursorQuery::new(Vec::new(), ScriptedInput::with_reply(b"\x1b[9R"), {
            QueryConfig::new()
                .with_timeout_cycles(2)
                .with_poll_interval(std::time::Duration::ZERO)
        });
        let err: Error = q.cursor_position().unwrap_err().into();
        assert!(matches!(err, Error::Query(QueryError::Malformed(_))));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("parse failed"));
    }

    #[test]
    fn palette_error_converts() {
        let palette: ColorPalette<MessageKind> = ColorPalette::new();
        let err: Error = palette.get(&MessageKind::Info).unwrap_err().into();
        assert_eq!(err.to_string(), "palette key not found");
    }

    #[test]
    fn tty_config_discards_typed_ahead_input() {
        let config = tty_config(QueryConfig::new().with_origin(OriginMode::ZeroBased));
        assert!(config.discard_stale_input);
        assert_eq!(config.origin, OriginMode::ZeroBased);

        let input = ScriptedInput::with_reply(b"q").gap(1).bytes(b"\x1b[2;3R");
        let mut q = CursorQuery::new(
            Vec::new(),
            input,
            config
                .with_timeout_cycles(4)
                .with_poll_interval(std::time::Duration::ZERO),
        );
        assert_eq!(q.cursor_position().unwrap(), CursorPosition::new(2, 3));
    }

    #[test]
    fn prelude_exposes_both_layers() {
        use crate::prelude::*;

        let config = QueryConfig::default();
        assert_eq!(config.origin, OriginMode::OneBased);
        let c = SetColor::new(named::GREEN, Layer::Background, FormatFlags::empty());
        assert_eq!(c.to_string(), "\x1b[48;5;2m");
    }
}
