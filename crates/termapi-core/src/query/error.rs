#![forbid(unsafe_code)]

//! Query errors.

use std::fmt;
use std::io;

use super::ParseError;

/// Where in the exchange a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStage {
    /// Writing the query or collecting the reply.
    Read,
    /// Interpreting the collected reply.
    Parse,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Parse => write!(f, "parse"),
        }
    }
}

/// Failure of a terminal query.
#[derive(Debug)]
pub enum QueryError {
    /// No terminator arrived before the polling budget ran out.
    Timeout {
        /// Whatever arrived before giving up.
        received: Vec<u8>,
    },
    /// The reply arrived but is not a well-formed frame.
    Malformed(ParseError),
    /// The input or output channel failed.
    Channel(io::Error),
    /// The cancellation flag was raised.
    Cancelled,
}

impl QueryError {
    /// The stage that failed.
    #[must_use]
    pub fn stage(&self) -> QueryStage {
        match self {
            Self::Malformed(_) => QueryStage::Parse,
            Self::Timeout { .. } | Self::Channel(_) | Self::Cancelled => QueryStage::Read,
        }
    }

    /// Whether nothing at all arrived.
    #[must_use]
    pub fn is_silent_timeout(&self) -> bool {
        matches!(self, Self::Timeout { received } if received.is_empty())
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = self.stage();
        match self {
            Self::Timeout { received } if received.is_empty() => {
                write!(f, "{stage} failed: no reply before timeout")
            }
            Self::Timeout { received } => write!(
                f,
                "{stage} failed: timed out after {} bytes ({:?})",
                received.len(),
                String::from_utf8_lossy(received)
            ),
            Self::Malformed(err) => write!(f, "{stage} failed: malformed reply: {err}"),
            Self::Channel(err) => write!(f, "{stage} failed: terminal i/o error: {err}"),
            Self::Cancelled => write!(f, "{stage} failed: query cancelled"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::Channel(err) => Some(err),
            Self::Timeout { .. } | Self::Cancelled => None,
        }
    }
}

impl From<io::Error> for QueryError {
    fn from(err: io::Error) -> Self {
        Self::Channel(err)
    }
}

impl From<ParseError> for QueryError {
    /// A reply that simply stopped short is a timeout; anything else is
    /// malformed.
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Incomplete { .. } => Self::Timeout {
                received: Vec::new(),
            },
            other => Self::Malformed(other),
        }
    }
}
