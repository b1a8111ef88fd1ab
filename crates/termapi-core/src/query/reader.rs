#![forbid(unsafe_code)]

//! Query transmission and reply accumulation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::{QueryConfig, QueryError, QuerySequence};
use crate::channel::{InputChannel, OutputChannel};

/// Bytes accumulated from the input channel during one exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReply {
    bytes: Vec<u8>,
    terminated: bool,
}

impl RawReply {
    /// Reply bytes in arrival order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Whether nothing arrived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of bytes received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the last byte read was the query's terminator.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

/// Writes a query and polls for the reply.
///
/// The loop runs until one of:
/// - the terminator byte has been read,
/// - `max_reply_len` bytes have been read,
/// - `timeout_cycles` probes have come back empty.
///
/// Reading a byte never consumes polling budget; only empty probes do, and
/// each one sleeps `poll_interval`. The reader never judges the reply's
/// content.
#[derive(Debug, Clone)]
pub struct ReplyReader {
    timeout_cycles: u32,
    poll_interval: Duration,
    flush_output: bool,
    discard_stale_input: bool,
    max_reply_len: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl ReplyReader {
    /// A reader with explicit budget and polling settings.
    ///
    /// `timeout_cycles` of zero is raised to one.
    #[must_use]
    pub fn new(timeout_cycles: u32, poll_interval: Duration, flush_output: bool) -> Self {
        Self::from_config(
            &QueryConfig::new()
                .with_timeout_cycles(timeout_cycles)
                .with_poll_interval(poll_interval)
                .with_flush_output(flush_output),
        )
    }

    /// A reader using the transport settings of `config`.
    #[must_use]
    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            timeout_cycles: config.timeout_cycles.max(1),
            poll_interval: config.poll_interval,
            flush_output: config.flush_output,
            discard_stale_input: config.discard_stale_input,
            max_reply_len: config.max_reply_len.max(1),
            cancel: None,
        }
    }

    /// Abort the exchange with [`QueryError::Cancelled`] once `flag` is set.
    ///
    /// The flag is checked once per polling iteration.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Write `query` to `output` and collect the reply from `input`.
    ///
    /// Returns whatever arrived, possibly nothing. Fails only on channel
    /// errors or cancellation.
    pub fn read_reply<O, I>(
        &self,
        query: &QuerySequence,
        output: &mut O,
        input: &mut I,
    ) -> Result<RawReply, QueryError>
    where
        O: OutputChannel + ?Sized,
        I: InputChannel + ?Sized,
    {
        if self.flush_output {
            output.flush()?;
        }
        if self.discard_stale_input {
            let dropped = input.discard_available()?;
            if dropped > 0 {
                crate::debug!(dropped, "discarded stale input before query");
            }
        }
        output.write_all(query.as_bytes())?;
        output.flush()?;

        let mut reply = RawReply {
            bytes: Vec::with_capacity(16),
            terminated: false,
        };
        let mut remaining = self.timeout_cycles;
        let mut burst = 0usize;

        while remaining > 0 {
            if self.is_cancelled() {
                crate::debug!(received = reply.len(), "query cancelled");
                return Err(QueryError::Cancelled);
            }

            if !input.has_data_available()? {
                if burst > 0 {
                    crate::trace!(bytes = burst, "reply burst received");
                    burst = 0;
                }
                if !self.poll_interval.is_zero() {
                    thread::sleep(self.poll_interval);
                }
                remaining -= 1;
                continue;
            }

            let byte = input.read_one()?;
            reply.bytes.push(byte);
            burst += 1;

            if byte == query.terminator() {
                reply.terminated = true;
                break;
            }
            if reply.bytes.len() >= self.max_reply_len {
                crate::debug!(len = reply.len(), "reply byte budget exhausted");
                break;
            }
        }

        if burst > 0 {
            crate::trace!(bytes = burst, "reply burst received");
        }
        crate::trace!(
            len = reply.len(),
            terminated = reply.terminated,
            cycles_left = remaining,
            "reply read finished"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::channel::ScriptedInput;

    fn fast(cycles: u32) -> ReplyReader {
        ReplyReader::new(cycles, Duration::ZERO, true)
    }

    #[test]
    fn never_ready_probes_exactly_budget() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::never_ready();
        let reply = fast(37)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert!(reply.is_empty());
        assert!(!reply.is_terminated());
        assert_eq!(input.probes(), 37);
        assert_eq!(input.reads(), 0);
        assert_eq!(out, b"\x1b[6n");
    }

    #[test]
    fn full_reply_stops_at_terminator() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::with_reply(b"\x1b[3;4R");
        let reply = fast(4)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert_eq!(reply.as_bytes(), b"\x1b[3;4R");
        assert!(reply.is_terminated());
        // One probe per byte and no empty probe at all.
        assert_eq!(input.probes(), 6);
        assert_eq!(input.reads(), 6);
    }

    #[test]
    fn bytes_do_not_consume_budget() {
        // A budget of 3 survives one gap before the reply and one in the middle.
        let mut out = Vec::new();
        let mut input = ScriptedInput::never_ready()
            .gap(1)
            .bytes(b"\x1b[1")
            .gap(1)
            .bytes(b";1R");
        let reply = fast(3)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert_eq!(reply.as_bytes(), b"\x1b[1;1R");
        assert!(reply.is_terminated());
    }

    #[test]
    fn budget_exhausted_mid_reply_returns_partial() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::with_reply(b"\x1b[1").gap(5).bytes(b";1R");
        let reply = fast(3)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert_eq!(reply.as_bytes(), b"\x1b[1");
        assert!(!reply.is_terminated());
        assert_eq!(input.probes(), 3 + 3);
    }

    #[test]
    fn trailing_input_left_unread() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::with_reply(b"\x1b[1;1Rabc");
        fast(4)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert_eq!(input.remaining(), 3);
    }

    #[test]
    fn byte_budget_caps_reply() {
        let mut out = Vec::new();
        let noise = vec![b'1'; 300];
        let mut input = ScriptedInput::with_reply(&noise);
        let reply = fast(4)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert_eq!(reply.len(), 256);
        assert!(!reply.is_terminated());
    }

    #[test]
    fn custom_byte_budget() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::with_reply(b"\x1b[12;34R");
        let config = QueryConfig::new()
            .with_poll_interval(Duration::ZERO)
            .with_max_reply_len(4);
        let reply = ReplyReader::from_config(&config)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert_eq!(reply.as_bytes(), b"\x1b[12");
    }

    #[test]
    fn zero_budget_is_raised_to_one() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::never_ready();
        fast(0)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert_eq!(input.probes(), 1);
    }

    #[test]
    fn discard_stale_input_before_query() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::with_reply(b"junk")
            .gap(1)
            .bytes(b"\x1b[2;2R");
        let config = QueryConfig::new()
            .with_poll_interval(Duration::ZERO)
            .with_discard_stale_input(true);
        let reply = ReplyReader::from_config(&config)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert_eq!(reply.as_bytes(), b"\x1b[2;2R");
    }

    #[test]
    fn stale_input_kept_by_default() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::with_reply(b"junk")
            .gap(1)
            .bytes(b"\x1b[2;2R");
        let reply = fast(8)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert_eq!(reply.as_bytes(), b"junk\x1b[2;2R");
    }

    #[test]
    fn probe_failure_is_channel_error() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::never_ready().fail(io::ErrorKind::BrokenPipe);
        let err = fast(4)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap_err();
        assert!(matches!(err, QueryError::Channel(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn write_failure_is_channel_error() {
        struct Refusing;
        impl io::Write for Refusing {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("refused"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mut input = ScriptedInput::with_reply(b"\x1b[1;1R");
        let err = fast(4)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut Refusing, &mut input)
            .unwrap_err();
        assert!(matches!(err, QueryError::Channel(_)));
        assert_eq!(input.probes(), 0);
    }

    #[test]
    fn raised_cancel_flag_stops_before_probing() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut out = Vec::new();
        let mut input = ScriptedInput::with_reply(b"\x1b[1;1R");
        let err = fast(4)
            .with_cancel_flag(flag)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap_err();
        assert!(matches!(err, QueryError::Cancelled));
        assert_eq!(input.probes(), 0);
    }

    #[test]
    fn lowered_cancel_flag_is_ignored() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut out = Vec::new();
        let mut input = ScriptedInput::with_reply(b"\x1b[1;1R");
        let reply = fast(4)
            .with_cancel_flag(flag)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        assert!(reply.is_terminated());
    }
}
