//! Property-based invariant tests for the cursor position query path.
//!
//! 1. Origin adjustment: `ESC[r;cR` parses to (r, c) zero-based and
//!    (r+1, c+1) one-based.
//! 2. `CursorPosition::to_reply` inverts the origin adjustment.
//! 3. Framing bytes inserted before the terminator change nothing.
//! 4. The parser never panics; reported indices point at the offending byte.
//! 5. A reply without a column never parses.
//! 6. A silent input is probed exactly `timeout_cycles` times and never read.
//! 7. A complete reply ends the exchange without spending budget.
//! 8. Accumulated replies never exceed the byte budget.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use proptest::prelude::*;
use termapi_core::channel::InputChannel;
use termapi_core::query::{
    CursorPosition, OriginMode, ParseError, QueryConfig, QuerySequence, ReplyParser, ReplyReader,
};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Input that is ready while it holds bytes; counts probes and reads.
struct Counting {
    pending: VecDeque<u8>,
    probes: usize,
    reads: usize,
}

impl Counting {
    fn new(bytes: &[u8]) -> Self {
        Self {
            pending: bytes.iter().copied().collect(),
            probes: 0,
            reads: 0,
        }
    }
}

impl InputChannel for Counting {
    fn has_data_available(&mut self) -> io::Result<bool> {
        self.probes += 1;
        Ok(!self.pending.is_empty())
    }

    fn read_one(&mut self) -> io::Result<u8> {
        self.reads += 1;
        self.pending
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
    }
}

fn reply(row: u32, col: u32) -> Vec<u8> {
    format!("\x1b[{row};{col}R").into_bytes()
}

fn origin_strategy() -> impl Strategy<Value = OriginMode> {
    prop_oneof![Just(OriginMode::ZeroBased), Just(OriginMode::OneBased)]
}

fn reader(cycles: u32) -> ReplyReader {
    ReplyReader::new(cycles, Duration::ZERO, true)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Origin adjustment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn origin_adjustment(r in 0u32..u32::MAX, c in 0u32..u32::MAX) {
        let bytes = reply(r, c);
        prop_assert_eq!(
            ReplyParser::parse(OriginMode::ZeroBased, &bytes),
            Ok(CursorPosition::new(r, c))
        );
        prop_assert_eq!(
            ReplyParser::parse(OriginMode::OneBased, &bytes),
            Ok(CursorPosition::new(r + 1, c + 1))
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. to_reply inverts the origin adjustment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn to_reply_round_trips(origin in origin_strategy(), r in 1u32..100_000, c in 1u32..100_000) {
        let pos = CursorPosition::new(r, c);
        let wire = pos.to_reply(origin);
        prop_assert_eq!(ReplyParser::parse(origin, wire.as_bytes()), Ok(pos));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Framing leniency
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn framing_bytes_are_ignored(
        r in 0u32..10_000,
        c in 0u32..10_000,
        at in any::<prop::sample::Index>(),
        framing in prop_oneof![Just(0x1bu8), Just(b'[')],
    ) {
        let mut bytes = reply(r, c);
        // Insert anywhere before the terminator.
        let pos = at.index(bytes.len());
        bytes.insert(pos, framing);
        prop_assert_eq!(
            ReplyParser::parse(OriginMode::ZeroBased, &bytes),
            Ok(CursorPosition::new(r, c))
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. No panics; indices point at the offending byte
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        match ReplyParser::parse(OriginMode::OneBased, &bytes) {
            Ok(_) => prop_assert!(bytes.contains(&b'R')),
            Err(ParseError::UnexpectedChar { ch, index }) => {
                prop_assert!(index < bytes.len());
                prop_assert_eq!(char::from(bytes[index]), ch);
            }
            Err(ParseError::FieldOverflow { index }) => {
                prop_assert!(index < bytes.len());
                prop_assert!(bytes[index].is_ascii_digit());
            }
            Err(ParseError::Incomplete { len }) => prop_assert_eq!(len, bytes.len()),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. A reply without a column never parses
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn row_only_reply_is_malformed(r in any::<u32>(), sep in any::<bool>()) {
        let text = if sep { format!("\x1b[{r};R") } else { format!("\x1b[{r}R") };
        let bytes = text.into_bytes();
        let result = ReplyParser::parse(OriginMode::ZeroBased, &bytes);
        prop_assert_eq!(
            result,
            Err(ParseError::UnexpectedChar { ch: 'R', index: bytes.len() - 1 })
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Silent input: exactly timeout_cycles probes, zero reads
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn silent_input_probed_exactly_budget(cycles in 1u32..512) {
        let mut out = Vec::new();
        let mut input = Counting::new(b"");
        let raw = reader(cycles)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        prop_assert!(raw.is_empty());
        prop_assert_eq!(input.probes, cycles as usize);
        prop_assert_eq!(input.reads, 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Complete replies end the exchange early
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn complete_reply_terminates_early(
        cycles in 1u32..64,
        r in 0u32..100_000,
        c in 0u32..100_000,
        trailing in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let mut bytes = reply(r, c);
        let len = bytes.len();
        bytes.extend_from_slice(&trailing);

        let mut out = Vec::new();
        let mut input = Counting::new(&bytes);
        let raw = reader(cycles)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        prop_assert!(raw.is_terminated());
        prop_assert_eq!(raw.len(), len);
        prop_assert_eq!(input.probes, len);
        prop_assert_eq!(input.pending.len(), trailing.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Byte budget
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reply_never_exceeds_byte_budget(
        budget in 1usize..64,
        noise in prop::collection::vec(b'0'..=b'9', 0..128),
    ) {
        let config = QueryConfig::new()
            .with_timeout_cycles(2)
            .with_poll_interval(Duration::ZERO)
            .with_max_reply_len(budget);
        let mut out = Vec::new();
        let mut input = Counting::new(&noise);
        let raw = ReplyReader::from_config(&config)
            .read_reply(&QuerySequence::CURSOR_POSITION, &mut out, &mut input)
            .unwrap();
        prop_assert_eq!(raw.len(), noise.len().min(budget));
    }
}
