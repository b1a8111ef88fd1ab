#![forbid(unsafe_code)]

//! Terminal input and output channels.
//!
//! The query core talks to the terminal through two narrow capabilities:
//! an [`OutputChannel`] it writes queries to, and an [`InputChannel`] it
//! polls for reply bytes. Both are caller-owned; nothing here locks.
//!
//! # Contract
//!
//! [`InputChannel::read_one`] may only be called immediately after
//! [`InputChannel::has_data_available`] returned `true`. The query reader
//! never breaks this rule, so implementations are free to block in
//! `read_one`.

use std::io::{self, Write};

/// Upper bound on bytes thrown away by [`InputChannel::discard_available`].
const MAX_DISCARD: usize = 4096;

/// Anything the query can be written to.
///
/// Blanket-implemented for every [`io::Write`], so `Stdout`, `Vec<u8>`, or a
/// `/dev/tty` handle all work.
pub trait OutputChannel: Write {}

impl<W: Write + ?Sized> OutputChannel for W {}

/// Non-blocking byte source for terminal replies.
pub trait InputChannel {
    /// Report whether at least one byte can be read without blocking.
    fn has_data_available(&mut self) -> io::Result<bool>;

    /// Read a single byte. Only called after a positive probe.
    fn read_one(&mut self) -> io::Result<u8>;

    /// Read and drop whatever is already buffered.
    ///
    /// Stops at the first negative probe. Returns the number of bytes dropped.
    fn discard_available(&mut self) -> io::Result<usize> {
        let mut dropped = 0;
        while dropped < MAX_DISCARD && self.has_data_available()? {
            self.read_one()?;
            dropped += 1;
        }
        Ok(dropped)
    }
}

impl<I: InputChannel + ?Sized> InputChannel for &mut I {
    fn has_data_available(&mut self) -> io::Result<bool> {
        (**self).has_data_available()
    }

    fn read_one(&mut self) -> io::Result<u8> {
        (**self).read_one()
    }
}

impl<I: InputChannel + ?Sized> InputChannel for Box<I> {
    fn has_data_available(&mut self) -> io::Result<bool> {
        (**self).has_data_available()
    }

    fn read_one(&mut self) -> io::Result<u8> {
        (**self).read_one()
    }
}

// ── Tty Input ────────────────────────────────────────────────────────────

/// Input channel over a terminal file descriptor, probed with `poll(2)`.
///
/// Owns its file so the descriptor stays valid for the channel's lifetime.
#[cfg(unix)]
#[derive(Debug)]
pub struct TtyInput {
    file: std::fs::File,
}

#[cfg(unix)]
impl TtyInput {
    /// Open the controlling terminal (`/dev/tty`) for reading.
    pub fn open() -> io::Result<Self> {
        let file = std::fs::File::open("/dev/tty")?;
        Ok(Self { file })
    }

    /// Wrap an already-open file (a tty, pipe, or socket).
    #[must_use]
    pub fn from_file(file: std::fs::File) -> Self {
        Self { file }
    }

    /// Give the file back.
    #[must_use]
    pub fn into_inner(self) -> std::fs::File {
        self.file
    }
}

#[cfg(unix)]
impl InputChannel for TtyInput {
    fn has_data_available(&mut self) -> io::Result<bool> {
        use std::os::fd::AsFd;

        let mut poll_fds = [nix::poll::PollFd::new(
            self.file.as_fd(),
            nix::poll::PollFlags::POLLIN,
        )];
        match nix::poll::poll(&mut poll_fds, nix::poll::PollTimeout::from(0u16)) {
            Ok(n) => Ok(n > 0),
            Err(nix::errno::Errno::EINTR) => Ok(false),
            Err(e) => Err(io::Error::other(e)),
        }
    }

    fn read_one(&mut self) -> io::Result<u8> {
        use std::io::Read;

        let mut buf = [0u8; 1];
        loop {
            match self.file.read(&mut buf) {
                Ok(1) => return Ok(buf[0]),
                Ok(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "terminal input closed",
                    ));
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

// ── Scripted Input ───────────────────────────────────────────────────────

#[cfg(any(test, feature = "test-helpers"))]
pub use scripted::ScriptedInput;

#[cfg(any(test, feature = "test-helpers"))]
mod scripted {
    use std::collections::VecDeque;
    use std::io;

    use super::InputChannel;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        Byte(u8),
        Gap,
        Fail(io::ErrorKind),
    }

    /// Deterministic [`InputChannel`] driven by a script of bytes and gaps.
    ///
    /// - A byte step makes the probe report `true`; `read_one` consumes it.
    /// - A gap step makes exactly one probe report `false`.
    /// - A failure step makes the next probe return an error.
    /// - Once the script is exhausted every probe reports `false`.
    ///
    /// Probes and reads are counted. Calling `read_one` without a preceding
    /// positive probe panics.
    #[derive(Debug, Default)]
    pub struct ScriptedInput {
        script: VecDeque<Step>,
        probes: usize,
        reads: usize,
        armed: bool,
    }

    impl ScriptedInput {
        /// An input that never has data.
        #[must_use]
        pub fn never_ready() -> Self {
            Self::default()
        }

        /// An input holding `bytes`, all immediately available.
        #[must_use]
        pub fn with_reply(bytes: &[u8]) -> Self {
            Self::default().bytes(bytes)
        }

        /// Append immediately available bytes.
        #[must_use]
        pub fn bytes(mut self, bytes: &[u8]) -> Self {
            self.script.extend(bytes.iter().copied().map(Step::Byte));
            self
        }

        /// Append `probes` negative probes.
        #[must_use]
        pub fn gap(mut self, probes: usize) -> Self {
            self.script.extend(std::iter::repeat_n(Step::Gap, probes));
            self
        }

        /// Append a probe that fails with `kind`.
        #[must_use]
        pub fn fail(mut self, kind: io::ErrorKind) -> Self {
            self.script.push_back(Step::Fail(kind));
            self
        }

        /// Number of `has_data_available` calls so far.
        #[must_use]
        pub fn probes(&self) -> usize {
            self.probes
        }

        /// Number of `read_one` calls so far.
        #[must_use]
        pub fn reads(&self) -> usize {
            self.reads
        }

        /// Script steps not yet consumed.
        #[must_use]
        pub fn remaining(&self) -> usize {
            self.script.len()
        }
    }

    impl InputChannel for ScriptedInput {
        fn has_data_available(&mut self) -> io::Result<bool> {
            self.probes += 1;
            match self.script.front().copied() {
                Some(Step::Byte(_)) => {
                    self.armed = true;
                    Ok(true)
                }
                Some(Step::Gap) => {
                    self.script.pop_front();
                    self.armed = false;
                    Ok(false)
                }
                Some(Step::Fail(kind)) => {
                    self.script.pop_front();
                    self.armed = false;
                    Err(io::Error::new(kind, "scripted input failure"))
                }
                None => {
                    self.armed = false;
                    Ok(false)
                }
            }
        }

        fn read_one(&mut self) -> io::Result<u8> {
            assert!(
                self.armed,
                "read_one called without a preceding positive probe"
            );
            self.armed = false;
            self.reads += 1;
            match self.script.pop_front() {
                Some(Step::Byte(b)) => Ok(b),
                _ => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "scripted input exhausted",
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_channel_accepts_any_writer() {
        fn write_query<O: OutputChannel + ?Sized>(out: &mut O) -> io::Result<()> {
            out.write_all(b"\x1b[6n")?;
            out.flush()
        }
        let mut buf = Vec::new();
        write_query(&mut buf).unwrap();
        assert_eq!(buf, b"\x1b[6n");
    }

    #[test]
    fn scripted_bytes_then_exhausted() {
        let mut input = ScriptedInput::with_reply(b"ab");
        assert!(input.has_data_available().unwrap());
        assert_eq!(input.read_one().unwrap(), b'a');
        assert!(input.has_data_available().unwrap());
        assert_eq!(input.read_one().unwrap(), b'b');
        assert!(!input.has_data_available().unwrap());
        assert_eq!(input.probes(), 3);
        assert_eq!(input.reads(), 2);
    }

    #[test]
    fn scripted_gap_consumes_one_probe() {
        let mut input = ScriptedInput::never_ready().gap(2).bytes(b"x");
        assert!(!input.has_data_available().unwrap());
        assert!(!input.has_data_available().unwrap());
        assert!(input.has_data_available().unwrap());
        assert_eq!(input.read_one().unwrap(), b'x');
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn scripted_failure_surfaces_on_probe() {
        let mut input = ScriptedInput::never_ready().fail(io::ErrorKind::BrokenPipe);
        let err = input.has_data_available().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(!input.has_data_available().unwrap());
    }

    #[test]
    #[should_panic(expected = "without a preceding positive probe")]
    fn scripted_read_without_probe_panics() {
        let mut input = ScriptedInput::with_reply(b"a");
        let _ = input.read_one();
    }

    #[test]
    fn discard_available_stops_at_gap() {
        let mut input = ScriptedInput::with_reply(b"old").gap(1).bytes(b"new");
        assert_eq!(input.discard_available().unwrap(), 3);
        assert!(input.has_data_available().unwrap());
        assert_eq!(input.read_one().unwrap(), b'n');
    }

    #[test]
    fn mut_ref_forwards() {
        fn first_byte<I: InputChannel>(mut input: I) -> Option<u8> {
            if input.has_data_available().ok()? {
                input.read_one().ok()
            } else {
                None
            }
        }
        let mut input = ScriptedInput::with_reply(b"z");
        assert_eq!(first_byte(&mut input), Some(b'z'));
        assert_eq!(input.reads(), 1);

        let boxed: Box<dyn InputChannel> = Box::new(ScriptedInput::never_ready());
        assert_eq!(first_byte(boxed), None);
    }

    // ── Socket-backed tty input ──────────────────────────────────────────

    /// Create a (reader_file, writer_stream) pair using Unix sockets.
    #[cfg(unix)]
    fn socket_pair() -> (std::fs::File, std::os::unix::net::UnixStream) {
        use std::os::unix::net::UnixStream;
        let (a, b) = UnixStream::pair().unwrap();
        let reader: std::fs::File = std::os::fd::OwnedFd::from(a).into();
        (reader, b)
    }

    #[cfg(unix)]
    #[test]
    fn tty_input_reports_nothing_when_idle() {
        let (reader, _writer) = socket_pair();
        let mut input = TtyInput::from_file(reader);
        assert!(!input.has_data_available().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn tty_input_reads_written_bytes() {
        let (reader, mut writer) = socket_pair();
        let mut input = TtyInput::from_file(reader);
        writer.write_all(b"\x1b[1;1R").unwrap();

        let mut got = Vec::new();
        while input.has_data_available().unwrap() {
            got.push(input.read_one().unwrap());
        }
        assert_eq!(got, b"\x1b[1;1R");
    }

    #[cfg(unix)]
    #[test]
    fn tty_input_eof_is_an_error() {
        let (reader, writer) = socket_pair();
        let mut input = TtyInput::from_file(reader);
        drop(writer);
        assert!(input.has_data_available().unwrap());
        let err = input.read_one().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
