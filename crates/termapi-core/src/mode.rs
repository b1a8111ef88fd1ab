#![forbid(unsafe_code)]

//! Terminal mode controllers.
//!
//! A reply to a query only reaches the input channel byte-by-byte if the
//! terminal is not line-buffering and echoing it. On Windows the console
//! additionally has to be told to interpret escape sequences at all. Those
//! platform differences live behind [`TerminalModeController`] and are
//! injected by the caller; the query path never touches them.

use std::io;

/// Which side of the terminal a mode change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Keyboard / reply input.
    Input,
    /// Display output.
    Output,
}

/// Platform capability that prepares a terminal stream for queries.
pub trait TerminalModeController {
    /// Put `stream` into query-friendly mode.
    fn enable(&mut self, stream: Stream) -> io::Result<()>;

    /// Undo [`enable`](Self::enable) for `stream`.
    fn disable(&mut self, stream: Stream) -> io::Result<()>;
}

impl<C: TerminalModeController + ?Sized> TerminalModeController for &mut C {
    fn enable(&mut self, stream: Stream) -> io::Result<()> {
        (**self).enable(stream)
    }

    fn disable(&mut self, stream: Stream) -> io::Result<()> {
        (**self).disable(stream)
    }
}

impl<C: TerminalModeController + ?Sized> TerminalModeController for Box<C> {
    fn enable(&mut self, stream: Stream) -> io::Result<()> {
        (**self).enable(stream)
    }

    fn disable(&mut self, stream: Stream) -> io::Result<()> {
        (**self).disable(stream)
    }
}

/// Controller that does nothing. For headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopController;

impl TerminalModeController for NoopController {
    fn enable(&mut self, _stream: Stream) -> io::Result<()> {
        Ok(())
    }

    fn disable(&mut self, _stream: Stream) -> io::Result<()> {
        Ok(())
    }
}

// ── Termios (Unix) ───────────────────────────────────────────────────────

/// Unix controller: turns off canonical mode and echo on the input side.
///
/// Output needs no preparation on Unix terminals, so `Stream::Output` is a
/// no-op. The original termios is saved on the first `enable(Input)` and
/// restored by `disable(Input)`.
#[cfg(unix)]
pub struct TermiosController {
    tty: std::fs::File,
    saved: Option<nix::sys::termios::Termios>,
}

#[cfg(unix)]
impl TermiosController {
    /// Control the process's controlling terminal.
    pub fn open() -> io::Result<Self> {
        let tty = std::fs::File::open("/dev/tty")?;
        Ok(Self::from_file(tty))
    }

    /// Control the terminal behind `tty`.
    #[must_use]
    pub fn from_file(tty: std::fs::File) -> Self {
        Self { tty, saved: None }
    }

    /// Whether input mode is currently changed from the original.
    #[must_use]
    pub fn is_input_enabled(&self) -> bool {
        self.saved.is_some()
    }
}

#[cfg(unix)]
impl std::fmt::Debug for TermiosController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermiosController")
            .field("tty", &self.tty)
            .field("input_enabled", &self.saved.is_some())
            .finish()
    }
}

#[cfg(unix)]
impl TerminalModeController for TermiosController {
    fn enable(&mut self, stream: Stream) -> io::Result<()> {
        use nix::sys::termios::{LocalFlags, SetArg, tcgetattr, tcsetattr};

        if stream == Stream::Output || self.saved.is_some() {
            return Ok(());
        }
        let original = tcgetattr(&self.tty).map_err(io::Error::other)?;
        let mut quiet = original.clone();
        quiet
            .local_flags
            .remove(LocalFlags::ICANON | LocalFlags::ECHO);
        tcsetattr(&self.tty, SetArg::TCSANOW, &quiet).map_err(io::Error::other)?;
        crate::debug!("termios: canonical mode and echo disabled");
        self.saved = Some(original);
        Ok(())
    }

    fn disable(&mut self, stream: Stream) -> io::Result<()> {
        use nix::sys::termios::{SetArg, tcsetattr};

        if stream == Stream::Output {
            return Ok(());
        }
        if let Some(original) = self.saved.take() {
            tcsetattr(&self.tty, SetArg::TCSANOW, &original).map_err(io::Error::other)?;
            crate::debug!("termios: original mode restored");
        }
        Ok(())
    }
}

// ── Console (Windows) ────────────────────────────────────────────────────

/// Windows controller built on crossterm's console handling.
///
/// `enable(Input)` switches the console to raw input; `enable(Output)`
/// turns on virtual terminal processing. VT processing cannot be turned
/// back off through crossterm, so `disable(Output)` is a no-op.
#[cfg(windows)]
#[derive(Debug, Default)]
pub struct ConsoleController {
    input_enabled: bool,
}

#[cfg(windows)]
impl ConsoleController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(windows)]
impl TerminalModeController for ConsoleController {
    fn enable(&mut self, stream: Stream) -> io::Result<()> {
        match stream {
            Stream::Input => {
                if !self.input_enabled {
                    crossterm::terminal::enable_raw_mode()?;
                    self.input_enabled = true;
                }
                Ok(())
            }
            Stream::Output => {
                if crossterm::ansi_support::supports_ansi() {
                    Ok(())
                } else {
                    Err(io::Error::new(
                        io::ErrorKind::Unsupported,
                        "console does not support virtual terminal processing",
                    ))
                }
            }
        }
    }

    fn disable(&mut self, stream: Stream) -> io::Result<()> {
        if stream == Stream::Input && self.input_enabled {
            crossterm::terminal::disable_raw_mode()?;
            self.input_enabled = false;
        }
        Ok(())
    }
}

/// The controller for the current platform, attached to the controlling
/// terminal.
#[cfg(unix)]
pub fn platform_controller() -> io::Result<Box<dyn TerminalModeController>> {
    Ok(Box::new(TermiosController::open()?))
}

/// The controller for the current platform, attached to the console.
#[cfg(windows)]
pub fn platform_controller() -> io::Result<Box<dyn TerminalModeController>> {
    Ok(Box::new(ConsoleController::new()))
}

/// The controller for the current platform. Does nothing here.
#[cfg(not(any(unix, windows)))]
pub fn platform_controller() -> io::Result<Box<dyn TerminalModeController>> {
    Ok(Box::new(NoopController))
}

// ── Mode Guard ───────────────────────────────────────────────────────────

/// RAII guard: enables a stream on creation and disables it on drop.
///
/// Errors during drop are ignored; call [`ModeGuard::release`] to observe
/// them.
pub struct ModeGuard<C: TerminalModeController> {
    controller: Option<C>,
    stream: Stream,
}

impl<C: TerminalModeController> ModeGuard<C> {
    /// Enable `stream` on `controller`, returning a guard that undoes it.
    pub fn enable(mut controller: C, stream: Stream) -> io::Result<Self> {
        controller.enable(stream)?;
        Ok(Self {
            controller: Some(controller),
            stream,
        })
    }

    /// The stream this guard controls.
    #[must_use]
    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Disable the stream now and hand the controller back.
    pub fn release(mut self) -> io::Result<C> {
        match self.controller.take() {
            Some(mut controller) => {
                controller.disable(self.stream)?;
                Ok(controller)
            }
            None => Err(io::Error::other("mode guard already released")),
        }
    }
}

impl<C: TerminalModeController> std::fmt::Debug for ModeGuard<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeGuard")
            .field("stream", &self.stream)
            .field("active", &self.controller.is_some())
            .finish()
    }
}

impl<C: TerminalModeController> Drop for ModeGuard<C> {
    fn drop(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            // Best-effort restore.
            let _ = controller.disable(self.stream);
        }
    }
}
