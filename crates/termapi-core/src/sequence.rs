#![forbid(unsafe_code)]

//! Escape sequence construction.
//!
//! Every helper here is pure: it composes an escape prefix, a payload, and a
//! terminator into a [`Sequence`] and never touches a terminal. Writing the
//! bytes is the caller's job (see [`Sequence::write_to`]).
//!
//! # Sequence Reference
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | CSI | `ESC [ n A/B/C/D` | Cursor up/down/right/left |
//! | CSI | `ESC [ n E/F` | Cursor next/previous line |
//! | CSI | `ESC [ y ; x H` | Cursor position |
//! | CSI | `ESC [ n S/T` | Scroll up/down |
//! | CSI | `ESC [ n @/P/X` | Insert/delete/erase characters |
//! | CSI | `ESC [ n L/M` | Insert/delete lines |
//! | CSI | `ESC [ n m` | SGR (Select Graphic Rendition) |
//! | CSI | `ESC [ ? 25 h/l` | Cursor visibility |
//! | CSI | `ESC [ ? 12 h/l` | Cursor blink |
//! | CSI | `ESC [ ? 1049 h/l` | Alternate/main screen buffer |
//! | CSI | `ESC [ 6 n` | Report cursor position (DECXCPR) |
//! | CSI | `ESC [ 0 c` | Primary device attributes |
//! | DEC | `ESC 7` / `ESC 8` | Cursor save/restore |

use std::fmt;
use std::io::{self, Write};

/// Escape character.
pub const ESC: u8 = 0x1b;

/// Control Sequence Introducer bracket.
pub const BRACKET: u8 = b'[';

/// Control Sequence Introducer: `ESC [`.
pub const CSI: &[u8] = b"\x1b[";

/// Final byte of an SGR sequence.
pub const SGR_END: u8 = b'm';

/// Final byte enabling a DEC private mode.
pub const MODE_ENABLE: u8 = b'h';

/// Final byte disabling a DEC private mode.
pub const MODE_DISABLE: u8 = b'l';

/// SGR parameter prefix selecting an indexed foreground color.
pub const LAYER_FOREGROUND: &str = "38;5";

/// SGR parameter prefix selecting an indexed background color.
pub const LAYER_BACKGROUND: &str = "48;5";

/// An immutable, transmittable escape sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Sequence {
    bytes: Vec<u8>,
}

impl Sequence {
    /// A sequence that writes nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Wrap raw bytes verbatim.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// `ESC <payload>`
    #[must_use]
    pub fn esc(payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(1 + payload.len());
        bytes.push(ESC);
        bytes.extend_from_slice(payload);
        Self { bytes }
    }

    /// `ESC [ <params> <final_byte>`
    #[must_use]
    pub fn csi(params: &str, final_byte: u8) -> Self {
        let mut bytes = Vec::with_capacity(CSI.len() + params.len() + 1);
        bytes.extend_from_slice(CSI);
        bytes.extend_from_slice(params.as_bytes());
        bytes.push(final_byte);
        Self { bytes }
    }

    /// Append another sequence, returning the combined one.
    #[must_use]
    pub fn chain(mut self, other: &Sequence) -> Self {
        self.bytes.extend_from_slice(&other.bytes);
        self
    }

    /// Raw bytes of the sequence.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether this sequence writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Write the sequence to `w`. Does not flush.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.bytes)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl AsRef<[u8]> for Sequence {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[inline]
fn csi_n(n: u32, final_byte: u8) -> Sequence {
    Sequence::csi(&n.to_string(), final_byte)
}

#[inline]
fn dec_mode(mode: u16, enable: bool) -> Sequence {
    let final_byte = if enable { MODE_ENABLE } else { MODE_DISABLE };
    Sequence::csi(&format!("?{mode}"), final_byte)
}

// =============================================================================
// Cursor Positioning
// =============================================================================

/// Move cursor up: `CSI n A`
#[must_use]
pub fn cursor_up(n: u32) -> Sequence {
    csi_n(n, b'A')
}

/// Move cursor down: `CSI n B`
#[must_use]
pub fn cursor_down(n: u32) -> Sequence {
    csi_n(n, b'B')
}

/// Move cursor right: `CSI n C`
#[must_use]
pub fn cursor_right(n: u32) -> Sequence {
    csi_n(n, b'C')
}

/// Move cursor left: `CSI n D`
#[must_use]
pub fn cursor_left(n: u32) -> Sequence {
    csi_n(n, b'D')
}

/// Move cursor to the start of the line `n` lines down: `CSI n E`
#[must_use]
pub fn cursor_next_line(n: u32) -> Sequence {
    csi_n(n, b'E')
}

/// Move cursor to the start of the line `n` lines up: `CSI n F`
#[must_use]
pub fn cursor_prev_line(n: u32) -> Sequence {
    csi_n(n, b'F')
}

/// DEC cursor save: `ESC 7` (DECSC)
#[must_use]
pub fn cursor_save() -> Sequence {
    Sequence::esc(b"7")
}

/// DEC cursor restore: `ESC 8` (DECRC)
#[must_use]
pub fn cursor_restore() -> Sequence {
    Sequence::esc(b"8")
}

/// Cursor position: `CSI y ; x H`.
///
/// Coordinates are emitted verbatim; the terminal treats them as 1-based.
#[must_use]
pub fn cursor_position(x: u32, y: u32) -> Sequence {
    Sequence::csi(&format!("{y};{x}"), b'H')
}

/// Show or hide the cursor: `CSI ? 25 h/l`
#[must_use]
pub fn cursor_visible(visible: bool) -> Sequence {
    dec_mode(25, visible)
}

/// Start or stop cursor blinking: `CSI ? 12 h/l`
#[must_use]
pub fn cursor_blink(blink: bool) -> Sequence {
    dec_mode(12, blink)
}

// =============================================================================
// Viewport and Screen Buffer
// =============================================================================

/// Scroll text up by `n` lines: `CSI n S`
#[must_use]
pub fn scroll_up(n: u32) -> Sequence {
    csi_n(n, b'S')
}

/// Scroll text down by `n` lines: `CSI n T`
#[must_use]
pub fn scroll_down(n: u32) -> Sequence {
    csi_n(n, b'T')
}

/// Switch to the alternate screen buffer: `CSI ? 1049 h`
///
/// Pair with [`main_screen`] before exit.
#[must_use]
pub fn alternate_screen() -> Sequence {
    dec_mode(1049, true)
}

/// Switch back to the main screen buffer: `CSI ? 1049 l`
#[must_use]
pub fn main_screen() -> Sequence {
    dec_mode(1049, false)
}

// =============================================================================
// Text Modification
// =============================================================================

/// Insert `n` blank characters at the cursor: `CSI n @`
#[must_use]
pub fn insert_chars(n: u32) -> Sequence {
    csi_n(n, b'@')
}

/// Delete `n` characters at the cursor, shifting the rest left: `CSI n P`
#[must_use]
pub fn delete_chars(n: u32) -> Sequence {
    csi_n(n, b'P')
}

/// Erase `n` characters from the cursor without shifting: `CSI n X`
#[must_use]
pub fn erase_chars(n: u32) -> Sequence {
    csi_n(n, b'X')
}

/// Insert `n` blank lines at the cursor: `CSI n L`
#[must_use]
pub fn insert_lines(n: u32) -> Sequence {
    csi_n(n, b'L')
}

/// Delete `n` lines at the cursor: `CSI n M`
#[must_use]
pub fn delete_lines(n: u32) -> Sequence {
    csi_n(n, b'M')
}

/// Select Graphic Rendition with a single mode: `CSI n m`
#[must_use]
pub fn graphics_rendition(mode: u32) -> Sequence {
    csi_n(mode, SGR_END)
}

// =============================================================================
// Queries
// =============================================================================

/// Report cursor position (DECXCPR): `CSI 6 n`
///
/// The terminal answers on the input stream with `CSI row ; col R`.
#[must_use]
pub fn report_cursor_position() -> Sequence {
    Sequence::from_bytes(crate::query::CURSOR_POSITION_QUERY)
}

/// Primary device attributes: `CSI 0 c`
///
/// The terminal answers on the input stream with `CSI ? Ps ; ... c`.
#[must_use]
pub fn device_attributes() -> Sequence {
    Sequence::from_bytes(crate::query::DEVICE_ATTRIBUTES_QUERY)
}

// =============================================================================
// DEC Character Sets
// =============================================================================

/// A G0 character set the terminal can be switched into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterSet {
    /// US ASCII (`ESC ( B`).
    Ascii,
    /// DEC special graphics, used for line drawing (`ESC ( 0`).
    DecLineDrawing,
}

impl CharacterSet {
    /// The designator byte following `ESC (`.
    #[must_use]
    pub const fn designator(self) -> u8 {
        match self {
            Self::Ascii => b'B',
            Self::DecLineDrawing => b'0',
        }
    }

    /// Sequence that designates this set as G0.
    #[must_use]
    pub fn designate(self) -> Sequence {
        Sequence::esc(&[b'(', self.designator()])
    }
}

impl TryFrom<u8> for CharacterSet {
    type Error = CharsetError;

    fn try_from(designator: u8) -> Result<Self, Self::Error> {
        match designator {
            b'B' => Ok(Self::Ascii),
            b'0' => Ok(Self::DecLineDrawing),
            other => Err(CharsetError { designator: other }),
        }
    }
}

/// Unknown character set designator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharsetError {
    /// The rejected designator byte.
    pub designator: u8,
}

impl fmt::Display for CharsetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown character set designator {:?} (0x{:02x})",
            char::from(self.designator),
            self.designator
        )
    }
}

impl std::error::Error for CharsetError {}

/// DEC special graphics glyphs. Only meaningful while
/// [`CharacterSet::DecLineDrawing`] is designated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LineChar {
    BottomRight = 0x6a,
    TopRight = 0x6b,
    TopLeft = 0x6c,
    BottomLeft = 0x6d,
    Cross = 0x6e,
    Horizontal = 0x71,
    TeeRight = 0x74,
    TeeLeft = 0x75,
    TeeUp = 0x76,
    TeeDown = 0x77,
    Vertical = 0x78,
}

impl LineChar {
    /// All glyphs, in byte order.
    pub const ALL: [LineChar; 11] = [
        Self::BottomRight,
        Self::TopRight,
        Self::TopLeft,
        Self::BottomLeft,
        Self::Cross,
        Self::Horizontal,
        Self::TeeRight,
        Self::TeeLeft,
        Self::TeeUp,
        Self::TeeDown,
        Self::Vertical,
    ];

    /// Byte the terminal maps to this glyph.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Unicode box-drawing equivalent, for terminals without DEC graphics.
    #[must_use]
    pub const fn unicode(self) -> char {
        match self {
            Self::BottomRight => '┘',
            Self::TopRight => '┐',
            Self::TopLeft => '┌',
            Self::BottomLeft => '└',
            Self::Cross => '┼',
            Self::Horizontal => '─',
            Self::TeeRight => '├',
            Self::TeeLeft => '┤',
            Self::TeeUp => '┴',
            Self::TeeDown => '┬',
            Self::Vertical => '│',
        }
    }

    /// Map a DEC graphics byte back to its glyph.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_byte() == byte)
    }
}

impl fmt::Display for LineChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.as_byte()))
    }
}
