#![forbid(unsafe_code)]

//! Inline color setter: a color sequence plus format flags.

use std::fmt;
use std::io::{self, Write};

use termapi_core::sequence::Sequence;

use crate::color::{Color, Layer, color_sequence};
use crate::format::FormatFlags;

/// A color escape sequence with optional formatting, printable inline.
///
/// ```
/// use termapi_style::color::named;
/// use termapi_style::format::FormatFlags;
/// use termapi_style::set_color::SetColor;
///
/// let warn = SetColor::foreground(named::ORANGE).with_format(FormatFlags::BOLD);
/// assert_eq!(warn.to_string(), "\x1b[38;5;208m\x1b[1m");
/// ```
///
/// Equality compares only the color sequence, not the format.
#[derive(Debug, Clone, Default)]
pub struct SetColor {
    sequence: Sequence,
    format: FormatFlags,
}

impl SetColor {
    /// Color `color` on `layer`, with `format`.
    #[must_use]
    pub fn new(color: impl Into<Color>, layer: Layer, format: FormatFlags) -> Self {
        Self {
            sequence: color_sequence(color, layer),
            format,
        }
    }

    /// Text color.
    #[must_use]
    pub fn foreground(color: impl Into<Color>) -> Self {
        Self::new(color, Layer::Foreground, FormatFlags::empty())
    }

    /// Background color.
    #[must_use]
    pub fn background(color: impl Into<Color>) -> Self {
        Self::new(color, Layer::Background, FormatFlags::empty())
    }

    /// Use a prebuilt sequence verbatim.
    #[must_use]
    pub fn from_sequence(sequence: Sequence, format: FormatFlags) -> Self {
        Self { sequence, format }
    }

    /// A setter that writes nothing.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format(mut self, format: FormatFlags) -> Self {
        self.format = format;
        self
    }

    /// Whether this setter writes nothing at all.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.sequence.is_empty() && self.format.is_empty()
    }

    #[must_use]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    #[must_use]
    pub fn format(&self) -> FormatFlags {
        self.format
    }

    /// Replace the format; returns the previous one.
    pub fn set_format(&mut self, format: FormatFlags) -> FormatFlags {
        std::mem::replace(&mut self.format, format)
    }

    /// Add `format` to the current flags; returns the previous ones.
    pub fn add_format(&mut self, format: FormatFlags) -> FormatFlags {
        let previous = self.format;
        self.format.insert(format);
        previous
    }

    /// Clear `format` from the current flags; returns the previous ones.
    pub fn remove_format(&mut self, format: FormatFlags) -> FormatFlags {
        let previous = self.format;
        self.format.remove(format);
        previous
    }

    /// Write the color sequence followed by one SGR per format flag.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        self.sequence.write_to(w)?;
        self.format.to_sequence().write_to(w)
    }
}

impl PartialEq for SetColor {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for SetColor {}

impl fmt::Display for SetColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sequence, self.format.to_sequence())
    }
}

impl From<Color> for SetColor {
    fn from(color: Color) -> Self {
        Self::foreground(color)
    }
}
