#![forbid(unsafe_code)]

//! Colored message prefixes (`[INFO]`, `[WARN]`, `[ERROR]`, ...).

use std::fmt;
use std::io::{self, Write};

use crate::color::named;
use crate::format::{FormatFlags, reset};
use crate::palette::ColorPalette;
use crate::set_color::SetColor;

/// Default width the tag plus padding occupies.
pub const DEFAULT_INDENT: usize = 8;

/// Message severity, also the key of the message palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Info,
    Log,
    Debug,
    Msg,
    Warn,
    Error,
    Critical,
}

impl MessageKind {
    /// Every kind, mildest first.
    pub const ALL: [MessageKind; 7] = [
        Self::Info,
        Self::Log,
        Self::Debug,
        Self::Msg,
        Self::Warn,
        Self::Error,
        Self::Critical,
    ];

    /// The bracketed tag printed before the message.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Info => "[INFO]",
            Self::Log => "[LOG]",
            Self::Debug => "[DEBUG]",
            Self::Msg => "[MSG]",
            Self::Warn => "[WARN]",
            Self::Error | Self::Critical => "[ERROR]",
        }
    }
}

/// The default message palette.
///
/// | Kind | Color |
/// |------|-------|
/// | Info | light gray |
/// | Log | white |
/// | Debug | magenta |
/// | Msg | green |
/// | Warn | orange |
/// | Error | red |
/// | Critical | bold intense red |
#[must_use]
pub fn message_palette() -> ColorPalette<MessageKind> {
    [
        (MessageKind::Info, SetColor::foreground(named::LIGHT_GRAY)),
        (MessageKind::Log, SetColor::foreground(named::WHITE)),
        (MessageKind::Debug, SetColor::foreground(named::MAGENTA)),
        (MessageKind::Msg, SetColor::foreground(named::GREEN)),
        (MessageKind::Warn, SetColor::foreground(named::ORANGE)),
        (MessageKind::Error, SetColor::foreground(named::RED)),
        (
            MessageKind::Critical,
            SetColor::foreground(named::INTENSE_RED).with_format(FormatFlags::BOLD),
        ),
    ]
    .into_iter()
    .collect()
}

/// A colored tag padded to the indent width.
///
/// Renders as `<color><tag><reset><padding>`; with an inactive palette or a
/// kind the palette lacks, only `<tag><padding>` is written. Padding is at
/// least one space.
#[derive(Debug, Clone, Copy)]
pub struct Message<'a> {
    kind: MessageKind,
    palette: &'a ColorPalette<MessageKind>,
    indent: usize,
}

impl<'a> Message<'a> {
    #[must_use]
    pub fn new(kind: MessageKind, palette: &'a ColorPalette<MessageKind>, indent: usize) -> Self {
        Self {
            kind,
            palette,
            indent,
        }
    }

    fn padding(&self) -> usize {
        self.indent.saturating_sub(self.kind.tag().len()).max(1)
    }
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.kind.tag();
        match self.palette.get(&self.kind) {
            Ok(color) if !color.is_placeholder() => write!(f, "{color}{tag}{}", reset())?,
            _ => f.write_str(tag)?,
        }
        write!(f, "{:width$}", "", width = self.padding())
    }
}

/// Writes tagged lines, optionally colored.
#[derive(Debug, Clone)]
pub struct MessagePrinter {
    palette: ColorPalette<MessageKind>,
    indent: usize,
}

impl Default for MessagePrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagePrinter {
    /// Colored output with the default palette and indent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            palette: message_palette(),
            indent: DEFAULT_INDENT,
        }
    }

    /// Use a custom palette.
    #[must_use]
    pub fn with_palette(mut self, palette: ColorPalette<MessageKind>) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.palette.set_active(enabled);
        self
    }

    /// Enable or disable color; returns the previous state.
    pub fn set_color_enabled(&mut self, enabled: bool) -> bool {
        self.palette.set_active(enabled)
    }

    #[must_use]
    pub fn color_enabled(&self) -> bool {
        self.palette.is_active()
    }

    /// The prefix for `kind`.
    #[must_use]
    pub fn prefix(&self, kind: MessageKind) -> Message<'_> {
        Message::new(kind, &self.palette, self.indent)
    }

    /// Write `prefix text\n` to `w`.
    pub fn write_line<W: Write + ?Sized>(
        &self,
        w: &mut W,
        kind: MessageKind,
        text: impl fmt::Display,
    ) -> io::Result<()> {
        writeln!(w, "{}{text}", self.prefix(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags() {
        assert_eq!(MessageKind::Info.tag(), "[INFO]");
        assert_eq!(MessageKind::Log.tag(), "[LOG]");
        assert_eq!(MessageKind::Debug.tag(), "[DEBUG]");
        assert_eq!(MessageKind::Msg.tag(), "[MSG]");
        assert_eq!(MessageKind::Warn.tag(), "[WARN]");
        assert_eq!(MessageKind::Error.tag(), "[ERROR]");
        assert_eq!(MessageKind::Critical.tag(), "[ERROR]");
    }

    #[test]
    fn palette_covers_every_kind() {
        let p = message_palette();
        for kind in MessageKind::ALL {
            assert!(p.contains_key(&kind), "{kind:?} missing");
        }
        assert_eq!(
            p.get(&MessageKind::Critical).unwrap().format(),
            FormatFlags::BOLD
        );
        assert_eq!(
            p.get(&MessageKind::Warn).unwrap(),
            &SetColor::foreground(named::ORANGE)
        );
    }

    #[test]
    fn colored_prefix_is_reset_and_padded() {
        let printer = MessagePrinter::new();
        assert_eq!(
            printer.prefix(MessageKind::Msg).to_string(),
            "\x1b[38;5;2m[MSG]\x1b[0m   "
        );
        assert_eq!(
            printer.prefix(MessageKind::Critical).to_string(),
            "\x1b[38;5;9m\x1b[1m[ERROR]\x1b[0m "
        );
    }

    #[test]
    fn plain_prefix_when_color_disabled() {
        let printer = MessagePrinter::new().with_color(false);
        assert!(!printer.color_enabled());
        assert_eq!(printer.prefix(MessageKind::Warn).to_string(), "[WARN]  ");
    }

    #[test]
    fn padding_is_at_least_one_space() {
        let printer = MessagePrinter::new().with_color(false).with_indent(2);
        assert_eq!(printer.prefix(MessageKind::Debug).to_string(), "[DEBUG] ");
    }

    #[test]
    fn write_line_appends_text_and_newline() {
        let mut printer = MessagePrinter::new();
        assert!(printer.set_color_enabled(false));
        let mut buf = Vec::new();
        printer
            .write_line(&mut buf, MessageKind::Info, "ready")
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[INFO]  ready\n");
    }

    #[test]
    fn missing_kind_prints_plain_tag() {
        let printer = MessagePrinter::new().with_palette(ColorPalette::new());
        assert_eq!(printer.prefix(MessageKind::Log).to_string(), "[LOG]   ");
    }
}
