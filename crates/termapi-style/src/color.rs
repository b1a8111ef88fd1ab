#![forbid(unsafe_code)]

//! Color values and the layer they apply to.

use std::fmt;

use termapi_core::sequence::{LAYER_BACKGROUND, LAYER_FOREGROUND, SGR_END, Sequence};

/// The 16 standard ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Ansi16 {
    /// Black (index 0).
    Black = 0,
    /// Red (index 1).
    Red = 1,
    /// Green (index 2).
    Green = 2,
    /// Yellow (index 3).
    Yellow = 3,
    /// Blue (index 4).
    Blue = 4,
    /// Magenta (index 5).
    Magenta = 5,
    /// Cyan (index 6).
    Cyan = 6,
    /// White (index 7).
    White = 7,
    /// Bright black (index 8).
    BrightBlack = 8,
    /// Bright red (index 9).
    BrightRed = 9,
    /// Bright green (index 10).
    BrightGreen = 10,
    /// Bright yellow (index 11).
    BrightYellow = 11,
    /// Bright blue (index 12).
    BrightBlue = 12,
    /// Bright magenta (index 13).
    BrightMagenta = 13,
    /// Bright cyan (index 14).
    BrightCyan = 14,
    /// Bright white (index 15).
    BrightWhite = 15,
}

impl Ansi16 {
    /// Return the raw ANSI index (0–15).
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Convert an index to a variant, returning `None` above 15.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Black),
            1 => Some(Self::Red),
            2 => Some(Self::Green),
            3 => Some(Self::Yellow),
            4 => Some(Self::Blue),
            5 => Some(Self::Magenta),
            6 => Some(Self::Cyan),
            7 => Some(Self::White),
            8 => Some(Self::BrightBlack),
            9 => Some(Self::BrightRed),
            10 => Some(Self::BrightGreen),
            11 => Some(Self::BrightYellow),
            12 => Some(Self::BrightBlue),
            13 => Some(Self::BrightMagenta),
            14 => Some(Self::BrightCyan),
            15 => Some(Self::BrightWhite),
            _ => None,
        }
    }
}

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// One of the 16 standard colors.
    Ansi16(Ansi16),
    /// An entry of the 256-color palette.
    Indexed(u8),
    /// 24-bit color.
    Rgb(Rgb),
}

impl Color {
    /// Palette index for indexed and standard colors.
    #[must_use]
    pub const fn palette_index(self) -> Option<u8> {
        match self {
            Self::Ansi16(c) => Some(c.as_u8()),
            Self::Indexed(n) => Some(n),
            Self::Rgb(_) => None,
        }
    }
}

impl From<Ansi16> for Color {
    fn from(c: Ansi16) -> Self {
        Self::Ansi16(c)
    }
}

impl From<u8> for Color {
    fn from(n: u8) -> Self {
        Self::Indexed(n)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}

/// Named 256-color palette entries.
pub mod named {
    use super::Color;

    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);
    pub const GRAY: Color = Color::Indexed(8);
    pub const INTENSE_RED: Color = Color::Indexed(9);
    pub const INTENSE_GREEN: Color = Color::Indexed(10);
    pub const INTENSE_YELLOW: Color = Color::Indexed(11);
    pub const INTENSE_BLUE: Color = Color::Indexed(12);
    pub const INTENSE_MAGENTA: Color = Color::Indexed(13);
    pub const INTENSE_CYAN: Color = Color::Indexed(14);
    pub const INTENSE_WHITE: Color = Color::Indexed(15);
    pub const ORANGE: Color = Color::Indexed(208);
    pub const LIGHT_GRAY: Color = Color::Indexed(250);
    pub const DARK_GRAY: Color = Color::Indexed(240);
}

/// Which part of a cell a color applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layer {
    /// Text.
    #[default]
    Foreground,
    /// Cell background.
    Background,
}

impl Layer {
    /// SGR prefix selecting a palette color on this layer.
    #[must_use]
    pub const fn indexed_prefix(self) -> &'static str {
        match self {
            Self::Foreground => LAYER_FOREGROUND,
            Self::Background => LAYER_BACKGROUND,
        }
    }

    /// SGR prefix selecting a 24-bit color on this layer.
    #[must_use]
    pub const fn rgb_prefix(self) -> &'static str {
        match self {
            Self::Foreground => "38;2",
            Self::Background => "48;2",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.indexed_prefix())
    }
}

/// `CSI <layer> ; <n> m` for palette colors, `CSI <layer> ; r ; g ; b m` for
/// RGB.
#[must_use]
pub fn color_sequence(color: impl Into<Color>, layer: Layer) -> Sequence {
    let params = match color.into() {
        Color::Ansi16(c) => format!("{};{}", layer.indexed_prefix(), c.as_u8()),
        Color::Indexed(n) => format!("{};{n}", layer.indexed_prefix()),
        Color::Rgb(Rgb { r, g, b }) => format!("{};{r};{g};{b}", layer.rgb_prefix()),
    };
    Sequence::csi(&params, SGR_END)
}
