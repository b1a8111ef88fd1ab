#![forbid(unsafe_code)]

//! Style: colors, format flags, color setters, palettes, and message prefixes.

pub mod color;
pub mod format;
pub mod message;
pub mod palette;
pub mod set_color;

pub use color::{Ansi16, Color, Layer, Rgb, color_sequence, named};
pub use format::FormatFlags;
pub use message::{Message, MessageKind, MessagePrinter, message_palette};
pub use palette::{ColorPalette, PaletteError};
pub use set_color::SetColor;
